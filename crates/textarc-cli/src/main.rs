//! Textarc CLI - Command-line utility for packing file trees into base64
//! text and unpacking them again.

mod cli;
mod commands;
mod error;
mod logger;
mod output;
mod progress;

use clap::Parser;
use cli::Commands;
use output::OutputFormatter;
use progress::CliProgress;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    logger::init(cli.verbose, cli.quiet);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match run(&cli, &*formatter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.format_error(cli.command.name(), &err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &cli::Cli, formatter: &dyn OutputFormatter) -> anyhow::Result<()> {
    let show_progress = CliProgress::should_show(cli.quiet, cli.json);

    match &cli.command {
        Commands::Pack(args) => commands::pack::execute(args, formatter, show_progress),
        Commands::Unpack(args) => commands::unpack::execute(args, formatter, show_progress),
        Commands::Save(args) => commands::save::execute(args, formatter),
        Commands::Encode(args) => commands::encode::execute(args, formatter),
        Commands::Decode(args) => commands::decode::execute(args, formatter),
        Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            Ok(())
        }
    }
}
