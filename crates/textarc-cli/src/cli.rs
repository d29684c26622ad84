//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::Path;
use std::path::PathBuf;
use textarc_core::CollisionPolicy;
use textarc_core::ExtractConfig;
use textarc_core::PackConfig;

#[derive(Parser)]
#[command(name = "textarc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pack files and directories into base64 text
    Pack(PackArgs),
    /// Decode base64 text and extract the archive it holds
    Unpack(UnpackArgs),
    /// Decode base64 text into a raw archive file
    Save(SaveArgs),
    /// Encode plain text as base64
    Encode(TextArgs),
    /// Decode base64 into plain text
    Decode(TextArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

impl Commands {
    /// Operation name used in JSON output.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pack(_) => "pack",
            Self::Unpack(_) => "unpack",
            Self::Save(_) => "save",
            Self::Encode(_) => "encode",
            Self::Decode(_) => "decode",
            Self::Completion(_) => "completion",
        }
    }
}

#[derive(clap::Args)]
pub struct PackArgs {
    /// Files or directories to pack
    #[arg(value_name = "SOURCE", required = true)]
    pub sources: Vec<PathBuf>,

    /// Write the text to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Compression level (0 stores, 1-9 deflate)
    #[arg(
        short = 'l',
        long,
        default_value = "6",
        value_parser = clap::value_parser!(u8).range(0..=9)
    )]
    pub compression_level: u8,

    /// Record symbolic links as skipped instead of following them
    #[arg(long)]
    pub no_follow_symlinks: bool,

    /// Leave out files and directories whose name starts with a dot
    #[arg(long)]
    pub exclude_hidden: bool,

    /// Do not store modification times
    #[arg(long)]
    pub no_mtime: bool,

    /// Overwrite output file if exists
    #[arg(short = 'f', long)]
    pub force: bool,
}

impl PackArgs {
    pub fn config(&self) -> PackConfig {
        PackConfig::default()
            .with_compression_level(self.compression_level)
            .with_follow_symlinks(!self.no_follow_symlinks)
            .with_include_hidden(!self.exclude_hidden)
            .with_store_mtime(!self.no_mtime)
    }
}

#[derive(clap::Args)]
pub struct UnpackArgs {
    /// Text file to read (default: stdin)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Destination directory
    #[arg(short = 'd', long = "dest", value_name = "DIR")]
    pub destination: PathBuf,

    /// Replace existing files
    #[arg(long, conflicts_with = "skip_existing")]
    pub overwrite: bool,

    /// Keep existing files and skip the entries that would replace them
    #[arg(long)]
    pub skip_existing: bool,

    /// Do not restore modification times
    #[arg(long)]
    pub no_mtime: bool,

    /// Fail if the destination directory does not exist
    #[arg(long)]
    pub no_create: bool,
}

impl UnpackArgs {
    pub const fn policy(&self) -> CollisionPolicy {
        if self.overwrite {
            CollisionPolicy::Overwrite
        } else if self.skip_existing {
            CollisionPolicy::SkipExisting
        } else {
            CollisionPolicy::FailOnConflict
        }
    }

    pub fn config(&self) -> ExtractConfig {
        ExtractConfig::default()
            .with_collision_policy(self.policy())
            .with_restore_mtime(!self.no_mtime)
            .with_create_destination(!self.no_create)
    }
}

#[derive(clap::Args)]
pub struct SaveArgs {
    /// Text file to read (default: stdin)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Archive file to write
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Overwrite output file if exists
    #[arg(short = 'f', long)]
    pub force: bool,
}

#[derive(clap::Args)]
pub struct TextArgs {
    /// File to read (default: stdin)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Returns the input file unless it is absent or `-`, which mean stdin.
pub fn input_file(input: Option<&PathBuf>) -> Option<&Path> {
    input.map(PathBuf::as_path).filter(|p| *p != Path::new("-"))
}
