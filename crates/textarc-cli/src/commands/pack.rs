//! Pack command implementation.

use super::ensure_writable;
use crate::cli::PackArgs;
use crate::error::add_context;
use crate::output::OutputFormatter;
use crate::output::PackOutput;
use crate::progress::CliProgress;
use anyhow::Context;
use anyhow::Result;
use std::fs;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;
use textarc_core::CancellationToken;
use textarc_core::NoopProgress;
use textarc_core::PackConfig;
use textarc_core::PackReport;
use textarc_core::ProgressCallback;
use textarc_core::pack_and_encode_with;
use textarc_core::pack_to_writer;
use textarc_core::suggested_text_file_name;

pub fn execute(args: &PackArgs, formatter: &dyn OutputFormatter, show_progress: bool) -> Result<()> {
    let config = args.config();
    let cancel = CancellationToken::new();
    let mut progress: Box<dyn ProgressCallback> = if show_progress {
        Box::new(CliProgress::new("Packing"))
    } else {
        Box::new(NoopProgress)
    };

    if let Some(output) = &args.output {
        let output = resolve_output(output, &args.sources);
        ensure_writable(&output, args.force)?;
        let report = write_text_file(&args.sources, &output, &config, progress.as_mut(), &cancel)?;
        drop(progress);
        return formatter.format_pack_result(PackOutput::File(&output), &report);
    }

    let (text, report) = add_context(
        pack_and_encode_with(&args.sources, &config, progress.as_mut(), &cancel),
        "sources",
    )?;
    drop(progress);
    formatter.format_pack_result(PackOutput::Text(&text), &report)
}

/// An existing directory as output receives the suggested file name.
fn resolve_output(output: &Path, sources: &[PathBuf]) -> PathBuf {
    if output.is_dir() {
        output.join(suggested_text_file_name(sources))
    } else {
        output.to_path_buf()
    }
}

fn write_text_file(
    sources: &[PathBuf],
    output: &Path,
    config: &PackConfig,
    progress: &mut dyn ProgressCallback,
    cancel: &CancellationToken,
) -> Result<PackReport> {
    let mut file = File::create(output)
        .with_context(|| format!("failed to create '{}'", output.display()))?;

    let result = pack_to_writer(sources, &mut file, config, progress, cancel)
        .and_then(|report| file.sync_all().map(|()| report).map_err(Into::into));

    if result.is_err() {
        drop(file);
        let _ = fs::remove_file(output);
    }
    add_context(result, "sources")
}
