//! Unpack command implementation.

use super::read_text;
use super::subject;
use crate::cli::UnpackArgs;
use crate::cli::input_file;
use crate::error::add_context;
use crate::error::convert_error;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use anyhow::bail;
use textarc_core::CancellationToken;
use textarc_core::NoopProgress;
use textarc_core::ProgressCallback;
use textarc_core::decode_and_extract_with;
use textarc_core::extract_text_file;

pub fn execute(
    args: &UnpackArgs,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
) -> Result<()> {
    let input = input_file(args.input.as_ref());
    let subject = subject(input);
    let config = args.config();
    let cancel = CancellationToken::new();
    let mut progress: Box<dyn ProgressCallback> = if show_progress {
        Box::new(CliProgress::new("Unpacking"))
    } else {
        Box::new(NoopProgress)
    };

    // Files are decoded through a temp file; stdin is small enough to hold.
    let result = match input {
        Some(path) => extract_text_file(
            path,
            &args.destination,
            &config,
            progress.as_mut(),
            &cancel,
        ),
        None => {
            let text = read_text(None)?;
            decode_and_extract_with(
                &text,
                &args.destination,
                &config,
                progress.as_mut(),
                &cancel,
            )
        }
    };
    drop(progress);

    let mut report = add_context(result, &subject)?;

    if let Some(err) = report.error.take() {
        let written = report.files_written;
        return Err(convert_error(err, &subject).context(format!(
            "unpack stopped after {} entries ({written} files written to '{}')",
            report.entries_processed,
            args.destination.display()
        )));
    }
    if report.cancelled {
        bail!("unpack cancelled after {} entries", report.entries_processed);
    }

    formatter.format_unpack_result(&args.destination, &report)
}
