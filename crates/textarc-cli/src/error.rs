//! Error conversion utilities for CLI.
//!
//! Converts textarc-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use textarc_core::TranscodeError;

/// Converts `TranscodeError` to user-friendly anyhow error with context.
///
/// `subject` names what was being processed, e.g. a file path or "stdin".
pub fn convert_error(err: TranscodeError, subject: &str) -> anyhow::Error {
    match err {
        TranscodeError::MalformedText { reason } => {
            anyhow!(
                "Input '{subject}' is not valid base64 text: {reason}\n\
                 HINT: Line breaks and spaces are ignored; any other character outside A-Z, a-z, 0-9, '+', '/' and '=' is rejected."
            )
        }
        TranscodeError::CorruptArchive { index, reason } => {
            anyhow!(
                "Archive decoded from '{subject}' is corrupt at entry {index}: {reason}\n\
                 HINT: The text decodes, but not to a ZIP archive. Use `textarc save` to inspect the raw bytes."
            )
        }
        TranscodeError::TruncatedArchive { index } => {
            anyhow!(
                "Archive decoded from '{subject}' ends inside entry {index}\n\
                 HINT: The text appears to be cut off. Check that it was copied completely."
            )
        }
        TranscodeError::DestinationConflict { path } => {
            anyhow!(
                "Refusing to replace '{}'\n\
                 HINT: Use --overwrite to replace existing files or --skip-existing to keep them.",
                path.display()
            )
        }
        TranscodeError::SourceUnavailable { path, source } => {
            anyhow!(
                "Cannot read source '{}': {source}\n\
                 HINT: Check that the path exists and is readable.",
                path.display()
            )
        }
        TranscodeError::Io(io_err) => {
            anyhow!("I/O error while processing '{subject}': {io_err}")
        }
        TranscodeError::Cancelled => anyhow!("Operation on '{subject}' was cancelled"),
        err @ TranscodeError::UnsafePath { .. } => {
            anyhow::Error::from(err).context(format!("Error processing '{subject}'"))
        }
    }
}

/// Adds user-facing context to a library result.
pub fn add_context<T>(result: Result<T, TranscodeError>, subject: &str) -> anyhow::Result<T> {
    result.map_err(|e| convert_error(e, subject))
}
