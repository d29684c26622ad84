//! Output formatter trait for CLI results.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use textarc_core::ExtractReport;
use textarc_core::PackReport;

/// Where `pack` sent its encoded text.
#[derive(Debug, Clone, Copy)]
pub enum PackOutput<'a> {
    /// Text was written to this file.
    File(&'a Path),
    /// Text is handed to the formatter for stdout.
    Text(&'a str),
}

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format pack result, including the text itself when it goes to stdout
    fn format_pack_result(&self, output: PackOutput<'_>, report: &PackReport) -> Result<()>;

    /// Format unpack result
    fn format_unpack_result(&self, destination: &Path, report: &ExtractReport) -> Result<()>;

    /// Format save result
    fn format_save_result(&self, output: &Path, bytes: u64, is_archive: bool) -> Result<()>;

    /// Format plain-text encode/decode result
    fn format_text_result(&self, operation: &str, text: &str) -> Result<()>;

    /// Format error message
    fn format_error(&self, operation: &str, error: &anyhow::Error);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SkippedOutput {
    pub path: String,
    pub reason: &'static str,
}

/// Flattens skipped entries for display.
pub fn skipped_entries(skipped: &[textarc_core::SkippedEntry]) -> Vec<SkippedOutput> {
    skipped
        .iter()
        .map(|s| SkippedOutput {
            path: s.path.clone(),
            reason: s.reason.as_str(),
        })
        .collect()
}
