//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::PackOutput;
use super::formatter::SkippedOutput;
use super::formatter::skipped_entries;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;
use textarc_core::ExtractReport;
use textarc_core::PackReport;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_pack_result(&self, output: PackOutput<'_>, report: &PackReport) -> Result<()> {
        #[derive(Serialize)]
        struct PackData<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            output_path: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            text: Option<&'a str>,
            files_added: usize,
            directories_added: usize,
            bytes_read: u64,
            archive_size: u64,
            compression_ratio: f64,
            skipped: Vec<SkippedOutput>,
            duration_ms: u128,
        }

        let (output_path, text) = match output {
            PackOutput::File(path) => (Some(path.display().to_string()), None),
            PackOutput::Text(text) => (None, Some(text)),
        };

        let data = PackData {
            output_path,
            text,
            files_added: report.files_added,
            directories_added: report.directories_added,
            bytes_read: report.bytes_read,
            archive_size: report.archive_size,
            compression_ratio: report.compression_ratio(),
            skipped: skipped_entries(&report.skipped),
            duration_ms: report.duration.as_millis(),
        };

        Self::output(&JsonOutput::success("pack", data))
    }

    fn format_unpack_result(&self, destination: &Path, report: &ExtractReport) -> Result<()> {
        #[derive(Serialize)]
        struct UnpackData {
            destination: String,
            files_written: usize,
            directories_created: usize,
            bytes_written: u64,
            entries_processed: usize,
            skipped: Vec<SkippedOutput>,
            duration_ms: u128,
        }

        let data = UnpackData {
            destination: destination.display().to_string(),
            files_written: report.files_written,
            directories_created: report.directories_created,
            bytes_written: report.bytes_written,
            entries_processed: report.entries_processed,
            skipped: skipped_entries(&report.skipped),
            duration_ms: report.duration.as_millis(),
        };

        Self::output(&JsonOutput::success("unpack", data))
    }

    fn format_save_result(&self, output: &Path, bytes: u64, is_archive: bool) -> Result<()> {
        #[derive(Serialize)]
        struct SaveData {
            output_path: String,
            bytes_written: u64,
            is_archive: bool,
        }

        let data = SaveData {
            output_path: output.display().to_string(),
            bytes_written: bytes,
            is_archive,
        };

        Self::output(&JsonOutput::success("save", data))
    }

    fn format_text_result(&self, operation: &str, text: &str) -> Result<()> {
        #[derive(Serialize)]
        struct TextData<'a> {
            text: &'a str,
        }

        Self::output(&JsonOutput::success(operation, TextData { text }))
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error(operation, format!("{error:#}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}
