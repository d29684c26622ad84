//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use super::formatter::PackOutput;
use super::formatter::skipped_entries;
use anyhow::Result;
use console::Term;
use console::style;
use std::path::Path;
use textarc_core::ExtractReport;
use textarc_core::PackReport;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn headline(&self, term: &Term, message: &str) {
        if self.use_colors {
            let _ = term.write_line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            let _ = term.write_line(message);
        }
    }

    fn write_skipped(&self, term: &Term, skipped: &[textarc_core::SkippedEntry]) {
        if skipped.is_empty() {
            return;
        }
        let _ = term.write_line(&format!(
            "  Skipped:          {}",
            Self::format_number(skipped.len())
        ));
        if self.verbose {
            for entry in skipped_entries(skipped) {
                let _ = term.write_line(&format!("    - {} ({})", entry.path, entry.reason));
            }
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_pack_result(&self, output: PackOutput<'_>, report: &PackReport) -> Result<()> {
        // Encoded text owns stdout; the summary moves to stderr.
        let term = match output {
            PackOutput::Text(text) => {
                self.term.write_line(text)?;
                Term::stderr()
            }
            PackOutput::File(_) => self.term.clone(),
        };

        if self.quiet {
            return Ok(());
        }

        match output {
            PackOutput::File(path) => {
                self.headline(&term, &format!("Text written: {}", path.display()));
            }
            PackOutput::Text(_) => self.headline(&term, "Packing complete"),
        }

        let _ = term.write_line(&format!(
            "  Files added:      {}",
            Self::format_number(report.files_added)
        ));
        let _ = term.write_line(&format!(
            "  Directories:      {}",
            Self::format_number(report.directories_added)
        ));
        let _ = term.write_line(&format!(
            "  Source size:      {}",
            Self::format_size(report.bytes_read)
        ));
        let _ = term.write_line(&format!(
            "  Archive size:     {}",
            Self::format_size(report.archive_size)
        ));
        self.write_skipped(&term, &report.skipped);

        if self.verbose {
            let _ = term.write_line(&format!("  Duration:         {:?}", report.duration));
        }

        Ok(())
    }

    fn format_unpack_result(&self, destination: &Path, report: &ExtractReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline(
            &self.term,
            &format!("Unpacked into {}", destination.display()),
        );
        let _ = self.term.write_line(&format!(
            "  Files written:    {}",
            Self::format_number(report.files_written)
        ));
        let _ = self.term.write_line(&format!(
            "  Directories:      {}",
            Self::format_number(report.directories_created)
        ));
        let _ = self.term.write_line(&format!(
            "  Total size:       {}",
            Self::format_size(report.bytes_written)
        ));
        self.write_skipped(&self.term, &report.skipped);

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Duration:         {:?}", report.duration));
        }

        Ok(())
    }

    fn format_save_result(&self, output: &Path, bytes: u64, is_archive: bool) -> Result<()> {
        if !is_archive {
            self.format_warning("decoded data does not look like a ZIP archive");
        }
        if self.quiet {
            return Ok(());
        }

        self.headline(
            &self.term,
            &format!(
                "Saved {} to {}",
                Self::format_size(bytes),
                output.display()
            ),
        );
        Ok(())
    }

    fn format_text_result(&self, _operation: &str, text: &str) -> Result<()> {
        // The result is the output, so quiet mode still prints it.
        self.term.write_line(text)?;
        Ok(())
    }

    fn format_error(&self, _operation: &str, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        let term = Term::stderr();
        if console::colors_enabled_stderr() {
            let _ = term.write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = term.write_line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let term = Term::stderr();
        if console::colors_enabled_stderr() {
            let _ = term.write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = term.write_line(&format!("WARNING: {message}"));
        }
    }
}
