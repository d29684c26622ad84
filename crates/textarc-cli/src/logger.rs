//! Minimal `log` backend writing styled records to stderr.

use console::Term;
use console::style;
use log::Level;
use log::LevelFilter;
use log::Log;
use log::Metadata;
use log::Record;

static LOGGER: StderrLogger = StderrLogger;

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level() && metadata.target().starts_with("textarc")
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let label = match record.level() {
            Level::Error => style("error:").red().bold(),
            Level::Warn => style("warning:").yellow().bold(),
            Level::Info => style("info:").cyan(),
            Level::Debug | Level::Trace => style("debug:").dim(),
        };
        let label = label.for_stderr();
        let _ = Term::stderr().write_line(&format!("{label} {}", record.args()));
    }

    fn flush(&self) {}
}

/// Maps the global verbosity flags onto a level filter.
pub const fn level_for(verbose: bool, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Installs the stderr logger. Later calls are ignored.
pub fn init(verbose: bool, quiet: bool) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level_for(verbose, quiet));
    }
}
