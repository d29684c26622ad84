//! Operation reports and progress reporting.

use std::path::Path;
use std::time::Duration;

use crate::TranscodeError;

/// Why an entry was left out of an archive or not written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Entry path escapes the destination or is malformed.
    UnsafePath,
    /// A file already exists at the target and the policy is skip-existing.
    AlreadyExists,
    /// Symbolic link leads back to a directory on the current path.
    SymlinkCycle,
    /// Symbolic link target does not exist.
    BrokenSymlink,
    /// Symbolic link not followed by configuration.
    Symlink,
    /// FIFO, socket, device or other non-regular file.
    SpecialFile,
    /// Another source already produced an entry with this archive path.
    DuplicatePath,
    /// File name cannot be stored as an archive path (not UTF-8, or holds a
    /// backslash or NUL).
    UnrepresentableName,
}

impl SkipReason {
    /// Returns a short, stable identifier for the reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnsafePath => "unsafe-path",
            Self::AlreadyExists => "already-exists",
            Self::SymlinkCycle => "symlink-cycle",
            Self::BrokenSymlink => "broken-symlink",
            Self::Symlink => "symlink",
            Self::SpecialFile => "special-file",
            Self::DuplicatePath => "duplicate-path",
            Self::UnrepresentableName => "unrepresentable-name",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entry that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Archive index of the entry (extraction only).
    pub index: Option<usize>,
    /// Archive path, or filesystem path when packing.
    pub path: String,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Report of a pack operation.
#[derive(Debug, Clone, Default)]
pub struct PackReport {
    /// Number of regular files added.
    pub files_added: usize,

    /// Number of directory entries added.
    pub directories_added: usize,

    /// Uncompressed bytes read from source files.
    pub bytes_read: u64,

    /// Size of the finished archive in bytes.
    pub archive_size: u64,

    /// Entries left out, with reasons.
    pub skipped: Vec<SkippedEntry>,

    /// Duration of the operation.
    pub duration: Duration,
}

impl PackReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a skipped source path.
    pub fn add_skip(&mut self, path: impl Into<String>, reason: SkipReason) {
        self.skipped.push(SkippedEntry {
            index: None,
            path: path.into(),
            reason,
        });
    }

    /// Returns the total number of entries written to the archive.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.files_added + self.directories_added
    }

    /// Returns the compression ratio (uncompressed / archive size).
    ///
    /// Returns 0.0 when either side is zero.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.archive_size == 0 || self.bytes_read == 0 {
            return 0.0;
        }
        self.bytes_read as f64 / self.archive_size as f64
    }

    /// Returns skipped entries with the given reason.
    #[cfg(test)]
    pub(crate) fn skipped_with(&self, reason: SkipReason) -> impl Iterator<Item = &SkippedEntry> {
        self.skipped.iter().filter(move |s| s.reason == reason)
    }
}

/// Summary of an extraction.
///
/// A report is produced even when the extraction aborts part way: files
/// written before the failure stay on disk and are counted here, and the
/// failure itself is kept in [`ExtractReport::error`].
#[derive(Debug, Default)]
pub struct ExtractReport {
    /// Number of regular files written.
    pub files_written: usize,

    /// Number of directories created (existing directories are not counted).
    pub directories_created: usize,

    /// Total bytes written to disk.
    pub bytes_written: u64,

    /// Entries handled so far, whether written or skipped.
    pub entries_processed: usize,

    /// Entries not written, with reasons.
    pub skipped: Vec<SkippedEntry>,

    /// Whether the run stopped because of a cancellation request.
    pub cancelled: bool,

    /// First fatal error, if the run aborted.
    pub error: Option<TranscodeError>,

    /// Duration of the operation.
    pub duration: Duration,
}

impl ExtractReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a skipped archive entry.
    pub fn add_skip(&mut self, index: usize, path: impl Into<String>, reason: SkipReason) {
        self.skipped.push(SkippedEntry {
            index: Some(index),
            path: path.into(),
            reason,
        });
    }

    /// Returns `true` if every entry was handled and nothing aborted the run.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.error.is_none()
    }

    /// Returns the fatal error, if the run aborted.
    #[must_use]
    pub fn error(&self) -> Option<&TranscodeError> {
        self.error.as_ref()
    }

    /// Returns skipped entries with the given reason.
    pub fn skipped_with(&self, reason: SkipReason) -> impl Iterator<Item = &SkippedEntry> {
        self.skipped.iter().filter(move |s| s.reason == reason)
    }

    /// Converts an aborted report into its error, discarding the counts.
    ///
    /// Cancellation is not an error here; check [`ExtractReport::cancelled`].
    pub fn into_result(mut self) -> crate::Result<Self> {
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

/// Callback trait for progress reporting during pack and extract.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use textarc_core::ProgressCallback;
///
/// struct Printer;
///
/// impl ProgressCallback for Printer {
///     fn on_entry_start(&mut self, path: &Path, total: Option<usize>, current: usize) {
///         match total {
///             Some(total) => println!("[{current}/{total}] {}", path.display()),
///             None => println!("[{current}] {}", path.display()),
///         }
///     }
///
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///
///     fn on_entry_complete(&mut self, _path: &Path) {}
///
///     fn on_complete(&mut self) {}
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called when starting to process an entry.
    ///
    /// `total` is unknown while extracting from a forward-only stream.
    /// `current` is 1-indexed.
    fn on_entry_start(&mut self, path: &Path, total: Option<usize>, current: usize);

    /// Called for every chunk of file data moved.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called when an entry has been fully processed (written or skipped).
    fn on_entry_complete(&mut self, path: &Path);

    /// Called once when the whole operation finishes.
    fn on_complete(&mut self);
}

/// No-op implementation of `ProgressCallback`.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _total: Option<usize>, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}
