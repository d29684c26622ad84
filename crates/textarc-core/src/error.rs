//! Error types for packing, transcoding and extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `TranscodeError`.
pub type Result<T> = std::result::Result<T, TranscodeError>;

/// Errors that can occur anywhere in the pack/encode and decode/extract
/// pipelines.
#[derive(Error, Debug)]
pub enum TranscodeError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A source path is missing or unreadable at pack time.
    #[error("source unavailable: {path}: {source}")]
    SourceUnavailable {
        /// The path that could not be read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// Input text is not valid radix-64.
    #[error("malformed text: {reason}")]
    MalformedText {
        /// Decoder diagnostic.
        reason: String,
    },

    /// Archive failed an internal consistency check.
    #[error("corrupt archive at entry {index}: {reason}")]
    CorruptArchive {
        /// Zero-based index of the offending entry.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// Archive byte stream ended in the middle of an entry.
    #[error("truncated archive: stream ended inside entry {index}")]
    TruncatedArchive {
        /// Zero-based index of the incomplete entry.
        index: usize,
    },

    /// Entry path would resolve outside the destination or is malformed.
    #[error("unsafe path in entry {index}: {path}")]
    UnsafePath {
        /// Zero-based index of the entry.
        index: usize,
        /// The path as recorded in the archive.
        path: String,
    },

    /// Destination already holds a file the archive wants to write.
    #[error("destination conflict: {path} already exists")]
    DestinationConflict {
        /// The existing path.
        path: PathBuf,
    },

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,
}

impl TranscodeError {
    /// Returns `true` if processing can continue with the next entry.
    ///
    /// Only per-entry problems are recoverable; everything else aborts the
    /// current operation.
    ///
    /// # Examples
    ///
    /// ```
    /// use textarc_core::TranscodeError;
    ///
    /// let err = TranscodeError::UnsafePath {
    ///     index: 3,
    ///     path: "../etc/passwd".into(),
    /// };
    /// assert!(err.is_recoverable());
    ///
    /// let err = TranscodeError::TruncatedArchive { index: 3 };
    /// assert!(!err.is_recoverable());
    /// ```
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnsafePath { .. })
    }

    /// Returns `true` if the error comes from untrusted archive content.
    #[must_use]
    pub const fn is_archive_fault(&self) -> bool {
        matches!(
            self,
            Self::CorruptArchive { .. } | Self::TruncatedArchive { .. } | Self::UnsafePath { .. }
        )
    }

    /// Returns the index of the entry the error is attributed to, if any.
    #[must_use]
    pub const fn entry_index(&self) -> Option<usize> {
        match self {
            Self::CorruptArchive { index, .. }
            | Self::TruncatedArchive { index }
            | Self::UnsafePath { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub(crate) fn corrupt(index: usize, reason: impl Into<String>) -> Self {
        Self::CorruptArchive {
            index,
            reason: reason.into(),
        }
    }

    pub(crate) fn source_unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            source,
        }
    }
}
