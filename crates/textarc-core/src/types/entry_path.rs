//! Validated archive entry path.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// A relative, forward-slash separated archive path.
///
/// `EntryPath` can only be built through [`EntryPath::parse`] (for names read
/// from an archive) or [`EntryPath::from_relative`] (for paths produced by
/// the tree walker), and both reject anything that could resolve outside the
/// directory it is joined to:
///
/// - empty names and empty segments (`a//b`)
/// - absolute names (`/etc/passwd`) and drive prefixes (`C:`)
/// - `.` and `..` segments
/// - backslashes and NUL bytes
///
/// Malformed names are rejected rather than cleaned up, so a bad archive is
/// reported instead of silently rewritten.
///
/// # Examples
///
/// ```
/// use textarc_core::types::EntryPath;
///
/// let path = EntryPath::parse("docs/readme.txt").unwrap();
/// assert_eq!(path.segments().count(), 2);
///
/// assert!(EntryPath::parse("../../etc/passwd").is_none());
/// assert!(EntryPath::parse("/etc/passwd").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryPath(String);

impl EntryPath {
    /// Validates a raw archive name.
    ///
    /// A single trailing `/` (the directory marker) is accepted and removed.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.strip_suffix('/').unwrap_or(raw);
        if trimmed.is_empty() || trimmed.contains(['\\', '\0']) || trimmed.starts_with('/') {
            return None;
        }

        for (i, segment) in trimmed.split('/').enumerate() {
            if segment.is_empty() || segment == "." || segment == ".." {
                return None;
            }
            if i == 0 && has_drive_prefix(segment) {
                return None;
            }
        }

        Some(Self(trimmed.to_string()))
    }

    /// Builds an archive path from a relative filesystem path.
    ///
    /// Returns `None` for absolute paths, paths containing `..`, or names that
    /// are not valid UTF-8.
    #[must_use]
    pub fn from_relative(path: &Path) -> Option<Self> {
        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(name) => segments.push(name.to_str()?),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Self::parse(&segments.join("/"))
    }

    /// Returns the path as stored in the archive, without a directory marker.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the archive name for a directory entry (with trailing `/`).
    #[must_use]
    pub fn as_dir_name(&self) -> String {
        format!("{}/", self.0)
    }

    /// Iterates the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Converts to a relative platform path.
    #[must_use]
    pub fn to_path_buf(&self) -> PathBuf {
        self.segments().collect()
    }
}

impl std::fmt::Display for EntryPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn has_drive_prefix(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
