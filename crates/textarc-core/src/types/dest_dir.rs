//! Validated destination directory type.

use crate::Result;
use crate::TranscodeError;
use crate::types::EntryPath;
use std::io;
use std::path::Path;
use std::path::PathBuf;

/// A validated destination directory for extraction.
///
/// Once constructed, a `DestDir` is an existing directory held as an absolute
/// canonical path. Every output path is produced by [`DestDir::resolve`],
/// which is the containment check the extractor relies on.
///
/// # Examples
///
/// ```no_run
/// use textarc_core::types::{DestDir, EntryPath};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp/extraction", true)?;
/// let entry = EntryPath::parse("docs/readme.txt").unwrap();
/// let target = dest.resolve(&entry)?;
/// assert!(target.unwrap().starts_with(dest.as_path()));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Creates a new `DestDir`, optionally creating the directory first.
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if:
    /// - The path does not exist and `create` is false
    /// - The path exists but is not a directory
    /// - The path cannot be canonicalized
    pub fn new(path: impl Into<PathBuf>, create: bool) -> Result<Self> {
        let path = path.into();

        if create && !path.exists() {
            std::fs::create_dir_all(&path).map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!("cannot create destination {}: {e}", path.display()),
                )
            })?;
        }

        if !path.exists() {
            return Err(TranscodeError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("destination directory does not exist: {}", path.display()),
            )));
        }

        if !path.is_dir() {
            return Err(TranscodeError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("path is not a directory: {}", path.display()),
            )));
        }

        let canonical = path.canonicalize().map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("failed to canonicalize path {}: {e}", path.display()),
            )
        })?;

        Ok(Self(canonical))
    }

    /// Returns the canonical destination path.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Resolves an entry path inside this directory.
    ///
    /// Returns `Ok(None)` when the result would not be contained: either the
    /// joined path leaves the root lexically, or one of its components that
    /// already exists on disk is a symbolic link (which could redirect the
    /// write elsewhere). Components that do not exist yet are fine; the
    /// extractor creates them as real directories.
    ///
    /// # Errors
    ///
    /// - `DestinationConflict` naming the blocking path if a parent
    ///   component already exists as something other than a directory
    /// - `Io` if a component's metadata cannot be read for a reason other
    ///   than absence
    pub fn resolve(&self, entry: &EntryPath) -> Result<Option<PathBuf>> {
        let mut candidate = self.0.clone();
        let mut on_disk = true;
        let mut segments = entry.segments().peekable();

        while let Some(segment) = segments.next() {
            candidate.push(segment);
            if !on_disk {
                continue;
            }
            match std::fs::symlink_metadata(&candidate) {
                Ok(meta) if meta.file_type().is_symlink() => return Ok(None),
                Ok(meta) if !meta.is_dir() && segments.peek().is_some() => {
                    return Err(TranscodeError::DestinationConflict { path: candidate });
                }
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => on_disk = false,
                Err(e) => return Err(e.into()),
            }
        }

        if !candidate.starts_with(&self.0) || candidate == self.0 {
            return Ok(None);
        }

        Ok(Some(candidate))
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dest_dir_valid() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path(), false).expect("dest should be valid");
        assert!(dest.as_path().is_absolute());
    }

    #[test]
    fn test_dest_dir_nonexistent() {
        let result = DestDir::new("/nonexistent/directory/that/does/not/exist", false);
        assert!(matches!(result, Err(TranscodeError::Io(_))));
    }

    #[test]
    fn test_dest_dir_created_on_request() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        let dest = DestDir::new(&nested, true).unwrap();
        assert!(nested.is_dir());
        assert_eq!(dest.as_path(), nested.canonicalize().unwrap());
    }

    #[test]
    fn test_dest_dir_not_a_directory() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("file.txt");
        fs::write(&file_path, "test").unwrap();

        let result = DestDir::new(file_path, true);
        assert!(matches!(result, Err(TranscodeError::Io(_))));
    }

    #[test]
    fn test_dest_dir_canonicalization() {
        let temp = TempDir::new().unwrap();
        let subdir = temp.path().join("subdir");
        fs::create_dir(&subdir).unwrap();

        let dest = DestDir::new(subdir.join(".").join(".."), false).unwrap();
        assert_eq!(dest.as_path(), temp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_resolve_nested_path() {
        let temp = TempDir::new().unwrap();
        let dest = DestDir::new(temp.path(), false).unwrap();
        let entry = EntryPath::parse("a/b/c.txt").unwrap();

        let resolved = dest.resolve(&entry).unwrap().unwrap();
        assert!(resolved.starts_with(dest.as_path()));
        assert!(resolved.ends_with("a/b/c.txt"));
    }

    #[test]
    fn test_resolve_existing_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/b")).unwrap();
        let dest = DestDir::new(temp.path(), false).unwrap();
        let entry = EntryPath::parse("a/b/c.txt").unwrap();
        assert!(dest.resolve(&entry).unwrap().is_some());
    }

    #[test]
    fn test_resolve_file_in_place_of_parent_is_conflict() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("d"), "not a directory").unwrap();
        let dest = DestDir::new(temp.path(), false).unwrap();

        let entry = EntryPath::parse("d/x.txt").unwrap();
        match dest.resolve(&entry) {
            Err(TranscodeError::DestinationConflict { path }) => assert!(path.ends_with("d")),
            other => panic!("expected DestinationConflict, got {other:?}"),
        }

        let leaf = EntryPath::parse("d").unwrap();
        assert!(dest.resolve(&leaf).unwrap().is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_rejects_symlinked_component() {
        let temp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let root = temp.path().join("root");
        fs::create_dir(&root).unwrap();
        std::os::unix::fs::symlink(outside.path(), root.join("escape")).unwrap();

        let dest = DestDir::new(&root, false).unwrap();
        let entry = EntryPath::parse("escape/passwd").unwrap();
        assert!(dest.resolve(&entry).unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_rejects_symlinked_leaf() {
        let temp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let target = outside.path().join("victim.txt");
        fs::write(&target, "original").unwrap();
        std::os::unix::fs::symlink(&target, temp.path().join("victim.txt")).unwrap();

        let dest = DestDir::new(temp.path(), false).unwrap();
        let entry = EntryPath::parse("victim.txt").unwrap();
        assert!(dest.resolve(&entry).unwrap().is_none());
    }
}
