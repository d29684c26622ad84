//! Test utilities for building archives and source trees.
//!
//! [`ZipBuilder`] writes entries with arbitrary names (including ones the
//! packer would never produce, such as `../../etc/passwd`), which is what
//! reader and extractor tests need to exercise hostile input.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Cursor;
use std::io::Write;
use std::path::Path;

use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Creates an in-memory ZIP archive from `(path, content)` pairs.
///
/// Files are deflated; names are written exactly as given.
///
/// # Examples
///
/// ```
/// use textarc_core::test_utils::create_test_zip;
///
/// let zip_data = create_test_zip(&[("file.txt", b"hello"), ("dir/nested.txt", b"world")]);
/// assert_eq!(&zip_data[..4], b"PK\x03\x04");
/// ```
#[must_use]
pub fn create_test_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    entries
        .iter()
        .fold(ZipBuilder::new(), |builder, (path, data)| builder.file(path, data))
        .build()
}

/// Creates an archive the way a writer without `Seek` does: every entry
/// carries a data descriptor instead of sizes in its local header.
///
/// Names ending in `/` become directory entries; files are deflated.
///
/// # Examples
///
/// ```
/// use textarc_core::test_utils::create_streamed_zip;
///
/// let zip_data = create_streamed_zip(&[("file.txt", b"hello"), ("dir/", b"")]);
/// assert_eq!(zip_data[6] & 0x08, 0x08);
/// ```
#[must_use]
pub fn create_streamed_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new_stream(Vec::new());
    for (path, data) in entries {
        if path.ends_with('/') {
            zip.add_directory(*path, base_options().unix_permissions(0o755))
                .unwrap();
        } else {
            let options = base_options()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(0o644);
            zip.start_file(*path, options).unwrap();
            zip.write_all(data).unwrap();
        }
    }
    zip.finish().unwrap().into_inner()
}

/// Builder for ZIP test archives.
///
/// # Examples
///
/// ```
/// use textarc_core::test_utils::ZipBuilder;
///
/// let zip_data = ZipBuilder::new()
///     .directory("dir/")
///     .file("dir/file.txt", b"content")
///     .file("../escape.txt", b"evil")
///     .build();
/// ```
pub struct ZipBuilder {
    zip: zip::ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            zip: zip::ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Adds a deflated file.
    #[must_use]
    pub fn file(self, path: &str, data: &[u8]) -> Self {
        self.entry(path, data, CompressionMethod::Deflated)
    }

    /// Adds an uncompressed file, so its bytes appear verbatim in the output.
    #[must_use]
    pub fn stored_file(self, path: &str, data: &[u8]) -> Self {
        self.entry(path, data, CompressionMethod::Stored)
    }

    /// Adds a directory entry. `path` should end with `/`.
    #[must_use]
    pub fn directory(mut self, path: &str) -> Self {
        let options = base_options().unix_permissions(0o755);
        self.zip.add_directory(path, options).unwrap();
        self
    }

    /// Finishes the archive and returns its bytes.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.zip.finish().unwrap().into_inner()
    }

    fn entry(mut self, path: &str, data: &[u8], method: CompressionMethod) -> Self {
        let options = base_options()
            .compression_method(method)
            .unix_permissions(0o644);
        self.zip.start_file(path, options).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }
}

impl Default for ZipBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn base_options() -> SimpleFileOptions {
    SimpleFileOptions::default().last_modified_time(zip::DateTime::default())
}

/// Creates files under `root` from `(relative path, content)` pairs, adding
/// parent directories as needed.
///
/// # Examples
///
/// ```
/// use textarc_core::test_utils::write_tree;
///
/// let temp = tempfile::TempDir::new().unwrap();
/// write_tree(temp.path(), &[("a.txt", "alpha"), ("sub/b.txt", "beta")]);
/// assert!(temp.path().join("sub/b.txt").is_file());
/// ```
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }
}
