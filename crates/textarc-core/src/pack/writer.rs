//! ZIP archive writing.
//!
//! [`ArchiveWriter`] wraps [`zip::ZipWriter`] with the options every entry
//! shares (compression, fixed permissions, timestamp policy) so the packer
//! only deals in [`EntryPath`]s and readers.

use std::io;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::time::SystemTime;

use chrono::DateTime;
use chrono::Datelike;
use chrono::Timelike;
use chrono::Utc;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;

use crate::PackConfig;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::CopyError;
use crate::copy::copy_with_progress;
use crate::types::EntryPath;

const FILE_MODE: u32 = 0o644;
const DIR_MODE: u32 = 0o755;

/// Sizes at or above this need ZIP64 headers.
const ZIP64_THRESHOLD: u64 = 0xFFFF_FFFF;

/// Streaming ZIP writer over any seekable sink.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use textarc_core::PackConfig;
/// use textarc_core::pack::writer::ArchiveWriter;
/// use textarc_core::types::EntryPath;
///
/// let mut writer = ArchiveWriter::new(Cursor::new(Vec::new()), &PackConfig::default());
/// let path = EntryPath::parse("hello.txt").unwrap();
/// writer.add_file(&path, &mut &b"hi"[..], 2, None, |_| {}).unwrap();
/// let bytes = writer.finish().unwrap().into_inner();
/// assert_eq!(&bytes[..4], b"PK\x03\x04");
/// ```
pub struct ArchiveWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: SimpleFileOptions,
    store_mtime: bool,
    buffer: CopyBuffer,
}

impl<W: Write + Seek> ArchiveWriter<W> {
    /// Creates a writer; level 0 stores entries uncompressed.
    #[must_use]
    pub fn new(sink: W, config: &PackConfig) -> Self {
        let options = if config.compression_level == 0 {
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
        } else {
            SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(i64::from(config.compression_level)))
        };

        Self {
            zip: ZipWriter::new(sink),
            options,
            store_mtime: config.store_mtime,
            buffer: CopyBuffer::new(),
        }
    }

    /// Adds a directory entry (`path/`).
    pub fn add_directory(&mut self, path: &EntryPath, modified: Option<SystemTime>) -> Result<()> {
        let options = self
            .options
            .unix_permissions(DIR_MODE)
            .last_modified_time(self.timestamp(modified));

        self.zip
            .add_directory(path.as_dir_name(), options)
            .map_err(|e| zip_to_io(e, "failed to add directory"))?;
        Ok(())
    }

    /// Adds a file entry, streaming `reader` in fixed-size chunks.
    ///
    /// `size_hint` selects ZIP64 headers for large files; `on_chunk` sees the
    /// size of every chunk written. Returns the number of bytes read.
    ///
    /// # Errors
    ///
    /// Read failures are returned as [`CopyError::Read`] wrapped in an `Io`
    /// error so the caller can attribute them to the source file.
    pub fn add_file<R, F>(
        &mut self,
        path: &EntryPath,
        reader: &mut R,
        size_hint: u64,
        modified: Option<SystemTime>,
        on_chunk: F,
    ) -> std::result::Result<u64, CopyError>
    where
        R: Read + ?Sized,
        F: FnMut(u64),
    {
        let options = self
            .options
            .unix_permissions(FILE_MODE)
            .large_file(size_hint >= ZIP64_THRESHOLD)
            .last_modified_time(self.timestamp(modified));

        self.zip
            .start_file(path.as_str(), options)
            .map_err(|e| CopyError::Write(zip_to_io(e, "failed to start file")))?;

        copy_with_progress(reader, &mut self.zip, &mut self.buffer, on_chunk)
    }

    /// Writes the central directory and returns the sink.
    pub fn finish(self) -> Result<W> {
        let sink = self
            .zip
            .finish()
            .map_err(|e| zip_to_io(e, "failed to finish archive"))?;
        Ok(sink)
    }

    fn timestamp(&self, modified: Option<SystemTime>) -> zip::DateTime {
        if self.store_mtime {
            modified.and_then(to_zip_datetime).unwrap_or_default()
        } else {
            zip::DateTime::default()
        }
    }
}

/// Converts a system time to a DOS timestamp in UTC.
///
/// Returns `None` for times the format cannot represent (before 1980 or
/// after 2107).
fn to_zip_datetime(time: SystemTime) -> Option<zip::DateTime> {
    let utc: DateTime<Utc> = time.into();
    zip::DateTime::from_date_and_time(
        u16::try_from(utc.year()).ok()?,
        u8::try_from(utc.month()).ok()?,
        u8::try_from(utc.day()).ok()?,
        u8::try_from(utc.hour()).ok()?,
        u8::try_from(utc.minute()).ok()?,
        u8::try_from(utc.second()).ok()?,
    )
    .ok()
}

fn zip_to_io(err: ZipError, context: &str) -> io::Error {
    match err {
        ZipError::Io(e) => e,
        other => io::Error::other(format!("{context}: {other}")),
    }
}
