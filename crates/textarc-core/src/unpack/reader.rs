//! Forward-only ZIP entry reader.
//!
//! Entries are read from their local headers in the order they appear, so
//! for ordinary archives the trailing central directory is never loaded.
//! Archives written to a non-seekable sink mark their entries with a data
//! descriptor instead of sizes; those are read through the central directory.
//!
//! Before an entry is handed out its framing is checked against the stream
//! length; an entry whose data runs past the end of the input is reported
//! as truncated instead of being partially yielded.

use std::io;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;

use chrono::NaiveDate;
use chrono::NaiveDateTime;
use log::debug;
use zip::ZipArchive;
use zip::read::ZipFile;
use zip::read::read_zipfile_from_stream;
use zip::result::ZipError;

use crate::Result;
use crate::TranscodeError;
use crate::types::EntryPath;

const LOCAL_HEADER_SIG: [u8; 4] = *b"PK\x03\x04";
const CENTRAL_HEADER_SIG: [u8; 4] = *b"PK\x01\x02";
const END_OF_CENTRAL_SIG: [u8; 4] = *b"PK\x05\x06";
const ZIP64_END_SIG: [u8; 4] = *b"PK\x06\x06";

const LOCAL_HEADER_LEN: usize = 30;
const EOCD_MIN_LEN: usize = 22;

/// General purpose flag bit 3: sizes follow the data.
const FLAG_DATA_DESCRIPTOR: u16 = 1 << 3;

/// Quick check whether `bytes` look like a ZIP archive.
///
/// Accepts a stream that starts with a local file header, or an empty
/// archive consisting of just the end-of-central-directory record.
///
/// # Examples
///
/// ```
/// use textarc_core::unpack::reader::looks_like_archive;
///
/// assert!(looks_like_archive(b"PK\x03\x04rest-of-header"));
/// assert!(!looks_like_archive(b"plain text"));
/// ```
#[must_use]
pub fn looks_like_archive(bytes: &[u8]) -> bool {
    bytes.starts_with(&LOCAL_HEADER_SIG)
        || (bytes.len() >= EOCD_MIN_LEN && bytes.starts_with(&END_OF_CENTRAL_SIG))
}

/// Result of inspecting the bytes at the current position.
enum Boundary {
    /// A local header whose entry ends at the given offset, if known.
    Entry { end: Option<u64> },
    /// A local header whose sizes follow the data.
    Descriptor,
    /// Central directory reached; no more entries.
    End,
}

/// Streaming reader over the entries of a ZIP archive.
///
/// This is a lending iterator: each [`ArchiveEntry`] borrows the reader, and
/// the next call to [`next_entry`](Self::next_entry) skips whatever content
/// the previous entry left unread.
///
/// Entries are read from their local headers. An entry written with a data
/// descriptor (general purpose bit 3) does not record its sizes up front, so
/// from that entry on the reader switches to the central directory and keeps
/// the same entry indices.
///
/// After a fatal error (`CorruptArchive`, `TruncatedArchive`) the reader is
/// exhausted and returns `Ok(None)`. An `UnsafePath` error only affects the
/// entry it names; reading can continue.
///
/// # Examples
///
/// ```no_run
/// use std::io::{Cursor, Read};
/// use textarc_core::unpack::reader::ArchiveReader;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("archive.zip")?;
/// let mut reader = ArchiveReader::new(Cursor::new(bytes))?;
/// while let Some(mut entry) = reader.next_entry()? {
///     let mut content = Vec::new();
///     entry.content().read_to_end(&mut content)?;
///     println!("{} ({} bytes)", entry.path, content.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct ArchiveReader<R: Read + Seek> {
    source: Source<R>,
    len: u64,
    index: usize,
    next_offset: Option<u64>,
    finished: bool,
}

/// Where entries come from.
enum Source<R: Read + Seek> {
    /// Local headers, read forward.
    Stream(R),
    /// Central directory, used once an entry has a data descriptor.
    Indexed(Box<ZipArchive<R>>),
    /// Left behind only if switching to the central directory failed.
    Detached,
}

impl<R: Read + Seek> ArchiveReader<R> {
    /// Creates a reader positioned at the start of `inner`.
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if the stream cannot be sought.
    pub fn new(mut inner: R) -> Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self {
            source: Source::Stream(inner),
            len,
            index: 0,
            next_offset: Some(0),
            finished: false,
        })
    }

    /// Number of entries consumed so far, including unsafe ones.
    #[must_use]
    pub fn entries_read(&self) -> usize {
        self.index
    }

    /// Returns the next entry, or `None` once the central directory is
    /// reached.
    ///
    /// # Errors
    ///
    /// - `UnsafePath` if this entry's name fails validation (recoverable)
    /// - `CorruptArchive` if the header is not a valid local header
    /// - `TruncatedArchive` if the input ends inside this entry
    pub fn next_entry(&mut self) -> Result<Option<ArchiveEntry<'_>>> {
        if self.finished {
            return Ok(None);
        }

        let index = self.index;
        if let Source::Stream(inner) = &mut self.source {
            match locate(inner, self.len, self.next_offset, index) {
                Ok(Boundary::Entry { end }) => self.next_offset = end,
                Ok(Boundary::Descriptor) => {
                    if let Err(e) = self.switch_to_central_directory(index) {
                        self.finished = true;
                        return Err(e);
                    }
                }
                Ok(Boundary::End) => {
                    self.finished = true;
                    return Ok(None);
                }
                Err(e) => {
                    self.finished = true;
                    return Err(e);
                }
            }
        }

        match &mut self.source {
            Source::Stream(inner) => {
                self.index += 1;
                read_streamed(inner, index, &mut self.finished)
            }
            Source::Indexed(archive) => {
                if index >= archive.len() {
                    self.finished = true;
                    return Ok(None);
                }
                self.index += 1;
                read_indexed(archive, index, &mut self.finished)
            }
            Source::Detached => {
                self.finished = true;
                Ok(None)
            }
        }
    }

    /// Reopens the input through its central directory.
    fn switch_to_central_directory(&mut self, index: usize) -> Result<()> {
        let Source::Stream(mut inner) = std::mem::replace(&mut self.source, Source::Detached)
        else {
            return Ok(());
        };
        inner.seek(SeekFrom::Start(0))?;

        match ZipArchive::new(inner) {
            Ok(archive) => {
                debug!(
                    "entry {index} has a data descriptor, reading {} entries from the central directory",
                    archive.len()
                );
                self.source = Source::Indexed(Box::new(archive));
                Ok(())
            }
            // The local header was valid, so a missing directory means the
            // input was cut short.
            Err(ZipError::InvalidArchive(_)) => Err(TranscodeError::TruncatedArchive { index }),
            Err(e) => Err(map_zip_error(index, e)),
        }
    }
}

fn read_streamed<'a, R: Read + Seek>(
    inner: &'a mut R,
    index: usize,
    finished: &mut bool,
) -> Result<Option<ArchiveEntry<'a>>> {
    match read_zipfile_from_stream(inner) {
        Ok(Some(file)) => entry_from(file, index).map(Some),
        Ok(None) => {
            *finished = true;
            Ok(None)
        }
        Err(e) => {
            *finished = true;
            Err(map_zip_error(index, e))
        }
    }
}

fn read_indexed<'a, R: Read + Seek>(
    archive: &'a mut ZipArchive<R>,
    index: usize,
    finished: &mut bool,
) -> Result<Option<ArchiveEntry<'a>>> {
    match archive.by_index(index) {
        Ok(file) => entry_from(file, index).map(Some),
        Err(e) => {
            *finished = true;
            Err(map_zip_error(index, e))
        }
    }
}

fn entry_from<'a, R: Read + 'a>(file: ZipFile<'a, R>, index: usize) -> Result<ArchiveEntry<'a>> {
    let name = file.name().to_string();
    let Some(path) = EntryPath::parse(&name) else {
        debug!("entry {index} has unsafe name {name:?}");
        return Err(TranscodeError::UnsafePath { index, path: name });
    };

    let is_directory = file.is_dir();
    let size = file.size();
    let modified_time = file.last_modified().and_then(to_naive);

    Ok(ArchiveEntry {
        index,
        path,
        is_directory,
        size,
        modified_time,
        content: EntryContent {
            inner: Box::new(file),
            index,
            declared: size,
            read: 0,
        },
    })
}

/// Positions the stream at the next header and classifies it.
fn locate<R: Read + Seek>(
    inner: &mut R,
    len: u64,
    next_offset: Option<u64>,
    index: usize,
) -> Result<Boundary> {
    let pos = match next_offset {
        Some(offset) => inner.seek(SeekFrom::Start(offset))?,
        // Unknown end (ZIP64 sizes); the previous entry was drained on drop.
        None => inner.stream_position()?,
    };

    let mut header = [0u8; LOCAL_HEADER_LEN];
    let n = read_up_to(inner, &mut header)?;
    inner.seek(SeekFrom::Start(pos))?;

    if n == 0 {
        return if index == 0 {
            Err(TranscodeError::corrupt(0, "input is empty"))
        } else {
            // Entries ended without a central directory.
            Err(TranscodeError::TruncatedArchive { index })
        };
    }

    if n < 4 {
        return if LOCAL_HEADER_SIG.starts_with(&header[..n]) {
            Err(TranscodeError::TruncatedArchive { index })
        } else {
            Err(TranscodeError::corrupt(index, "not a ZIP local header"))
        };
    }

    let sig = [header[0], header[1], header[2], header[3]];
    if sig == CENTRAL_HEADER_SIG || sig == END_OF_CENTRAL_SIG || sig == ZIP64_END_SIG {
        debug!("central directory reached after {index} entries");
        return Ok(Boundary::End);
    }
    if sig != LOCAL_HEADER_SIG {
        return Err(TranscodeError::corrupt(index, "not a ZIP local header"));
    }
    if n < LOCAL_HEADER_LEN {
        return Err(TranscodeError::TruncatedArchive { index });
    }

    let flags = u16::from_le_bytes([header[6], header[7]]);
    let compressed = u32::from_le_bytes([header[18], header[19], header[20], header[21]]);
    let name_len = u16::from_le_bytes([header[26], header[27]]);
    let extra_len = u16::from_le_bytes([header[28], header[29]]);

    let header_end = pos + LOCAL_HEADER_LEN as u64 + u64::from(name_len) + u64::from(extra_len);
    if header_end > len {
        return Err(TranscodeError::TruncatedArchive { index });
    }

    if flags & FLAG_DATA_DESCRIPTOR != 0 {
        return Ok(Boundary::Descriptor);
    }
    if compressed == u32::MAX {
        return Ok(Boundary::Entry { end: None });
    }

    let end = header_end + u64::from(compressed);
    if end > len {
        return Err(TranscodeError::TruncatedArchive { index });
    }
    Ok(Boundary::Entry { end: Some(end) })
}

/// One archive entry, borrowed from its [`ArchiveReader`].
pub struct ArchiveEntry<'a> {
    /// Zero-based position in the archive.
    pub index: usize,

    /// Validated relative path.
    pub path: EntryPath,

    /// `true` for directory entries, which carry no content.
    pub is_directory: bool,

    /// Declared uncompressed size.
    pub size: u64,

    /// Recorded modification time, interpreted as UTC.
    pub modified_time: Option<NaiveDateTime>,

    content: EntryContent<'a>,
}

impl<'a> ArchiveEntry<'a> {
    /// Returns the decompressed content stream.
    ///
    /// Read errors carry enough detail for [`classify_read_error`] to turn
    /// them back into archive errors.
    pub fn content(&mut self) -> &mut EntryContent<'a> {
        &mut self.content
    }
}

impl std::fmt::Debug for ArchiveEntry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveEntry")
            .field("index", &self.index)
            .field("path", &self.path)
            .field("is_directory", &self.is_directory)
            .field("size", &self.size)
            .field("modified_time", &self.modified_time)
            .finish_non_exhaustive()
    }
}

/// Decompressed entry content with a length check.
///
/// Reports `InvalidData` if the stream yields more or fewer bytes than the
/// entry's declared size.
pub struct EntryContent<'a> {
    inner: Box<dyn Read + 'a>,
    index: usize,
    declared: u64,
    read: u64,
}

impl EntryContent<'_> {
    /// Bytes produced so far.
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.read
    }

    fn size_mismatch(&self) -> io::Error {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "entry {} declares {} bytes but decompresses to {}",
                self.index, self.declared, self.read
            ),
        )
    }
}

impl Read for EntryContent<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read += n as u64;
        if self.read > self.declared || (n == 0 && !buf.is_empty() && self.read != self.declared)
        {
            return Err(self.size_mismatch());
        }
        Ok(n)
    }
}

/// Maps a failure while reading entry content to an archive error.
///
/// A premature end of stream becomes `TruncatedArchive`; anything else
/// (checksum mismatch, bad deflate data, wrong length) becomes
/// `CorruptArchive`.
#[must_use]
pub fn classify_read_error(index: usize, err: &io::Error) -> TranscodeError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        TranscodeError::TruncatedArchive { index }
    } else {
        TranscodeError::corrupt(index, err.to_string())
    }
}

fn map_zip_error(index: usize, err: ZipError) -> TranscodeError {
    match err {
        ZipError::Io(e) => classify_read_error(index, &e),
        other => TranscodeError::corrupt(index, other.to_string()),
    }
}

/// Reads until `buf` is full or the stream ends.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn to_naive(stamp: zip::DateTime) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(
        i32::from(stamp.year()),
        u32::from(stamp.month()),
        u32::from(stamp.day()),
    )?
    .and_hms_opt(
        u32::from(stamp.hour()),
        u32::from(stamp.minute()),
        u32::from(stamp.second()),
    )
}
