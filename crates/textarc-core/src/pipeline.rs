//! High-level pack/encode and decode/extract operations.
//!
//! These functions wire the walker, the ZIP writer and reader, the extractor
//! and the text codec together. Each has a short form with default
//! configuration and a `_with` form that takes configuration, a progress
//! callback and a cancellation token.
//!
//! The in-memory forms hold the encoded text and the archive bytes. For
//! inputs too large for that, [`pack_to_writer`], [`decode_reader_to_writer`]
//! and [`extract_text_file`] stage the archive in an anonymous temporary file
//! and stream text in fixed-size chunks.

use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::path::Path;

use log::debug;
use log::info;

use crate::CancellationToken;
use crate::CollisionPolicy;
use crate::ExtractConfig;
use crate::PackConfig;
use crate::Result;
use crate::codec;
use crate::copy::CHUNK_SIZE;
use crate::pack::pack_into;
use crate::report::ExtractReport;
use crate::report::NoopProgress;
use crate::report::PackReport;
use crate::report::ProgressCallback;
use crate::types::DestDir;
use crate::unpack::ArchiveReader;
use crate::unpack::extract_entries;

const DEFAULT_TEXT_FILE_NAME: &str = "archive_base64.txt";

/// Encodes raw bytes as radix-64 text.
///
/// # Examples
///
/// ```
/// use textarc_core::{decode_text, encode_bytes};
///
/// let text = encode_bytes(b"\x00\x01binary");
/// assert_eq!(decode_text(&text).unwrap(), b"\x00\x01binary");
/// ```
#[must_use]
pub fn encode_bytes(bytes: &[u8]) -> String {
    codec::encode(bytes)
}

/// Decodes radix-64 text into raw bytes.
///
/// # Errors
///
/// Returns `MalformedText` if the text is not valid radix-64.
pub fn decode_text(text: &str) -> Result<Vec<u8>> {
    codec::decode(text)
}

/// Packs files and directories into a ZIP archive and encodes it as text.
///
/// # Errors
///
/// Returns `SourceUnavailable` if any source is missing or unreadable.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use textarc_core::pack_and_encode;
///
/// let text = pack_and_encode(&[Path::new("project")])?;
/// std::fs::write("project_base64.txt", text)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn pack_and_encode<P: AsRef<Path>>(paths: &[P]) -> Result<String> {
    let (text, _) = pack_and_encode_with(
        paths,
        &PackConfig::default(),
        &mut NoopProgress,
        &CancellationToken::new(),
    )?;
    Ok(text)
}

/// [`pack_and_encode`] with configuration, progress and cancellation.
///
/// # Errors
///
/// Returns `SourceUnavailable` for a missing or unreadable source and
/// `Cancelled` if `cancel` fires; no text is produced in either case.
pub fn pack_and_encode_with<P: AsRef<Path>>(
    paths: &[P],
    config: &PackConfig,
    progress: &mut dyn ProgressCallback,
    cancel: &CancellationToken,
) -> Result<(String, PackReport)> {
    let (sink, report) = pack_into(Cursor::new(Vec::new()), paths, config, progress, cancel)?;
    let text = codec::encode(&sink.into_inner());
    debug!("encoded {} archive bytes as {} chars", report.archive_size, text.len());
    Ok((text, report))
}

/// Decodes text into an archive and extracts it under `destination`.
///
/// The destination is created if missing. A failure after at least one
/// entry was processed stops the extraction and is returned in
/// [`ExtractReport::error`], next to the counts of what was already written.
///
/// # Errors
///
/// Returns `MalformedText` if the text does not decode, or `Io` if the
/// destination cannot be created or is not a directory. A failure at the
/// first entry, such as text that does not hold an archive at all, is
/// returned as the error itself (`CorruptArchive`, `TruncatedArchive`,
/// `DestinationConflict`).
///
/// # Examples
///
/// ```no_run
/// use textarc_core::{CollisionPolicy, decode_and_extract};
///
/// let text = std::fs::read_to_string("project_base64.txt")?;
/// let report = decode_and_extract(&text, "restored".as_ref(), CollisionPolicy::SkipExisting)?;
/// if let Some(err) = report.error() {
///     eprintln!("stopped early: {err}");
/// }
/// println!("{} files written", report.files_written);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn decode_and_extract(
    text: &str,
    destination: &Path,
    policy: CollisionPolicy,
) -> Result<ExtractReport> {
    decode_and_extract_with(
        text,
        destination,
        &ExtractConfig::default().with_collision_policy(policy),
        &mut NoopProgress,
        &CancellationToken::new(),
    )
}

/// [`decode_and_extract`] with configuration, progress and cancellation.
///
/// # Errors
///
/// Same as [`decode_and_extract`]. Cancellation is reported through
/// [`ExtractReport::cancelled`].
pub fn decode_and_extract_with(
    text: &str,
    destination: &Path,
    config: &ExtractConfig,
    progress: &mut dyn ProgressCallback,
    cancel: &CancellationToken,
) -> Result<ExtractReport> {
    let bytes = codec::decode(text)?;
    debug!("decoded {} archive bytes", bytes.len());
    let dest = DestDir::new(destination, config.create_destination)?;
    let mut reader = ArchiveReader::new(Cursor::new(bytes))?;
    settle(extract_entries(&mut reader, &dest, config, progress, cancel))
}

/// Decodes text and writes the raw bytes to `destination_file`.
///
/// Nothing is written if the text does not decode. An existing file is
/// replaced.
///
/// # Errors
///
/// Returns `MalformedText` for invalid text, or `Io` if the file cannot be
/// written.
pub fn decode_and_save(text: &str, destination_file: &Path) -> Result<u64> {
    let bytes = codec::decode(text)?;
    let mut file = File::create(destination_file)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    info!(
        "saved {} bytes to {}",
        bytes.len(),
        destination_file.display()
    );
    Ok(bytes.len() as u64)
}

/// Packs sources and streams the encoded text into `writer`.
///
/// The archive is staged in an anonymous temporary file, so memory use does
/// not grow with the size of the sources.
///
/// # Errors
///
/// Same as [`pack_and_encode_with`], plus `Io` if the temporary file or
/// `writer` fails.
pub fn pack_to_writer<P: AsRef<Path>, W: Write>(
    paths: &[P],
    writer: W,
    config: &PackConfig,
    progress: &mut dyn ProgressCallback,
    cancel: &CancellationToken,
) -> Result<PackReport> {
    let staging = tempfile::tempfile()?;
    let (mut staging, report) = pack_into(staging, paths, config, progress, cancel)?;
    staging.seek(SeekFrom::Start(0))?;
    codec::encode_to_writer(&mut staging, BufWriter::with_capacity(CHUNK_SIZE, writer))?;
    Ok(report)
}

/// Streams radix-64 text from `reader` into raw bytes in `writer`.
///
/// # Errors
///
/// Returns `MalformedText` for invalid text and `Io` for read or write
/// failures.
pub fn decode_reader_to_writer<R: Read, W: Write>(reader: R, writer: &mut W) -> Result<u64> {
    codec::decode_to_writer(reader, writer)
}

/// Decodes a text file and extracts the archive it holds.
///
/// The decoded archive is staged in an anonymous temporary file and read
/// back forward-only, so neither the text nor the archive is held in
/// memory.
///
/// # Errors
///
/// Returns `Io` if `text_path` cannot be opened, `MalformedText` if its
/// content does not decode, and `Io` for destination problems. Failures at
/// the first entry are returned as errors, as in [`decode_and_extract`].
pub fn extract_text_file(
    text_path: &Path,
    destination: &Path,
    config: &ExtractConfig,
    progress: &mut dyn ProgressCallback,
    cancel: &CancellationToken,
) -> Result<ExtractReport> {
    let text = File::open(text_path)?;
    let mut staging = tempfile::tempfile()?;
    let size = codec::decode_to_writer(BufReader::new(text), &mut staging)?;
    debug!("staged {size} archive bytes from {}", text_path.display());
    staging.seek(SeekFrom::Start(0))?;

    let dest = DestDir::new(destination, config.create_destination)?;
    let mut reader = ArchiveReader::new(BufReader::with_capacity(CHUNK_SIZE, staging))?;
    settle(extract_entries(&mut reader, &dest, config, progress, cancel))
}

/// A run that failed before processing any entry has nothing to report.
fn settle(report: ExtractReport) -> Result<ExtractReport> {
    if report.entries_processed == 0 {
        report.into_result()
    } else {
        Ok(report)
    }
}

/// Default file name for saving the encoded text of `paths`.
///
/// A single directory source gives `<name>_base64.txt`; anything else gives
/// `archive_base64.txt`.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use textarc_core::suggested_text_file_name;
///
/// assert_eq!(suggested_text_file_name(&[Path::new("photos")]), "photos_base64.txt");
/// ```
#[must_use]
pub fn suggested_text_file_name<P: AsRef<Path>>(paths: &[P]) -> String {
    let [single] = paths else {
        return DEFAULT_TEXT_FILE_NAME.to_string();
    };
    let path = single.as_ref();
    if !path.is_dir() {
        return DEFAULT_TEXT_FILE_NAME.to_string();
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            path.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        });

    name.map_or_else(
        || DEFAULT_TEXT_FILE_NAME.to_string(),
        |name| format!("{name}_base64.txt"),
    )
}

/// Returns `true` if `text` decodes to something that looks like an
/// archive.
///
/// Used to decide whether extraction should be offered for a piece of text
/// at all; invalid text simply returns `false`.
#[must_use]
pub fn text_holds_archive(text: &str) -> bool {
    codec::decode(text).is_ok_and(|bytes| crate::unpack::looks_like_archive(&bytes))
}
