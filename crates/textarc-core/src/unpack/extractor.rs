//! Writing archive entries into a destination directory.
//!
//! Every target path comes from [`DestDir::resolve`]; entries it rejects are
//! skipped, never written. File content is streamed into a temporary file in
//! the target's directory and renamed into place only once it has been read
//! completely, so a corrupt or truncated entry leaves nothing behind.

use std::fs;
use std::io;
use std::io::BufWriter;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;
use std::time::SystemTime;

use log::debug;
use log::info;
use log::warn;
use tempfile::NamedTempFile;

use crate::CancellationToken;
use crate::CollisionPolicy;
use crate::ExtractConfig;
use crate::Result;
use crate::TranscodeError;
use crate::copy::CHUNK_SIZE;
use crate::copy::CopyBuffer;
use crate::copy::CopyError;
use crate::copy::copy_with_progress;
use crate::report::ExtractReport;
use crate::report::ProgressCallback;
use crate::report::SkipReason;
use crate::types::DestDir;
use crate::unpack::reader::ArchiveEntry;
use crate::unpack::reader::ArchiveReader;
use crate::unpack::reader::classify_read_error;

/// Extracts every entry `reader` yields into `dest`.
///
/// Never returns early with an error: per-entry problems are recorded as
/// skips, and the first fatal problem (corrupt or truncated stream,
/// destination conflict, I/O failure) stops the run and is stored in
/// [`ExtractReport::error`]. Files written before that point stay on disk.
///
/// Cancellation is checked between entries only.
pub fn extract_entries<R: Read + Seek>(
    reader: &mut ArchiveReader<R>,
    dest: &DestDir,
    config: &ExtractConfig,
    progress: &mut dyn ProgressCallback,
    cancel: &CancellationToken,
) -> ExtractReport {
    let start = Instant::now();
    let mut report = ExtractReport::new();
    let mut buffer = CopyBuffer::new();

    loop {
        if cancel.is_cancelled() {
            info!(
                "extraction cancelled after {} entries",
                report.entries_processed
            );
            report.cancelled = true;
            break;
        }

        let entry = match reader.next_entry() {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(TranscodeError::UnsafePath { index, path }) => {
                warn!("skipping entry {index}: unsafe path {path:?}");
                report.add_skip(index, path, SkipReason::UnsafePath);
                report.entries_processed += 1;
                continue;
            }
            Err(e) => {
                warn!("extraction stopped: {e}");
                report.error = Some(e);
                break;
            }
        };

        let display_path = entry.path.to_path_buf();
        progress.on_entry_start(&display_path, None, entry.index + 1);

        if let Err(e) = extract_entry(entry, dest, config, &mut buffer, &mut report, progress) {
            warn!("extraction stopped: {e}");
            report.error = Some(e);
            break;
        }

        report.entries_processed += 1;
        progress.on_entry_complete(&display_path);
    }

    report.duration = start.elapsed();
    progress.on_complete();

    info!(
        "extracted {} files and {} directories ({} bytes), {} skipped",
        report.files_written,
        report.directories_created,
        report.bytes_written,
        report.skipped.len()
    );
    report
}

fn extract_entry(
    mut entry: ArchiveEntry<'_>,
    dest: &DestDir,
    config: &ExtractConfig,
    buffer: &mut CopyBuffer,
    report: &mut ExtractReport,
    progress: &mut dyn ProgressCallback,
) -> Result<()> {
    let index = entry.index;

    let target = match dest.resolve(&entry.path) {
        Ok(Some(target)) => target,
        Ok(None) => {
            warn!("skipping entry {index}: {} is not contained", entry.path);
            report.add_skip(index, entry.path.as_str(), SkipReason::UnsafePath);
            return Ok(());
        }
        Err(TranscodeError::DestinationConflict { path })
            if config.collision_policy == CollisionPolicy::SkipExisting =>
        {
            debug!("skip {} ({} is not a directory)", entry.path, path.display());
            report.add_skip(index, entry.path.as_str(), SkipReason::AlreadyExists);
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    if entry.is_directory {
        if let Some(existing) = existing_kind(&target)?
            && !existing.is_dir()
        {
            if config.collision_policy == CollisionPolicy::SkipExisting {
                debug!("skip {} (exists as a file)", entry.path);
                report.add_skip(index, entry.path.as_str(), SkipReason::AlreadyExists);
                return Ok(());
            }
            // Overwrite replaces files with files, never with directories.
            return Err(TranscodeError::DestinationConflict { path: target });
        }
        report.directories_created += create_dirs(&target)?;
        debug!("dir  {}", entry.path);
        return Ok(());
    }

    if let Some(existing) = existing_kind(&target)? {
        match config.collision_policy {
            CollisionPolicy::SkipExisting => {
                debug!("skip {} (exists)", entry.path);
                report.add_skip(index, entry.path.as_str(), SkipReason::AlreadyExists);
                return Ok(());
            }
            CollisionPolicy::Overwrite if !existing.is_dir() => {}
            CollisionPolicy::Overwrite | CollisionPolicy::FailOnConflict => {
                return Err(TranscodeError::DestinationConflict { path: target });
            }
        }
    }

    let parent = target.parent().unwrap_or_else(|| dest.as_path());
    report.directories_created += create_dirs(parent)?;

    let mut out = BufWriter::with_capacity(CHUNK_SIZE, NamedTempFile::new_in(parent)?);
    let written = copy_with_progress(entry.content(), &mut out, buffer, |n| {
        progress.on_bytes_written(n);
    })
    .map_err(|e| match e {
        CopyError::Read(e) => classify_read_error(index, &e),
        CopyError::Write(e) => TranscodeError::Io(e),
    })?;
    let temp = out.into_inner().map_err(io::IntoInnerError::into_error)?;

    if config.restore_mtime
        && let Some(modified) = entry.modified_time
        && let Err(e) = temp
            .as_file()
            .set_modified(SystemTime::from(modified.and_utc()))
    {
        warn!("cannot set modification time on {}: {e}", target.display());
    }

    persist(temp, &target, config.collision_policy)?;

    report.files_written += 1;
    report.bytes_written += written;
    debug!("file {} ({written} bytes)", entry.path);
    Ok(())
}

fn existing_kind(path: &Path) -> Result<Option<fs::FileType>> {
    match fs::symlink_metadata(path) {
        Ok(meta) => Ok(Some(meta.file_type())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Moves the finished temporary file into place.
fn persist(temp: NamedTempFile, target: &Path, policy: CollisionPolicy) -> Result<()> {
    match policy {
        CollisionPolicy::Overwrite => {
            temp.persist(target).map_err(|e| e.error)?;
        }
        CollisionPolicy::SkipExisting | CollisionPolicy::FailOnConflict => {
            temp.persist_noclobber(target).map_err(|e| {
                if e.error.kind() == io::ErrorKind::AlreadyExists {
                    TranscodeError::DestinationConflict {
                        path: target.to_path_buf(),
                    }
                } else {
                    TranscodeError::Io(e.error)
                }
            })?;
        }
    }
    Ok(())
}

/// Creates `path` and any missing parents, returning how many were new.
fn create_dirs(path: &Path) -> Result<usize> {
    let mut missing: Vec<PathBuf> = Vec::new();
    let mut current = Some(path);
    while let Some(dir) = current {
        if dir.is_dir() {
            break;
        }
        missing.push(dir.to_path_buf());
        current = dir.parent();
    }

    if missing.is_empty() {
        return Ok(0);
    }
    fs::create_dir_all(path)?;
    Ok(missing.len())
}
