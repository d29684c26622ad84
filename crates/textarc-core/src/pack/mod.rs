//! Packing files and directory trees into a ZIP archive.
//!
//! Packing happens in two passes: [`walker::collect_items`] resolves every
//! source into an ordered item list, then [`pack_into`] streams each item
//! into an [`ArchiveWriter`](writer::ArchiveWriter). Nothing is written
//! until the walk has succeeded.

pub mod walker;
pub mod writer;

use std::fs::File;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use log::debug;
use log::info;

use crate::CancellationToken;
use crate::PackConfig;
use crate::Result;
use crate::TranscodeError;
use crate::copy::CopyError;
use crate::report::PackReport;
use crate::report::ProgressCallback;
use walker::ItemKind;
use walker::PackItem;
use writer::ArchiveWriter;

/// Packs `sources` into a ZIP archive written to `sink`.
///
/// Returns the sink positioned at the end of the archive, together with a
/// report of what was added and skipped.
///
/// # Errors
///
/// - `SourceUnavailable` if a source is missing or becomes unreadable
/// - `Cancelled` if `cancel` fires between entries
/// - `Io` if writing to `sink` fails
///
/// # Examples
///
/// ```no_run
/// use std::io::Cursor;
/// use std::path::Path;
/// use textarc_core::{CancellationToken, NoopProgress, PackConfig};
/// use textarc_core::pack::pack_into;
///
/// let (sink, report) = pack_into(
///     Cursor::new(Vec::new()),
///     &[Path::new("project")],
///     &PackConfig::default(),
///     &mut NoopProgress,
///     &CancellationToken::new(),
/// )?;
/// println!("{} files, {} bytes", report.files_added, sink.into_inner().len());
/// # Ok::<(), textarc_core::TranscodeError>(())
/// ```
pub fn pack_into<W, P>(
    sink: W,
    sources: &[P],
    config: &PackConfig,
    progress: &mut dyn ProgressCallback,
    cancel: &CancellationToken,
) -> Result<(W, PackReport)>
where
    W: Write + Seek,
    P: AsRef<Path>,
{
    let start = Instant::now();
    let mut report = PackReport::new();

    let items = walker::collect_items(sources, config, &mut report)?;
    let total = items.len();
    debug!("packing {total} items");

    let mut writer = ArchiveWriter::new(sink, config);

    for (idx, item) in items.iter().enumerate() {
        if cancel.is_cancelled() {
            info!("pack cancelled after {idx} of {total} entries");
            return Err(TranscodeError::Cancelled);
        }

        let display_path = item.archive_path.to_path_buf();
        progress.on_entry_start(&display_path, Some(total), idx + 1);
        add_item(&mut writer, item, &mut report, progress)?;
        progress.on_entry_complete(&display_path);
    }

    let mut sink = writer.finish()?;
    report.archive_size = sink.seek(SeekFrom::End(0))?;
    report.duration = start.elapsed();
    progress.on_complete();

    info!(
        "packed {} files and {} directories ({} bytes -> {} bytes)",
        report.files_added, report.directories_added, report.bytes_read, report.archive_size
    );
    Ok((sink, report))
}

fn add_item<W: Write + Seek>(
    writer: &mut ArchiveWriter<W>,
    item: &PackItem,
    report: &mut PackReport,
    progress: &mut dyn ProgressCallback,
) -> Result<()> {
    match item.kind {
        ItemKind::Directory => {
            writer.add_directory(&item.archive_path, item.modified)?;
            report.directories_added += 1;
        }
        ItemKind::File { size } => {
            let mut file = File::open(&item.source)
                .map_err(|e| TranscodeError::source_unavailable(&item.source, e))?;
            let copied = writer
                .add_file(&item.archive_path, &mut file, size, item.modified, |n| {
                    progress.on_bytes_written(n);
                })
                .map_err(|e| match e {
                    CopyError::Read(e) => TranscodeError::source_unavailable(&item.source, e),
                    CopyError::Write(e) => TranscodeError::Io(e),
                })?;
            report.files_added += 1;
            report.bytes_read += copied;
        }
    }
    debug!("added {}", item.archive_path);
    Ok(())
}
