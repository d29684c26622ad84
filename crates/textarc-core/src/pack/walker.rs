//! Deterministic source tree walking.
//!
//! Sources are expanded into a flat, ordered list of [`PackItem`]s before any
//! archive bytes are written, so a missing or unreadable path fails the whole
//! pack without producing a partial archive, and the progress total is known
//! up front.
//!
//! Directories are walked pre-order with siblings sorted by file name, which
//! makes the item list (and therefore the archive) reproducible for an
//! unchanged tree.

use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use log::debug;
use log::warn;
use walkdir::DirEntry;
use walkdir::WalkDir;

use crate::PackConfig;
use crate::Result;
use crate::TranscodeError;
use crate::report::PackReport;
use crate::report::SkipReason;
use crate::types::EntryPath;

/// Kind of item to pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Regular file with its size at walk time.
    File {
        /// Size in bytes.
        size: u64,
    },
    /// Directory, stored without content.
    Directory,
}

/// A filesystem item with its computed archive path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackItem {
    /// Full filesystem path to read from.
    pub source: PathBuf,

    /// Path to record in the archive.
    pub archive_path: EntryPath,

    /// File or directory.
    pub kind: ItemKind,

    /// Modification time, if the platform reports one.
    pub modified: Option<SystemTime>,
}

/// Expands `sources` into the ordered list of items to pack.
///
/// - A file source becomes one item named after the file.
/// - A directory source becomes one item per directory and regular file
///   underneath it, named relative to the directory's parent.
///
/// Cycles, dangling links, special files, links that are not followed,
/// names that cannot be stored in an archive and duplicate archive paths are
/// recorded as skips in `report`. A skipped directory takes its subtree with
/// it.
///
/// # Errors
///
/// Returns `SourceUnavailable` if a source, or anything beneath it, does not
/// exist or cannot be read.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use textarc_core::PackConfig;
/// use textarc_core::pack::walker::collect_items;
/// use textarc_core::report::PackReport;
///
/// let mut report = PackReport::new();
/// let items = collect_items(&[Path::new("./project")], &PackConfig::default(), &mut report)?;
/// println!("{} items", items.len());
/// # Ok::<(), textarc_core::TranscodeError>(())
/// ```
pub fn collect_items<P: AsRef<Path>>(
    sources: &[P],
    config: &PackConfig,
    report: &mut PackReport,
) -> Result<Vec<PackItem>> {
    let mut items = Vec::new();
    let mut seen = HashSet::new();

    for source in sources {
        let source = source.as_ref();
        let metadata = std::fs::metadata(source)
            .map_err(|e| TranscodeError::source_unavailable(source, e))?;
        let Some(root_name) = root_name(source)? else {
            skip_unrepresentable(source, report);
            continue;
        };

        let walked = if metadata.is_dir() {
            walk_directory(source, &root_name, config, report)?
        } else if metadata.is_file() {
            vec![PackItem {
                source: source.to_path_buf(),
                archive_path: root_name,
                kind: ItemKind::File {
                    size: metadata.len(),
                },
                modified: metadata.modified().ok(),
            }]
        } else {
            report.add_skip(source.display().to_string(), SkipReason::SpecialFile);
            Vec::new()
        };

        for item in walked {
            if seen.insert(item.archive_path.clone()) {
                items.push(item);
            } else {
                warn!("duplicate archive path {}, skipping", item.archive_path);
                report.add_skip(item.source.display().to_string(), SkipReason::DuplicatePath);
            }
        }
    }

    Ok(items)
}

/// Walks one directory source.
fn walk_directory(
    root: &Path,
    root_name: &EntryPath,
    config: &PackConfig,
    report: &mut PackReport,
) -> Result<Vec<PackItem>> {
    let include_hidden = config.include_hidden;
    let mut walker = WalkDir::new(root)
        .follow_links(config.follow_symlinks)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| include_hidden || e.depth() == 0 || !is_hidden(e));

    let mut items = Vec::new();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                if err.loop_ancestor().is_some() {
                    warn!("symlink cycle at {}, skipping subtree", path.display());
                    report.add_skip(path.display().to_string(), SkipReason::SymlinkCycle);
                    continue;
                }
                if is_dangling_link(&path) {
                    warn!("dangling symlink {}, skipping", path.display());
                    report.add_skip(path.display().to_string(), SkipReason::BrokenSymlink);
                    continue;
                }
                let io_err = err
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("directory walk failed"));
                return Err(TranscodeError::source_unavailable(path, io_err));
            }
        };

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            // Only reachable when links are not followed.
            report.add_skip(entry.path().display().to_string(), SkipReason::Symlink);
            continue;
        }
        if !file_type.is_dir() && !file_type.is_file() {
            report.add_skip(entry.path().display().to_string(), SkipReason::SpecialFile);
            continue;
        }

        let metadata = entry
            .metadata()
            .map_err(|e| walk_error(entry.path(), e))?;
        let Some(archive_path) = archive_path_for(root, root_name, entry.path())? else {
            skip_unrepresentable(entry.path(), report);
            if file_type.is_dir() {
                walker.skip_current_dir();
            }
            continue;
        };
        let kind = if file_type.is_dir() {
            ItemKind::Directory
        } else {
            ItemKind::File {
                size: metadata.len(),
            }
        };

        debug!("walk: {archive_path}");
        items.push(PackItem {
            source: entry.path().to_path_buf(),
            archive_path,
            kind,
            modified: metadata.modified().ok(),
        });
    }

    Ok(items)
}

/// Determines the archive name of a top-level source.
///
/// Returns `None` if the name cannot be stored in an archive.
fn root_name(source: &Path) -> Result<Option<EntryPath>> {
    let name = match source.file_name() {
        Some(name) => PathBuf::from(name),
        None => {
            let canonical = source
                .canonicalize()
                .map_err(|e| TranscodeError::source_unavailable(source, e))?;
            canonical.file_name().map(PathBuf::from).ok_or_else(|| {
                TranscodeError::source_unavailable(
                    source,
                    io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"),
                )
            })?
        }
    };

    Ok(EntryPath::from_relative(&name))
}

/// Computes `root_name/<path relative to root>`, or `None` if a name on the
/// way cannot be stored in an archive.
fn archive_path_for(root: &Path, root_name: &EntryPath, path: &Path) -> Result<Option<EntryPath>> {
    let relative = path.strip_prefix(root).map_err(|_| {
        TranscodeError::source_unavailable(
            path,
            io::Error::other("walked path is outside its source"),
        )
    })?;
    let full = root_name.to_path_buf().join(relative);
    Ok(EntryPath::from_relative(&full))
}

fn skip_unrepresentable(path: &Path, report: &mut PackReport) {
    let why = match path.file_name().map(|n| n.to_str()) {
        Some(None) => "is not valid UTF-8",
        _ => "contains a character archive names cannot hold",
    };
    warn!("file name of {} {why}, skipping", path.display());
    report.add_skip(path.display().to_string(), SkipReason::UnrepresentableName);
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|s| s.starts_with('.'))
}

fn is_dangling_link(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink())
        && std::fs::metadata(path).is_err()
}

fn walk_error(path: &Path, err: walkdir::Error) -> TranscodeError {
    let io_err = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other("cannot read metadata"));
    TranscodeError::source_unavailable(path, io_err)
}
