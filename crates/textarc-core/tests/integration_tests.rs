//! Integration tests for textarc-core.
//!
//! These tests verify end-to-end workflows with real filesystem operations.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;
use textarc_core::CancellationToken;
use textarc_core::CollisionPolicy;
use textarc_core::ExtractConfig;
use textarc_core::NoopProgress;
use textarc_core::PackConfig;
use textarc_core::ProgressCallback;
use textarc_core::SkipReason;
use textarc_core::TranscodeError;
use textarc_core::decode_and_extract;
use textarc_core::decode_and_extract_with;
use textarc_core::decode_text;
use textarc_core::encode_bytes;
use textarc_core::pack_and_encode;
use textarc_core::pack_and_encode_with;
use textarc_core::test_utils::ZipBuilder;
use textarc_core::test_utils::write_tree;

/// Collects `relative path -> content` for every file under `root`.
fn snapshot(root: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
        let entry = entry.unwrap();
        let relative = entry.path().strip_prefix(root).unwrap();
        let name = relative.to_string_lossy().replace('\\', "/");
        if entry.file_type().is_dir() {
            files.push((format!("{name}/"), Vec::new()));
        } else {
            files.push((name, fs::read(entry.path()).unwrap()));
        }
    }
    files
}

/// Incompressible bytes from a fixed xorshift sequence.
fn noise(len: usize) -> Vec<u8> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state.to_le_bytes()[0]
        })
        .collect()
}

fn sample_tree(temp: &TempDir) -> PathBuf {
    let root = temp.path().join("project");
    write_tree(
        &root,
        &[
            ("README.md", "# project\n"),
            ("src/main.rs", "fn main() {}\n"),
            ("src/lib/mod.rs", "pub mod a;\n"),
            ("assets/data.bin", "\u{0}\u{1}\u{2}binary"),
        ],
    );
    fs::create_dir_all(root.join("empty/nested")).unwrap();
    fs::write(root.join("large.txt"), "line of text\n".repeat(20_000)).unwrap();
    root
}

#[test]
fn test_round_trip_reproduces_tree() {
    let src = TempDir::new().unwrap();
    let root = sample_tree(&src);

    let text = pack_and_encode(&[&root]).unwrap();
    let out = TempDir::new().unwrap();
    let report = decode_and_extract(&text, out.path(), CollisionPolicy::FailOnConflict).unwrap();

    assert!(report.is_complete(), "{:?}", report.error());
    assert!(report.skipped.is_empty());
    assert_eq!(snapshot(&root), snapshot(&out.path().join("project")));
}

#[test]
fn test_round_trip_multiple_sources() {
    let src = TempDir::new().unwrap();
    let root = sample_tree(&src);
    let loose = src.path().join("notes.txt");
    fs::write(&loose, "loose file").unwrap();

    let text = pack_and_encode(&[root.as_path(), loose.as_path()]).unwrap();
    let out = TempDir::new().unwrap();
    let report = decode_and_extract(&text, out.path(), CollisionPolicy::FailOnConflict).unwrap();

    assert!(report.is_complete());
    assert_eq!(
        fs::read_to_string(out.path().join("notes.txt")).unwrap(),
        "loose file"
    );
    assert!(out.path().join("project/src/main.rs").is_file());
}

#[test]
fn test_packing_is_reproducible() {
    let src = TempDir::new().unwrap();
    let root = sample_tree(&src);

    let first = pack_and_encode(&[&root]).unwrap();
    let second = pack_and_encode(&[&root]).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_newlines_in_text_are_tolerated() {
    let src = TempDir::new().unwrap();
    let root = sample_tree(&src);
    let text = pack_and_encode(&[&root]).unwrap();

    let wrapped: String = text
        .as_bytes()
        .chunks(76)
        .map(|line| format!("{}\r\n", std::str::from_utf8(line).unwrap()))
        .collect();
    assert_eq!(decode_text(&wrapped).unwrap(), decode_text(&text).unwrap());
}

#[test]
fn test_injected_character_is_malformed() {
    let src = TempDir::new().unwrap();
    let root = sample_tree(&src);
    let mut text = pack_and_encode(&[&root]).unwrap();
    text.insert(text.len() / 2, '!');

    let out = TempDir::new().unwrap();
    let err = decode_and_extract(&text, out.path(), CollisionPolicy::Overwrite).unwrap_err();
    assert!(matches!(err, TranscodeError::MalformedText { .. }));
    assert!(fs::read_dir(out.path()).unwrap().next().is_none());
}

#[test]
fn test_traversal_entry_never_escapes() {
    let sandbox = TempDir::new().unwrap();
    let dest = sandbox.path().join("a/b/dest");
    let text = encode_bytes(
        &ZipBuilder::new()
            .file("../../etc/passwd", b"root::0:0")
            .file("good.txt", b"good")
            .build(),
    );

    let report = decode_and_extract(&text, &dest, CollisionPolicy::Overwrite).unwrap();

    assert!(report.is_complete());
    let skipped: Vec<_> = report.skipped_with(SkipReason::UnsafePath).collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].path, "../../etc/passwd");
    assert!(!sandbox.path().join("a/etc/passwd").exists());
    assert!(dest.join("good.txt").is_file());
}

#[test]
fn test_collision_policies() {
    let src = TempDir::new().unwrap();
    write_tree(&src.path().join("pkg"), &[("a.txt", "new a"), ("b.txt", "new b")]);
    let text = pack_and_encode(&[src.path().join("pkg")]).unwrap();

    let prepare = || {
        let out = TempDir::new().unwrap();
        write_tree(&out.path().join("pkg"), &[("a.txt", "old a")]);
        out
    };

    let out = prepare();
    let report = decode_and_extract(&text, out.path(), CollisionPolicy::Overwrite).unwrap();
    assert!(report.is_complete());
    assert_eq!(fs::read_to_string(out.path().join("pkg/a.txt")).unwrap(), "new a");

    let out = prepare();
    let report = decode_and_extract(&text, out.path(), CollisionPolicy::SkipExisting).unwrap();
    assert!(report.is_complete());
    assert_eq!(report.skipped_with(SkipReason::AlreadyExists).count(), 1);
    assert_eq!(fs::read_to_string(out.path().join("pkg/a.txt")).unwrap(), "old a");
    assert_eq!(fs::read_to_string(out.path().join("pkg/b.txt")).unwrap(), "new b");

    let out = prepare();
    let report = decode_and_extract(&text, out.path(), CollisionPolicy::FailOnConflict).unwrap();
    assert!(matches!(
        report.error(),
        Some(TranscodeError::DestinationConflict { path }) if path.ends_with("pkg/a.txt")
    ));
    assert_eq!(fs::read_to_string(out.path().join("pkg/a.txt")).unwrap(), "old a");
    assert!(!out.path().join("pkg/b.txt").exists());
}

struct CancelAfter {
    completed: usize,
    limit: usize,
    token: CancellationToken,
}

impl ProgressCallback for CancelAfter {
    fn on_entry_start(&mut self, _path: &Path, _total: Option<usize>, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {
        self.completed += 1;
        if self.completed == self.limit {
            self.token.cancel();
        }
    }

    fn on_complete(&mut self) {}
}

#[test]
fn test_cancelled_extraction_reports_exact_progress() {
    let mut builder = ZipBuilder::new();
    for i in 0..10 {
        builder = builder.file(&format!("file{i:02}.txt"), &vec![b'x'; 100_000]);
    }
    let text = encode_bytes(&builder.build());

    for k in [1, 4, 9] {
        let out = TempDir::new().unwrap();
        let token = CancellationToken::new();
        let mut progress = CancelAfter {
            completed: 0,
            limit: k,
            token: token.clone(),
        };
        let report = decode_and_extract_with(
            &text,
            out.path(),
            &ExtractConfig::default(),
            &mut progress,
            &token,
        )
        .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.entries_processed, k);
        let on_disk: Vec<_> = fs::read_dir(out.path()).unwrap().collect();
        assert_eq!(on_disk.len(), k, "no partial or temporary files");
        for entry in on_disk {
            assert_eq!(fs::metadata(entry.unwrap().path()).unwrap().len(), 100_000);
        }
    }
}

#[test]
fn test_cancelled_pack_returns_no_text() {
    let src = TempDir::new().unwrap();
    let root = sample_tree(&src);
    let token = CancellationToken::new();
    let mut progress = CancelAfter {
        completed: 0,
        limit: 2,
        token: token.clone(),
    };

    let err = pack_and_encode_with(&[&root], &PackConfig::default(), &mut progress, &token)
        .unwrap_err();
    assert!(matches!(err, TranscodeError::Cancelled));
}

#[test]
fn test_truncated_text_keeps_earlier_entries() {
    let src = TempDir::new().unwrap();
    let root = src.path().join("t");
    write_tree(&root, &[("a.txt", "first")]);
    fs::write(root.join("b.bin"), noise(200_000)).unwrap();

    let text = pack_and_encode(&[&root]).unwrap();
    let archive = decode_text(&text).unwrap();
    let cut = encode_bytes(&archive[..archive.len() / 2]);

    let out = TempDir::new().unwrap();
    let report = decode_and_extract(&cut, out.path(), CollisionPolicy::FailOnConflict).unwrap();

    assert!(matches!(
        report.error(),
        Some(TranscodeError::TruncatedArchive { index: 2 })
    ));
    assert_eq!(fs::read_to_string(out.path().join("t/a.txt")).unwrap(), "first");
    assert!(!out.path().join("t/b.bin").exists());
}

#[test]
fn test_random_bytes_are_corrupt_at_first_entry() {
    let mut bytes = noise(4096);
    bytes[0] = 0;
    let out = TempDir::new().unwrap();
    let err = decode_and_extract(&encode_bytes(&bytes), out.path(), CollisionPolicy::Overwrite)
        .unwrap_err();

    assert!(matches!(err, TranscodeError::CorruptArchive { index: 0, .. }));
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_missing_source_fails_whole_pack() {
    let src = TempDir::new().unwrap();
    let root = sample_tree(&src);
    let missing = src.path().join("does-not-exist");

    let err = pack_and_encode(&[root.as_path(), missing.as_path()]).unwrap_err();
    match err {
        TranscodeError::SourceUnavailable { path, .. } => assert_eq!(path, missing),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_destination_not_created_when_disabled() {
    let out = TempDir::new().unwrap();
    let dest = out.path().join("missing");
    let text = encode_bytes(&ZipBuilder::new().file("a.txt", b"a").build());

    let result = decode_and_extract_with(
        &text,
        &dest,
        &ExtractConfig::default().with_create_destination(false),
        &mut NoopProgress,
        &CancellationToken::new(),
    );
    assert!(matches!(result, Err(TranscodeError::Io(_))));
    assert!(!dest.exists());
}

#[cfg(unix)]
#[test]
fn test_symlink_cycle_is_skipped_during_pack() {
    let src = TempDir::new().unwrap();
    let root = src.path().join("cyclic");
    write_tree(&root, &[("sub/file.txt", "data")]);
    std::os::unix::fs::symlink(&root, root.join("sub/loop")).unwrap();

    let (text, report) = pack_and_encode_with(
        &[&root],
        &PackConfig::default(),
        &mut NoopProgress,
        &CancellationToken::new(),
    )
    .unwrap();

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].reason, SkipReason::SymlinkCycle);

    let out = TempDir::new().unwrap();
    let extracted = decode_and_extract(&text, out.path(), CollisionPolicy::FailOnConflict).unwrap();
    assert!(extracted.is_complete());
    assert!(out.path().join("cyclic/sub/file.txt").is_file());
    assert!(!out.path().join("cyclic/sub/loop").exists());
}
