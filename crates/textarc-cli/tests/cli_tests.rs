//! Integration tests for textarc-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

fn textarc_cmd() -> Command {
    cargo_bin_cmd!("textarc")
}

/// Creates `root/project` with a nested file and returns its path.
fn sample_project(root: &Path) -> PathBuf {
    let project = root.join("project");
    fs::create_dir_all(project.join("src")).expect("failed to create dirs");
    fs::write(project.join("README.md"), "# project\n").expect("failed to write");
    fs::write(project.join("src/main.rs"), "fn main() {}\n").expect("failed to write");
    project
}

fn pack_to_stdout(source: &Path) -> Vec<u8> {
    textarc_cmd()
        .arg("--quiet")
        .arg("pack")
        .arg(source)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone()
}

#[test]
fn test_version_flag() {
    textarc_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("textarc"));
}

#[test]
fn test_help_flag() {
    textarc_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pack"))
        .stdout(predicate::str::contains("unpack"));
}

#[test]
fn test_unpack_help() {
    textarc_cmd()
        .arg("unpack")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Decode base64 text and extract"));
}

// ============================================================================
// Pack / Unpack
// ============================================================================

#[test]
fn test_pack_prints_base64() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let project = sample_project(temp.path());

    let stdout = pack_to_stdout(&project);
    let text = String::from_utf8(stdout).expect("text is ascii");
    // Every archive starts with "PK\x03\x04".
    assert!(text.starts_with("UEsDB"));
    assert!(
        text.trim()
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'=')
    );
}

#[test]
fn test_pack_stdout_unpack_stdin_round_trip() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let project = sample_project(temp.path());
    let dest = temp.path().join("restored");

    let text = pack_to_stdout(&project);

    textarc_cmd()
        .arg("unpack")
        .arg("-d")
        .arg(&dest)
        .write_stdin(text)
        .assert()
        .success()
        .stdout(predicate::str::contains("Unpacked into"));

    assert_eq!(
        fs::read_to_string(dest.join("project/src/main.rs")).unwrap(),
        "fn main() {}\n"
    );
    assert_eq!(
        fs::read_to_string(dest.join("project/README.md")).unwrap(),
        "# project\n"
    );
}

#[test]
fn test_pack_to_file_then_unpack_file() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let project = sample_project(temp.path());
    let text_file = temp.path().join("project.txt");
    let dest = temp.path().join("out");

    textarc_cmd()
        .arg("pack")
        .arg(&project)
        .arg("-o")
        .arg(&text_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Text written"));

    textarc_cmd()
        .arg("unpack")
        .arg(&text_file)
        .arg("-d")
        .arg(&dest)
        .assert()
        .success();

    assert!(dest.join("project/src/main.rs").is_file());
}

#[test]
fn test_pack_into_directory_uses_suggested_name() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let project = sample_project(temp.path());
    let out_dir = temp.path().join("texts");
    fs::create_dir(&out_dir).unwrap();

    textarc_cmd()
        .arg("pack")
        .arg(&project)
        .arg("-o")
        .arg(&out_dir)
        .assert()
        .success();

    assert!(out_dir.join("project_base64.txt").is_file());
}

#[test]
fn test_pack_output_exists_without_force() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let project = sample_project(temp.path());
    let text_file = temp.path().join("exists.txt");
    fs::write(&text_file, "keep me").unwrap();

    textarc_cmd()
        .arg("pack")
        .arg(&project)
        .arg("-o")
        .arg(&text_file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(fs::read_to_string(&text_file).unwrap(), "keep me");

    textarc_cmd()
        .arg("pack")
        .arg(&project)
        .arg("-o")
        .arg(&text_file)
        .arg("--force")
        .assert()
        .success();

    assert_ne!(fs::read_to_string(&text_file).unwrap(), "keep me");
}

#[test]
fn test_pack_missing_source_fails() {
    let temp = TempDir::new().expect("failed to create temp dir");

    textarc_cmd()
        .arg("pack")
        .arg(temp.path().join("nope"))
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Cannot read source"));
}

#[test]
fn test_pack_json_output() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let project = sample_project(temp.path());

    let output = textarc_cmd()
        .arg("--json")
        .arg("pack")
        .arg(&project)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("invalid JSON output");
    assert_eq!(json["status"], "success");
    assert_eq!(json["operation"], "pack");
    assert_eq!(json["data"]["files_added"], 2);
    assert_eq!(json["data"]["directories_added"], 2);
    assert!(json["data"]["text"].as_str().unwrap().starts_with("UEsDB"));
}

#[test]
fn test_unpack_conflict_fails_with_hint() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let project = sample_project(temp.path());
    let dest = temp.path().join("restored");
    let text = pack_to_stdout(&project);

    fs::create_dir_all(dest.join("project")).unwrap();
    fs::write(dest.join("project/README.md"), "local edit").unwrap();

    textarc_cmd()
        .arg("unpack")
        .arg("-d")
        .arg(&dest)
        .write_stdin(text)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--overwrite"));

    assert_eq!(
        fs::read_to_string(dest.join("project/README.md")).unwrap(),
        "local edit"
    );
}

#[test]
fn test_unpack_skip_existing_and_overwrite() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let project = sample_project(temp.path());
    let dest = temp.path().join("restored");
    let text = pack_to_stdout(&project);

    fs::create_dir_all(dest.join("project")).unwrap();
    fs::write(dest.join("project/README.md"), "local edit").unwrap();

    let output = textarc_cmd()
        .arg("--json")
        .arg("unpack")
        .arg("-d")
        .arg(&dest)
        .arg("--skip-existing")
        .write_stdin(text.clone())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("invalid JSON output");
    assert_eq!(json["data"]["skipped"][0]["reason"], "already-exists");
    assert_eq!(
        fs::read_to_string(dest.join("project/README.md")).unwrap(),
        "local edit"
    );
    assert!(dest.join("project/src/main.rs").is_file());

    textarc_cmd()
        .arg("unpack")
        .arg("-d")
        .arg(&dest)
        .arg("--overwrite")
        .write_stdin(text)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dest.join("project/README.md")).unwrap(),
        "# project\n"
    );
}

#[test]
fn test_unpack_malformed_text() {
    let temp = TempDir::new().expect("failed to create temp dir");

    textarc_cmd()
        .arg("unpack")
        .arg("-d")
        .arg(temp.path().join("out"))
        .write_stdin("this is not base64!")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid base64"));

    assert!(!temp.path().join("out").exists());
}

#[test]
fn test_unpack_truncated_text_reports_cut_off() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let project = sample_project(temp.path());

    // Incompressible payload so the middle of the text falls inside file data.
    let mut state = 0x2545_f491_u32;
    let blob: Vec<u8> = (0..8192)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state.to_le_bytes()[0]
        })
        .collect();
    fs::write(project.join("blob.bin"), blob).unwrap();

    let text = String::from_utf8(pack_to_stdout(&project)).unwrap();
    let text = text.trim();
    // Keep a multiple of four characters so the prefix still decodes.
    let cut = (text.len() / 2) & !3;

    textarc_cmd()
        .arg("unpack")
        .arg("-d")
        .arg(temp.path().join("out"))
        .write_stdin(&text[..cut])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unpack stopped"))
        .stderr(predicate::str::contains("cut off"));

    assert!(temp.path().join("out/project/README.md").is_file());
}

#[test]
fn test_unpack_json_error() {
    let temp = TempDir::new().expect("failed to create temp dir");

    let output = textarc_cmd()
        .arg("--json")
        .arg("unpack")
        .arg("-d")
        .arg(temp.path().join("out"))
        .write_stdin("AAAA")
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("invalid JSON output");
    assert_eq!(json["status"], "error");
    assert_eq!(json["operation"], "unpack");
    assert!(json["error"].as_str().unwrap().contains("corrupt"));
}

// ============================================================================
// Save
// ============================================================================

#[test]
fn test_save_writes_archive() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let project = sample_project(temp.path());
    let text = pack_to_stdout(&project);
    let zip = temp.path().join("project.zip");

    textarc_cmd()
        .arg("save")
        .arg("-o")
        .arg(&zip)
        .write_stdin(text)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved"));

    let bytes = fs::read(&zip).unwrap();
    assert!(bytes.starts_with(b"PK\x03\x04"));
}

#[test]
fn test_save_from_file_warns_on_non_archive() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let input = temp.path().join("hello.txt");
    fs::write(&input, "aGVsbG8=\n").unwrap();
    let out = temp.path().join("hello.bin");

    textarc_cmd()
        .arg("save")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("does not look like a ZIP archive"));

    assert_eq!(fs::read(&out).unwrap(), b"hello");
}

#[test]
fn test_save_refuses_existing_output() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let out = temp.path().join("taken.zip");
    fs::write(&out, "original").unwrap();

    textarc_cmd()
        .arg("save")
        .arg("-o")
        .arg(&out)
        .write_stdin("aGVsbG8=")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    assert_eq!(fs::read_to_string(&out).unwrap(), "original");
}

#[test]
fn test_save_force_keeps_existing_output_on_bad_text() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let input = temp.path().join("broken.txt");
    fs::write(&input, "UEsDBA==\nnot base64!").unwrap();
    let out = temp.path().join("taken.zip");
    fs::write(&out, "original").unwrap();

    textarc_cmd()
        .arg("save")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .arg("--force")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid base64"));

    assert_eq!(fs::read_to_string(&out).unwrap(), "original");
}

// ============================================================================
// Plain text mode
// ============================================================================

#[test]
fn test_encode_plain_text() {
    textarc_cmd()
        .arg("encode")
        .write_stdin("hello\n")
        .assert()
        .success()
        .stdout("aGVsbG8=\n");
}

#[test]
fn test_decode_plain_text() {
    textarc_cmd()
        .arg("decode")
        .write_stdin("  aGVs\r\nbG8=  \n")
        .assert()
        .success()
        .stdout("hello\n");
}

#[test]
fn test_decode_rejects_invalid_text() {
    textarc_cmd()
        .arg("decode")
        .write_stdin("aGVs*bG8=")
        .assert()
        .failure()
        .stderr(predicate::str::contains("HINT"));
}

#[test]
fn test_encode_json_output() {
    let output = textarc_cmd()
        .arg("--json")
        .arg("encode")
        .write_stdin("hi")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("invalid JSON output");
    assert_eq!(json["operation"], "encode");
    assert_eq!(json["data"]["text"], "aGk=");
}

#[test]
fn test_completion_bash() {
    textarc_cmd()
        .arg("completion")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("textarc"));
}
