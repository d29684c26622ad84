//! Save command implementation.

use super::ensure_writable;
use super::read_text;
use super::subject;
use crate::cli::SaveArgs;
use crate::cli::input_file;
use crate::error::add_context;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Read;
use std::path::Path;
use tempfile::NamedTempFile;
use textarc_core::decode_and_save;
use textarc_core::decode_reader_to_writer;
use textarc_core::looks_like_archive;

pub fn execute(args: &SaveArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let input = input_file(args.input.as_ref());
    let subject = subject(input);
    ensure_writable(&args.output, args.force)?;

    let bytes = match input {
        Some(path) => stream_to_file(path, &args.output, &subject)?,
        None => {
            let text = read_text(None)?;
            add_context(decode_and_save(&text, &args.output), &subject)?
        }
    };

    let is_archive = written_as_archive(&args.output)?;
    formatter.format_save_result(&args.output, bytes, is_archive)
}

/// Decodes into a temporary file next to `output` and moves it into place
/// only once the whole text has decoded.
fn stream_to_file(input: &Path, output: &Path, subject: &str) -> Result<u64> {
    let reader = File::open(input)
        .map(BufReader::new)
        .with_context(|| format!("failed to open '{}'", input.display()))?;

    let parent = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staging = NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create a temporary file in '{}'", parent.display()))?;

    let written = {
        let mut writer = BufWriter::new(staging.as_file_mut());
        add_context(decode_reader_to_writer(reader, &mut writer), subject)?
    };

    staging
        .persist(output)
        .with_context(|| format!("failed to write '{}'", output.display()))?;
    Ok(written)
}

/// Long enough to hold the end record of an empty archive.
const HEAD_LEN: u64 = 22;

fn written_as_archive(path: &Path) -> Result<bool> {
    let mut head = Vec::new();
    File::open(path)
        .and_then(|f| f.take(HEAD_LEN).read_to_end(&mut head))
        .with_context(|| format!("failed to read back '{}'", path.display()))?;
    Ok(looks_like_archive(&head))
}
