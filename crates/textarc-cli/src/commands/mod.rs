//! Subcommand implementations.

pub mod completion;
pub mod decode;
pub mod encode;
pub mod pack;
pub mod save;
pub mod unpack;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use std::fs;
use std::io::Read;
use std::io::{self};
use std::path::Path;

/// Reads the whole input, from `input` or stdin when `None`.
pub fn read_text(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display())),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Name of the input for error messages.
pub fn subject(input: Option<&Path>) -> String {
    input.map_or_else(|| "stdin".to_string(), |p| p.display().to_string())
}

/// Fails if `path` exists and `force` is not set.
pub fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Output file '{}' already exists\n\
             HINT: Use --force to overwrite it.",
            path.display()
        );
    }
    Ok(())
}
