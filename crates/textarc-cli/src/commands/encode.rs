//! Encode command implementation.

use super::read_text;
use crate::cli::TextArgs;
use crate::cli::input_file;
use crate::output::OutputFormatter;
use anyhow::Result;
use textarc_core::encode_text;

pub fn execute(args: &TextArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let text = read_text(input_file(args.input.as_ref()))?;
    // A trailing newline from `echo` or an editor is not part of the text.
    let text = text.strip_suffix('\n').unwrap_or(&text);
    let text = text.strip_suffix('\r').unwrap_or(text);
    formatter.format_text_result("encode", &encode_text(text))
}
