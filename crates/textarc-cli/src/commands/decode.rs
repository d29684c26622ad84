//! Decode command implementation.

use super::read_text;
use super::subject;
use crate::cli::TextArgs;
use crate::cli::input_file;
use crate::error::add_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use textarc_core::decode_to_text;

pub fn execute(args: &TextArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let input = input_file(args.input.as_ref());
    let text = read_text(input)?;
    let decoded = add_context(decode_to_text(&text), &subject(input))?;
    formatter.format_text_result("decode", &decoded)
}
