//! Radix-64 text codec.
//!
//! Uses the standard alphabet with `=` padding. Decoding strips ASCII
//! whitespace first, so text pasted across several lines still decodes, and
//! then requires canonical padding: the stripped length must be a multiple of
//! four and `=` may only appear in the final block. Unused bits in the final
//! symbol are ignored, so `Zh==` decodes like `Zg==`. Encoding always clears
//! them.
//!
//! Besides the in-memory functions, this module provides streaming adapters
//! ([`encode_to_writer`], [`decode_to_writer`]) for inputs too large to hold
//! as a single string.

use std::io::Read;
use std::io::Write;
use std::io::{self};

use base64::Engine;
use base64::alphabet;
use base64::engine::GeneralPurpose;
use base64::engine::GeneralPurposeConfig;
use base64::engine::general_purpose::STANDARD;
use base64::read::DecoderReader;
use base64::write::EncoderWriter;

use crate::Result;
use crate::TranscodeError;
use crate::copy::CopyBuffer;
use crate::copy::CopyError;
use crate::copy::copy_with_buffer;

/// Standard alphabet and padding, lenient about the final symbol's spare bits.
const DECODER: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Encodes bytes as radix-64 text.
///
/// Total and deterministic; empty input yields an empty string.
///
/// # Examples
///
/// ```
/// use textarc_core::codec::encode;
///
/// assert_eq!(encode(b"hello"), "aGVsbG8=");
/// assert_eq!(encode(b""), "");
/// ```
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes radix-64 text into bytes, ignoring interspersed whitespace.
///
/// # Errors
///
/// Returns `MalformedText` for characters outside the alphabet, a length
/// that is not a multiple of four, or misplaced padding.
///
/// # Examples
///
/// ```
/// use textarc_core::codec::decode;
///
/// assert_eq!(decode("aGVs\nbG8=").unwrap(), b"hello");
/// assert!(decode("aGVs*bG8=").is_err());
/// ```
pub fn decode(text: &str) -> Result<Vec<u8>> {
    let compact = strip_whitespace(text);
    DECODER.decode(compact.as_bytes()).map_err(malformed)
}

/// Encodes UTF-8 text as radix-64 after trimming surrounding whitespace.
#[must_use]
pub fn encode_text(text: &str) -> String {
    encode(text.trim().as_bytes())
}

/// Decodes radix-64 text and interprets the bytes as UTF-8.
///
/// Invalid UTF-8 sequences are replaced rather than rejected, so any
/// well-formed radix-64 input yields a string.
pub fn decode_to_text(text: &str) -> Result<String> {
    let bytes = decode(text.trim())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Streams `reader` into `writer` as radix-64 text.
///
/// Returns the number of raw bytes consumed from `reader`.
pub fn encode_to_writer<R: Read, W: Write>(reader: &mut R, writer: W) -> Result<u64> {
    let mut encoder = EncoderWriter::new(writer, &STANDARD);
    let mut buffer = CopyBuffer::new();
    let consumed = copy_with_buffer(reader, &mut encoder, &mut buffer).map_err(CopyError::into_io)?;
    let mut inner = encoder.finish()?;
    inner.flush()?;
    Ok(consumed)
}

/// Streams radix-64 text from `reader` into `writer` as raw bytes.
///
/// Whitespace in the input is skipped. Returns the number of decoded bytes
/// written.
///
/// # Errors
///
/// Returns `MalformedText` if the text is not valid radix-64, or `Io` if
/// reading or writing fails.
pub fn decode_to_writer<R: Read, W: Write>(reader: R, writer: &mut W) -> Result<u64> {
    let mut decoder = DecoderReader::new(WhitespaceFilter::new(reader), &DECODER);
    let mut buffer = CopyBuffer::new();
    match copy_with_buffer(&mut decoder, writer, &mut buffer) {
        Ok(written) => {
            writer.flush()?;
            Ok(written)
        }
        Err(CopyError::Read(e)) if e.kind() == io::ErrorKind::InvalidData => {
            Err(TranscodeError::MalformedText {
                reason: e.to_string(),
            })
        }
        Err(e) => Err(e.into_io().into()),
    }
}

fn malformed(err: base64::DecodeError) -> TranscodeError {
    TranscodeError::MalformedText {
        reason: err.to_string(),
    }
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_whitespace()).collect()
}

/// Reader adapter that drops ASCII whitespace bytes.
struct WhitespaceFilter<R> {
    inner: R,
}

impl<R> WhitespaceFilter<R> {
    fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> Read for WhitespaceFilter<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let n = self.inner.read(buf)?;
            if n == 0 {
                return Ok(0);
            }
            let mut kept = 0;
            for i in 0..n {
                let byte = buf[i];
                if !byte.is_ascii_whitespace() {
                    buf[kept] = byte;
                    kept += 1;
                }
            }
            // An all-whitespace chunk must not be reported as EOF.
            if kept > 0 {
                return Ok(kept);
            }
        }
    }
}
