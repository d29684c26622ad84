//! Chunked copy with a reusable buffer.
//!
//! Every byte that moves between disk, archive and text goes through
//! [`copy_with_buffer`], which keeps memory use at one fixed-size chunk
//! regardless of how large the stream is.

use std::io::Read;
use std::io::Write;
use std::io::{self};

/// Chunk size for all streaming I/O (64 KiB).
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Heap-allocated, reusable chunk buffer.
///
/// # Examples
///
/// ```
/// use textarc_core::copy::{CopyBuffer, copy_with_buffer};
///
/// let mut buffer = CopyBuffer::new();
/// let mut input: &[u8] = b"payload";
/// let mut output = Vec::new();
/// let copied = copy_with_buffer(&mut input, &mut output, &mut buffer).unwrap();
/// assert_eq!(copied, 7);
/// ```
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Box<[u8]>,
}

impl CopyBuffer {
    /// Creates a new zeroed buffer of [`CHUNK_SIZE`] bytes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; CHUNK_SIZE].into_boxed_slice(),
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Which side of a copy failed.
///
/// Callers map read failures to archive or text errors and write failures to
/// plain I/O errors, so the distinction has to survive the copy loop.
#[derive(Debug)]
pub enum CopyError {
    /// Reading from the source failed.
    Read(io::Error),
    /// Writing to the sink failed.
    Write(io::Error),
}

impl CopyError {
    /// Discards the side and returns the underlying I/O error.
    #[must_use]
    pub fn into_io(self) -> io::Error {
        match self {
            Self::Read(e) | Self::Write(e) => e,
        }
    }
}

/// Copies `reader` into `writer` chunk by chunk.
///
/// Returns the total number of bytes copied. Interrupted reads are retried.
pub fn copy_with_buffer<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
) -> Result<u64, CopyError> {
    copy_with_progress(reader, writer, buffer, |_| {})
}

/// Like [`copy_with_buffer`], calling `on_chunk` with the size of every chunk
/// written.
pub fn copy_with_progress<R, W, F>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
    mut on_chunk: F,
) -> Result<u64, CopyError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
    F: FnMut(u64),
{
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };

        writer
            .write_all(&buffer.buf[..bytes_read])
            .map_err(CopyError::Write)?;

        total += bytes_read as u64;
        on_chunk(bytes_read as u64);
    }

    Ok(total)
}
