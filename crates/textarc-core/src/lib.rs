//! Pack file trees into ZIP archives carried as radix-64 text, and extract
//! them back without escaping the destination.
//!
//! `textarc-core` provides two pipelines:
//!
//! - **pack and encode**: walk files and directories deterministically,
//!   deflate them into a ZIP archive and encode the archive as text
//! - **decode and extract**: decode the text, read the archive forward-only
//!   and write its entries under a destination directory, enforcing path
//!   containment and a collision policy
//!
//! Text that holds an archive can also be saved as a raw `.zip` file, and
//! plain UTF-8 text can be converted directly.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//! use textarc_core::{CollisionPolicy, decode_and_extract, pack_and_encode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let text = pack_and_encode(&[Path::new("project")])?;
//! let report = decode_and_extract(&text, Path::new("restored"), CollisionPolicy::FailOnConflict)?;
//! println!("Extracted {} files", report.files_written);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cancel;
pub mod codec;
pub mod config;
pub mod copy;
pub mod error;
pub mod pack;
pub mod pipeline;
pub mod report;
#[doc(hidden)]
pub mod test_utils;
pub mod types;
pub mod unpack;

// Re-export main API types
pub use cancel::CancellationToken;
pub use codec::decode_to_text;
pub use codec::encode_text;
pub use config::CollisionPolicy;
pub use config::ExtractConfig;
pub use config::PackConfig;
pub use error::Result;
pub use error::TranscodeError;
pub use pipeline::decode_and_extract;
pub use pipeline::decode_and_extract_with;
pub use pipeline::decode_and_save;
pub use pipeline::decode_reader_to_writer;
pub use pipeline::decode_text;
pub use pipeline::encode_bytes;
pub use pipeline::extract_text_file;
pub use pipeline::pack_and_encode;
pub use pipeline::pack_and_encode_with;
pub use pipeline::pack_to_writer;
pub use pipeline::suggested_text_file_name;
pub use pipeline::text_holds_archive;
pub use report::ExtractReport;
pub use report::NoopProgress;
pub use report::PackReport;
pub use report::ProgressCallback;
pub use report::SkipReason;
pub use report::SkippedEntry;
pub use unpack::looks_like_archive;
