//! Validated path types.
//!
//! Archive names and destination paths are wrapped in newtypes that can only
//! be created through validation, so the extractor never joins an unchecked
//! string onto the filesystem.

pub mod dest_dir;
pub mod entry_path;

pub use dest_dir::DestDir;
pub use entry_path::EntryPath;
