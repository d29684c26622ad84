//! Reading ZIP archives and extracting them into a directory.
//!
//! [`reader::ArchiveReader`] walks local headers forward-only and validates
//! each entry's name; [`extractor::extract_entries`] performs the
//! containment check against the destination and applies the collision
//! policy.

pub mod extractor;
pub mod reader;

pub use extractor::extract_entries;
pub use reader::ArchiveEntry;
pub use reader::ArchiveReader;
pub use reader::looks_like_archive;
