//! File metadata yielded by storage backends.

use std::path::PathBuf;
use time::OffsetDateTime;

/// Metadata for a single regular file in the storage tree.
///
/// Produced by both tree walks ([`list_stream`](crate::StorageBackend::list_stream))
/// and single-file lookups ([`stat`](crate::StorageBackend::stat)).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Relative path from storage root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified: OffsetDateTime,
}
impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: impl Into<OffsetDateTime>) -> Self {
        Self {
            path: path.into(),
            size,
            modified: modified.into(),
        }
    }

    /// The final path component, if it is valid UTF-8.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }
}
