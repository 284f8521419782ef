//! Storage backend trait and implementations.
//!
//! [`StorageBackend`] is the small set of operations the ingestion pipeline
//! needs from the storage tree: walk it, inspect a file, move a file, delete
//! a file. [`LocalBackend`] is the real thing; [`MockBackend`] (behind the
//! `mock` feature) keeps everything in memory with controllable timestamps.

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
use crate::error::Result;
use crate::file::FileInfo;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::path::Path;
use std::pin::Pin;

pub type FileInfoStream<'a> = Pin<Box<dyn Stream<Item = Result<FileInfo>> + Send + 'a>>;

/// Unified interface over the storage tree.
///
/// # Path Handling
/// All paths are relative to [`root()`](Self::root) and are validated with
/// [`validate_path`](crate::validate_path) by implementations before use.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use camdrop_storage::{backend::StorageBackend, error::Result};
///
/// async fn size_of_upload(backend: &dyn StorageBackend) -> Result<u64> {
///     let path = Path::new("Casa_ch1_main_20250624000000_20250624010000.dav");
///     match backend.exists(path).await? {
///         true => Ok(backend.stat(path).await?.size),
///         false => Ok(0),
///     }
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the backend, used for logging only.
    fn name(&self) -> &str;

    /// Absolute location of the storage root. Index records are written
    /// against this root, and absolute paths reported by the transfer engine
    /// are made relative to it.
    fn root(&self) -> &Path;

    /// Collect every regular file in the tree into a [`Vec`].
    ///
    /// Stops at the first error; walkers that must survive individual
    /// failures should consume [`list_stream()`](Self::list_stream) instead.
    async fn list(&self) -> Result<Vec<FileInfo>> {
        self.list_stream().try_collect().await
    }

    /// Stream metadata for every regular file under the root, recursively.
    ///
    /// Errors for individual entries are yielded in place and the walk
    /// continues with the next entry. Directories that disappear mid-walk
    /// are skipped silently.
    ///
    /// ```
    /// use futures::StreamExt;
    /// # use camdrop_storage::backend::StorageBackend;
    /// # async fn example(backend: &dyn StorageBackend) {
    /// let mut files = backend.list_stream();
    /// while let Some(entry) = files.next().await {
    ///     match entry {
    ///         Ok(info) => println!("{}: {} bytes", info.path.display(), info.size),
    ///         Err(e) => eprintln!("skipping: {e:?}"),
    ///     }
    /// }
    /// # }
    /// ```
    fn list_stream<'a>(&'a self) -> FileInfoStream<'a>;

    /// Check if a file exists.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Read file contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write file contents, creating parent directories as needed and
    /// replacing any existing file.
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Delete a file.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn delete(&self, path: &Path) -> Result<()>;

    /// Rename/move a file within the tree.
    ///
    /// # Notes
    /// - Parent directories of `to` are created as needed.
    /// - If the destination already exists, it is overwritten.
    /// - Returns [`NotFound`](crate::error::ErrorKind::NotFound) if `from`
    ///   does not exist.
    async fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Get file metadata without reading contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn stat(&self, path: &Path) -> Result<FileInfo>;
}
