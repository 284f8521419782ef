//! In-memory storage backend for testing.

use super::FileInfoStream;
use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::file::FileInfo;
use crate::path::validate as validate_path;
use async_stream::stream;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tokio::sync::RwLock;

const MOCK_ROOT: &str = "/mock";

/// In-memory storage backend for testing.
///
/// Files are kept in a sorted map behind a [`RwLock`] together with their
/// modification time, which tests can set explicitly to exercise retention
/// rules. Paths can also be marked as undeletable to simulate permission
/// problems part-way through a sweep.
///
/// # Examples
///
/// ```
/// use camdrop_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([("ch1_20250624000000.dav", b"frames")]);
/// assert!(backend.exists(Path::new("ch1_20250624000000.dav")).await?);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    root: PathBuf,
    storage: RwLock<BTreeMap<PathBuf, (OffsetDateTime, Vec<u8>)>>,
    locked: RwLock<HashSet<PathBuf>>,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files, all modified "now".
    ///
    /// Panics if any path fails validation. If test setup is wrong, then the
    /// test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self::with_aged_files(files.into_iter().map(|(path, data)| (path, data, now)))
    }

    /// Create a mock backend pre-populated with files and explicit
    /// modification times.
    pub fn with_aged_files(
        files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>, OffsetDateTime)>,
    ) -> Self {
        let mut map = BTreeMap::new();
        for (path, data, modified) in files {
            let path = path.into();
            let Ok(validated) = validate_path(&path) else {
                // The panic here is DELIBERATE. MockBackend is intended to be
                // used in tests; panics are expected. There is no error result.
                panic!("MockBackend::with_aged_files: invalid path {}", path.display());
            };
            map.insert(validated, (modified, data.into()));
        }
        Self {
            name: "mock".to_string(),
            root: PathBuf::from(MOCK_ROOT),
            storage: RwLock::new(map),
            locked: RwLock::new(HashSet::new()),
        }
    }

    /// Make every future [`delete`](StorageBackend::delete) of `path` fail
    /// with [`PermissionDenied`](ErrorKind::PermissionDenied).
    pub async fn lock(&self, path: impl AsRef<Path>) {
        if let Ok(path) = validate_path(path.as_ref()) {
            self.locked.write().await.insert(path);
        }
    }

    /// Overwrite the modification time of an existing file.
    pub async fn set_modified(&self, path: impl AsRef<Path>, modified: OffsetDateTime) -> Result<()> {
        let path = validate_path(path.as_ref())?;
        let mut guard = self.storage.write().await;
        let entry = guard.get_mut(&path).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path.clone())))?;
        entry.0 = modified;
        Ok(())
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &str); 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn list_stream<'a>(&'a self) -> FileInfoStream<'a> {
        Box::pin(stream! {
            // Snapshot under the read lock, then drop it before yielding so
            // consumers can delete while iterating.
            let entries: Vec<FileInfo> = {
                let guard = self.storage.read().await;
                guard
                    .iter()
                    .map(|(path, (modified, data))| FileInfo::new(path.clone(), data.len() as u64, *modified))
                    .collect()
            };
            for info in entries {
                yield Ok(info);
            }
        })
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let path = validate_path(path)?;
        Ok(self.storage.read().await.contains_key(&path))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let path = validate_path(path)?;
        let guard = self.storage.read().await;
        let (_modified, data) = guard.get(&path).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path.clone())))?;
        Ok(data.clone())
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let path = validate_path(path)?;
        self.storage.write().await.insert(path, (OffsetDateTime::now_utc(), data.to_vec()));
        Ok(())
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        let path = validate_path(path)?;
        if self.locked.read().await.contains(&path) {
            exn::bail!(ErrorKind::PermissionDenied(path));
        }
        self.storage.write().await.remove(&path).map(|_| ()).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path)))
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let from = validate_path(from)?;
        let to = validate_path(to)?;
        let mut guard = self.storage.write().await;
        let entry = guard.remove(&from).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(from)))?;
        // Moves keep their modification time, like rename(2).
        guard.insert(to, entry);
        Ok(())
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let path = validate_path(path)?;
        let guard = self.storage.read().await;
        let (modified, data) = guard.get(&path).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path.clone())))?;
        Ok(FileInfo::new(path.clone(), data.len() as u64, *modified))
    }
}
