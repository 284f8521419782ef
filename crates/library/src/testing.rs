//! Test doubles shared by the handler, sweeper, stats and monitor tests.

use async_trait::async_trait;
use camdrop_storage::backend::{FileInfoStream, MockBackend};
use camdrop_storage::error::{ErrorKind, Result};
use camdrop_storage::{FileInfo, StorageBackend};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Wraps a [`MockBackend`] and misbehaves during walks: first it yields
/// `walk_errors` permission errors, then entries for `ghosts` (files that do
/// not exist, as if deleted by someone else after being listed), then the
/// real contents. With `stat_panics` set, every `stat` panics.
pub(crate) struct FlakyBackend {
    pub inner: MockBackend,
    pub ghosts: Vec<FileInfo>,
    pub walk_errors: usize,
    pub stat_panics: bool,
    walks: AtomicUsize,
}
impl FlakyBackend {
    pub fn new(inner: MockBackend) -> Self {
        Self {
            inner,
            ghosts: Vec::new(),
            walk_errors: 0,
            stat_panics: false,
            walks: AtomicUsize::new(0),
        }
    }

    pub fn with_ghost(mut self, ghost: FileInfo) -> Self {
        self.ghosts.push(ghost);
        self
    }

    pub fn with_walk_errors(mut self, count: usize) -> Self {
        self.walk_errors = count;
        self
    }

    pub fn with_panicking_stat(mut self) -> Self {
        self.stat_panics = true;
        self
    }

    /// How many times the tree has been walked.
    pub fn walks(&self) -> usize {
        self.walks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageBackend for FlakyBackend {
    fn name(&self) -> &str {
        "flaky"
    }

    fn root(&self) -> &Path {
        self.inner.root()
    }

    fn list_stream<'a>(&'a self) -> FileInfoStream<'a> {
        self.walks.fetch_add(1, Ordering::SeqCst);
        let errors = (0..self.walk_errors)
            .map(|n| Err(exn::Exn::from(ErrorKind::PermissionDenied(PathBuf::from(format!("locked-{n}"))))));
        let ghosts = self.ghosts.iter().cloned().map(Ok);
        let leading: Vec<Result<FileInfo>> = errors.chain(ghosts).collect();
        Box::pin(futures::stream::iter(leading).chain(self.inner.list_stream()))
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        self.inner.exists(path).await
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.inner.read(path).await
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        self.inner.write(path, data).await
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        self.inner.delete(path).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.inner.rename(from, to).await
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        if self.stat_panics {
            panic!("FlakyBackend::stat: {}", path.display());
        }
        self.inner.stat(path).await
    }
}
