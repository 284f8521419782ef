//! Storage usage reporting.

use crate::error::{ErrorKind, Result};
use camdrop_storage::BackendHandle;
use futures::StreamExt;
use tracing::instrument;

const BYTES_PER_GIGABYTE: f64 = 1024.0 * 1024.0 * 1024.0;

/// Aggregate size of the storage tree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    pub files: u64,
    pub bytes: u64,
}
impl TreeStats {
    pub fn gigabytes(&self) -> f64 {
        self.bytes as f64 / BYTES_PER_GIGABYTE
    }
}

/// Counts every regular file under the root and sums their sizes.
///
/// Entries that cannot be read are logged and left out of the totals.
///
/// # Errors
/// Returns [`ErrorKind::Stats`] when the walk produced errors and nothing
/// else, which means the tree itself could not be read.
#[instrument(skip_all, fields(backend = backend.name()))]
pub async fn collect(backend: &BackendHandle) -> Result<TreeStats> {
    let mut stats = TreeStats::default();
    let mut failures = 0u64;
    let mut files = backend.list_stream();
    while let Some(entry) = files.next().await {
        match entry {
            Ok(file) => {
                stats.files += 1;
                stats.bytes += file.size;
            },
            Err(e) if e.is_not_found() => {},
            Err(e) => {
                tracing::warn!(error = ?e, "Skipping unreadable entry while collecting stats");
                failures += 1;
            },
        }
    }
    if stats.files == 0 && failures > 0 {
        exn::bail!(ErrorKind::Stats);
    }
    tracing::info!(
        files = stats.files,
        size_gb = %format!("{:.2}", stats.gigabytes()),
        "Storage statistics"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FlakyBackend;
    use camdrop_storage::FileInfo;
    use camdrop_storage::backend::MockBackend;
    use std::sync::Arc;
    use time::OffsetDateTime;

    #[tokio::test]
    async fn test_collect_counts_everything() {
        let backend: BackendHandle = Arc::new(MockBackend::with_files([
            ("organized/2025/06/24/a.dav", vec![0u8; 100]),
            ("b.mp4", vec![0u8; 20]),
            ("notes.txt", vec![0u8; 3]),
        ]));
        assert_eq!(collect(&backend).await.unwrap(), TreeStats { files: 3, bytes: 123 });
    }

    #[tokio::test]
    async fn test_collect_empty_tree() {
        let backend: BackendHandle = Arc::new(MockBackend::default());
        assert_eq!(collect(&backend).await.unwrap(), TreeStats::default());
    }

    #[tokio::test]
    async fn test_collect_skips_bad_entries() {
        let flaky = FlakyBackend::new(MockBackend::with_files([("a.dav", vec![0u8; 5])]))
            .with_walk_errors(1)
            .with_ghost(FileInfo::new("ghost.dav", 7, OffsetDateTime::now_utc()));
        let backend: BackendHandle = Arc::new(flaky);
        // The ghost was listed, so it counts; only the error is dropped.
        assert_eq!(collect(&backend).await.unwrap(), TreeStats { files: 2, bytes: 12 });
    }

    #[tokio::test]
    async fn test_collect_unreadable_tree() {
        let backend: BackendHandle = Arc::new(FlakyBackend::new(MockBackend::default()).with_walk_errors(1));
        let err = collect(&backend).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Stats));
    }

    #[test]
    fn test_gigabytes() {
        let stats = TreeStats {
            files: 1,
            bytes: 3 * 1024 * 1024 * 1024 / 2,
        };
        assert_eq!(stats.gigabytes(), 1.5);
    }
}
