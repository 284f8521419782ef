//! Age-based deletion across the whole storage tree.
//!
//! Every regular file under the root is a candidate, organized or not, video
//! or not. The index is never consulted or pruned, so records for deleted
//! files stay in it.

use camdrop_storage::{BackendHandle, FileInfo};
use futures::StreamExt;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use time::{Duration, OffsetDateTime, PrimitiveDateTime};
use tracing::instrument;

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// How long files are kept, and which files are kept regardless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    keep_days: NonZeroU32,
    exempt: Vec<PathBuf>,
}
impl RetentionPolicy {
    pub fn new(keep_days: NonZeroU32) -> Self {
        Self {
            keep_days,
            exempt: Vec::new(),
        }
    }

    /// Never delete the file at `path` (relative to the storage root).
    pub fn exempt(mut self, path: impl Into<PathBuf>) -> Self {
        self.exempt.push(path.into());
        self
    }

    pub fn keep_days(&self) -> NonZeroU32 {
        self.keep_days
    }

    pub fn is_exempt(&self, path: &Path) -> bool {
        self.exempt.iter().any(|exempt| exempt == path)
    }

    /// Files last modified strictly before this instant are expired.
    ///
    /// Windows reaching past the earliest representable date saturate, so
    /// nothing expires.
    pub fn cutoff(&self, now: OffsetDateTime) -> OffsetDateTime {
        now.checked_sub(Duration::days(i64::from(self.keep_days.get())))
            .unwrap_or(PrimitiveDateTime::MIN.assume_utc())
    }

    pub fn is_expired(&self, file: &FileInfo, cutoff: OffsetDateTime) -> bool {
        file.modified < cutoff && !self.is_exempt(&file.path)
    }
}

/// Totals for one sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Files the walk produced.
    pub scanned: u64,
    /// Expired files deleted.
    pub removed: u64,
    /// Sum of the sizes of deleted files.
    pub bytes_freed: u64,
    /// Entries that disappeared between being listed and being deleted.
    pub vanished: u64,
    /// Walk or delete errors; the sweep carried on past each one.
    pub failed: u64,
}
impl SweepReport {
    pub fn megabytes_freed(&self) -> f64 {
        self.bytes_freed as f64 / BYTES_PER_MEGABYTE
    }
}

/// Deletes every file whose modification time is older than the policy's
/// window, measured back from `now`.
///
/// Never fails: errors for individual files are logged and counted in the
/// report, and the walk continues with the next file.
#[instrument(skip_all, fields(backend = backend.name(), keep_days = policy.keep_days().get()))]
pub async fn sweep(backend: &BackendHandle, policy: &RetentionPolicy, now: OffsetDateTime) -> SweepReport {
    let cutoff = policy.cutoff(now);
    let mut report = SweepReport::default();
    let mut files = backend.list_stream();
    while let Some(entry) = files.next().await {
        let file = match entry {
            Ok(file) => file,
            Err(e) if e.is_not_found() => {
                report.vanished += 1;
                continue;
            },
            Err(e) => {
                tracing::warn!(error = ?e, "Skipping unreadable entry during retention sweep");
                report.failed += 1;
                continue;
            },
        };
        report.scanned += 1;
        if !policy.is_expired(&file, cutoff) {
            continue;
        }
        match backend.delete(&file.path).await {
            Ok(()) => {
                tracing::debug!(path = %file.path.display(), size = file.size, "Deleted expired file");
                report.removed += 1;
                report.bytes_freed += file.size;
            },
            Err(e) if e.is_not_found() => {
                tracing::debug!(path = %file.path.display(), "Expired file vanished before it could be deleted");
                report.vanished += 1;
            },
            Err(e) => {
                tracing::warn!(path = %file.path.display(), error = ?e, "Could not delete expired file");
                report.failed += 1;
            },
        }
    }
    if report.removed > 0 {
        tracing::info!(
            removed = report.removed,
            freed_mb = %format!("{:.2}", report.megabytes_freed()),
            "Removed expired files"
        );
    }
    report
}
