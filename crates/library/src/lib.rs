//! Ingestion pipeline for camera uploads.
//!
//! The [`handler`] is the single entry point for finished uploads: it filters
//! out non-video files and passes the rest to the [`organize`] step, which
//! files them under `organized/YYYY/MM/DD/` and records them in the index.
//! The [`monitor`] runs in the background, reporting [`stats`] and applying
//! the [`retention`] policy on a fixed interval.

pub mod error;
pub mod handler;
pub mod monitor;
pub mod organize;
pub mod retention;
pub mod stats;
#[cfg(test)]
mod testing;

pub use crate::handler::{Outcome, on_transfer_complete};
pub use crate::organize::{Action, organize_file};
pub use crate::retention::{RetentionPolicy, SweepReport, sweep};
pub use crate::stats::TreeStats;
use camdrop_index::IndexStore;
use camdrop_storage::BackendHandle;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Everything the pipeline needs, built once at startup and shared by the
/// upload handler and the monitor loop.
#[derive(Clone)]
pub struct Context {
    pub backend: BackendHandle,
    pub index: Arc<IndexStore>,
    pub retention: RetentionPolicy,
}
impl Context {
    /// When the index file lives inside the storage tree it is exempted from
    /// retention, otherwise the sweeper would delete it once it stops being
    /// written to for `keep_days`.
    pub fn new(backend: BackendHandle, index: IndexStore, keep_days: NonZeroU32) -> Self {
        let mut retention = RetentionPolicy::new(keep_days);
        if let Ok(relative) = index.path().strip_prefix(backend.root()) {
            retention = retention.exempt(relative);
        }
        Self {
            backend,
            index: Arc::new(index),
            retention,
        }
    }
}
