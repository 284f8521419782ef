//! Append-only index of accepted videos.
//!
//! Every video the organizer files away gets one line in a flat text file:
//! capture time, location and size. The index is a log, not a mirror of the
//! storage tree: records are never updated or removed, so entries for files
//! the retention sweeper has since deleted stay put, and organizing the same
//! file name twice produces two records.
//!
//! # Format
//! One record per line, UTF-8, comma separated:
//!
//! ```text
//! 2025-06-24T00:00:00,/srv/dahua_videos/organized/2025/06/24/Casa_ch1_main_20250624000000_20250624010000.dav,1048576
//! ```
//!
//! When the index is missing or empty, [`catalog`] rebuilds an equivalent
//! listing from the storage tree itself.

mod catalog;
pub mod error;
mod record;
mod store;

pub use crate::catalog::catalog;
pub use crate::record::VideoRecord;
pub use crate::store::{DEFAULT_INDEX_FILE, IndexStore};
