//! Access to the video storage tree.
//!
//! Everything the ingestion side touches on disk goes through a
//! [`StorageBackend`]: the organizer renames files into the dated tree, the
//! retention sweeper walks and deletes, the stats monitor only walks. Paths
//! handed to a backend are always relative to its [root](StorageBackend::root).

pub mod backend;
pub mod error;
pub mod file;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::file::FileInfo;
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
