//! Index Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An index error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("unable to read index: {}", _0.display())]
    Read(#[error(not(source))] PathBuf),
    #[display("unable to append to index: {}", _0.display())]
    Write(#[error(not(source))] PathBuf),
    /// The record cannot be represented as a single index line.
    #[display("record cannot be indexed: {}", _0.display())]
    InvalidRecord(#[error(not(source))] PathBuf),
    /// Walking the storage tree for a fallback catalog failed.
    #[display("storage error")]
    Storage,
}
