//! Library Error Types
//!
//! Each module with fallible entry points raises its own `ErrorKind`
//! internally; the public functions wrap those into this crate-level kind so
//! callers only need to match on one enum.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// An upload could not be moved into the dated tree.
    #[display("could not organize upload")]
    Organize,
    /// The storage tree could not be walked at all.
    #[display("storage tree is unreadable")]
    Stats,
}
