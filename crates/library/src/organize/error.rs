//! Error types for the [`organize`](super) module.

use derive_more::{Display, Error};

/// An organize error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for organize operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of an organize failure.
///
/// Index failures are deliberately absent: once the file has been moved, a
/// failed append is reported as [`Action::MovedUnindexed`](super::Action)
/// rather than as an error.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A storage backend operation (stat, rename) failed.
    #[display("storage operation failed")]
    Storage,
    /// The file name is not valid UTF-8 and cannot be inspected.
    #[display("file name is not valid UTF-8")]
    InvalidName,
}
