//! Binary Error Types

use derive_more::{Display, Error};

/// A command error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for commands.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not set up logging")]
    Logging,
    #[display("could not open the storage root")]
    Storage,
    #[display("could not start the async runtime")]
    Runtime,
    #[display("could not listen for the shutdown signal")]
    Signal,
    #[display("storage monitor failed")]
    Monitor,
    #[display("could not read the catalog")]
    Catalog,
    #[display("{_0} upload(s) could not be processed")]
    Ingest(#[error(not(source))] usize),
}
