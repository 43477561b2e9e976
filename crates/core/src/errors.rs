//! Core error types.
//!
//! Storage backends convert their own failures into [`Error::Storage`] so the
//! resolver stays independent of any particular spreadsheet API.

use bookdate_lookup::LookupError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A required setting (spreadsheet id, credentials, ...) was not provided.
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    /// The worksheet holding the pending items does not exist.
    #[error("Sheet \"{0}\" not found")]
    SheetNotFound(String),

    #[error("Storage operation failed: {0}")]
    Storage(String),

    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Configuration problems are the caller's fault; everything else is ours.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingConfig(_) | Self::SheetNotFound(_))
    }
}
