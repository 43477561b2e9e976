//! Sheets-specific error types.
//!
//! These errors stay inside the storage layer and are converted to
//! `bookdate_core::Error::Storage` before reaching the resolver.

use bookdate_core::errors::Error;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SheetsError>;

#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Sheets request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheets API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode Sheets response: {0}")]
    Decode(String),
}

impl From<SheetsError> for Error {
    fn from(err: SheetsError) -> Self {
        Error::Storage(err.to_string())
    }
}
