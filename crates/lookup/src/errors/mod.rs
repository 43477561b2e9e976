//! Error types for catalogue lookups.
//!
//! Every variant is recoverable from the resolver's point of view: a source
//! that fails is treated as "not found" and the next source is tried. The
//! variants exist so the failure can be logged with a useful reason.

use thiserror::Error;

/// Errors that can occur while querying a catalogue source.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The raw identifier was empty once separators were removed.
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// The request could not be sent or the connection failed.
    #[error("Transport error: {source_name} - {message}")]
    Transport {
        /// The source that was being queried
        source_name: String,
        /// Description of the failure
        message: String,
    },

    /// The request to the source timed out.
    #[error("Timeout: {source_name}")]
    Timeout {
        /// The source that timed out
        source_name: String,
    },

    /// A search query was missing a required field or had a bad value.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The source answered with a non-success HTTP status.
    #[error("Unexpected status from {source_name}: {status}")]
    UnexpectedStatus {
        /// The source that answered
        source_name: String,
        /// The HTTP status code
        status: u16,
    },

    /// The response body was not the JSON shape we expect.
    #[error("Failed to parse response from {source_name}: {message}")]
    Parse {
        /// The source whose body failed to parse
        source_name: String,
        /// The parser's message
        message: String,
    },
}

impl LookupError {
    /// Build a transport or timeout error from a reqwest failure.
    pub fn from_reqwest(source_name: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                source_name: source_name.to_string(),
            }
        } else {
            Self::Transport {
                source_name: source_name.to_string(),
                message: err.to_string(),
            }
        }
    }
}
