//! Google Sheets storage implementation for Bookdate.
//!
//! Implements the storage traits defined in `bookdate-core` on top of the
//! Sheets v4 REST API:
//! - Service-account authentication (JWT bearer grant)
//! - The work sheet of ISBNs and publication dates
//! - The append-only `indice` sheet backing the resolution index
//!
//! ```text
//!        bookdate-core (traits)
//!                │
//!                ▼
//!   storage-sheets (this crate)
//!                │
//!                ▼
//!      Sheets REST API (v4)
//! ```

pub mod a1;
pub mod auth;
pub mod client;
pub mod connector;
pub mod errors;
pub mod index;
pub mod worksheet;

#[cfg(test)]
pub(crate) mod fake_api;

pub use auth::{ServiceAccountAuth, ServiceAccountCredentials};
pub use client::SheetsClient;
pub use connector::SheetsConnector;
pub use errors::SheetsError;
pub use index::SheetsIndexStore;
pub use worksheet::SheetsWorksheet;
