//! Bookdate Lookup Crate
//!
//! Catalogue lookups for book publication dates.
//!
//! # Overview
//!
//! - [`Isbn`] - normalized identifier used as the key everywhere downstream
//! - [`DateProvider`] - one external catalogue; failures fold into "not found"
//! - [`GoogleBooksProvider`] - primary source
//! - [`OpenLibraryProvider`] - secondary source
//! - [`RateLimiter`] - randomized pauses before queries and between batches
//!
//! # Architecture
//!
//! ```text
//! raw ISBN cell ──> Isbn::parse ──> RateLimiter::before_request
//!                                          │
//!                                          v
//!                                  DateProvider::lookup
//!                                          │
//!                          Some(ProviderHit) | None
//! ```

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

pub use errors::LookupError;
pub use models::{Isbn, ProviderHit, SourceKind};
pub use provider::google_books::{GoogleBooksProvider, VolumeLookup, VolumeQuery};
pub use provider::open_library::OpenLibraryProvider;
pub use provider::{DateProvider, UserAgentPool};
pub use registry::{DelayRange, RateLimitConfig, RateLimiter};
