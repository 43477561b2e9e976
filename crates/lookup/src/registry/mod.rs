//! Request pacing for the catalogue sources.
//!
//! The sources are queried strictly one at a time; this module decides how
//! long to wait between queries and between batches of items.

mod rate_limiter;

pub use rate_limiter::{DelayRange, RateLimitConfig, RateLimiter};
