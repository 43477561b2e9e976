//! Catalogue source abstractions and implementations.
//!
//! This module contains:
//! - The `DateProvider` trait that every source implements
//! - The user-agent pool sources draw from per request
//! - Concrete sources (Google Books, Open Library)

mod traits;
mod user_agents;

pub mod google_books;
pub mod open_library;

#[cfg(test)]
pub(crate) mod fixture_server;

pub use traits::DateProvider;
pub use user_agents::UserAgentPool;

use std::time::Duration;

/// Timeout applied to every catalogue request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Language preference sent with catalogue requests.
pub(crate) const ACCEPT_LANGUAGE: &str = "es-ES,es;q=0.9,en;q=0.8";

pub(crate) fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Treat blank dates the same as missing ones. Other values pass through
/// untouched.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Issue one GET and return the body of a successful response.
pub(crate) async fn get_text(
    client: &reqwest::Client,
    source_name: &str,
    url: &str,
    params: &[(String, String)],
    user_agent: &str,
) -> Result<String, crate::errors::LookupError> {
    use crate::errors::LookupError;
    use reqwest::header;

    tracing::debug!("{} request: {} with {} params", source_name, url, params.len());

    let response = client
        .get(url)
        .query(params)
        .header(header::USER_AGENT, user_agent)
        .header(header::ACCEPT, "application/json")
        .header(header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
        .send()
        .await
        .map_err(|e| LookupError::from_reqwest(source_name, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LookupError::UnexpectedStatus {
            source_name: source_name.to_string(),
            status: status.as_u16(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| LookupError::from_reqwest(source_name, e))
}
