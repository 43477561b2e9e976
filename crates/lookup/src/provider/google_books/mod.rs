//! Google Books catalogue source.
//!
//! Primary source for publication dates. Also backs the raw volume-search
//! proxy and the single-ISBN lookup endpoint.
//!
//! API documentation: https://developers.google.com/books/docs/v1/using

mod models;

pub use models::{VolumeLookup, VolumeQuery, DEFAULT_MAX_RESULTS};

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use self::models::VolumesResponse;
use crate::errors::LookupError;
use crate::models::{Isbn, SourceKind};
use crate::provider::{build_client, get_text, non_empty, DateProvider, UserAgentPool};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/books/v1";
const SOURCE_NAME: &str = "Google Books";

/// Google Books volumes API client.
pub struct GoogleBooksProvider {
    client: Client,
    base_url: String,
    user_agents: UserAgentPool,
}

impl GoogleBooksProvider {
    pub fn new(user_agents: UserAgentPool) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, user_agents)
    }

    /// Point the provider at another deployment (used by tests).
    pub fn with_base_url(base_url: impl Into<String>, user_agents: UserAgentPool) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agents,
        }
    }

    fn volumes_url(&self) -> String {
        format!("{}/volumes", self.base_url)
    }

    async fn fetch_volumes(&self, params: &[(String, String)]) -> Result<String, LookupError> {
        get_text(
            &self.client,
            SOURCE_NAME,
            &self.volumes_url(),
            params,
            self.user_agents.pick(),
        )
        .await
    }

    fn isbn_params(isbn: &Isbn) -> Vec<(String, String)> {
        vec![("q".to_string(), format!("isbn:{}", isbn))]
    }

    /// Raw volume search; the body is returned untouched.
    pub async fn search_volumes(
        &self,
        query: &VolumeQuery,
    ) -> Result<serde_json::Value, LookupError> {
        let body = self.fetch_volumes(&query.to_params()).await?;
        serde_json::from_str(&body).map_err(|e| LookupError::Parse {
            source_name: SOURCE_NAME.to_string(),
            message: e.to_string(),
        })
    }

    /// Single-ISBN lookup returning the date together with the raw payload.
    pub async fn lookup_volume(&self, isbn: &Isbn) -> Result<VolumeLookup, LookupError> {
        let body = self.fetch_volumes(&Self::isbn_params(isbn)).await?;
        let raw_data: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| LookupError::Parse {
                source_name: SOURCE_NAME.to_string(),
                message: e.to_string(),
            })?;

        let published_date = serde_json::from_value::<VolumesResponse>(raw_data.clone())
            .ok()
            .and_then(VolumesResponse::first_published_date);
        let published_date = non_empty(published_date);

        Ok(VolumeLookup {
            isbn: isbn.to_string(),
            source: published_date.as_ref().map(|_| SOURCE_NAME.to_string()),
            published_date,
            raw_data,
        })
    }
}

#[async_trait]
impl DateProvider for GoogleBooksProvider {
    fn id(&self) -> SourceKind {
        SourceKind::GoogleBooks
    }

    async fn fetch_published_date(&self, isbn: &Isbn) -> Result<Option<String>, LookupError> {
        let body = self.fetch_volumes(&Self::isbn_params(isbn)).await?;
        let response: VolumesResponse =
            serde_json::from_str(&body).map_err(|e| LookupError::Parse {
                source_name: SOURCE_NAME.to_string(),
                message: e.to_string(),
            })?;

        debug!(
            "Google Books returned {} items for {}",
            response.total_items, isbn
        );
        Ok(non_empty(response.first_published_date()))
    }
}
