//! Open Library catalogue source.
//!
//! Secondary source for publication dates, queried through the books API
//! with `ISBN:<id>` bibkeys:
//! https://openlibrary.org/dev/docs/api/books

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::errors::LookupError;
use crate::models::{Isbn, SourceKind};
use crate::provider::{build_client, get_text, non_empty, DateProvider, UserAgentPool};

pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org";
const SOURCE_NAME: &str = "Open Library";

/// Entry under each bibkey in the `jscmd=data` response.
#[derive(Debug, Deserialize)]
struct BookData {
    #[serde(default)]
    publish_date: Option<String>,
}

/// Open Library books API client.
pub struct OpenLibraryProvider {
    client: Client,
    base_url: String,
    user_agents: UserAgentPool,
}

impl OpenLibraryProvider {
    pub fn new(user_agents: UserAgentPool) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, user_agents)
    }

    pub fn with_base_url(base_url: impl Into<String>, user_agents: UserAgentPool) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agents,
        }
    }
}

/// Pull the date for `bibkey` out of a books API body.
fn extract_publish_date(body: &str, bibkey: &str) -> Result<Option<String>, LookupError> {
    let mut books: HashMap<String, BookData> =
        serde_json::from_str(body).map_err(|e| LookupError::Parse {
            source_name: SOURCE_NAME.to_string(),
            message: e.to_string(),
        })?;

    Ok(non_empty(
        books.remove(bibkey).and_then(|book| book.publish_date),
    ))
}

#[async_trait]
impl DateProvider for OpenLibraryProvider {
    fn id(&self) -> SourceKind {
        SourceKind::OpenLibrary
    }

    async fn fetch_published_date(&self, isbn: &Isbn) -> Result<Option<String>, LookupError> {
        let bibkey = isbn.bibkey();
        let params = [
            ("bibkeys".to_string(), bibkey.clone()),
            ("format".to_string(), "json".to_string()),
            ("jscmd".to_string(), "data".to_string()),
        ];
        let url = format!("{}/api/books", self.base_url);

        let body = get_text(
            &self.client,
            SOURCE_NAME,
            &url,
            &params,
            self.user_agents.pick(),
        )
        .await?;

        extract_publish_date(&body, &bibkey)
    }
}
