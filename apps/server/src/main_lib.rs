use std::sync::Arc;

use anyhow::Context;
use bookdate_core::{
    errors::Error as CoreError,
    resolver::{DateResolver, RunStats, SourceChain},
    store::{SheetTarget, WorkbookConnector},
};
use bookdate_lookup::{
    GoogleBooksProvider, OpenLibraryProvider, RateLimitConfig, RateLimiter, UserAgentPool,
};
use bookdate_storage_sheets::SheetsConnector;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    /// `None` when no service account is configured; runs then fail with a
    /// configuration error.
    pub connector: Option<Arc<dyn WorkbookConnector>>,
    pub sources: SourceChain,
    pub google_books: Arc<GoogleBooksProvider>,
    pub rate_limit: RateLimitConfig,
    pub default_spreadsheet_id: Option<String>,
    pub default_sheet_name: String,
    pub index_sheet_name: String,
}

impl AppState {
    /// Connect to the target and resolve its pending rows.
    ///
    /// Every call gets its own resolver, index and pacing counters.
    pub async fn process_books(
        &self,
        target: &SheetTarget,
        max_count: Option<usize>,
    ) -> Result<RunStats, CoreError> {
        let connector = self.connector.as_ref().ok_or_else(|| {
            CoreError::MissingConfig(
                "GOOGLE_SERVICE_ACCOUNT_EMAIL and GOOGLE_PRIVATE_KEY must be set".to_string(),
            )
        })?;

        let workbook = connector.connect(target).await?;
        let rate_limiter = Arc::new(RateLimiter::new(self.rate_limit.clone()));
        let mut resolver =
            DateResolver::initialize(workbook, self.sources.clone(), rate_limiter).await;

        resolver.run(max_count).await
    }
}

pub fn init_tracing() {
    let fmt_layer = fmt::layer().json().with_current_span(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let user_agents = UserAgentPool::new(config.user_agents.clone());
    let google_books = Arc::new(GoogleBooksProvider::new(user_agents.clone()));
    let open_library = Arc::new(OpenLibraryProvider::new(user_agents));

    let connector: Option<Arc<dyn WorkbookConnector>> = match &config.service_account {
        Some(credentials) => {
            let connector = SheetsConnector::new(credentials)
                .context("Invalid Google service account credentials")?;
            tracing::info!("Using service account {}", credentials.client_email());
            Some(Arc::new(connector))
        }
        None => {
            tracing::warn!("No Google service account configured; /process-books will fail");
            None
        }
    };

    Ok(Arc::new(AppState {
        connector,
        sources: SourceChain::new(google_books.clone(), open_library),
        google_books,
        rate_limit: config.rate_limit.clone(),
        default_spreadsheet_id: config.default_spreadsheet_id.clone(),
        default_sheet_name: config.default_sheet_name.clone(),
        index_sheet_name: config.index_sheet_name.clone(),
    }))
}
