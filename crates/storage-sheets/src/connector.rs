//! Opens the work sheet and the index sheet of a spreadsheet.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bookdate_core::errors::{Error, Result};
use bookdate_core::store::{SheetTarget, Workbook, WorkbookConnector};
use log::info;

use crate::auth::{ServiceAccountAuth, ServiceAccountCredentials};
use crate::client::{SheetsClient, DEFAULT_BASE_URL};
use crate::index::SheetsIndexStore;
use crate::worksheet::SheetsWorksheet;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`WorkbookConnector`] backed by the Sheets API.
///
/// One connector (and its cached access token) is shared by every run; each
/// `connect` call checks the target spreadsheet afresh.
pub struct SheetsConnector {
    client: reqwest::Client,
    auth: Arc<ServiceAccountAuth>,
    base_url: String,
}

impl SheetsConnector {
    pub fn new(credentials: &ServiceAccountCredentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;
        let auth = ServiceAccountAuth::new(credentials, client.clone())?;

        Ok(Self::with_auth(client, Arc::new(auth)))
    }

    pub fn with_auth(client: reqwest::Client, auth: Arc<ServiceAccountAuth>) -> Self {
        Self {
            client,
            auth,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl WorkbookConnector for SheetsConnector {
    async fn connect(&self, target: &SheetTarget) -> Result<Workbook> {
        let client = SheetsClient::new(
            self.client.clone(),
            self.auth.clone(),
            &self.base_url,
            target.spreadsheet_id.clone(),
        );

        let titles = client.sheet_titles().await?;
        if !titles.iter().any(|t| *t == target.sheet_name) {
            return Err(Error::SheetNotFound(target.sheet_name.clone()));
        }

        let index = SheetsIndexStore::new(client.clone(), target.index_sheet_name.clone());
        if !titles.iter().any(|t| *t == target.index_sheet_name) {
            info!("Creating index sheet '{}'", target.index_sheet_name);
            client.add_sheet(&target.index_sheet_name).await?;
            index.write_header().await?;
        }

        Ok(Workbook {
            worksheet: Arc::new(SheetsWorksheet::new(client, target.sheet_name.clone())),
            index: Arc::new(index),
        })
    }
}
