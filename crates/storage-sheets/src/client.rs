//! Thin client for the Sheets v4 REST API.

use std::sync::Arc;

use log::debug;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::ServiceAccountAuth;
use crate::errors::{Result, SheetsError};

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Render a cell the way it reads in the sheet.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Values and metadata calls against one spreadsheet.
#[derive(Clone)]
pub struct SheetsClient {
    client: reqwest::Client,
    auth: Arc<ServiceAccountAuth>,
    base_url: String,
    spreadsheet_id: String,
}

impl SheetsClient {
    pub fn new(
        client: reqwest::Client,
        auth: Arc<ServiceAccountAuth>,
        base_url: &str,
        spreadsheet_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            auth,
            base_url: base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    fn spreadsheet_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url,
            urlencoding::encode(&self.spreadsheet_id)
        )
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(),
            urlencoding::encode(range)
        )
    }

    /// Authorize, send and decode one request.
    async fn execute<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let token = self.auth.access_token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| body.chars().take(200).collect());
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| SheetsError::Decode(e.to_string()))
    }

    /// Titles of every sheet in the spreadsheet, in tab order.
    pub async fn sheet_titles(&self) -> Result<Vec<String>> {
        let request = self
            .client
            .get(self.spreadsheet_url())
            .query(&[("fields", "sheets.properties.title")]);
        let metadata: SpreadsheetMetadata = self.execute(request).await?;

        Ok(metadata
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.title)
            .collect())
    }

    pub async fn add_sheet(&self, title: &str) -> Result<()> {
        debug!("Adding sheet '{}' to {}", title, self.spreadsheet_id);

        let body = json!({
            "requests": [{ "addSheet": { "properties": { "title": title } } }]
        });
        let request = self
            .client
            .post(format!("{}:batchUpdate", self.spreadsheet_url()))
            .json(&body);
        let _: IgnoredAny = self.execute(request).await?;
        Ok(())
    }

    /// Cell text of `range`, row-major. Trailing empty cells and rows are
    /// omitted by the API.
    pub async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let request = self.client.get(self.values_url(range));
        let value_range: ValueRange = self.execute(request).await?;

        Ok(value_range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    /// Overwrite `range` with `values`, stored as typed.
    pub async fn update_values(&self, range: &str, values: Vec<Vec<String>>) -> Result<()> {
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": values,
        });
        let request = self
            .client
            .put(self.values_url(range))
            .query(&[("valueInputOption", "RAW")])
            .json(&body);
        let _: IgnoredAny = self.execute(request).await?;
        Ok(())
    }

    /// Insert `values` as new rows after the table found in `range`.
    pub async fn append_values(&self, range: &str, values: Vec<Vec<String>>) -> Result<()> {
        let body = json!({
            "majorDimension": "ROWS",
            "values": values,
        });
        let request = self
            .client
            .post(format!("{}:append", self.values_url(range)))
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&body);
        let _: IgnoredAny = self.execute(request).await?;
        Ok(())
    }
}
