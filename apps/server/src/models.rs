use bookdate_core::resolver::RunStats;
use serde::{Deserialize, Serialize};

/// Query of `GET /process-books`. Values are validated by the handler so
/// malformed input gets the JSON error envelope.
#[derive(Debug, Default, Deserialize)]
pub struct ProcessQuery {
    pub spreadsheet_id: Option<String>,
    pub sheet_name: Option<String>,
    pub max_isbn: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub message: String,
    pub statistics: RunStats,
}

/// ISBN given as query parameter or JSON body.
#[derive(Debug, Default, Deserialize)]
pub struct LookupRequest {
    pub isbn: Option<String>,
}
