//! Google Books API response and request structures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::LookupError;

/// Default page size for volume searches.
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Response from the /volumes endpoint. Only the fields we read are mapped.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VolumesResponse {
    #[serde(default)]
    pub total_items: i64,
    #[serde(default)]
    pub items: Option<Vec<Volume>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Volume {
    #[serde(default)]
    pub volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VolumeInfo {
    #[serde(default)]
    pub published_date: Option<String>,
}

impl VolumesResponse {
    /// Publication date of the first volume, when the search matched anything.
    pub fn first_published_date(self) -> Option<String> {
        if self.total_items <= 0 {
            return None;
        }
        self.items?
            .into_iter()
            .next()?
            .volume_info?
            .published_date
    }
}

/// Parameters for a raw volume search.
///
/// `q` and `max_results` are the recognized fields. Anything else is kept in
/// `passthrough` and forwarded verbatim. When building the request the
/// passthrough entries are applied first and the recognized fields last, so a
/// passthrough `q` or `maxResults` never overrides them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VolumeQuery {
    pub q: String,
    pub max_results: u32,
    pub passthrough: BTreeMap<String, String>,
}

impl VolumeQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            max_results: DEFAULT_MAX_RESULTS,
            passthrough: BTreeMap::new(),
        }
    }

    /// Split incoming query parameters into recognized and passthrough fields.
    pub fn from_params(mut params: BTreeMap<String, String>) -> Result<Self, LookupError> {
        let q = params
            .remove("q")
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .ok_or_else(|| LookupError::InvalidQuery("the \"q\" parameter is required".into()))?;

        let max_results = match params.remove("maxResults") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|_| {
                LookupError::InvalidQuery(format!("maxResults must be a number, got '{}'", raw))
            })?,
            None => DEFAULT_MAX_RESULTS,
        };

        Ok(Self {
            q,
            max_results,
            passthrough: params,
        })
    }

    /// Final request parameters after applying the merge policy.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut merged = self.passthrough.clone();
        merged.insert("q".to_string(), self.q.clone());
        merged.insert("maxResults".to_string(), self.max_results.to_string());
        merged.into_iter().collect()
    }
}

/// Result of a single-ISBN lookup, including the raw payload for debugging.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeLookup {
    pub isbn: String,
    pub published_date: Option<String>,
    pub source: Option<String>,
    pub raw_data: serde_json::Value,
}
