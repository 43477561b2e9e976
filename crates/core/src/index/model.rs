//! Persisted index records.

use bookdate_lookup::{Isbn, SourceKind};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// One successful resolution, written once and never modified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionRecord {
    isbn: Isbn,
    value: String,
    source: SourceKind,
    resolved_at: DateTime<Utc>,
}

impl ResolutionRecord {
    /// Stamp a new record with the current time.
    pub fn new(isbn: Isbn, value: impl Into<String>, source: SourceKind) -> Self {
        Self::at(isbn, value, source, Utc::now())
    }

    pub fn at(
        isbn: Isbn,
        value: impl Into<String>,
        source: SourceKind,
        resolved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            isbn,
            value: value.into(),
            source,
            resolved_at,
        }
    }

    pub fn isbn(&self) -> &Isbn {
        &self.isbn
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }

    /// Row shape used by the persisted index.
    pub fn to_row(&self) -> IndexRow {
        IndexRow {
            isbn: Some(self.isbn.to_string()),
            value: Some(self.value.clone()),
            source: Some(self.source.label().to_string()),
            searched_at: Some(self.resolved_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

/// A persisted index row as read back from storage, before validation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexRow {
    pub isbn: Option<String>,
    pub value: Option<String>,
    pub source: Option<String>,
    pub searched_at: Option<String>,
}

impl IndexRow {
    pub fn new(isbn: &str, value: &str) -> Self {
        Self {
            isbn: Some(isbn.to_string()),
            value: Some(value.to_string()),
            ..Self::default()
        }
    }
}
