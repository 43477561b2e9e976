//! Resolution index: the cache of already-resolved identifiers.
//!
//! The index is hydrated once from the persisted store when a run starts and
//! appended to (in memory and in storage) on every new resolution. Entries are
//! never removed.

mod model;

pub use model::{IndexRow, ResolutionRecord};

use std::collections::HashMap;

use bookdate_lookup::{Isbn, SourceKind};
use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::store::IndexStore;

/// Cached value plus whatever provenance the stored row carried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    pub value: String,
    pub source: Option<SourceKind>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// In-memory identifier -> publication date mapping.
#[derive(Debug, Default)]
pub struct ResolutionIndex {
    entries: HashMap<Isbn, IndexEntry>,
}

impl ResolutionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrate from persisted storage.
    ///
    /// A failed read is logged and yields an empty index; the run carries on
    /// and simply re-queries the sources.
    pub async fn load(store: &dyn IndexStore) -> Self {
        match store.list_records().await {
            Ok(rows) => {
                let index = Self::from_rows(rows);
                info!("Index loaded: {} ISBNs stored", index.len());
                index
            }
            Err(e) => {
                warn!("Failed to load index, starting empty: {}", e);
                Self::new()
            }
        }
    }

    /// Build from raw rows, skipping rows without an identifier or a value.
    /// A later row for the same identifier replaces an earlier one.
    pub fn from_rows(rows: impl IntoIterator<Item = IndexRow>) -> Self {
        let mut entries = HashMap::new();

        for row in rows {
            let Some(isbn) = row.isbn.as_deref().and_then(|raw| Isbn::parse(raw).ok()) else {
                continue;
            };
            let Some(value) = row
                .value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
            else {
                continue;
            };

            let source = row.source.as_deref().and_then(|s| s.parse().ok());
            let resolved_at = row
                .searched_at
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
                .map(|dt| dt.with_timezone(&Utc));

            entries.insert(
                isbn,
                IndexEntry {
                    value: value.to_string(),
                    source,
                    resolved_at,
                },
            );
        }

        Self { entries }
    }

    pub fn lookup(&self, isbn: &Isbn) -> Option<&str> {
        self.entries.get(isbn).map(|entry| entry.value.as_str())
    }

    pub fn entry(&self, isbn: &Isbn) -> Option<&IndexEntry> {
        self.entries.get(isbn)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Persist a new resolution and add it to the in-memory map.
    ///
    /// The in-memory entry is added even when the durable write fails, so the
    /// rest of the run treats the identifier as resolved. Returns whether the
    /// write reached storage.
    pub async fn record(
        &mut self,
        store: &dyn IndexStore,
        isbn: Isbn,
        value: String,
        source: SourceKind,
    ) -> bool {
        let record = ResolutionRecord::new(isbn, value, source);

        let persisted = match store.append_record(&record).await {
            Ok(()) => {
                info!("Saved {} to index (source: {})", record.isbn(), source);
                true
            }
            Err(e) => {
                warn!("Failed to save {} to index: {}", record.isbn(), e);
                false
            }
        };

        self.entries.insert(
            record.isbn().clone(),
            IndexEntry {
                value: record.value().to_string(),
                source: Some(record.source()),
                resolved_at: Some(record.resolved_at()),
            },
        );

        persisted
    }
}
