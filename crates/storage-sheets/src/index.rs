//! The `indice` sheet backing the resolution index.
//!
//! Layout: a header row `ISBN | Fecha | Fuente | Fecha_Busqueda`, then one
//! row per resolution, appended in order. Rows are never updated.

use async_trait::async_trait;
use bookdate_core::errors::Result;
use bookdate_core::index::{IndexRow, ResolutionRecord};
use bookdate_core::store::IndexStore;

use crate::a1;
use crate::client::SheetsClient;

pub const HEADER: [&str; 4] = ["ISBN", "Fecha", "Fuente", "Fecha_Busqueda"];

/// Position of each field, found by header name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    isbn: usize,
    value: usize,
    source: usize,
    searched_at: usize,
}

impl Columns {
    /// Match header cells case-insensitively; an unknown header keeps the
    /// field's default position.
    fn from_header(header: &[String]) -> Self {
        let find = |name: &str, fallback: usize| {
            header
                .iter()
                .position(|cell| cell.trim().eq_ignore_ascii_case(name))
                .unwrap_or(fallback)
        };
        Self {
            isbn: find(HEADER[0], 0),
            value: find(HEADER[1], 1),
            source: find(HEADER[2], 2),
            searched_at: find(HEADER[3], 3),
        }
    }
}

fn cell(row: &[String], column: usize) -> Option<String> {
    row.get(column)
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// Map the full sheet contents, header included, to index rows.
fn to_index_rows(values: Vec<Vec<String>>) -> Vec<IndexRow> {
    let mut rows = values.into_iter();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let columns = Columns::from_header(&header);

    rows.map(|row| IndexRow {
        isbn: cell(&row, columns.isbn),
        value: cell(&row, columns.value),
        source: cell(&row, columns.source),
        searched_at: cell(&row, columns.searched_at),
    })
    .collect()
}

pub struct SheetsIndexStore {
    client: SheetsClient,
    title: String,
}

impl SheetsIndexStore {
    pub fn new(client: SheetsClient, title: impl Into<String>) -> Self {
        Self {
            client,
            title: title.into(),
        }
    }

    fn table_range(&self) -> String {
        a1::range(&self.title, "A:D")
    }

    /// Write the header row into a freshly created sheet.
    pub async fn write_header(&self) -> Result<()> {
        let header = HEADER.iter().map(|h| h.to_string()).collect();
        self.client
            .update_values(&a1::range(&self.title, "A1:D1"), vec![header])
            .await?;
        Ok(())
    }
}

#[async_trait]
impl IndexStore for SheetsIndexStore {
    async fn append_record(&self, record: &ResolutionRecord) -> Result<()> {
        let row = record.to_row();
        let cells = vec![
            row.isbn.unwrap_or_default(),
            row.value.unwrap_or_default(),
            row.source.unwrap_or_default(),
            row.searched_at.unwrap_or_default(),
        ];
        self.client
            .append_values(&self.table_range(), vec![cells])
            .await?;
        Ok(())
    }

    async fn list_records(&self) -> Result<Vec<IndexRow>> {
        let values = self.client.get_values(&self.table_range()).await?;
        Ok(to_index_rows(values))
    }
}
