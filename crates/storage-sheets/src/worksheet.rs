//! The work sheet: ISBNs in column A, publication dates in column B.

use async_trait::async_trait;
use bookdate_core::errors::Result;
use bookdate_core::store::{SheetRow, WorksheetStore};

use crate::a1;
use crate::client::SheetsClient;

/// First row below the header.
const FIRST_DATA_ROW: u32 = 2;
const VALUE_COLUMN: char = 'B';

pub struct SheetsWorksheet {
    client: SheetsClient,
    title: String,
}

impl SheetsWorksheet {
    pub fn new(client: SheetsClient, title: impl Into<String>) -> Self {
        Self {
            client,
            title: title.into(),
        }
    }
}

/// Number the returned rows from the first data row. Missing cells read as
/// empty.
fn to_sheet_rows(values: Vec<Vec<String>>) -> Vec<SheetRow> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let mut cells = row.into_iter();
            SheetRow {
                row: FIRST_DATA_ROW + i as u32,
                isbn_cell: cells.next().unwrap_or_default(),
                value_cell: cells.next().unwrap_or_default(),
            }
        })
        .collect()
}

#[async_trait]
impl WorksheetStore for SheetsWorksheet {
    async fn list_rows(&self) -> Result<Vec<SheetRow>> {
        let range = a1::range(&self.title, &format!("A{}:B", FIRST_DATA_ROW));
        let values = self.client.get_values(&range).await?;
        Ok(to_sheet_rows(values))
    }

    async fn set_value(&self, row: u32, value: &str) -> Result<()> {
        let range = a1::cell(&self.title, VALUE_COLUMN, row);
        self.client
            .update_values(&range, vec![vec![value.to_string()]])
            .await?;
        Ok(())
    }
}
