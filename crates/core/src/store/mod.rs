//! Storage traits for the work queue and the persisted index.
//!
//! The resolver never talks to a spreadsheet API directly. It sees:
//!
//! - [`WorksheetStore`] - the sheet of ISBNs to resolve and the cells to fill
//! - [`IndexStore`] - the append-only log of past resolutions
//! - [`WorkbookConnector`] - opens both for a given [`SheetTarget`]
//!
//! [`memory`] provides in-process implementations.

pub mod memory;

pub use memory::{MemoryConnector, MemoryIndexStore, MemoryWorksheet};

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::Result;
use crate::index::{IndexRow, ResolutionRecord};

/// Default title of the worksheet holding the ISBNs.
pub const DEFAULT_SHEET_NAME: &str = "Kobo";

/// Default title of the worksheet holding the persisted index.
pub const DEFAULT_INDEX_SHEET_NAME: &str = "indice";

/// One data row of the work sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetRow {
    /// 1-based sheet row number; the header is row 1.
    pub row: u32,
    pub isbn_cell: String,
    pub value_cell: String,
}

/// Source of pending items and writer of resolved values.
#[async_trait]
pub trait WorksheetStore: Send + Sync {
    /// All data rows, in sheet order.
    async fn list_rows(&self) -> Result<Vec<SheetRow>>;

    /// Write `value` into the date cell of `row`.
    ///
    /// Must be visible to a subsequent `list_rows` before returning.
    async fn set_value(&self, row: u32, value: &str) -> Result<()>;
}

/// Durable, append-only log of resolutions.
#[async_trait]
pub trait IndexStore: Send + Sync {
    async fn append_record(&self, record: &ResolutionRecord) -> Result<()>;

    async fn list_records(&self) -> Result<Vec<IndexRow>>;
}

/// Which spreadsheet and worksheets a run works against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetTarget {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub index_sheet_name: String,
}

impl SheetTarget {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            index_sheet_name: DEFAULT_INDEX_SHEET_NAME.to_string(),
        }
    }

    pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = sheet_name.into();
        self
    }

    pub fn with_index_sheet_name(mut self, index_sheet_name: impl Into<String>) -> Self {
        self.index_sheet_name = index_sheet_name.into();
        self
    }
}

/// The pair of stores a run needs.
#[derive(Clone)]
pub struct Workbook {
    pub worksheet: Arc<dyn WorksheetStore>,
    pub index: Arc<dyn IndexStore>,
}

/// Opens the stores for a target, creating the index sheet if needed.
#[async_trait]
pub trait WorkbookConnector: Send + Sync {
    async fn connect(&self, target: &SheetTarget) -> Result<Workbook>;
}
