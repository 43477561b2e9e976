//! In-memory stores.
//!
//! Used by tests and by callers that keep their work queue in process. Rows
//! are numbered the way a sheet with a header row would number them: the
//! first data row is row 2.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{IndexStore, SheetRow, SheetTarget, Workbook, WorkbookConnector, WorksheetStore};
use crate::errors::{Error, Result};
use crate::index::{IndexRow, ResolutionRecord};

/// First data row below the header.
const FIRST_DATA_ROW: u32 = 2;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Work sheet of `(isbn, date)` cells.
#[derive(Debug, Default)]
pub struct MemoryWorksheet {
    cells: Mutex<Vec<(String, String)>>,
    writes: Mutex<Vec<(u32, String)>>,
    fail_writes: AtomicBool,
}

impl MemoryWorksheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows<I, S, T>(rows: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            cells: Mutex::new(
                rows.into_iter()
                    .map(|(isbn, value)| (isbn.into(), value.into()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Current date cell of a sheet row.
    pub fn value_at(&self, row: u32) -> Option<String> {
        let index = row.checked_sub(FIRST_DATA_ROW)? as usize;
        lock(&self.cells).get(index).map(|(_, value)| value.clone())
    }

    /// Every `set_value` call, in order.
    pub fn writes(&self) -> Vec<(u32, String)> {
        lock(&self.writes).clone()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl WorksheetStore for MemoryWorksheet {
    async fn list_rows(&self) -> Result<Vec<SheetRow>> {
        Ok(lock(&self.cells)
            .iter()
            .enumerate()
            .map(|(i, (isbn, value))| SheetRow {
                row: FIRST_DATA_ROW + i as u32,
                isbn_cell: isbn.clone(),
                value_cell: value.clone(),
            })
            .collect())
    }

    async fn set_value(&self, row: u32, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Storage(format!("write to row {} rejected", row)));
        }

        let index = row
            .checked_sub(FIRST_DATA_ROW)
            .map(|i| i as usize)
            .ok_or_else(|| Error::Storage(format!("row {} is not a data row", row)))?;

        let mut cells = lock(&self.cells);
        let cell = cells
            .get_mut(index)
            .ok_or_else(|| Error::Storage(format!("row {} does not exist", row)))?;
        cell.1 = value.to_string();
        drop(cells);

        lock(&self.writes).push((row, value.to_string()));
        Ok(())
    }
}

/// Append-only index kept in a vector.
#[derive(Debug, Default)]
pub struct MemoryIndexStore {
    rows: Mutex<Vec<IndexRow>>,
    fail_reads: AtomicBool,
    fail_appends: AtomicBool,
}

impl MemoryIndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<IndexRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    /// Snapshot of every stored row.
    pub fn rows(&self) -> Vec<IndexRow> {
        lock(&self.rows).clone()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl IndexStore for MemoryIndexStore {
    async fn append_record(&self, record: &ResolutionRecord) -> Result<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(Error::Storage("index append rejected".to_string()));
        }
        lock(&self.rows).push(record.to_row());
        Ok(())
    }

    async fn list_records(&self) -> Result<Vec<IndexRow>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Storage("index read rejected".to_string()));
        }
        Ok(self.rows())
    }
}

/// Connector over a fixed set of in-memory workbooks keyed by
/// `(spreadsheet_id, sheet_name)`.
#[derive(Default)]
pub struct MemoryConnector {
    workbooks: Mutex<HashMap<(String, String), (Arc<MemoryWorksheet>, Arc<MemoryIndexStore>)>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        worksheet: Arc<MemoryWorksheet>,
        index: Arc<MemoryIndexStore>,
    ) {
        lock(&self.workbooks).insert(
            (spreadsheet_id.to_string(), sheet_name.to_string()),
            (worksheet, index),
        );
    }
}

#[async_trait]
impl WorkbookConnector for MemoryConnector {
    async fn connect(&self, target: &SheetTarget) -> Result<Workbook> {
        let workbooks = lock(&self.workbooks);
        let (worksheet, index) = workbooks
            .get(&(target.spreadsheet_id.clone(), target.sheet_name.clone()))
            .ok_or_else(|| Error::SheetNotFound(target.sheet_name.clone()))?;

        Ok(Workbook {
            worksheet: worksheet.clone(),
            index: index.clone(),
        })
    }
}
