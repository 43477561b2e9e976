//! Bookdate Core - resolution index, storage traits and the batch resolver.
//!
//! This crate holds the resolution logic for Bookdate. It is storage-agnostic
//! and defines the traits that the `storage-sheets` crate implements.

pub mod errors;
pub mod index;
pub mod resolver;
pub mod store;

pub use errors::{Error, Result};
pub use index::{IndexEntry, IndexRow, ResolutionIndex, ResolutionRecord};
pub use resolver::{
    apply_limit, pending_items, DateResolver, Outcome, PendingItem, RunStats, SourceChain,
    SourceSlot, SOURCE_ORDER,
};
pub use store::{
    IndexStore, MemoryConnector, MemoryIndexStore, MemoryWorksheet, SheetRow, SheetTarget,
    Workbook, WorkbookConnector, WorksheetStore, DEFAULT_INDEX_SHEET_NAME, DEFAULT_SHEET_NAME,
};
