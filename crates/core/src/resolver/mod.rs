//! Resolution strategy engine.
//!
//! For each pending identifier the engine runs a fixed, short-circuiting
//! chain:
//!
//! ```text
//! ┌──────────────┐ hit   write cell, count cache
//! │ 1. Index     │──────────────────────────────────────────> done
//! └──────┬───────┘
//!        │ miss
//!        v
//! ┌──────────────┐ hit   write cell, record in index, count primary
//! │ 2. Primary   │──────────────────────────────────────────> done
//! └──────┬───────┘
//!        │ not found
//!        v
//! ┌──────────────┐ hit   write cell, record in index, count secondary
//! │ 3. Secondary │──────────────────────────────────────────> done
//! └──────┬───────┘
//!        │ not found
//!        v
//!    count not found
//! ```
//!
//! The source order is the [`SOURCE_ORDER`] constant. Items are processed one
//! at a time; a cool-down is applied between batches.

mod engine;
mod pending;
mod stats;


pub use engine::{DateResolver, Outcome, SourceChain, SourceSlot, SOURCE_ORDER};
pub use pending::{apply_limit, pending_items, PendingItem};
pub use stats::RunStats;
