//! Per-identifier state machine and batch driver.

use std::sync::Arc;

use bookdate_lookup::{DateProvider, Isbn, ProviderHit, RateLimiter};
use log::{info, warn};

use super::pending::{apply_limit, pending_items, PendingItem};
use super::stats::RunStats;
use crate::errors::Result;
use crate::index::ResolutionIndex;
use crate::store::{IndexStore, Workbook, WorksheetStore};

/// Position of a provider in the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceSlot {
    Primary,
    Secondary,
}

/// Order in which sources are queried after an index miss.
pub const SOURCE_ORDER: [SourceSlot; 2] = [SourceSlot::Primary, SourceSlot::Secondary];

/// The two catalogue sources of a run.
#[derive(Clone)]
pub struct SourceChain {
    primary: Arc<dyn DateProvider>,
    secondary: Arc<dyn DateProvider>,
}

impl SourceChain {
    pub fn new(primary: Arc<dyn DateProvider>, secondary: Arc<dyn DateProvider>) -> Self {
        Self { primary, secondary }
    }

    pub fn get(&self, slot: SourceSlot) -> &Arc<dyn DateProvider> {
        match slot {
            SourceSlot::Primary => &self.primary,
            SourceSlot::Secondary => &self.secondary,
        }
    }
}

/// How one identifier was resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Already in the index; no network call was made.
    Cached(String),
    /// Answered by a source.
    Found(SourceSlot, ProviderHit),
    NotFound,
}

impl Outcome {
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Cached(value) => Some(value),
            Self::Found(_, hit) => Some(&hit.value),
            Self::NotFound => None,
        }
    }
}

/// Resolves publication dates for the pending rows of one worksheet.
///
/// Owns the index for the lifetime of the run; nothing else reads or writes
/// it, so a record followed by a lookup within the run always sees the
/// recorded value.
pub struct DateResolver {
    worksheet: Arc<dyn WorksheetStore>,
    index_store: Arc<dyn IndexStore>,
    index: ResolutionIndex,
    sources: SourceChain,
    rate_limiter: Arc<RateLimiter>,
}

impl DateResolver {
    /// Open a resolver, hydrating the index from the workbook.
    pub async fn initialize(
        workbook: Workbook,
        sources: SourceChain,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        let index = ResolutionIndex::load(workbook.index.as_ref()).await;
        Self::with_index(workbook, index, sources, rate_limiter)
    }

    /// Build a resolver around an already-loaded index.
    pub fn with_index(
        workbook: Workbook,
        index: ResolutionIndex,
        sources: SourceChain,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            worksheet: workbook.worksheet,
            index_store: workbook.index,
            index,
            sources,
            rate_limiter,
        }
    }

    pub fn index(&self) -> &ResolutionIndex {
        &self.index
    }

    /// Query the sources in [`SOURCE_ORDER`], stopping at the first hit.
    async fn query_sources(&self, isbn: &Isbn) -> Option<(SourceSlot, ProviderHit)> {
        for slot in SOURCE_ORDER {
            let provider = self.sources.get(slot);
            info!("Searching {} in {}...", isbn, provider.id());

            self.rate_limiter.before_request(provider.id()).await;
            if let Some(hit) = provider.lookup(isbn).await {
                info!("Found {} in {}: {}", isbn, hit.source, hit.value);
                return Some((slot, hit));
            }
        }

        info!("{} not found in any source", isbn);
        None
    }

    async fn record(&mut self, isbn: Isbn, hit: &ProviderHit) {
        self.index
            .record(
                self.index_store.as_ref(),
                isbn,
                hit.value.clone(),
                hit.source,
            )
            .await;
    }

    /// Resolve one identifier through index -> primary -> secondary.
    ///
    /// Source hits are recorded in the index. No cell is written.
    pub async fn resolve_one(&mut self, isbn: &Isbn) -> Outcome {
        if let Some(value) = self.index.lookup(isbn) {
            info!("Found {} in index: {}", isbn, value);
            return Outcome::Cached(value.to_string());
        }

        match self.query_sources(isbn).await {
            Some((slot, hit)) => {
                self.record(isbn.clone(), &hit).await;
                Outcome::Found(slot, hit)
            }
            None => Outcome::NotFound,
        }
    }

    /// Run the state machine for one pending row.
    ///
    /// A resolved value is written to the row before it is recorded in the
    /// index. A failed cell write aborts the run.
    async fn process_item(&mut self, item: &PendingItem) -> Result<Outcome> {
        let isbn = match Isbn::parse(&item.isbn) {
            Ok(isbn) => isbn,
            Err(e) => {
                warn!("Row {}: {}", item.row, e);
                return Ok(Outcome::NotFound);
            }
        };

        if let Some(value) = self.index.lookup(&isbn) {
            let value = value.to_string();
            info!("Found {} in index: {}", isbn, value);
            self.worksheet.set_value(item.row, &value).await?;
            return Ok(Outcome::Cached(value));
        }

        match self.query_sources(&isbn).await {
            Some((slot, hit)) => {
                self.worksheet.set_value(item.row, &hit.value).await?;
                self.record(isbn, &hit).await;
                Ok(Outcome::Found(slot, hit))
            }
            None => Ok(Outcome::NotFound),
        }
    }

    /// Process the pending rows of the worksheet, at most `max_count` of them.
    ///
    /// Statistics are only returned when the whole batch completes; an error
    /// from the worksheet aborts the run and discards them.
    pub async fn run(&mut self, max_count: Option<usize>) -> Result<RunStats> {
        let rows = self.worksheet.list_rows().await?;
        let mut items = pending_items(rows);
        let total_pending = items.len();
        info!("{} ISBNs pending", total_pending);

        if apply_limit(&mut items, max_count) {
            info!("Limiting run to {} ISBNs", items.len());
        }

        let total = items.len();
        let mut stats = RunStats::default();

        for (i, item) in items.iter().enumerate() {
            info!("[{}/{}] ISBN {} (row {})", i + 1, total, item.isbn, item.row);

            let outcome = self.process_item(item).await?;
            stats.tally(&outcome);

            if self.rate_limiter.cooldown_due(stats.processed, total) {
                info!("Batch of {} done, cooling down", stats.processed);
                self.rate_limiter.cooldown().await;
            }
        }

        debug_assert!(stats.is_consistent());
        info!(
            "Run complete: pending={} processed={} cache={} primary={} secondary={} not_found={} index_size={}",
            total_pending,
            stats.processed,
            stats.found_in_cache,
            stats.found_primary,
            stats.found_secondary,
            stats.not_found,
            self.index.len()
        );

        Ok(stats)
    }
}
