//! Catalogue source trait definition.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::LookupError;
use crate::models::{Isbn, ProviderHit, SourceKind};

/// A catalogue that can report a book's publication date.
///
/// Implementors only provide [`fetch_published_date`](Self::fetch_published_date),
/// which may fail. Callers use [`lookup`](Self::lookup), which folds every
/// failure into "not found" so one flaky source never aborts a batch.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use bookdate_lookup::{DateProvider, Isbn, LookupError, SourceKind};
///
/// struct FixedProvider;
///
/// #[async_trait]
/// impl DateProvider for FixedProvider {
///     fn id(&self) -> SourceKind {
///         SourceKind::GoogleBooks
///     }
///
///     async fn fetch_published_date(&self, _isbn: &Isbn) -> Result<Option<String>, LookupError> {
///         Ok(Some("2001-05".to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait DateProvider: Send + Sync {
    /// Which source this provider queries.
    fn id(&self) -> SourceKind;

    /// Perform one lookup against the source.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(date))` - the source knows the book and has a date
    /// * `Ok(None)` - the source answered but has no usable date
    /// * `Err(error)` - transport, status or parse failure
    async fn fetch_published_date(&self, isbn: &Isbn) -> Result<Option<String>, LookupError>;

    /// Look up a publication date, never failing.
    async fn lookup(&self, isbn: &Isbn) -> Option<ProviderHit> {
        match self.fetch_published_date(isbn).await {
            Ok(Some(value)) => Some(ProviderHit {
                value,
                source: self.id(),
            }),
            Ok(None) => {
                debug!("{} has no publication date for {}", self.id(), isbn);
                None
            }
            Err(e) => {
                warn!("{} lookup failed for {}: {}", self.id(), isbn, e);
                None
            }
        }
    }
}
