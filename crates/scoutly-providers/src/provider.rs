use async_trait::async_trait;

use scoutly_core::ProviderId;

use crate::error::ProviderError;
use crate::types::RawHit;

/// Query phrasing convention a provider responds best to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStyle {
    /// Plain space-separated keyword list.
    Keywords,
    /// Multi-word terms wrapped in double quotes.
    QuotedPhrase,
}

/// A queryable external search provider.
///
/// Implementations normalize their own wire shape into [`RawHit`] so the
/// aggregation layer only ever deals with one canonical result type.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Phrasing convention for composed queries. Defaults to keywords.
    fn query_style(&self) -> QueryStyle {
        QueryStyle::Keywords
    }

    /// Issues one search query and returns normalized hits.
    ///
    /// Implementations map HTTP status codes onto the [`ProviderError`]
    /// taxonomy (429 → `RateLimited`, 401/403 → `AuthFailure`, 502-504 →
    /// `Transient`) and must not retry internally; pacing and retries are
    /// the queueing layer's concern.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on HTTP, status, or decoding failures.
    async fn search(&self, query: &str) -> Result<Vec<RawHit>, ProviderError>;
}
