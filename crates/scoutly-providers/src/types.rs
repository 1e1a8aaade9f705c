use chrono::{DateTime, Utc};

use scoutly_core::ProviderId;

/// One raw search result from a provider, before canonicalization.
///
/// Ephemeral: produced by a provider call and consumed immediately by the
/// canonicalization stage.
#[derive(Debug, Clone)]
pub struct RawHit {
    /// Provider that surfaced the hit, kept for cross-confirmation.
    pub provider: ProviderId,
    pub title: String,
    /// Result link as returned by the provider, un-normalized.
    pub link: String,
    pub snippet: String,
    pub discovered_at: DateTime<Utc>,
}
