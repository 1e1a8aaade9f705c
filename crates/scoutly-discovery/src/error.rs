use thiserror::Error;

use scoutly_core::RequestError;

/// Errors surfaced by [`crate::DiscoveryEngine::discover`].
///
/// Provider failures never appear here: the fallback ladder absorbs them
/// and degrades to synthetic candidates instead. Only a request that is
/// malformed before any provider is contacted is rejected.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("invalid search request: {0}")]
    InvalidRequest(#[from] RequestError),
}
