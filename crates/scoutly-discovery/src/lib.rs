//! Discovery orchestrator: turns a campaign search request into a
//! deduplicated, quality-filtered list of candidate social-media profiles.
//!
//! A request enters the fallback ladder, which builds tier-1 queries, fans
//! them out to every enabled provider concurrently (through per-provider
//! request queues and circuit breakers), canonicalizes and deduplicates the
//! raw hits, and quality-filters the survivors. If too few candidates
//! remain it repeats with broadened tier-2 queries, and finally falls back
//! to locally generated synthetic candidates. The orchestrator always
//! returns a result, no matter how unreliable the upstream providers are.

mod aggregate;
mod canonical;
mod engine;
mod error;
mod filter;
mod ladder;
mod query;
mod synthetic;

pub use engine::{DiscoveryConfig, DiscoveryEngine};
pub use error::DiscoveryError;
pub use query::ProviderQuery;
