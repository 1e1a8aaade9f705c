//! External search-provider plumbing: clients, health state, and pacing.
//!
//! Every outbound call flows through a [`RequestQueue`], which serializes
//! calls per provider, enforces jittered spacing, applies exponential
//! backoff after errors, and consults the per-provider [`CircuitBreaker`]
//! held in the shared [`ProviderRegistry`].

pub mod backoff;
pub mod circuit;
pub mod error;
pub mod provider;
pub mod queue;
pub mod registry;
pub mod serpapi;
pub mod serply;
pub mod types;

pub use backoff::BackoffPolicy;
pub use circuit::{CircuitConfig, CircuitState};
pub use error::{ErrorClass, ProviderError};
pub use provider::{QueryStyle, SearchProvider};
pub use queue::{PacingConfig, RequestQueue, SearchScope};
pub use registry::{ProviderHealthSnapshot, ProviderRegistry};
pub use serpapi::SerpApiClient;
pub use serply::SerplyClient;
pub use types::RawHit;
