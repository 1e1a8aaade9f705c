//! Discovery engine: the subsystem's sole entry point.

use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;
use uuid::Uuid;

use scoutly_core::{AppConfig, DiscoveryResult, QualityWeights, SearchRequest};
use scoutly_providers::{
    BackoffPolicy, CircuitConfig, PacingConfig, ProviderError, ProviderHealthSnapshot,
    ProviderRegistry, RequestQueue, SearchProvider, SerpApiClient, SerplyClient,
};

use crate::error::DiscoveryError;
use crate::ladder;

/// Engine-level knobs, typically derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Wall-clock budget covering the tier-1 and tier-2 provider phases.
    pub search_budget: Duration,
    /// Filtered-candidate threshold below which the ladder escalates.
    pub min_candidates: usize,
    /// Additional attempts per provider call after the first failure.
    pub provider_max_retries: u32,
    pub weights: QualityWeights,
}

impl DiscoveryConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            search_budget: config.search_budget(),
            min_candidates: config.min_candidates,
            provider_max_retries: config.provider_max_retries,
            weights: config.quality_weights,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            search_budget: Duration::from_secs(20),
            min_candidates: 3,
            provider_max_retries: 2,
            weights: QualityWeights::default(),
        }
    }
}

/// Orchestrates candidate discovery across all enabled providers.
///
/// Holds the provider set, the shared request queue (and through it the
/// process-wide health registry), and the engine configuration. One engine
/// serves all concurrent searches; per-search state never leaks between
/// calls.
pub struct DiscoveryEngine {
    providers: Vec<Arc<dyn SearchProvider>>,
    queue: Arc<RequestQueue>,
    config: DiscoveryConfig,
}

impl DiscoveryEngine {
    /// Builds an engine from explicit parts. The registry inside `queue`
    /// is shared state: construct it once per process and inject it, so
    /// provider backoff and circuit memory span all searches.
    #[must_use]
    pub fn new(
        providers: Vec<Arc<dyn SearchProvider>>,
        queue: Arc<RequestQueue>,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            providers,
            queue,
            config,
        }
    }

    /// Builds an engine with the standard provider set, enabling each
    /// provider whose API key is present in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if an HTTP client cannot be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let registry = Arc::new(ProviderRegistry::new(CircuitConfig {
            failure_threshold: config.circuit_failure_threshold,
            cooldown: Duration::from_secs(config.circuit_cooldown_secs),
        }));
        let queue = Arc::new(RequestQueue::new(
            registry,
            PacingConfig {
                min_spacing: Duration::from_millis(config.provider_min_spacing_ms),
                max_spacing: Duration::from_millis(config.provider_max_spacing_ms),
            },
            BackoffPolicy::new(config.provider_backoff_base_ms, config.provider_backoff_cap),
        ));

        let mut providers: Vec<Arc<dyn SearchProvider>> = Vec::new();
        if let Some(key) = &config.serply_api_key {
            providers.push(Arc::new(SerplyClient::new(
                key,
                config.http_timeout_secs,
                &config.user_agent,
            )?));
        }
        if let Some(key) = &config.serpapi_api_key {
            providers.push(Arc::new(SerpApiClient::new(
                key,
                config.http_timeout_secs,
                &config.user_agent,
            )?));
        }
        if providers.is_empty() {
            tracing::warn!(
                "no provider API keys configured; discovery will only produce synthetic candidates"
            );
        }

        Ok(Self::new(
            providers,
            queue,
            DiscoveryConfig::from_app_config(config),
        ))
    }

    /// Per-provider health, for the host service's diagnostics surface.
    #[must_use]
    pub fn provider_health(&self) -> Vec<ProviderHealthSnapshot> {
        self.queue.registry().snapshot()
    }

    /// Runs one discovery search.
    ///
    /// Always returns a result for a valid request: provider failures,
    /// open circuits, and expired budgets degrade through the fallback
    /// ladder down to synthetic candidates instead of failing the call.
    /// Dropping the returned future cancels the search; outstanding
    /// provider calls are abandoned without polluting health state.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidRequest`] if the request fails
    /// validation. No other error is ever surfaced.
    pub async fn discover(
        &self,
        request: SearchRequest,
    ) -> Result<DiscoveryResult, DiscoveryError> {
        request.validate()?;

        let search_id = Uuid::new_v4();
        let span = tracing::info_span!("discover", %search_id);
        async {
            tracing::debug!(
                platforms = ?request.platforms,
                niches = ?request.niches,
                cap = request.result_cap,
                "starting discovery"
            );

            let outcome = ladder::run(&self.providers, &self.queue, &self.config, &request).await;

            tracing::info!(
                tier = %outcome.tier_used,
                candidates = outcome.records.len(),
                total_found = outcome.total_found,
                providers = outcome.providers.len(),
                "discovery complete"
            );

            Ok(DiscoveryResult {
                candidates: outcome.records.into_iter().map(|r| r.profile).collect(),
                total_found: outcome.total_found,
                tier_used: outcome.tier_used,
                providers: outcome.providers,
            })
        }
        .instrument(span)
        .await
    }
}
