use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    /// Maps an environment label to its variant. Unknown labels fall back
    /// to development.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "production" => Environment::Production,
            "test" => Environment::Test,
            _ => Environment::Development,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Soft-scoring weights used to order candidates that pass hard filtering.
///
/// Exposed as configuration rather than constants so operators can tune
/// ranking without a redeploy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityWeights {
    /// Weight per niche term found in a hit's title/snippet.
    pub niche: f64,
    /// Weight when the requested location appears in the hit text.
    pub location: f64,
    /// Weight when the requested gender term appears in the hit text.
    pub gender: f64,
    /// Weight when a follower count parsed from the hit text falls inside
    /// the requested range.
    pub followers: f64,
    /// Weight per additional provider confirming the same profile.
    pub cross_confirmation: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            niche: 2.0,
            location: 1.5,
            gender: 1.0,
            followers: 1.0,
            cross_confirmation: 2.5,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub serply_api_key: Option<String>,
    pub serpapi_api_key: Option<String>,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    /// Wall-clock budget for one discovery call's provider phases.
    pub search_budget_secs: u64,
    /// Jittered minimum spacing between calls to the same provider.
    pub provider_min_spacing_ms: u64,
    pub provider_max_spacing_ms: u64,
    pub provider_backoff_base_ms: u64,
    /// Exponent cap for `base * 2^min(consecutive_errors, cap)`.
    pub provider_backoff_cap: u32,
    /// Additional attempts per provider call after the first failure.
    pub provider_max_retries: u32,
    pub circuit_failure_threshold: u32,
    pub circuit_cooldown_secs: u64,
    /// Minimum filtered candidate count before the ladder stops escalating.
    pub min_candidates: usize,
    pub default_result_cap: usize,
    pub quality_weights: QualityWeights,
}

impl AppConfig {
    #[must_use]
    pub fn search_budget(&self) -> Duration {
        Duration::from_secs(self.search_budget_secs)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field(
                "serply_api_key",
                &self.serply_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "serpapi_api_key",
                &self.serpapi_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("search_budget_secs", &self.search_budget_secs)
            .field("provider_min_spacing_ms", &self.provider_min_spacing_ms)
            .field("provider_max_spacing_ms", &self.provider_max_spacing_ms)
            .field("provider_backoff_base_ms", &self.provider_backoff_base_ms)
            .field("provider_backoff_cap", &self.provider_backoff_cap)
            .field("provider_max_retries", &self.provider_max_retries)
            .field(
                "circuit_failure_threshold",
                &self.circuit_failure_threshold,
            )
            .field("circuit_cooldown_secs", &self.circuit_cooldown_secs)
            .field("min_candidates", &self.min_candidates)
            .field("default_result_cap", &self.default_result_cap)
            .field("quality_weights", &self.quality_weights)
            .finish()
    }
}
