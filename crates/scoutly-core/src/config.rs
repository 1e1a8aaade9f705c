use crate::app_config::{AppConfig, Environment, QualityWeights};
use crate::ConfigError;

/// Loads configuration from the process environment, reading a `.env` file
/// first when one is present.
///
/// # Errors
///
/// Returns `ConfigError` if a value cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Like [`load_app_config`], but without touching `.env` files, for callers
/// that manage the environment themselves.
///
/// # Errors
///
/// Returns `ConfigError` if a value cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Reads `var` through `lookup` (falling back to `default`) and parses it.
fn env_parse<T, F>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_string());
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Assembles the configuration through an injected lookup, so tests can
/// drive it from a plain map instead of mutating process env vars.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let env = Environment::from_label(&or_default("SCOUTLY_ENV", "development"));
    let log_level = or_default("SCOUTLY_LOG_LEVEL", "info");

    let serply_api_key = lookup("SCOUTLY_SERPLY_API_KEY").ok();
    let serpapi_api_key = lookup("SCOUTLY_SERPAPI_API_KEY").ok();

    let http_timeout_secs = env_parse(&lookup, "SCOUTLY_HTTP_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("SCOUTLY_USER_AGENT", "scoutly/0.1 (candidate-discovery)");

    let search_budget_secs = env_parse(&lookup, "SCOUTLY_SEARCH_BUDGET_SECS", "20")?;

    let provider_min_spacing_ms: u64 =
        env_parse(&lookup, "SCOUTLY_PROVIDER_MIN_SPACING_MS", "1000")?;
    let provider_max_spacing_ms: u64 =
        env_parse(&lookup, "SCOUTLY_PROVIDER_MAX_SPACING_MS", "3000")?;
    if provider_min_spacing_ms > provider_max_spacing_ms {
        return Err(ConfigError::InvalidEnvVar {
            var: "SCOUTLY_PROVIDER_MIN_SPACING_MS".to_string(),
            reason: format!(
                "min spacing {provider_min_spacing_ms}ms exceeds max {provider_max_spacing_ms}ms"
            ),
        });
    }

    let provider_backoff_base_ms = env_parse(&lookup, "SCOUTLY_PROVIDER_BACKOFF_BASE_MS", "1000")?;
    let provider_backoff_cap = env_parse(&lookup, "SCOUTLY_PROVIDER_BACKOFF_CAP", "6")?;
    let provider_max_retries = env_parse(&lookup, "SCOUTLY_PROVIDER_MAX_RETRIES", "2")?;

    let circuit_failure_threshold = env_parse(&lookup, "SCOUTLY_CIRCUIT_FAILURE_THRESHOLD", "5")?;
    let circuit_cooldown_secs = env_parse(&lookup, "SCOUTLY_CIRCUIT_COOLDOWN_SECS", "60")?;

    let min_candidates = env_parse(&lookup, "SCOUTLY_MIN_CANDIDATES", "3")?;
    let default_result_cap = env_parse(&lookup, "SCOUTLY_DEFAULT_RESULT_CAP", "15")?;

    let quality_weights = QualityWeights {
        niche: env_parse(&lookup, "SCOUTLY_WEIGHT_NICHE", "2.0")?,
        location: env_parse(&lookup, "SCOUTLY_WEIGHT_LOCATION", "1.5")?,
        gender: env_parse(&lookup, "SCOUTLY_WEIGHT_GENDER", "1.0")?,
        followers: env_parse(&lookup, "SCOUTLY_WEIGHT_FOLLOWERS", "1.0")?,
        cross_confirmation: env_parse(&lookup, "SCOUTLY_WEIGHT_CROSS_CONFIRM", "2.5")?,
    };

    Ok(AppConfig {
        env,
        log_level,
        serply_api_key,
        serpapi_api_key,
        http_timeout_secs,
        user_agent,
        search_budget_secs,
        provider_min_spacing_ms,
        provider_max_spacing_ms,
        provider_backoff_base_ms,
        provider_backoff_cap,
        provider_max_retries,
        circuit_failure_threshold,
        circuit_cooldown_secs,
        min_candidates,
        default_result_cap,
        quality_weights,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
