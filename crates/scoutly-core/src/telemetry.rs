//! Tracing initialization for host services embedding the discovery engine.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `log_level` (typically
/// `AppConfig::log_level`) is used as the filter directive.
///
/// # Errors
///
/// Returns an error if the filter directive cannot be parsed or a global
/// subscriber is already installed.
pub fn init_tracing(log_level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()?;
    Ok(())
}
