//! Shared domain types and configuration for the scoutly discovery service.

pub mod app_config;
pub mod config;
pub mod request;
pub mod result;
pub mod telemetry;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, QualityWeights};
pub use config::{load_app_config, load_app_config_from_env};
pub use request::{
    FollowerRange, Gender, Platform, ProviderId, RequestError, SearchRequest,
};
pub use result::{CandidateProfile, DiscoveryResult, Tier};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
