//! Search request types accepted at the discovery boundary.
//!
//! A [`SearchRequest`] is assembled by the caller (UI/API layer) and owned
//! for the lifetime of one discovery call. Validation is synchronous and
//! happens before any provider is contacted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Social platform a candidate profile can live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    TikTok,
    YouTube,
    Twitter,
}

impl Platform {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::TikTok => "tiktok",
            Platform::YouTube => "youtube",
            Platform::Twitter => "twitter",
        }
    }

    /// Primary web domain for the platform, used when composing
    /// `site:`-style provider queries and canonical profile URLs.
    #[must_use]
    pub fn domain(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram.com",
            Platform::TikTok => "tiktok.com",
            Platform::YouTube => "youtube.com",
            Platform::Twitter => "twitter.com",
        }
    }

    /// Canonical profile URL for a handle on this platform.
    #[must_use]
    pub fn profile_url(self, handle: &str) -> String {
        match self {
            Platform::Instagram => format!("https://instagram.com/{handle}"),
            Platform::TikTok => format!("https://tiktok.com/@{handle}"),
            Platform::YouTube => format!("https://youtube.com/@{handle}"),
            Platform::Twitter => format!("https://twitter.com/{handle}"),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested creator gender. Soft criterion only, never a hard reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Inclusive follower-count range requested by the campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerRange {
    pub min: u64,
    pub max: u64,
}

impl FollowerRange {
    #[must_use]
    pub fn contains(self, count: u64) -> bool {
        (self.min..=self.max).contains(&count)
    }
}

/// Identifier for an external search provider.
///
/// Providers declare their own ids as `&'static str` constants; the health
/// registry and result attribution key on this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProviderId(&'static str);

impl ProviderId {
    #[must_use]
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// One campaign search, as assembled at the API boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Platforms to discover candidates on. Must be non-empty.
    pub platforms: Vec<Platform>,
    /// Niche terms, ordered from most general to most specific.
    pub niches: Vec<String>,
    pub followers: FollowerRange,
    pub location: Option<String>,
    pub gender: Option<Gender>,
    pub brand_name: Option<String>,
    /// Free-text query supplied by the user, appended verbatim.
    pub user_query: String,
    /// Maximum number of candidates to return.
    pub result_cap: usize,
}

impl SearchRequest {
    /// Default result cap applied by callers that do not set one.
    pub const DEFAULT_RESULT_CAP: usize = 15;

    /// Validates the request before any provider is contacted.
    ///
    /// # Errors
    ///
    /// - [`RequestError::NoPlatforms`] if the platform set is empty.
    /// - [`RequestError::InvalidFollowerRange`] if `min > max`.
    /// - [`RequestError::ZeroResultCap`] if the cap is zero.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.platforms.is_empty() {
            return Err(RequestError::NoPlatforms);
        }
        if self.followers.min > self.followers.max {
            return Err(RequestError::InvalidFollowerRange {
                min: self.followers.min,
                max: self.followers.max,
            });
        }
        if self.result_cap == 0 {
            return Err(RequestError::ZeroResultCap);
        }
        Ok(())
    }
}

/// Validation errors for a [`SearchRequest`]. These are the only errors the
/// discovery entry point ever surfaces to callers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("search request has an empty platform set")]
    NoPlatforms,

    #[error("invalid follower range: min {min} exceeds max {max}")]
    InvalidFollowerRange { min: u64, max: u64 },

    #[error("result cap must be at least 1")]
    ZeroResultCap,
}
