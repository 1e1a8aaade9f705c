//! Discovery output types consumed by downstream enrichment and scoring.

use serde::Serialize;

use crate::request::{Platform, ProviderId};

/// Fallback-ladder tier a candidate was found at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Direct query composed from the request as given.
    Direct,
    /// Broadened query after tier-1 relaxation.
    Broadened,
    /// Locally generated placeholder candidates.
    Synthetic,
}

impl Tier {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Direct => "direct",
            Tier::Broadened => "broadened",
            Tier::Synthetic => "synthetic",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deduplicated candidate profile.
///
/// Identity is `(platform, handle)`; the pair is unique within one
/// [`DiscoveryResult`]. `providers` records every provider that surfaced
/// the profile; multi-provider confirmation raises ranking confidence.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateProfile {
    pub platform: Platform,
    /// Normalized lowercase handle with no `@` prefix.
    pub handle: String,
    pub url: String,
    pub providers: Vec<ProviderId>,
    /// Tier the profile was first seen at.
    pub tier: Tier,
    /// `true` for placeholder candidates generated from request
    /// parameters rather than discovered from a provider.
    pub synthetic: bool,
}

impl CandidateProfile {
    /// Dedup key within one discovery run.
    #[must_use]
    pub fn identity(&self) -> (Platform, &str) {
        (self.platform, self.handle.as_str())
    }
}

/// Final output of one discovery call.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryResult {
    /// Ranked candidates, at most the request's result cap.
    pub candidates: Vec<CandidateProfile>,
    /// Candidates surviving hard filtering across all tiers, before the
    /// cap was applied.
    pub total_found: usize,
    /// Deepest tier the ladder had to reach.
    pub tier_used: Tier,
    /// Providers whose calls completed successfully during the search.
    pub providers: Vec<ProviderId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_platform_and_handle() {
        let candidate = CandidateProfile {
            platform: Platform::Instagram,
            handle: "testuser".to_owned(),
            url: Platform::Instagram.profile_url("testuser"),
            providers: vec![ProviderId::new("serply")],
            tier: Tier::Direct,
            synthetic: false,
        };
        assert_eq!(candidate.identity(), (Platform::Instagram, "testuser"));
    }

    #[test]
    fn tier_ordering_matches_ladder_depth() {
        assert!(Tier::Direct < Tier::Broadened);
        assert!(Tier::Broadened < Tier::Synthetic);
    }
}
