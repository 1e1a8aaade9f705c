//! URL canonicalization and candidate deduplication.
//!
//! Raw provider hits arrive as arbitrary result links: tracking query
//! strings, `www.`/mobile hosts, content URLs instead of profile URLs.
//! This module reduces each link to its canonical `(platform, handle)`
//! identity and folds duplicates into a single candidate whose provider
//! set is the union of every source that surfaced it.

use percent_encoding::percent_decode_str;

use scoutly_core::{CandidateProfile, Platform, Tier};
use scoutly_providers::RawHit;

/// A deduplicated candidate plus the accumulated hit text used later for
/// soft quality scoring.
#[derive(Debug, Clone)]
pub(crate) struct CandidateRecord {
    pub profile: CandidateProfile,
    /// Concatenated titles/snippets of every hit that mapped to this
    /// profile.
    pub evidence: String,
}

/// Instagram path roots that are content or utility pages, not profiles.
const INSTAGRAM_NON_PROFILE: &[&str] = &[
    "p",
    "reel",
    "reels",
    "tv",
    "explore",
    "stories",
    "accounts",
    "directory",
    "discover",
    "about",
    "developer",
    "legal",
];

/// Twitter/X path roots that can never be user handles.
const TWITTER_NON_PROFILE: &[&str] = &[
    "search",
    "hashtag",
    "explore",
    "home",
    "i",
    "intent",
    "share",
    "settings",
    "notifications",
    "messages",
    "login",
    "signup",
    "tos",
    "privacy",
];

/// Extracts the canonical `(platform, handle)` identity from a result
/// link.
///
/// Returns `None` for links that are not recognizable profile (or
/// profile-owned content) URLs on a supported platform.
pub(crate) fn canonicalize_link(link: &str) -> Option<(Platform, String)> {
    let trimmed = link.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);

    // Query string and fragment never carry identity.
    let without_fragment = without_scheme.split('#').next().unwrap_or(without_scheme);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);

    let (host, path) = match without_query.split_once('/') {
        Some((host, path)) => (host, path),
        None => (without_query, ""),
    };

    let host = host.to_lowercase();
    // "mobile." must be tried before "m." or it would be half-stripped.
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("mobile."))
        .or_else(|| host.strip_prefix("m."))
        .unwrap_or(&host);

    let platform = match host {
        "instagram.com" => Platform::Instagram,
        "tiktok.com" => Platform::TikTok,
        "youtube.com" => Platform::YouTube,
        "twitter.com" | "x.com" => Platform::Twitter,
        _ => return None,
    };

    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    let segments: Vec<&str> = decoded.split('/').filter(|s| !s.is_empty()).collect();

    let handle = extract_handle(platform, &segments)?;
    let handle = handle.trim_start_matches('@').trim_end_matches('.').to_lowercase();
    if handle.is_empty() {
        return None;
    }
    Some((platform, handle))
}

fn extract_handle(platform: Platform, segments: &[&str]) -> Option<String> {
    let first = *segments.first()?;
    match platform {
        Platform::Instagram => {
            if INSTAGRAM_NON_PROFILE.contains(&first.to_lowercase().as_str()) {
                return None;
            }
            Some(first.to_owned())
        }
        Platform::TikTok => {
            // Profile and content URLs both start with the @handle segment;
            // `/@user/video/<id>` collapses to the owning handle.
            if first.starts_with('@') {
                Some(first.to_owned())
            } else {
                None
            }
        }
        Platform::YouTube => {
            if let Some(handle) = first.strip_prefix('@') {
                return Some(handle.to_owned());
            }
            // Only the explicit channel URL forms name a profile; watch,
            // shorts, results, playlist pages do not.
            match first.to_lowercase().as_str() {
                "c" | "user" | "channel" => segments.get(1).map(|s| (*s).to_owned()),
                _ => None,
            }
        }
        Platform::Twitter => {
            if TWITTER_NON_PROFILE.contains(&first.to_lowercase().as_str()) {
                return None;
            }
            Some(first.to_owned())
        }
    }
}

/// Folds raw hits into the running candidate list.
///
/// Hits whose canonical key matches an existing record merge into it: the
/// provider set becomes the union of both sources, the first-seen tier is
/// kept, and the hit text is appended to the scoring evidence.
pub(crate) fn merge_hits(records: &mut Vec<CandidateRecord>, hits: &[RawHit], tier: Tier) {
    for hit in hits {
        let Some((platform, handle)) = canonicalize_link(&hit.link) else {
            continue;
        };

        if let Some(existing) = records
            .iter_mut()
            .find(|r| r.profile.platform == platform && r.profile.handle == handle)
        {
            if !existing.profile.providers.contains(&hit.provider) {
                existing.profile.providers.push(hit.provider);
            }
            existing.evidence.push(' ');
            existing.evidence.push_str(&hit.title);
            existing.evidence.push(' ');
            existing.evidence.push_str(&hit.snippet);
        } else {
            let url = platform.profile_url(&handle);
            records.push(CandidateRecord {
                profile: CandidateProfile {
                    platform,
                    handle: handle.clone(),
                    url,
                    providers: vec![hit.provider],
                    tier,
                    synthetic: false,
                },
                evidence: format!("{} {}", hit.title, hit.snippet),
            });
        }
    }
}
