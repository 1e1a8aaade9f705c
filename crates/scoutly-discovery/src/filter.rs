//! Quality filtering and ranking of deduplicated candidates.
//!
//! Hard rejects remove handles that cannot plausibly belong to an
//! individual creator (brand accounts, numeric junk, malformed handles).
//! Soft scoring only orders the survivors: textual proximity of the hit
//! evidence to the requested niche/location/gender terms, a follower count
//! quoted in range, and a bonus per additional confirming provider.
//! Weights are configuration, not constants.

use std::sync::LazyLock;

use regex::Regex;

use scoutly_core::{Gender, QualityWeights, SearchRequest};

use crate::canonical::CandidateRecord;

/// Handles must be 3-30 chars, start alphanumeric, and use only the
/// character set the platforms themselves allow.
static HANDLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9._-]{2,29}$").expect("valid regex")
});

static MALE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bmale\b").expect("valid regex"));
static FEMALE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bfemale\b").expect("valid regex"));

/// Follower counts as SERP snippets phrase them: "12k followers",
/// "1.2M followers", "3,400 subscribers".
static FOLLOWERS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d[\d.,]*)\s*([km])?\s*(?:followers|subscribers)\b")
        .expect("valid regex")
});

/// Handle substrings that mark brand, corporate, or utility accounts
/// rather than individual creators.
const BRAND_MARKERS: &[&str] = &[
    "official",
    "shop",
    "store",
    "brand",
    "corp",
    "support",
    "help",
    "news",
    "press",
    "team",
    "agency",
    "deals",
];

/// Returns `true` if the handle survives the hard filters.
pub(crate) fn handle_is_plausible(handle: &str) -> bool {
    if !HANDLE_RE.is_match(handle) {
        return false;
    }
    if handle.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    !BRAND_MARKERS.iter().any(|marker| handle.contains(marker))
}

/// Drops records failing the hard filters. Synthetic records pass
/// unconditionally; they were generated to satisfy the handle rules.
pub(crate) fn hard_filter(records: &[CandidateRecord]) -> Vec<CandidateRecord> {
    records
        .iter()
        .filter(|r| r.profile.synthetic || handle_is_plausible(&r.profile.handle))
        .cloned()
        .collect()
}

/// Soft quality score for ordering. Never used to reject.
pub(crate) fn quality_score(
    record: &CandidateRecord,
    request: &SearchRequest,
    weights: &QualityWeights,
) -> f64 {
    let haystack = format!(
        "{} {}",
        record.profile.handle,
        record.evidence.to_lowercase()
    );

    let mut score = 0.0;
    for niche in &request.niches {
        let niche = niche.trim().to_lowercase();
        if !niche.is_empty() && haystack.contains(&niche) {
            score += weights.niche;
        }
    }

    if let Some(location) = &request.location {
        let location = location.trim().to_lowercase();
        if !location.is_empty() && haystack.contains(&location) {
            score += weights.location;
        }
    }

    if let Some(gender) = request.gender {
        let matched = match gender {
            Gender::Male => MALE_RE.is_match(&haystack),
            Gender::Female => FEMALE_RE.is_match(&haystack),
        };
        if matched {
            score += weights.gender;
        }
    }

    if let Some(count) = parsed_follower_count(&haystack) {
        if request.followers.contains(count) {
            score += weights.followers;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let extra_confirmations = record.profile.providers.len().saturating_sub(1) as f64;
    score + extra_confirmations * weights.cross_confirmation
}

/// First follower count stated in the hit text, if any.
fn parsed_follower_count(text: &str) -> Option<u64> {
    let caps = FOLLOWERS_RE.captures(text)?;
    let value: f64 = caps[1].replace(',', "").parse().ok()?;
    let multiplier = match caps.get(2).map(|m| m.as_str()) {
        Some(suffix) if suffix.eq_ignore_ascii_case("k") => 1_000.0,
        Some(suffix) if suffix.eq_ignore_ascii_case("m") => 1_000_000.0,
        _ => 1.0,
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = (value * multiplier) as u64;
    Some(count)
}

/// Orders records by score (cross-confirmation included), breaking ties by
/// provider count and then by identity so output order is deterministic,
/// and truncates to `cap`.
pub(crate) fn rank_and_cap(
    records: Vec<CandidateRecord>,
    request: &SearchRequest,
    weights: &QualityWeights,
    cap: usize,
) -> Vec<CandidateRecord> {
    let mut scored: Vec<(f64, CandidateRecord)> = records
        .into_iter()
        .map(|r| (quality_score(&r, request, weights), r))
        .collect();
    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .partial_cmp(score_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.profile.providers.len().cmp(&a.profile.providers.len()))
            .then_with(|| {
                (a.profile.platform, a.profile.handle.as_str())
                    .cmp(&(b.profile.platform, b.profile.handle.as_str()))
            })
    });
    scored.truncate(cap);
    scored.into_iter().map(|(_, r)| r).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoutly_core::{
        CandidateProfile, FollowerRange, Platform, ProviderId, Tier,
    };

    fn record(handle: &str, providers: &[&'static str], evidence: &str) -> CandidateRecord {
        CandidateRecord {
            profile: CandidateProfile {
                platform: Platform::Instagram,
                handle: handle.to_owned(),
                url: Platform::Instagram.profile_url(handle),
                providers: providers.iter().map(|p| ProviderId::new(p)).collect(),
                tier: Tier::Direct,
                synthetic: false,
            },
            evidence: evidence.to_owned(),
        }
    }

    fn request() -> SearchRequest {
        SearchRequest {
            platforms: vec![Platform::Instagram],
            niches: vec!["fitness".to_owned()],
            followers: FollowerRange {
                min: 0,
                max: 1_000_000,
            },
            location: Some("Spain".to_owned()),
            gender: Some(Gender::Male),
            brand_name: None,
            user_query: String::new(),
            result_cap: 15,
        }
    }

    #[test]
    fn well_formed_handles_are_plausible() {
        assert!(handle_is_plausible("laura.fit"));
        assert!(handle_is_plausible("carlos_lifts"));
        assert!(handle_is_plausible("abc"));
    }

    #[test]
    fn too_short_or_too_long_handles_are_rejected() {
        assert!(!handle_is_plausible("ab"));
        assert!(!handle_is_plausible(&"a".repeat(31)));
        assert!(handle_is_plausible(&"a".repeat(30)));
    }

    #[test]
    fn purely_numeric_handles_are_rejected() {
        assert!(!handle_is_plausible("123456"));
        assert!(handle_is_plausible("user123"));
    }

    #[test]
    fn disallowed_characters_are_rejected() {
        assert!(!handle_is_plausible("user name"));
        assert!(!handle_is_plausible("user!"));
        assert!(!handle_is_plausible(".leadingdot"));
    }

    #[test]
    fn brand_like_handles_are_rejected() {
        assert!(!handle_is_plausible("nikeofficial"));
        assert!(!handle_is_plausible("protein.shop"));
        assert!(!handle_is_plausible("fitnessbrand"));
        assert!(!handle_is_plausible("gym.news"));
    }

    #[test]
    fn hard_filter_drops_rejects_and_keeps_the_rest() {
        let records = vec![
            record("laura.fit", &["serply"], ""),
            record("999999", &["serply"], ""),
            record("supplements.store", &["serply"], ""),
        ];
        let kept = hard_filter(&records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].profile.handle, "laura.fit");
    }

    #[test]
    fn synthetic_records_bypass_hard_filters() {
        let mut synthetic = record("x1", &[], "");
        synthetic.profile.synthetic = true;
        let kept = hard_filter(&[synthetic]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn niche_and_location_matches_raise_the_score() {
        let req = request();
        let weights = QualityWeights::default();
        let matched = record("laura.fit", &["serply"], "Fitness coach in Spain");
        let unmatched = record("someone.else", &["serply"], "cooking videos");
        assert!(
            quality_score(&matched, &req, &weights) > quality_score(&unmatched, &req, &weights)
        );
    }

    #[test]
    fn gender_matching_is_word_bounded() {
        let req = request();
        let weights = QualityWeights {
            niche: 0.0,
            location: 0.0,
            gender: 1.0,
            followers: 0.0,
            cross_confirmation: 0.0,
        };
        let male = record("a.creator", &["serply"], "male lifestyle creator");
        let female = record("b.creator", &["serply"], "female lifestyle creator");
        assert!((quality_score(&male, &req, &weights) - 1.0).abs() < f64::EPSILON);
        assert!(
            quality_score(&female, &req, &weights).abs() < f64::EPSILON,
            "\"female\" must not count as a match for male"
        );
    }

    #[test]
    fn follower_counts_parse_with_k_m_and_separator_forms() {
        assert_eq!(parsed_follower_count("12k followers"), Some(12_000));
        assert_eq!(parsed_follower_count("1.2M Followers"), Some(1_200_000));
        assert_eq!(parsed_follower_count("3,400 subscribers"), Some(3_400));
        assert_eq!(parsed_follower_count("no numbers here"), None);
    }

    #[test]
    fn in_range_follower_count_raises_the_score() {
        let req = request();
        let weights = QualityWeights {
            niche: 0.0,
            location: 0.0,
            gender: 0.0,
            followers: 1.0,
            cross_confirmation: 0.0,
        };
        let in_range = record("a.creator", &["serply"], "coach with 250k followers");
        let out_of_range = record("b.creator", &["serply"], "coach with 9M followers");
        assert!((quality_score(&in_range, &req, &weights) - 1.0).abs() < f64::EPSILON);
        assert!(quality_score(&out_of_range, &req, &weights).abs() < f64::EPSILON);
    }

    #[test]
    fn niche_match_in_the_handle_itself_counts() {
        let req = request();
        let weights = QualityWeights::default();
        let r = record("laura.fitness", &["serply"], "");
        assert!(quality_score(&r, &req, &weights) >= weights.niche);
    }

    #[test]
    fn cross_confirmed_candidates_outrank_single_source_ones() {
        let req = request();
        let weights = QualityWeights::default();
        let ranked = rank_and_cap(
            vec![
                record("single.source", &["serply"], "fitness Spain"),
                record("both.sources", &["serply", "serpapi"], "fitness Spain"),
            ],
            &req,
            &weights,
            10,
        );
        assert_eq!(ranked[0].profile.handle, "both.sources");
    }

    #[test]
    fn cap_is_enforced_exactly() {
        let req = request();
        let weights = QualityWeights::default();
        let records: Vec<CandidateRecord> = (0..40)
            .map(|i| record(&format!("creator.{i:02}"), &["serply"], "fitness"))
            .collect();
        let ranked = rank_and_cap(records, &req, &weights, 15);
        assert_eq!(ranked.len(), 15);
    }

    #[test]
    fn equal_scores_order_deterministically_by_identity() {
        let req = request();
        let weights = QualityWeights::default();
        let a = vec![
            record("bbb.creator", &["serply"], ""),
            record("aaa.creator", &["serply"], ""),
        ];
        let b: Vec<CandidateRecord> = a.iter().rev().cloned().collect();
        let ranked_a = rank_and_cap(a, &req, &weights, 10);
        let ranked_b = rank_and_cap(b, &req, &weights, 10);
        assert_eq!(ranked_a[0].profile.handle, ranked_b[0].profile.handle);
        assert_eq!(ranked_a[0].profile.handle, "aaa.creator");
    }
}
