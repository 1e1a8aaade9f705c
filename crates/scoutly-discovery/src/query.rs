//! Deterministic provider query composition.
//!
//! Tier 1 composes the request directly; tier 2 relaxes it by dropping the
//! most specific niche term, broadening a city to its country, and
//! substituting synonyms from a fixed table. The same request and tier
//! always produce the same query strings, which keeps tests reproducible
//! and makes provider responses cacheable upstream.

use std::sync::Arc;

use scoutly_core::{Platform, ProviderId, SearchRequest, Tier};
use scoutly_providers::{QueryStyle, SearchProvider};

/// One composed query for one provider at one tier. Never mutated after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderQuery {
    pub provider: ProviderId,
    pub query: String,
    pub tier: Tier,
}

/// Fixed niche-synonym table used for tier-2 relaxation.
const NICHE_SYNONYMS: &[(&str, &str)] = &[
    ("fitness", "workout"),
    ("fashion", "style"),
    ("beauty", "makeup"),
    ("travel", "wanderlust"),
    ("food", "cooking"),
    ("gaming", "gamer"),
    ("tech", "technology"),
    ("music", "musician"),
    ("wellness", "selfcare"),
];

/// City → country broadening table for tier-2 relaxation. Locations not
/// listed here are assumed to already be broad and pass through unchanged.
const CITY_COUNTRIES: &[(&str, &str)] = &[
    ("madrid", "Spain"),
    ("barcelona", "Spain"),
    ("valencia", "Spain"),
    ("lisbon", "Portugal"),
    ("paris", "France"),
    ("london", "United Kingdom"),
    ("manchester", "United Kingdom"),
    ("berlin", "Germany"),
    ("munich", "Germany"),
    ("milan", "Italy"),
    ("rome", "Italy"),
    ("new york", "United States"),
    ("los angeles", "United States"),
    ("miami", "United States"),
    ("chicago", "United States"),
    ("toronto", "Canada"),
    ("mexico city", "Mexico"),
    ("bogota", "Colombia"),
    ("buenos aires", "Argentina"),
    ("sao paulo", "Brazil"),
];

/// Builds one query per enabled provider for the given tier.
pub(crate) fn build_queries(
    providers: &[Arc<dyn SearchProvider>],
    request: &SearchRequest,
    tier: Tier,
) -> Vec<ProviderQuery> {
    providers
        .iter()
        .map(|p| build_query(p.id(), p.query_style(), request, tier))
        .collect()
}

/// Builds the query for one provider at the given tier.
#[must_use]
pub(crate) fn build_query(
    provider: ProviderId,
    style: QueryStyle,
    request: &SearchRequest,
    tier: Tier,
) -> ProviderQuery {
    let mut terms: Vec<String> = Vec::new();

    for niche in effective_niches(request, tier) {
        terms.push(phrase(&niche, style));
    }

    if let Some(location) = &request.location {
        let location = match tier {
            Tier::Direct => location.clone(),
            _ => broaden_location(location),
        };
        terms.push(phrase(&location, style));
    }

    if let Some(gender) = request.gender {
        terms.push(gender.as_str().to_owned());
    }

    if let Some(brand) = &request.brand_name {
        terms.push(phrase(brand, style));
    }

    if !request.user_query.trim().is_empty() {
        terms.push(request.user_query.trim().to_owned());
    }

    terms.push(site_filter(&request.platforms));

    ProviderQuery {
        provider,
        query: terms.join(" "),
        tier,
    }
}

/// Niche terms after tier-appropriate relaxation.
///
/// Tier 2 drops the most specific (last) niche when more than one was
/// given; with a single niche it substitutes a synonym instead, so the
/// broadened query still targets the vertical.
fn effective_niches(request: &SearchRequest, tier: Tier) -> Vec<String> {
    let niches: Vec<String> = request
        .niches
        .iter()
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty())
        .collect();

    match tier {
        Tier::Direct => niches,
        _ => {
            if niches.len() > 1 {
                niches[..niches.len() - 1].to_vec()
            } else {
                niches.iter().map(|n| synonym_for(n)).collect()
            }
        }
    }
}

fn synonym_for(niche: &str) -> String {
    let lower = niche.to_lowercase();
    NICHE_SYNONYMS
        .iter()
        .find(|(from, _)| *from == lower)
        .map_or_else(|| niche.to_owned(), |(_, to)| (*to).to_owned())
}

fn broaden_location(location: &str) -> String {
    let lower = location.trim().to_lowercase();
    CITY_COUNTRIES
        .iter()
        .find(|(city, _)| *city == lower)
        .map_or_else(|| location.trim().to_owned(), |(_, country)| (*country).to_owned())
}

fn phrase(term: &str, style: QueryStyle) -> String {
    match style {
        QueryStyle::QuotedPhrase if term.contains(' ') => format!("\"{term}\""),
        _ => term.to_owned(),
    }
}

/// `site:` filter restricting hits to the requested platforms.
fn site_filter(platforms: &[Platform]) -> String {
    let mut sites: Vec<&str> = platforms.iter().map(|p| p.domain()).collect();
    sites.sort_unstable();
    sites.dedup();
    if sites.len() == 1 {
        format!("site:{}", sites[0])
    } else {
        let joined = sites
            .iter()
            .map(|d| format!("site:{d}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        format!("({joined})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoutly_core::{FollowerRange, Gender};

    const PROVIDER: ProviderId = ProviderId::new("test-provider");

    fn request() -> SearchRequest {
        SearchRequest {
            platforms: vec![Platform::Instagram],
            niches: vec!["fitness".to_owned(), "crossfit".to_owned()],
            followers: FollowerRange {
                min: 0,
                max: 1_000_000,
            },
            location: Some("Madrid".to_owned()),
            gender: Some(Gender::Female),
            brand_name: None,
            user_query: String::new(),
            result_cap: 15,
        }
    }

    #[test]
    fn tier1_composes_all_terms_directly() {
        let q = build_query(PROVIDER, QueryStyle::Keywords, &request(), Tier::Direct);
        assert_eq!(
            q.query,
            "fitness crossfit Madrid female site:instagram.com"
        );
        assert_eq!(q.tier, Tier::Direct);
        assert_eq!(q.provider, PROVIDER);
    }

    #[test]
    fn tier2_drops_the_most_specific_niche_and_broadens_the_city() {
        let q = build_query(PROVIDER, QueryStyle::Keywords, &request(), Tier::Broadened);
        assert_eq!(q.query, "fitness Spain female site:instagram.com");
    }

    #[test]
    fn tier2_substitutes_a_synonym_when_only_one_niche_is_given() {
        let mut req = request();
        req.niches = vec!["fitness".to_owned()];
        let q = build_query(PROVIDER, QueryStyle::Keywords, &req, Tier::Broadened);
        assert!(
            q.query.starts_with("workout "),
            "single niche should be relaxed via synonym: {}",
            q.query
        );
    }

    #[test]
    fn unknown_location_passes_through_unbroadened() {
        let mut req = request();
        req.location = Some("Andorra".to_owned());
        let q = build_query(PROVIDER, QueryStyle::Keywords, &req, Tier::Broadened);
        assert!(q.query.contains("Andorra"), "got: {}", q.query);
    }

    #[test]
    fn quoted_phrase_style_quotes_multi_word_terms_only() {
        let mut req = request();
        req.niches = vec!["weight lifting".to_owned()];
        req.location = Some("New York".to_owned());
        let q = build_query(PROVIDER, QueryStyle::QuotedPhrase, &req, Tier::Direct);
        assert_eq!(
            q.query,
            "\"weight lifting\" \"New York\" female site:instagram.com"
        );
    }

    #[test]
    fn multiple_platforms_become_an_or_site_filter() {
        let mut req = request();
        req.platforms = vec![Platform::TikTok, Platform::Instagram];
        let q = build_query(PROVIDER, QueryStyle::Keywords, &req, Tier::Direct);
        assert!(
            q.query
                .ends_with("(site:instagram.com OR site:tiktok.com)"),
            "got: {}",
            q.query
        );
    }

    #[test]
    fn same_request_and_tier_always_yield_the_same_query() {
        let a = build_query(PROVIDER, QueryStyle::Keywords, &request(), Tier::Broadened);
        let b = build_query(PROVIDER, QueryStyle::Keywords, &request(), Tier::Broadened);
        assert_eq!(a, b);
    }

    #[test]
    fn user_query_is_appended_verbatim() {
        let mut req = request();
        req.user_query = "marathon training".to_owned();
        let q = build_query(PROVIDER, QueryStyle::Keywords, &req, Tier::Direct);
        assert!(q.query.contains("marathon training"), "got: {}", q.query);
    }
}
