//! Synthetic candidate generation, the ladder's terminal fallback.
//!
//! When every provider is unusable, discovery still returns seeds built
//! deterministically from the request's own parameters. Each is marked
//! `synthetic = true` so downstream consumers treat it as a low-confidence
//! starting point rather than a verified discovery.

use scoutly_core::{CandidateProfile, SearchRequest, Tier};

use crate::canonical::CandidateRecord;

/// Generates up to `count` placeholder candidates from the request.
///
/// Deterministic: the same request always yields the same candidates, in
/// the same order. Platforms are filled round-robin so a multi-platform
/// request gets seeds on every platform.
pub(crate) fn generate(request: &SearchRequest, count: usize) -> Vec<CandidateRecord> {
    let niche = request
        .niches
        .first()
        .map_or_else(|| "creator".to_owned(), |n| slug(n));
    let location = request.location.as_deref().map(slug);
    let gender = request.gender.map(|g| g.as_str().to_owned());
    let brand = request.brand_name.as_deref().map(slug);

    let mut stems: Vec<String> = Vec::new();
    if let Some(location) = &location {
        stems.push(format!("{niche}.{location}"));
    }
    if let Some(gender) = &gender {
        stems.push(format!("{gender}.{niche}"));
    }
    if let Some(brand) = &brand {
        stems.push(format!("{brand}.{niche}.fan"));
    }
    stems.push(format!("{niche}.daily"));
    stems.push(format!("the.{niche}.edit"));
    stems.push(format!("{niche}.journal"));
    stems.push(format!("real.{niche}.life"));
    stems.push(format!("{niche}.collective"));

    let mut records = Vec::new();
    'outer: for (index, stem) in stems.iter().enumerate() {
        for platform in &request.platforms {
            if records.len() >= count {
                break 'outer;
            }
            let handle = pad_handle(&format!("{stem}.{:02}", index + 1));
            records.push(CandidateRecord {
                profile: CandidateProfile {
                    platform: *platform,
                    handle: handle.clone(),
                    url: platform.profile_url(&handle),
                    providers: Vec::new(),
                    tier: Tier::Synthetic,
                    synthetic: true,
                },
                evidence: String::new(),
            });
        }
    }
    records
}

/// Lowercases and strips a free-text term down to handle-safe characters.
fn slug(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    let mut last_was_dot = true;
    for c in term.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_was_dot = false;
        } else if !last_was_dot {
            out.push('.');
            last_was_dot = true;
        }
    }
    while out.ends_with('.') {
        out.pop();
    }
    if out.is_empty() {
        "creator".to_owned()
    } else {
        out
    }
}

/// Keeps generated handles inside the 3-30 character validity window.
fn pad_handle(handle: &str) -> String {
    let mut handle = handle.to_owned();
    if handle.len() > 30 {
        handle.truncate(30);
        while handle.ends_with('.') {
            handle.pop();
        }
    }
    handle
}
