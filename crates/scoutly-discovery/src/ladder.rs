//! Fallback ladder: direct query → broadened query → synthetic seeds.
//!
//! Each tier runs the full pipeline (build queries → fan out → merge →
//! filter) and escalates only when the filtered candidate count is still
//! below the configured threshold. Candidates found at earlier tiers carry
//! forward and dedup still applies. The synthetic tier is local-only and
//! never fails, so the ladder always terminates with a result.

use std::sync::Arc;
use std::time::Instant;

use scoutly_core::{ProviderId, SearchRequest, Tier};
use scoutly_providers::{RequestQueue, SearchProvider};

use crate::canonical::{self, CandidateRecord};
use crate::engine::DiscoveryConfig;
use crate::query::build_queries;
use crate::{aggregate, filter, synthetic};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LadderState {
    Tier1,
    Tier2,
    Synthetic,
}

/// Result of one full ladder run, before conversion to the public
/// `DiscoveryResult`.
pub(crate) struct LadderOutcome {
    /// Ranked, capped candidate records.
    pub records: Vec<CandidateRecord>,
    /// Hard-filter survivors across all tiers, before the cap.
    pub total_found: usize,
    pub tier_used: Tier,
    pub providers: Vec<ProviderId>,
}

pub(crate) async fn run(
    providers: &[Arc<dyn SearchProvider>],
    queue: &Arc<RequestQueue>,
    config: &DiscoveryConfig,
    request: &SearchRequest,
) -> LadderOutcome {
    let deadline = Instant::now() + config.search_budget;
    let mut state = LadderState::Tier1;
    let mut records: Vec<CandidateRecord> = Vec::new();
    let mut contributing: Vec<ProviderId> = Vec::new();

    loop {
        match state {
            LadderState::Tier1 | LadderState::Tier2 => {
                let tier = if state == LadderState::Tier1 {
                    Tier::Direct
                } else {
                    Tier::Broadened
                };

                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    tracing::debug!(tier = %tier, "search budget exhausted, skipping tier");
                } else {
                    let queries = build_queries(providers, request, tier);
                    let outcome = aggregate::fan_out(
                        providers,
                        &queries,
                        queue,
                        config.provider_max_retries,
                        remaining,
                    )
                    .await;
                    for provider in outcome.succeeded {
                        if !contributing.contains(&provider) {
                            contributing.push(provider);
                        }
                    }
                    canonical::merge_hits(&mut records, &outcome.hits, tier);
                }

                let survivors = filter::hard_filter(&records);
                if survivors.len() >= config.min_candidates {
                    tracing::debug!(
                        tier = %tier,
                        candidates = survivors.len(),
                        "tier produced enough candidates"
                    );
                    return finish(survivors, tier, contributing, request, config);
                }

                state = if state == LadderState::Tier1 {
                    tracing::debug!(
                        candidates = survivors.len(),
                        threshold = config.min_candidates,
                        "tier 1 below threshold, broadening queries"
                    );
                    LadderState::Tier2
                } else {
                    tracing::warn!(
                        candidates = survivors.len(),
                        threshold = config.min_candidates,
                        "tier 2 still below threshold, generating synthetic candidates"
                    );
                    LadderState::Synthetic
                };
            }
            LadderState::Synthetic => {
                let mut survivors = filter::hard_filter(&records);
                let want = request.result_cap.saturating_sub(survivors.len());
                let generated = synthetic::generate(request, want);
                for record in generated {
                    let exists = survivors
                        .iter()
                        .any(|s| s.profile.identity() == record.profile.identity());
                    if !exists {
                        survivors.push(record);
                    }
                }
                return finish(survivors, Tier::Synthetic, contributing, request, config);
            }
        }
    }
}

fn finish(
    survivors: Vec<CandidateRecord>,
    tier_used: Tier,
    mut contributing: Vec<ProviderId>,
    request: &SearchRequest,
    config: &DiscoveryConfig,
) -> LadderOutcome {
    let total_found = survivors.len();
    let records = filter::rank_and_cap(survivors, request, &config.weights, request.result_cap);
    contributing.sort_unstable();
    LadderOutcome {
        records,
        total_found,
        tier_used,
        providers: contributing,
    }
}
