//! Concurrent provider fan-out with a settle-all join.
//!
//! Each enabled provider gets its own task running through the request
//! queue. The fan-out resolves once every task has returned hits, failed,
//! or the search's wall-clock budget expired. A failing provider only
//! shrinks the hit pool, it never fails the search. Tasks still
//! outstanding at the deadline are abandoned: the shared scope closes, so
//! their late outcomes are neither collected nor recorded against
//! provider health.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use scoutly_core::ProviderId;
use scoutly_providers::{
    ErrorClass, ProviderError, RawHit, RequestQueue, SearchProvider, SearchScope,
};

use crate::query::ProviderQuery;

/// Union of every successful provider's hits for one tier.
#[derive(Debug, Default)]
pub(crate) struct FanOutOutcome {
    pub hits: Vec<RawHit>,
    /// Providers whose calls completed successfully, even if their hit
    /// lists were empty.
    pub succeeded: Vec<ProviderId>,
}

/// Per-fan-out accumulator shared with the provider tasks.
#[derive(Debug, Default)]
struct Collector {
    hits: Mutex<Vec<RawHit>>,
    succeeded: Mutex<Vec<ProviderId>>,
}

impl Collector {
    fn record(&self, provider: ProviderId, hits: Vec<RawHit>) {
        self.hits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(hits);
        self.succeeded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(provider);
    }
}

/// Closes the scope when the fan-out future is dropped, so a cancelled
/// search stops its outstanding tasks from recording outcomes.
struct ScopeGuard(Arc<SearchScope>);

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Fans `queries` out to their providers concurrently and joins with a
/// settle-all policy under `budget`.
pub(crate) async fn fan_out(
    providers: &[Arc<dyn SearchProvider>],
    queries: &[ProviderQuery],
    queue: &Arc<RequestQueue>,
    max_retries: u32,
    budget: Duration,
) -> FanOutOutcome {
    let scope = Arc::new(SearchScope::new());
    let _guard = ScopeGuard(Arc::clone(&scope));
    let collector = Arc::new(Collector::default());

    let mut handles = Vec::new();
    for provider in providers {
        let Some(query) = queries.iter().find(|q| q.provider == provider.id()) else {
            continue;
        };
        handles.push(tokio::spawn(provider_task(
            Arc::clone(provider),
            query.query.clone(),
            Arc::clone(queue),
            Arc::clone(&scope),
            Arc::clone(&collector),
            max_retries,
        )));
    }

    let settled = tokio::time::timeout(budget, futures::future::join_all(handles)).await;
    // One-shot close: late results and outcomes are discarded from here on.
    scope.close();

    if settled.is_err() {
        let budget_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX);
        tracing::warn!(
            budget_ms,
            "search budget expired with provider calls outstanding, abandoning them"
        );
    }

    let hits = collector
        .hits
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .drain(..)
        .collect();
    let mut succeeded: Vec<ProviderId> = collector
        .succeeded
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .drain(..)
        .collect();
    succeeded.sort_unstable();

    FanOutOutcome { hits, succeeded }
}

/// One provider's call loop: bounded retries around the request queue.
///
/// Retry decisions live here, not in the queue: the queue only enforces
/// spacing and backoff eligibility. Rate-limit and transient errors are
/// retried up to `max_retries` additional attempts; everything else makes
/// the provider unavailable for this search.
async fn provider_task(
    provider: Arc<dyn SearchProvider>,
    query: String,
    queue: Arc<RequestQueue>,
    scope: Arc<SearchScope>,
    collector: Arc<Collector>,
    max_retries: u32,
) {
    let id = provider.id();
    let mut attempt = 0u32;
    loop {
        let result = queue
            .execute(id, &scope, || provider.search(&query))
            .await;

        match result {
            Ok(hits) => {
                if scope.is_closed() {
                    return;
                }
                tracing::debug!(provider = %id, count = hits.len(), "provider returned hits");
                collector.record(id, hits);
                return;
            }
            Err(err) => match err.class() {
                ErrorClass::Cancelled => return,
                ErrorClass::RateLimited | ErrorClass::Transient if attempt < max_retries => {
                    attempt += 1;
                    tracing::debug!(
                        provider = %id,
                        attempt,
                        max_retries,
                        error = %err,
                        "retrying provider after transient error"
                    );
                }
                _ => {
                    log_unavailable(id, &err);
                    return;
                }
            },
        }
    }
}

fn log_unavailable(provider: ProviderId, err: &ProviderError) {
    match err.class() {
        // Recurs on every search while the provider cools down; debug only.
        ErrorClass::CircuitOpen => {
            tracing::debug!(provider = %provider, "provider skipped, circuit open");
        }
        _ => {
            tracing::warn!(provider = %provider, error = %err, "provider unavailable for this search");
        }
    }
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
