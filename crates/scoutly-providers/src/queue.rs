//! Per-provider request queue: serialization, pacing, and backoff.
//!
//! [`RequestQueue::execute`] is the only path to a provider. It guarantees
//! at most one in-flight call per provider, enforces a jittered minimum
//! spacing between calls, applies exponential backoff after errors, and
//! evaluates the circuit breaker before a call is even enqueued. Retries
//! are the caller's decision; the queue only enforces spacing and records
//! outcomes.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use scoutly_core::ProviderId;

use crate::backoff::BackoffPolicy;
use crate::circuit::CircuitState;
use crate::error::ProviderError;
use crate::registry::{ProviderRegistry, ProviderSlot};

/// Jittered minimum spacing between consecutive calls to one provider,
/// applied even after successes.
#[derive(Debug, Clone, Copy)]
pub struct PacingConfig {
    pub min_spacing: Duration,
    pub max_spacing: Duration,
}

impl PacingConfig {
    /// A uniformly jittered delay in `[min_spacing, max_spacing]`.
    #[must_use]
    pub fn jittered(&self) -> Duration {
        let span = self.max_spacing.saturating_sub(self.min_spacing);
        if span.is_zero() {
            return self.min_spacing;
        }
        self.min_spacing + span.mul_f64(rand::random::<f64>())
    }
}

/// One search's liveness flag.
///
/// Closed when the search returns, its budget expires, or the caller
/// cancels. A call whose scope closed before its outcome was observed
/// neither delivers results nor touches provider health: client-side
/// cancellations must not pollute circuit or backoff state.
#[derive(Debug, Default)]
pub struct SearchScope {
    closed: AtomicBool,
}

impl SearchScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Serializing, pacing, health-recording gateway for provider calls.
pub struct RequestQueue {
    registry: Arc<ProviderRegistry>,
    pacing: PacingConfig,
    backoff: BackoffPolicy,
}

impl RequestQueue {
    #[must_use]
    pub fn new(registry: Arc<ProviderRegistry>, pacing: PacingConfig, backoff: BackoffPolicy) -> Self {
        Self {
            registry,
            pacing,
            backoff,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Runs `call` against `provider` under the queue's guarantees.
    ///
    /// Order of gates: disabled check and circuit admission (an open
    /// breaker fails fast without enqueueing), then the per-provider
    /// in-flight lock, then the pacing/backoff wait, then the call.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::Disabled`]: provider was disabled by an earlier
    ///   auth failure.
    /// - [`ProviderError::CircuitOpen`]: breaker rejected the call.
    /// - [`ProviderError::Cancelled`]: `scope` closed before the outcome
    ///   was observed; nothing was recorded.
    /// - Any error returned by `call`, after recording it.
    pub async fn execute<T, F, Fut>(
        &self,
        provider: ProviderId,
        scope: &SearchScope,
        call: F,
    ) -> Result<T, ProviderError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let slot = self.registry.slot(provider);

        if scope.is_closed() {
            return Err(ProviderError::Cancelled);
        }

        {
            let mut health = slot.health();
            if health.disabled {
                return Err(ProviderError::Disabled { provider });
            }
            if !health.circuit.try_admit(Instant::now()) {
                return Err(ProviderError::CircuitOpen { provider });
            }
        }

        // One in-flight call per provider.
        let _in_flight = slot.call_lock.lock().await;

        if scope.is_closed() {
            slot.health().circuit.release_trial();
            return Err(ProviderError::Cancelled);
        }

        let wait = {
            let health = slot.health();
            health
                .next_allowed_at
                .map_or(Duration::ZERO, |at| at.saturating_duration_since(Instant::now()))
        };
        if !wait.is_zero() {
            let wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
            tracing::debug!(provider = %provider, wait_ms, "waiting out provider pacing");
            tokio::time::sleep(wait).await;
        }

        if scope.is_closed() {
            slot.health().circuit.release_trial();
            return Err(ProviderError::Cancelled);
        }

        let result = call().await;

        if scope.is_closed() {
            // Outcome arrived after the search stopped caring; do not let
            // it influence the provider's health either way.
            slot.health().circuit.release_trial();
            return Err(ProviderError::Cancelled);
        }

        match &result {
            Ok(_) => self.record_success(provider, &slot),
            Err(err) => self.record_failure(provider, &slot, err),
        }
        result
    }

    fn record_success(&self, provider: ProviderId, slot: &ProviderSlot) {
        let now = Instant::now();
        let mut health = slot.health();
        health.consecutive_errors = 0;
        health.circuit.on_success();
        health.next_allowed_at = Some(now + self.pacing.jittered());
        tracing::debug!(provider = %provider, "provider call succeeded");
    }

    fn record_failure(&self, provider: ProviderId, slot: &ProviderSlot, err: &ProviderError) {
        let now = Instant::now();
        let mut health = slot.health();

        match err {
            ProviderError::AuthFailure { .. } => {
                health.disabled = true;
                health.last_error_at = Some(now);
                health.circuit.release_trial();
                tracing::warn!(
                    provider = %provider,
                    error = %err,
                    "provider disabled for the remainder of the run after auth failure"
                );
                return;
            }
            // Queue-generated outcomes; never counted against the provider.
            ProviderError::Cancelled
            | ProviderError::CircuitOpen { .. }
            | ProviderError::Disabled { .. } => return,
            _ => {}
        }

        health.consecutive_errors = health.consecutive_errors.saturating_add(1);
        health.last_error_at = Some(now);
        let streak = health.consecutive_errors;
        health.circuit.on_failure(now, streak);

        let mut delay = self.backoff.delay_for(streak);
        if let ProviderError::RateLimited {
            retry_after_secs: Some(secs),
            ..
        } = err
        {
            delay = delay.max(Duration::from_secs(*secs));
        }
        health.next_allowed_at = Some(now + delay);

        if health.circuit.state() == CircuitState::Open {
            tracing::warn!(
                provider = %provider,
                consecutive_errors = streak,
                error = %err,
                "provider circuit opened"
            );
        } else {
            let backoff_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
            tracing::debug!(
                provider = %provider,
                consecutive_errors = streak,
                backoff_ms,
                error = %err,
                "provider call failed, backing off"
            );
        }
    }
}

#[cfg(test)]
#[path = "queue_test.rs"]
mod tests;
