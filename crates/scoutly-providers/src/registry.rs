//! Shared, thread-safe provider health registry.
//!
//! One [`ProviderRegistry`] is constructed at startup and injected into the
//! discovery engine. Health state (error streaks, circuit, pacing) is
//! per-provider and shared across all concurrent searches; it persists for
//! the process lifetime and resets on restart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use scoutly_core::ProviderId;

use crate::circuit::{CircuitBreaker, CircuitConfig, CircuitState};

/// Mutable health record for one provider.
///
/// Mutated only by the request queue and circuit breaker; guarded by the
/// slot's mutex. All updates are O(1), so contention between concurrent
/// searches stays cheap.
pub(crate) struct ProviderHealth {
    pub(crate) consecutive_errors: u32,
    pub(crate) last_error_at: Option<Instant>,
    /// Earliest instant the next call may start (pacing + backoff).
    pub(crate) next_allowed_at: Option<Instant>,
    /// Set on auth failure; stays set for the remainder of the process run.
    pub(crate) disabled: bool,
    pub(crate) circuit: CircuitBreaker,
}

/// Registry entry: health record plus the per-provider in-flight lock that
/// serializes outgoing calls.
pub(crate) struct ProviderSlot {
    health: Mutex<ProviderHealth>,
    pub(crate) call_lock: tokio::sync::Mutex<()>,
}

impl ProviderSlot {
    fn new(circuit: CircuitConfig) -> Self {
        Self {
            health: Mutex::new(ProviderHealth {
                consecutive_errors: 0,
                last_error_at: None,
                next_allowed_at: None,
                disabled: false,
                circuit: CircuitBreaker::new(circuit),
            }),
            call_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Locks the health record, recovering from a poisoned mutex; health
    /// updates are plain counter writes and cannot leave the record in an
    /// inconsistent state.
    pub(crate) fn health(&self) -> MutexGuard<'_, ProviderHealth> {
        self.health.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read-only view of one provider's health, for diagnostics surfaces.
#[derive(Debug, Clone)]
pub struct ProviderHealthSnapshot {
    pub provider: ProviderId,
    pub consecutive_errors: u32,
    pub circuit_state: CircuitState,
    pub disabled: bool,
    /// Time since the most recent recorded failure, if any.
    pub last_error_age: Option<Duration>,
    /// Time remaining until the next call is allowed, if currently paced.
    pub retry_in: Option<Duration>,
}

/// Shared map of provider id to health slot.
pub struct ProviderRegistry {
    circuit: CircuitConfig,
    slots: Mutex<HashMap<ProviderId, Arc<ProviderSlot>>>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new(circuit: CircuitConfig) -> Self {
        Self {
            circuit,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the slot for `provider`, creating it on first use.
    pub(crate) fn slot(&self, provider: ProviderId) -> Arc<ProviderSlot> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            slots
                .entry(provider)
                .or_insert_with(|| Arc::new(ProviderSlot::new(self.circuit))),
        )
    }

    /// Snapshot of every provider seen so far, sorted by id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ProviderHealthSnapshot> {
        let now = Instant::now();
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let mut out: Vec<ProviderHealthSnapshot> = slots
            .iter()
            .map(|(provider, slot)| {
                let health = slot.health();
                ProviderHealthSnapshot {
                    provider: *provider,
                    consecutive_errors: health.consecutive_errors,
                    circuit_state: health.circuit.state(),
                    disabled: health.disabled,
                    last_error_age: health
                        .last_error_at
                        .map(|at| now.saturating_duration_since(at)),
                    retry_in: health.next_allowed_at.and_then(|at| {
                        let wait = at.saturating_duration_since(now);
                        (wait > Duration::ZERO).then_some(wait)
                    }),
                }
            })
            .collect();
        out.sort_by_key(|s| s.provider);
        out
    }
}
