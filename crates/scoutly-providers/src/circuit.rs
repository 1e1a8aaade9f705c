//! Per-provider circuit breaker.
//!
//! Pure state machine: the clock is injected as `Instant` values so tests
//! drive transitions without sleeping. Admission is evaluated before every
//! call; an open breaker rejects without the call ever being enqueued.

use std::time::{Duration, Instant};

/// Circuit breaker configuration shared by all providers in a registry.
#[derive(Debug, Clone, Copy)]
pub struct CircuitConfig {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,
    /// How long an open circuit rejects calls before admitting one trial.
    pub cooldown: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls pass through.
    Closed,
    /// Calls are short-circuited until the cool-down elapses.
    Open,
    /// One trial call is in flight; its outcome decides the next state.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Per-provider breaker tracking the failure streak's effect on admission.
///
/// The consecutive-error count itself lives in the provider's health record
/// (it also drives backoff); the breaker receives it on each failure.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitConfig,
    state: CircuitState,
    opened_at: Option<Instant>,
    /// Set while the single HalfOpen trial call is outstanding.
    trial_in_flight: bool,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(config: CircuitConfig) -> Self {
        Self {
            config,
            state: CircuitState::Closed,
            opened_at: None,
            trial_in_flight: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.state
    }

    /// Decides whether a call starting at `now` may proceed.
    ///
    /// Open circuits transition to `HalfOpen` once the cool-down has
    /// elapsed, admitting exactly one trial; concurrent callers are
    /// rejected until the trial settles.
    pub fn try_admit(&mut self, now: Instant) -> bool {
        match self.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let elapsed = self
                    .opened_at
                    .map_or(Duration::MAX, |opened| now.saturating_duration_since(opened));
                if elapsed >= self.config.cooldown {
                    self.state = CircuitState::HalfOpen;
                    self.trial_in_flight = true;
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                if self.trial_in_flight {
                    false
                } else {
                    self.trial_in_flight = true;
                    true
                }
            }
        }
    }

    /// Records a successful call. A HalfOpen trial success closes the
    /// circuit.
    pub fn on_success(&mut self) {
        self.state = CircuitState::Closed;
        self.opened_at = None;
        self.trial_in_flight = false;
    }

    /// Records a failed call. `consecutive_errors` is the provider's
    /// updated streak including this failure.
    ///
    /// A HalfOpen trial failure re-opens the circuit and restarts the
    /// cool-down; a Closed circuit opens once the streak reaches the
    /// threshold.
    pub fn on_failure(&mut self, now: Instant, consecutive_errors: u32) {
        match self.state {
            CircuitState::HalfOpen => {
                self.state = CircuitState::Open;
                self.opened_at = Some(now);
                self.trial_in_flight = false;
            }
            CircuitState::Closed => {
                if consecutive_errors >= self.config.failure_threshold {
                    self.state = CircuitState::Open;
                    self.opened_at = Some(now);
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Releases a HalfOpen trial reservation without counting its outcome,
    /// used when the call was cancelled mid-flight. The breaker stays
    /// HalfOpen so the next caller gets the trial slot.
    pub fn release_trial(&mut self) {
        self.trial_in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(threshold: u32, cooldown_ms: u64) -> CircuitBreaker {
        CircuitBreaker::new(CircuitConfig {
            failure_threshold: threshold,
            cooldown: Duration::from_millis(cooldown_ms),
        })
    }

    #[test]
    fn closed_circuit_admits_calls() {
        let mut cb = breaker(5, 1_000);
        assert!(cb.try_admit(Instant::now()));
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn opens_after_threshold_consecutive_failures() {
        let mut cb = breaker(5, 1_000);
        let now = Instant::now();
        for streak in 1..=4 {
            cb.on_failure(now, streak);
            assert_eq!(cb.state(), CircuitState::Closed, "streak {streak}");
        }
        cb.on_failure(now, 5);
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.try_admit(now), "open circuit must short-circuit calls");
    }

    #[test]
    fn admits_exactly_one_trial_after_cooldown() {
        let mut cb = breaker(1, 1_000);
        let t0 = Instant::now();
        cb.on_failure(t0, 1);
        assert_eq!(cb.state(), CircuitState::Open);

        let after_cooldown = t0 + Duration::from_millis(1_001);
        assert!(cb.try_admit(after_cooldown), "first caller gets the trial");
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        assert!(
            !cb.try_admit(after_cooldown),
            "second caller must wait for the trial to settle"
        );
    }

    #[test]
    fn trial_success_closes_and_trial_failure_reopens() {
        let mut cb = breaker(1, 1_000);
        let t0 = Instant::now();
        cb.on_failure(t0, 1);
        let t1 = t0 + Duration::from_millis(1_001);
        assert!(cb.try_admit(t1));
        cb.on_success();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.try_admit(t1), "closed circuit admits freely again");

        cb.on_failure(t1, 1);
        let t2 = t1 + Duration::from_millis(1_001);
        assert!(cb.try_admit(t2));
        cb.on_failure(t2, 1);
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(
            !cb.try_admit(t2 + Duration::from_millis(500)),
            "cool-down restarts after a failed trial"
        );
        assert!(cb.try_admit(t2 + Duration::from_millis(1_001)));
    }

    #[test]
    fn released_trial_frees_the_slot_without_state_change() {
        let mut cb = breaker(1, 1_000);
        let t0 = Instant::now();
        cb.on_failure(t0, 1);
        let t1 = t0 + Duration::from_millis(1_500);
        assert!(cb.try_admit(t1));
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        cb.release_trial();
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        assert!(cb.try_admit(t1), "released slot is available to the next caller");
    }
}
