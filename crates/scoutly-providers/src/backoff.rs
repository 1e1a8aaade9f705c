//! Exponential backoff policy for provider error streaks.
//!
//! The policy is an explicit function from a provider's consecutive-error
//! count to a jittered delay, owned by the [`crate::RequestQueue`]. Waiting
//! out a delay is a scheduler-level sleep on the provider's own queue, so
//! searches against other providers are unaffected.

use std::time::Duration;

/// Hard ceiling on any computed backoff delay.
const MAX_DELAY_MS: u64 = 60_000;

/// Backoff schedule `base * 2^min(consecutive_errors - 1, cap)` with
/// ±25% jitter.
///
/// | Consecutive errors | Delay (base 1 000 ms, cap 6) |
/// |--------------------|------------------------------|
/// | 1                  | 1 000 ms × 2⁰ ± 25 %         |
/// | 2                  | 1 000 ms × 2¹ ± 25 %         |
/// | 7+                 | 1 000 ms × 2⁶ ± 25 %         |
///
/// Delays never exceed 60 s regardless of configuration.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub base_ms: u64,
    /// Cap on the exponent, bounding worst-case delay growth.
    pub exponent_cap: u32,
}

impl BackoffPolicy {
    #[must_use]
    pub fn new(base_ms: u64, exponent_cap: u32) -> Self {
        Self {
            base_ms,
            exponent_cap,
        }
    }

    /// Delay before the provider may be called again after its
    /// `consecutive_errors`-th consecutive failure.
    #[must_use]
    pub fn delay_for(&self, consecutive_errors: u32) -> Duration {
        if consecutive_errors == 0 {
            return Duration::ZERO;
        }
        let exponent = (consecutive_errors - 1).min(self.exponent_cap).min(62);
        let computed = self.base_ms.saturating_mul(1u64 << exponent);
        let capped = computed.min(MAX_DELAY_MS);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
        Duration::from_millis(jittered)
    }
}
