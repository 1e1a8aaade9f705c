use scoutly_core::ProviderId;
use thiserror::Error;

/// Errors produced by provider calls and the queueing layer around them.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 429. `retry_after_secs` carries the server's `Retry-After`
    /// header when present.
    #[error("rate limited by {provider}")]
    RateLimited {
        provider: ProviderId,
        retry_after_secs: Option<u64>,
    },

    /// HTTP 401/403. The provider is disabled for the remainder of the
    /// process run.
    #[error("authentication failure from {provider} (status {status})")]
    AuthFailure { provider: ProviderId, status: u16 },

    /// HTTP 502/503/504, a transient upstream failure.
    #[error("transient upstream error from {provider} (status {status})")]
    Transient { provider: ProviderId, status: u16 },

    /// Any other non-2xx status.
    #[error("unexpected HTTP status {status} from {provider}")]
    UnexpectedStatus { provider: ProviderId, status: u16 },

    /// The provider returned a 2xx response carrying an in-band error
    /// envelope (e.g. `"error": "..."` in the body).
    #[error("{provider} API error: {message}")]
    Api { provider: ProviderId, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("undecodable response for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The provider's circuit breaker is open; no call was attempted.
    #[error("circuit open for {provider}")]
    CircuitOpen { provider: ProviderId },

    /// The provider was disabled by an earlier auth failure.
    #[error("{provider} is disabled for this process run")]
    Disabled { provider: ProviderId },

    /// The search was cancelled or its scope closed before the call's
    /// outcome could be observed.
    #[error("call cancelled")]
    Cancelled,
}

/// Coarse classification driving retry and health-recording decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Retry after backoff; counts against the provider's error streak.
    RateLimited,
    /// Retry up to the bounded attempt count; counts against the streak.
    Transient,
    /// Never retried. Auth failures additionally disable the provider.
    Fatal,
    /// No call was attempted; treated as provider-unavailable.
    CircuitOpen,
    /// Outcome must not be counted for or against the provider.
    Cancelled,
}

impl ProviderError {
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            ProviderError::RateLimited { .. } => ErrorClass::RateLimited,
            // Undecodable payloads are retried: SERP backends under load
            // intermittently return truncated bodies that succeed on the
            // next attempt.
            ProviderError::Http(_)
            | ProviderError::Transient { .. }
            | ProviderError::Deserialize { .. } => ErrorClass::Transient,
            ProviderError::AuthFailure { .. }
            | ProviderError::UnexpectedStatus { .. }
            | ProviderError::Api { .. }
            | ProviderError::Disabled { .. } => ErrorClass::Fatal,
            ProviderError::CircuitOpen { .. } => ErrorClass::CircuitOpen,
            ProviderError::Cancelled => ErrorClass::Cancelled,
        }
    }

    /// `true` for errors worth another attempt after backoff.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.class(),
            ErrorClass::RateLimited | ErrorClass::Transient
        )
    }
}

/// Maps a non-2xx HTTP status to the matching [`ProviderError`].
///
/// Returns `None` for 2xx statuses.
pub(crate) fn error_for_status(
    provider: ProviderId,
    status: reqwest::StatusCode,
    retry_after_secs: Option<u64>,
) -> Option<ProviderError> {
    if status.is_success() {
        return None;
    }
    let code = status.as_u16();
    Some(match code {
        401 | 403 => ProviderError::AuthFailure {
            provider,
            status: code,
        },
        429 => ProviderError::RateLimited {
            provider,
            retry_after_secs,
        },
        502..=504 => ProviderError::Transient {
            provider,
            status: code,
        },
        _ => ProviderError::UnexpectedStatus {
            provider,
            status: code,
        },
    })
}

/// Extracts an integral `Retry-After` header value in seconds.
pub(crate) fn retry_after_secs(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
}
