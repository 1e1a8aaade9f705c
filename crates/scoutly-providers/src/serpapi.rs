//! HTTP client for the SerpApi Google-results API.
//!
//! SerpApi nests hits under `organic_results`, authenticates with an
//! `api_key` query parameter, and can return HTTP 200 carrying an in-band
//! `error` field, surfaced here as [`ProviderError::Api`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Url};
use serde::Deserialize;

use scoutly_core::ProviderId;

use crate::error::{error_for_status, retry_after_secs, ProviderError};
use crate::provider::SearchProvider;
use crate::types::RawHit;

const DEFAULT_BASE_URL: &str = "https://serpapi.com/";

const RESULT_COUNT: u32 = 20;

/// Client for the SerpApi search API.
///
/// Use [`SerpApiClient::new`] for production or
/// [`SerpApiClient::with_base_url`] to point at a mock server in tests.
pub struct SerpApiClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl SerpApiClient {
    pub const ID: ProviderId = ProviderId::new("serpapi");

    /// Creates a new client pointed at the production SerpApi endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with
    /// wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ProviderError::Api`] if `base_url` is
    /// not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise to exactly one trailing slash; the search path is set
        // per request.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ProviderError::Api {
            provider: Self::ID,
            message: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    fn search_url(&self, query: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("search.json");
        url.query_pairs_mut()
            .append_pair("engine", "google")
            .append_pair("q", query)
            .append_pair("num", &RESULT_COUNT.to_string())
            .append_pair("api_key", &self.api_key);
        url
    }
}

#[async_trait]
impl SearchProvider for SerpApiClient {
    fn id(&self) -> ProviderId {
        Self::ID
    }

    async fn search(&self, query: &str) -> Result<Vec<RawHit>, ProviderError> {
        let url = self.search_url(query);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if let Some(err) = error_for_status(Self::ID, status, retry_after_secs(response.headers()))
        {
            return Err(err);
        }

        let body = response.text().await?;
        let parsed: SerpApiResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
                context: format!("serpapi search(q={query})"),
                source: e,
            })?;

        if let Some(message) = parsed.error {
            return Err(ProviderError::Api {
                provider: Self::ID,
                message,
            });
        }

        Ok(parsed.to_raw_hits())
    }
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    error: Option<String>,
    #[serde(default)]
    organic_results: Vec<SerpApiResult>,
}

#[derive(Debug, Deserialize)]
struct SerpApiResult {
    #[serde(default)]
    title: String,
    link: Option<String>,
    #[serde(default)]
    snippet: String,
}

impl SerpApiResponse {
    /// Normalizes the SerpApi shape into [`RawHit`]s, dropping entries
    /// without a link.
    fn to_raw_hits(self) -> Vec<RawHit> {
        let discovered_at = Utc::now();
        self.organic_results
            .into_iter()
            .filter_map(|r| {
                let link = r.link?;
                if link.is_empty() {
                    return None;
                }
                Some(RawHit {
                    provider: SerpApiClient::ID,
                    title: r.title,
                    link,
                    snippet: r.snippet,
                    discovered_at,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> SerpApiClient {
        SerpApiClient::with_base_url("test-key", 30, "scoutly-test/0", base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn search_url_carries_engine_query_and_key() {
        let client = test_client("https://serpapi.com");
        let url = client.search_url("fitness instagram spain");
        let s = url.as_str();
        assert!(s.starts_with("https://serpapi.com/search.json?"));
        assert!(s.contains("engine=google"));
        assert!(s.contains("api_key=test-key"));
        assert!(
            s.contains("q=fitness+instagram+spain") || s.contains("q=fitness%20instagram%20spain")
        );
    }

    #[test]
    fn organic_results_normalize_to_raw_hits() {
        let parsed: SerpApiResponse = serde_json::from_value(serde_json::json!({
            "organic_results": [
                { "title": "A", "link": "https://tiktok.com/@a", "snippet": "sa" },
                { "title": "no link", "snippet": "x" }
            ]
        }))
        .unwrap();
        let hits = parsed.to_raw_hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].provider, SerpApiClient::ID);
        assert_eq!(hits[0].snippet, "sa");
    }

    #[test]
    fn in_band_error_field_parses() {
        let parsed: SerpApiResponse =
            serde_json::from_str(r#"{"error": "Invalid API key"}"#).unwrap();
        assert_eq!(parsed.error.as_deref(), Some("Invalid API key"));
        assert!(parsed.organic_results.is_empty());
    }
}
