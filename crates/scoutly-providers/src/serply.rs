//! HTTP client for the Serply web-search API.
//!
//! Serply returns a flat `results` array and authenticates with an
//! `X-Api-Key` header. Queries are passed as a percent-encoded `q`
//! parameter.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Url};
use serde::Deserialize;

use scoutly_core::ProviderId;

use crate::error::{error_for_status, retry_after_secs, ProviderError};
use crate::provider::{QueryStyle, SearchProvider};
use crate::types::RawHit;

const DEFAULT_BASE_URL: &str = "https://api.serply.io/";

/// Results requested per query. Discovery never needs more than one page.
const RESULT_COUNT: u32 = 20;

/// Client for the Serply search API.
///
/// Use [`SerplyClient::new`] for production or
/// [`SerplyClient::with_base_url`] to point at a mock server in tests.
pub struct SerplyClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl SerplyClient {
    pub const ID: ProviderId = ProviderId::new("serply");

    /// Creates a new client pointed at the production Serply API.
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
        url.set_path("v1/search");
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("num", &RESULT_COUNT.to_string());
        url
    }
}

#[async_trait]
impl SearchProvider for SerplyClient {
    fn id(&self) -> ProviderId {
        Self::ID
    }

    /// Serply treats quoted phrases as exact-match requirements.
    fn query_style(&self) -> QueryStyle {
        QueryStyle::QuotedPhrase
    }

    async fn search(&self, query: &str) -> Result<Vec<RawHit>, ProviderError> {
        let url = self.search_url(query);
        let response = self
            .client
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if let Some(err) = error_for_status(Self::ID, status, retry_after_secs(response.headers()))
        {
            return Err(err);
        }

        let body = response.text().await?;
        let parsed: SerplyResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
                context: format!("serply search(q={query})"),
                source: e,
            })?;

        Ok(parsed.to_raw_hits())
    }
}

#[derive(Debug, Deserialize)]
struct SerplyResponse {
    #[serde(default)]
    results: Vec<SerplyResult>,
}

#[derive(Debug, Deserialize)]
struct SerplyResult {
    #[serde(default)]
    title: String,
    link: Option<String>,
    #[serde(default)]
    description: String,
}

impl SerplyResponse {
    /// Normalizes the Serply shape into [`RawHit`]s, dropping entries
    /// without a link.
    fn to_raw_hits(self) -> Vec<RawHit> {
        let discovered_at = Utc::now();
        self.results
            .into_iter()
            .filter_map(|r| {
                let link = r.link?;
                if link.is_empty() {
                    return None;
                }
                Some(RawHit {
                    provider: SerplyClient::ID,
                    title: r.title,
                    link,
                    snippet: r.description,
                    discovered_at,
                })
            })
            .collect()
    }
}
