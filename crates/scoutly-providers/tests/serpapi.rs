//! Integration tests for `SerpApiClient` using wiremock HTTP mocks.

use scoutly_providers::{ProviderError, SearchProvider, SerpApiClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> SerpApiClient {
    SerpApiClient::with_base_url("test-key", 30, "scoutly-test/0", base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn search_returns_normalized_hits() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "search_metadata": { "status": "Success" },
        "organic_results": [
            {
                "position": 1,
                "title": "Ana Trains (@anatrains) | TikTok",
                "link": "https://www.tiktok.com/@anatrains",
                "snippet": "Workout videos from Barcelona"
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google"))
        .and(query_param("q", "fitness tiktok"))
        .and(query_param("api_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let hits = test_client(&server.uri())
        .search("fitness tiktok")
        .await
        .expect("should parse hits");

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].provider, SerpApiClient::ID);
    assert_eq!(hits[0].link, "https://www.tiktok.com/@anatrains");
    assert_eq!(hits[0].title, "Ana Trains (@anatrains) | TikTok");
}

#[tokio::test]
async fn in_band_error_envelope_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": "Google hasn't returned any results for this query."
        })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).search("q").await.unwrap_err();
    assert!(
        matches!(err, ProviderError::Api { .. }),
        "expected Api error, got: {err:?}"
    );
    assert!(!err.is_retriable());
}

#[tokio::test]
async fn http_403_maps_to_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).search("q").await.unwrap_err();
    assert!(
        matches!(err, ProviderError::AuthFailure { status: 403, .. }),
        "expected AuthFailure, got: {err:?}"
    );
}

#[tokio::test]
async fn http_502_maps_to_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).search("q").await.unwrap_err();
    assert!(
        matches!(err, ProviderError::Transient { status: 502, .. }),
        "expected Transient, got: {err:?}"
    );
}

#[tokio::test]
async fn http_429_maps_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).search("q").await.unwrap_err();
    assert!(
        matches!(
            err,
            ProviderError::RateLimited {
                retry_after_secs: None,
                ..
            }
        ),
        "expected RateLimited without Retry-After, got: {err:?}"
    );
}
