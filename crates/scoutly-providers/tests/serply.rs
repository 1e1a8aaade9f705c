//! Integration tests for `SerplyClient` using wiremock HTTP mocks.

use scoutly_providers::{ProviderError, SearchProvider, SerplyClient};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> SerplyClient {
    SerplyClient::with_base_url("test-key", 30, "scoutly-test/0", base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn search_returns_normalized_hits() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "results": [
            {
                "title": "Laura Fit (@laurafit) • Instagram",
                "link": "https://www.instagram.com/laurafit/",
                "description": "Fitness coach in Madrid"
            },
            {
                "title": "Carlos Lifts",
                "link": "https://www.instagram.com/carloslifts",
                "description": "Strength training"
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("q", "fitness instagram"))
        .and(header("X-Api-Key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let hits = client
        .search("fitness instagram")
        .await
        .expect("should parse hits");

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].provider, SerplyClient::ID);
    assert_eq!(hits[0].link, "https://www.instagram.com/laurafit/");
    assert_eq!(hits[1].snippet, "Strength training");
}

#[tokio::test]
async fn empty_results_are_a_successful_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
        .mount(&server)
        .await;

    let hits = test_client(&server.uri()).search("anything").await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn http_429_maps_to_rate_limited_with_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "17"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .search("q")
        .await
        .expect_err("429 must be an error");
    assert!(
        matches!(
            err,
            ProviderError::RateLimited {
                retry_after_secs: Some(17),
                ..
            }
        ),
        "expected RateLimited with Retry-After, got: {err:?}"
    );
}

#[tokio::test]
async fn http_401_maps_to_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).search("q").await.unwrap_err();
    assert!(
        matches!(err, ProviderError::AuthFailure { status: 401, .. }),
        "expected AuthFailure, got: {err:?}"
    );
}

#[tokio::test]
async fn http_503_maps_to_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).search("q").await.unwrap_err();
    assert!(
        matches!(err, ProviderError::Transient { status: 503, .. }),
        "expected Transient, got: {err:?}"
    );
    assert!(err.is_retriable());
}

#[tokio::test]
async fn http_404_maps_to_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).search("q").await.unwrap_err();
    assert!(
        matches!(err, ProviderError::UnexpectedStatus { status: 404, .. }),
        "expected UnexpectedStatus, got: {err:?}"
    );
    assert!(!err.is_retriable());
}

#[tokio::test]
async fn undecodable_body_maps_to_deserialize() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).search("q").await.unwrap_err();
    assert!(
        matches!(err, ProviderError::Deserialize { .. }),
        "expected Deserialize, got: {err:?}"
    );
    assert!(err.is_retriable(), "undecodable payloads are retried");
}
