//! Integration tests for `SearchClient` using wiremock HTTP mocks.

use sdgpulse_search::{SearchClient, SearchError};
use wiremock::matchers::{header, method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str, max_retries: u32) -> SearchClient {
    SearchClient::with_base_url(
        Some("test-token"),
        30,
        "sdgpulse-test/0.1",
        0,
        max_retries,
        0,
        base_url,
    )
    .expect("client construction should not fail")
}

fn page_body() -> serde_json::Value {
    serde_json::json!({
        "data": [
            {
                "id": "1790000000000000101",
                "text": "Clean water access is expanding in rural areas",
                "created_at": "2026-05-11T09:15:00.000Z",
                "lang": "en"
            },
            {
                "id": "1790000000000000102",
                "text": "حملة جديدة لمحو الأمية في القرى",
                "created_at": "2026-05-11T09:16:00.000Z",
                "lang": "ar"
            }
        ],
        "meta": { "next_token": "b26v89c19zqg8o3f", "result_count": 2 }
    })
}

#[tokio::test]
async fn fetch_page_returns_posts_and_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("query", "(water) (jordan) lang:en -is:retweet"))
        .and(query_param("max_results", "100"))
        .and(query_param("tweet.fields", "created_at,lang"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body()))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 0);
    let page = client
        .fetch_page("(water) (jordan) lang:en -is:retweet", 100, None, None)
        .await
        .expect("should parse page");

    assert_eq!(page.posts.len(), 2);
    assert_eq!(page.posts[0].id, "1790000000000000101");
    assert_eq!(page.posts[1].lang.as_deref(), Some("ar"));
    assert_eq!(page.next_token.as_deref(), Some("b26v89c19zqg8o3f"));
    assert_eq!(page.result_count, 2);
}

#[tokio::test]
async fn fetch_page_passes_since_id_and_next_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("since_id", "1790000000000000100"))
        .and(query_param("next_token", "tok1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 0);
    client
        .fetch_page("q", 100, Some(1_790_000_000_000_000_100), Some("tok1"))
        .await
        .expect("should parse page");
}

#[tokio::test]
async fn fetch_page_sends_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 0);
    client
        .fetch_page("q", 100, None, None)
        .await
        .expect("should parse page");
}

#[tokio::test]
async fn empty_page_has_no_posts_and_no_cursor() {
    let server = MockServer::start().await;

    let body = serde_json::json!({ "meta": { "result_count": 0 } });
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 0);
    let page = client
        .fetch_page("q", 100, None, None)
        .await
        .expect("empty page should parse");

    assert!(page.is_empty());
    assert!(page.next_token.is_none());
    assert_eq!(page.result_count, 0);
}

#[tokio::test]
async fn auth_failure_is_fatal_and_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 3);
    let err = client
        .fetch_page("q", 100, None, None)
        .await
        .expect_err("401 should fail");

    assert!(matches!(err, SearchError::Auth { status: 401 }));
    let requests = server.received_requests().await.expect("requests recorded");
    assert_eq!(requests.len(), 1, "auth errors must not be retried");
}

#[tokio::test]
async fn rate_limited_is_retried_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body()))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 2);
    let page = client
        .fetch_page("q", 100, None, None)
        .await
        .expect("should succeed after one 429");

    assert_eq!(page.posts.len(), 2);
}

#[tokio::test]
async fn rate_limit_exhaustion_surfaces_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 1);
    let err = client
        .fetch_page("q", 100, None, None)
        .await
        .expect_err("persistent 429 should fail");

    assert!(matches!(
        err,
        SearchError::RateLimited { retry_after_secs: 0 }
    ));
    let requests = server.received_requests().await.expect("requests recorded");
    assert_eq!(requests.len(), 2, "one initial attempt plus one retry");
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body()))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 2);
    let page = client
        .fetch_page("q", 100, None, None)
        .await
        .expect("should succeed after one 503");

    assert_eq!(page.posts.len(), 2);
}

#[tokio::test]
async fn unexpected_status_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 3);
    let err = client
        .fetch_page("q", 100, None, None)
        .await
        .expect_err("400 should fail");

    assert!(matches!(err, SearchError::UnexpectedStatus { status: 400, .. }));
    let requests = server.received_requests().await.expect("requests recorded");
    assert_eq!(requests.len(), 1, "client errors must not be retried");
}

#[tokio::test]
async fn malformed_body_is_retried_then_surfaces() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 1);
    let err = client
        .fetch_page("q", 100, None, None)
        .await
        .expect_err("non-JSON body should fail");

    assert!(matches!(err, SearchError::Deserialize { .. }));
    let requests = server.received_requests().await.expect("requests recorded");
    assert_eq!(requests.len(), 2, "truncated pages get one re-fetch here");
}

#[tokio::test]
async fn verify_credentials_accepts_ok_probe() {
    let server = MockServer::start().await;

    let body = serde_json::json!({ "meta": { "result_count": 0 } });
    Mock::given(method("GET"))
        .and(query_param("max_results", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 0);
    client
        .verify_credentials()
        .await
        .expect("probe should pass");
}

#[tokio::test]
async fn verify_credentials_rejects_bad_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 3);
    let err = client
        .verify_credentials()
        .await
        .expect_err("403 should fail");

    assert!(matches!(err, SearchError::Auth { status: 403 }));
}
