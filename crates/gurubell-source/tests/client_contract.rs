//! Contract tests for the search endpoint client.
//!
//! These tests verify the request shape (path, query, headers) and how
//! success and failure responses are turned into `RawResponse`/`RequestError`.

use gurubell_core::{BearerToken, SourceConfig};
use gurubell_source::{CategoryFilter, GuruClient, JobSource};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GuruClient {
    let config = SourceConfig {
        base_url: server.uri(),
        ..SourceConfig::default()
    };
    GuruClient::new(&config).expect("create client")
}

fn token() -> BearerToken {
    BearerToken::new("test-token").expect("valid token")
}

fn search_body() -> serde_json::Value {
    json!({
        "Data": {
            "Results": [
                {
                    "ProjectID": 101,
                    "Title": "Rust backend",
                    "CategoryName": "Programming & Development",
                    "DatePosted": "1700000000000",
                    "Skills": ["Rust"],
                    "TotalApplied": 3,
                    "SeoUrl": "rust-backend/101"
                },
                {
                    "ProjectID": 102,
                    "Title": "Logo design",
                    "CategoryName": "Design & Art"
                }
            ]
        }
    })
}

#[tokio::test]
async fn test_request_shape() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search/job"))
        .and(query_param("Category.Id", "1"))
        .and(query_param("SortOrder", "recent"))
        .and(query_param("Page", "1"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .expect(1)
        .mount(&server)
        .await;

    let raw = client_for(&server)
        .fetch_jobs(&token())
        .await
        .expect("fetch should succeed");

    assert_eq!(raw.results.len(), 2);
    assert_eq!(raw.results[0].project_id.as_str(), "101");
}

#[tokio::test]
async fn test_results_filter_to_category() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search/job"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .mount(&server)
        .await;

    let raw = client_for(&server).fetch_jobs(&token()).await.expect("fetch");
    let jobs = CategoryFilter::from_config(&SourceConfig::default()).apply(raw.results);

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].title, "Rust backend");
}

#[tokio::test]
async fn test_unauthorized_carries_status_and_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search/job"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Token expired"})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_jobs(&token())
        .await
        .expect_err("401 should fail");

    assert_eq!(err.status_code, Some(401));
    assert_eq!(err.message, "Token expired");
}

#[tokio::test]
async fn test_server_error_uses_body_text() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search/job"))
        .respond_with(ResponseTemplate::new(500).set_body_string("server error"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_jobs(&token())
        .await
        .expect_err("500 should fail");

    assert_eq!(err.status_code, Some(500));
    assert_eq!(err.message, "server error");
}

#[tokio::test]
async fn test_malformed_body_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search/job"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_jobs(&token())
        .await
        .expect_err("html body should fail");

    assert_eq!(err.status_code, Some(200));
    assert!(err.message.starts_with("malformed response"));
}

#[tokio::test]
async fn test_null_fields_do_not_fail_the_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search/job"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Data": {
                "Results": [
                    {
                        "ProjectID": 201,
                        "Title": null,
                        "Description": null,
                        "CategoryName": "Programming & Development",
                        "TotalApplied": null
                    },
                    {
                        "ProjectID": 202,
                        "Title": "CLI in Rust",
                        "CategoryName": null
                    }
                ]
            }
        })))
        .mount(&server)
        .await;

    let raw = client_for(&server).fetch_jobs(&token()).await.expect("fetch");
    assert_eq!(raw.results.len(), 2);
    assert!(raw.results[0].title.is_empty());
    assert_eq!(raw.results[0].total_applied, 0);
    assert!(raw.results[1].category_name.is_empty());

    let jobs = CategoryFilter::from_config(&SourceConfig::default()).apply(raw.results);
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].project_id.as_str(), "201");
}

#[tokio::test]
async fn test_missing_results_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search/job"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Data": {}})))
        .mount(&server)
        .await;

    let raw = client_for(&server).fetch_jobs(&token()).await.expect("fetch");
    assert!(raw.results.is_empty());
}

#[tokio::test]
async fn test_transport_failure_has_no_status() {
    // Nothing listens on the discard port of localhost.
    let config = SourceConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout_secs: 2,
        ..SourceConfig::default()
    };
    let client = GuruClient::new(&config).expect("create client");

    let err = client.fetch_jobs(&token()).await.expect_err("no server");
    assert_eq!(err.status_code, None);
    assert_eq!(err.status_or_zero(), 0);
}
