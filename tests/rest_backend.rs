//! Integration tests for the table API client.
//!
//! These tests drive [`RestBackend`] against a mock PostgREST endpoint.

use eduverza_core::backend::{Backend, BackendError, BackendErrorKind, RestBackend};
use eduverza_core::resource::record;
use eduverza_core::{BackendConfig, Counter};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TABLE_PATH: &str = "/rest/v1/resources";
const ANON_KEY: &str = "test-anon-key";

fn backend_for(server: &MockServer) -> RestBackend {
    RestBackend::new(BackendConfig::new(server.uri(), ANON_KEY)).expect("client should build")
}

#[tokio::test]
async fn test_list_resources_sends_keys_and_orders_newest_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(query_param("select", "*"))
        .and(query_param("order", "created_at.desc"))
        .and(header("apikey", ANON_KEY))
        .and(header("authorization", "Bearer test-anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 2, "title": "Operating Systems Notes", "subject": "Operating Systems",
             "department": "Computer Science", "year": 3, "sem": 5, "type": "Notes",
             "views": 10, "downloads": 4},
            {"id": 1, "title": "DBMS Lab Record", "subject": "Database Systems",
             "department": "Computer Science", "year": 3, "sem": 6, "type": "Lab Records",
             "views": 3, "downloads": 1}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let rows = backend_for(&server).list_resources().await.unwrap();
    assert_eq!(rows.len(), 2);
    let first = record::from_row(&rows[0]);
    assert_eq!(first.id, "2");
    assert_eq!(first.title, "Operating Systems Notes");
    assert_eq!(first.downloads, 4);
}

#[tokio::test]
async fn test_get_resource_returns_none_when_no_row_matches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(query_param("id", "eq.99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let row = backend_for(&server).get_resource("99").await.unwrap();
    assert!(row.is_none());
}

#[tokio::test]
async fn test_get_resource_returns_matching_row() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(query_param("id", "eq.7"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 7, "title": "Compiler Design Papers", "downloads": 12}
        ])))
        .mount(&server)
        .await;

    let row = backend_for(&server).get_resource("7").await.unwrap().unwrap();
    let resource = record::from_row(&row);
    assert_eq!(resource.id, "7");
    assert_eq!(resource.downloads, 12);
    assert!(resource.description.is_none());
}

#[tokio::test]
async fn test_count_resources_reads_content_range_total() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path(TABLE_PATH))
        .and(header("prefer", "count=exact"))
        .respond_with(ResponseTemplate::new(200).insert_header("Content-Range", "0-24/42"))
        .mount(&server)
        .await;

    let count = backend_for(&server).count_resources().await.unwrap();
    assert_eq!(count, 42);
}

#[tokio::test]
async fn test_count_resources_without_header_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = backend_for(&server).count_resources().await.unwrap_err();
    assert_eq!(err.kind(), BackendErrorKind::Decode);
}

#[tokio::test]
async fn test_download_counts_selects_only_downloads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(query_param("select", "downloads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"downloads": 100}, {"downloads": 200}, {"downloads": null}
        ])))
        .mount(&server)
        .await;

    let rows = backend_for(&server).download_counts().await.unwrap();
    let total: u64 = rows.iter().map(record::downloads_of).sum();
    assert_eq!(total, 300);
}

#[tokio::test]
async fn test_insert_resource_returns_stored_representation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .and(header("prefer", "return=representation"))
        .and(body_json(json!([{"title": "Signals Notes"}])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {"id": 31, "title": "Signals Notes", "views": 0, "downloads": 0}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let stored = backend_for(&server)
        .insert_resource(json!({"title": "Signals Notes"}))
        .await
        .unwrap();
    assert_eq!(record::id_of(&stored).as_deref(), Some("31"));
}

#[tokio::test]
async fn test_increment_reads_then_writes_next_value() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(query_param("select", "views"))
        .and(query_param("id", "eq.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"views": 41}])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(TABLE_PATH))
        .and(query_param("id", "eq.5"))
        .and(body_json(json!({"views": 42})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    backend_for(&server)
        .increment("5", Counter::Views)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_increment_missing_row_does_not_write() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .increment("404", Counter::Downloads)
        .await
        .unwrap_err();
    assert_eq!(err, BackendError::MissingRow { id: "404".to_string() });
}

#[tokio::test]
async fn test_rejected_request_passes_backend_message_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Invalid API key",
            "hint": "Double check your anon key"
        })))
        .mount(&server)
        .await;

    let err = backend_for(&server).list_resources().await.unwrap_err();
    assert_eq!(err.kind(), BackendErrorKind::Rejected);
    match err {
        BackendError::Rejected { status, message, .. } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid API key (hint: Double check your anon key)");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // Nothing listens on port 1.
    let backend = RestBackend::new(BackendConfig::new("http://127.0.0.1:1", ANON_KEY)).unwrap();
    let err = backend.list_resources().await.unwrap_err();
    assert_eq!(err.kind(), BackendErrorKind::Network);
}
