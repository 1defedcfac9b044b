//! Tests for the export module

use super::*;
use crate::auth::Token;
use crate::error::Error;
use crate::http::{HttpClient, HttpClientConfig, Transport};
use crate::normalize::Normalizer;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EXPORT_ID: &str = "ce45a7a1-f19d-4ce2-882c-a3c795940a7d";

fn token() -> Token {
    Token::new("tok", None)
}

fn window() -> FilterWindow {
    FilterWindow::new("2024-01-01T00:00:00Z", "2024-01-31T00:00:00Z").unwrap()
}

fn driver(server: &MockServer, max_attempts: u32) -> BulkExportDriver {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .max_retries(0)
        .no_rate_limit()
        .build();
    let transport: Arc<dyn Transport> = Arc::new(HttpClient::new(config).unwrap());
    BulkExportDriver::new(
        transport,
        ExportConfig::new().with_poll(Duration::from_millis(5), max_attempts),
    )
}

fn status_body(status: &str) -> Value {
    json!({
        "success": true,
        "result": [{"exportId": EXPORT_ID, "format": "CSV", "status": status}]
    })
}

async fn mount_create_and_enqueue(server: &MockServer, enqueue_status: &str) {
    Mock::given(method("POST"))
        .and(path("/bulk/v1/leads/export/create.json"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("Created")))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/enqueue.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body(enqueue_status)))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_status_sequence(server: &MockServer, statuses: &[&str]) {
    for status in statuses {
        Mock::given(method("GET"))
            .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/status.json")))
            .respond_with(ResponseTemplate::new(200).set_body_json(status_body(status)))
            .up_to_n_times(1)
            .expect(1)
            .mount(server)
            .await;
    }
}

// ============================================================================
// Types
// ============================================================================

#[test_case("Created", ExportStatus::Created, false)]
#[test_case("Queued", ExportStatus::Queued, false)]
#[test_case("Processing", ExportStatus::Processing, false)]
#[test_case("Completed", ExportStatus::Completed, true)]
#[test_case("Failed", ExportStatus::Failed, true)]
#[test_case("Cancelled", ExportStatus::Cancelled, true)]
fn test_status_parse(raw: &str, expected: ExportStatus, terminal: bool) {
    let status = ExportStatus::parse(raw);
    assert_eq!(status, expected);
    assert_eq!(status.is_terminal(), terminal);
    assert_eq!(status.to_string(), raw);
}

#[test]
fn test_unknown_status_is_not_terminal() {
    let status = ExportStatus::parse("Paused");
    assert_eq!(status, ExportStatus::Unknown("Paused".to_string()));
    assert!(!status.is_terminal());
}

#[test]
fn test_export_config_defaults() {
    let config = ExportConfig::default();
    assert_eq!(config.poll_interval, Duration::from_secs(5));
    assert_eq!(config.max_poll_attempts, 720);
}

#[test_case("2024-01-01T00:00:00Z", "2024-02-01T00:00:00Z", true ; "utc")]
#[test_case("2024-01-01T00:00:00", "2024-01-01T00:00:00", true ; "naive equal bounds")]
#[test_case("2024-01-01T00:00:00+02:00", "2024-01-01T00:00:00Z", true ; "offset")]
#[test_case("2024-02-01T00:00:00Z", "2024-01-01T00:00:00Z", false ; "reversed")]
#[test_case("yesterday", "2024-01-01T00:00:00Z", false ; "garbage")]
fn test_filter_window(start: &str, end: &str, ok: bool) {
    let result = FilterWindow::new(start, end);
    assert_eq!(result.is_ok(), ok);
    if let Err(err) = result {
        assert!(err.is_validation());
    }
}

// ============================================================================
// CSV
// ============================================================================

#[test]
fn test_second_line_after_header_is_discarded() {
    let text = "id,firstName,email\nDISCARDED,x,y\n1,Jo,jo@example.com\n2,Al,null\n";
    let table = parse_export(text, &Normalizer::default()).unwrap();

    assert_eq!(table.headers, vec!["id", "first_name", "email"]);
    assert_eq!(table.records.len(), 2);
    assert_eq!(table.records[0]["id"], "1");
    assert_eq!(table.records[0]["first_name"], "Jo");
    assert_eq!(table.records[1]["email"], "null");
}

#[test]
fn test_quoted_fields() {
    let text = "id,company,note\n_\n7,\"Acme, Inc.\",\"said \"\"hi\"\"\nthen left\"\r\n";
    let table = parse_export(text, &Normalizer::default()).unwrap();

    assert_eq!(table.records.len(), 1);
    assert_eq!(table.records[0]["company"], "Acme, Inc.");
    assert_eq!(table.records[0]["note"], "said \"hi\"\nthen left");
}

#[test]
fn test_short_rows_zip_to_present_columns() {
    let text = "id,email,company\n_\n1,a@b.c\n";
    let table = parse_export(text, &Normalizer::default()).unwrap();

    assert_eq!(table.records[0].len(), 2);
    assert!(table.records[0].get("company").is_none());
}

#[test]
fn test_empty_file() {
    let table = parse_export("", &Normalizer::default()).unwrap();
    assert!(table.headers.is_empty());
    assert!(table.records.is_empty());

    let table = parse_export("id,email\n", &Normalizer::default()).unwrap();
    assert_eq!(table.headers, vec!["id", "email"]);
    assert!(table.records.is_empty());
}

#[test]
fn test_colliding_headers_rejected() {
    let err = parse_export("leadStatus,Lead_Status\nskip\na,b\n", &Normalizer::default())
        .unwrap_err();
    assert!(matches!(err, Error::Normalization { .. }));
}

#[test]
fn test_split_rows_crlf() {
    let rows = split_rows("a,b\r\n1,2\r\n");
    assert_eq!(rows, vec![vec!["a", "b"], vec!["1", "2"]]);
}

// ============================================================================
// Driver
// ============================================================================

#[tokio::test]
async fn test_export_completes_after_three_polls() {
    let server = MockServer::start().await;
    mount_create_and_enqueue(&server, "Queued").await;
    mount_status_sequence(&server, &["Queued", "Processing", "Completed"]).await;

    Mock::given(method("GET"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/file.json")))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "id,firstName,email\n0,skip,skip\n1,Jo,jo@example.com\n2,Al,al@example.com\n",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let records = driver(&server, 10)
        .export_leads(
            &window(),
            Some(vec!["id".into(), "firstName".into(), "email".into()]),
            &token(),
        )
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["first_name"], "Al");
}

#[tokio::test]
async fn test_create_request_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bulk/v1/leads/export/create.json"))
        .and(body_partial_json(json!({
            "fields": ["id", "email"],
            "columnHeaderNames": {"id": "id", "email": "email"},
            "filter": {"updatedAt": {
                "startAt": "2024-01-01T00:00:00Z",
                "endAt": "2024-01-31T00:00:00Z"
            }},
            "format": "CSV"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("Created")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/enqueue.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("Completed")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/file.json")))
        .respond_with(ResponseTemplate::new(200).set_body_string("id,email\n"))
        .mount(&server)
        .await;

    let records = driver(&server, 1)
        .export_leads(&window(), Some(vec!["id".into(), "email".into()]), &token())
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_poll_bound_raises_export_timeout() {
    let server = MockServer::start().await;
    mount_create_and_enqueue(&server, "Queued").await;

    Mock::given(method("GET"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/status.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("Processing")))
        .expect(3)
        .mount(&server)
        .await;

    let err = driver(&server, 3)
        .export_leads(&window(), Some(vec!["id".into()]), &token())
        .await
        .unwrap_err();

    match err {
        Error::ExportTimeout {
            export_id,
            attempts,
        } => {
            assert_eq!(export_id, EXPORT_ID);
            assert_eq!(attempts, 3);
        }
        other => panic!("expected ExportTimeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_status_is_export_error() {
    let server = MockServer::start().await;
    mount_create_and_enqueue(&server, "Queued").await;
    mount_status_sequence(&server, &["Failed"]).await;

    let err = driver(&server, 10)
        .export_leads(&window(), Some(vec!["id".into()]), &token())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Export { .. }));
    assert!(err.to_string().contains("Failed"));
}

#[tokio::test]
async fn test_create_failure_is_export_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bulk/v1/leads/export/create.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "errors": [{"code": "1029", "message": "Export daily quota exceeded"}]
        })))
        .mount(&server)
        .await;

    let err = driver(&server, 10)
        .export_leads(&window(), Some(vec!["id".into()]), &token())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Export { .. }));
    assert!(err.to_string().contains("1029"));
}

#[tokio::test]
async fn test_describe_skips_fields_without_rest_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/leads/describe.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": [
                {"id": 1, "displayName": "Email", "rest": {"name": "email"}},
                {"id": 2, "displayName": "SOAP only", "soap": {"name": "Legacy"}},
                {"id": 3, "displayName": "First Name", "rest": {"name": "firstName", "readOnly": false}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fields = driver(&server, 1).describe_fields(&token()).await.unwrap();
    assert_eq!(fields, vec!["email", "firstName"]);
}

#[tokio::test]
async fn test_describe_sends_configured_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/leads/describe.json"))
        .and(query_param("partitionName", "Default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": [{"rest": {"name": "email"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut payload = crate::types::Payload::new();
    payload.insert("partitionName".to_string(), json!("Default"));

    let fields = driver(&server, 1)
        .with_payload(payload)
        .describe_fields(&token())
        .await
        .unwrap();
    assert_eq!(fields, vec!["email"]);
}

#[tokio::test]
async fn test_describe_used_when_no_fields_given() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/leads/describe.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": [{"rest": {"name": "email"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/bulk/v1/leads/export/create.json"))
        .and(body_partial_json(json!({"fields": ["email"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("Created")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/enqueue.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("Completed")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/file.json")))
        .respond_with(ResponseTemplate::new(200).set_body_string("email\n-\na@b.c\n"))
        .mount(&server)
        .await;

    let records = driver(&server, 1)
        .export_leads(&window(), None, &token())
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["email"], "a@b.c");
}

#[tokio::test]
async fn test_download_failure_is_export_error() {
    let server = MockServer::start().await;
    mount_create_and_enqueue(&server, "Completed").await;

    Mock::given(method("GET"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/file.json")))
        .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
        .mount(&server)
        .await;

    let err = driver(&server, 1)
        .export_leads(&window(), Some(vec!["id".into()]), &token())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Export { .. }));
}
