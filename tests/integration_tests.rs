//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: YAML job → Marketo requests → NDJSON/Parquet output

use marketo_extract::engine::{ExtractOutcome, Extractor, SkipSignal};
use marketo_extract::http::{HttpClient, HttpClientConfig};
use marketo_extract::output::ObjectStorage;
use marketo_extract::{Endpoint, ExtractConfig, ExtractJob};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

#[derive(Default)]
struct CapturedSkips(Mutex<Vec<Endpoint>>);

impl SkipSignal for CapturedSkips {
    fn skip(&self, endpoint: Endpoint) {
        self.0.lock().unwrap().push(endpoint);
    }
}

fn load_job(server: &MockServer, dir: &TempDir, body: &str) -> ExtractJob {
    let yaml = format!(
        "{body}
credential:
  client_id: ${{MKTO_CLIENT_ID}}
  client_secret: ${{MKTO_CLIENT_SECRET}}
  host: {host}
destination:
  url: {dest}
  key: out/data
export:
  poll_interval_seconds: 1
  max_poll_attempts: 3
http:
  max_retries: 0
  max_calls: 0
",
        host = server.uri(),
        dest = dir.path().display()
    );
    let env = |name: &str| match name {
        "MKTO_CLIENT_ID" => Some("client-id".to_string()),
        "MKTO_CLIENT_SECRET" => Some("client-secret".to_string()),
        _ => None,
    };
    ExtractConfig::from_str_with_env(&yaml, env)
        .unwrap()
        .validate()
        .unwrap()
}

fn extractor(job: ExtractJob, dir: &TempDir) -> Extractor {
    let config: HttpClientConfig = job.http_client_config();
    let transport = HttpClient::new(config).unwrap();
    let storage = ObjectStorage::parse(dir.path().to_str().unwrap()).unwrap();
    Extractor::new(job, Arc::new(transport), Arc::new(storage))
}

async fn mount_identity(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/identity/oauth/token"))
        .and(query_param("grant_type", "client_credentials"))
        .and(query_param("client_id", "client-id"))
        .and(query_param("client_secret", "client-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "abc123",
            "token_type": "bearer",
            "expires_in": 3599,
            "scope": "api@example.com"
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn read_lines(dir: &TempDir) -> Vec<Value> {
    std::fs::read_to_string(dir.path().join("out/data"))
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

// ============================================================================
// Cursor endpoints
// ============================================================================

#[tokio::test]
async fn test_campaigns_two_pages_to_ndjson() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_identity(&server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/campaigns.json"))
        .and(header("Authorization", "Bearer abc123"))
        .and(query_param("nextPageToken", "PAGE2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requestId": "b",
            "success": true,
            "result": [{"id": 3, "name": "Third", "isActive": "null"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/campaigns.json"))
        .and(header("Authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requestId": "a",
            "success": true,
            "moreResult": true,
            "nextPageToken": "PAGE2",
            "result": [
                {"id": 1, "name": "First", "isActive": true},
                {"id": 2, "name": "Second", "isActive": false}
            ]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let job = load_job(&server, &dir, "endpoint: campaigns");
    let outcome = extractor(job, &dir).run().await.unwrap();

    assert_eq!(outcome.records(), 3);
    let rows = read_lines(&dir);
    assert_eq!(
        rows,
        vec![
            json!({"id": 1, "name": "First", "is_active": true}),
            json!({"id": 2, "name": "Second", "is_active": false}),
            json!({"id": 3, "name": "Third", "is_active": null}),
        ]
    );

    let requests = server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| !r.url.query().unwrap_or("").contains("moreResult")));
}

#[tokio::test]
async fn test_lead_lists_no_data_skips() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_identity(&server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/lists.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requestId": "c",
            "success": true
        })))
        .mount(&server)
        .await;

    let skips = Arc::new(CapturedSkips::default());
    let job = load_job(&server, &dir, "endpoint: lead_lists");
    let outcome = extractor(job, &dir)
        .with_skip_signal(skips.clone())
        .run()
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        ExtractOutcome::NoData {
            endpoint: Endpoint::LeadLists,
            ..
        }
    ));
    assert_eq!(*skips.0.lock().unwrap(), vec![Endpoint::LeadLists]);
    assert!(!dir.path().join("out/data").exists());
}

// ============================================================================
// Activities
// ============================================================================

#[tokio::test]
async fn test_activities_stream_to_parquet() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_identity(&server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/activities/pagingtoken.json"))
        .and(query_param("sinceDatetime", "2014-01-01T00:00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "nextPageToken": "SEED"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/activities/types.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": [
                {"id": 1, "name": "Visit Webpage"},
                {"id": 2, "name": "Fill Out Form"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/activities.json"))
        .and(query_param("activityTypeIds", "1"))
        .and(query_param("nextPageToken", "SEED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "moreResult": false,
            "nextPageToken": "AFTER",
            "result": [{
                "id": 500,
                "marketoGUID": "500",
                "leadId": 9,
                "activityDate": "2024-02-01T10:00:00Z",
                "activityTypeId": 1,
                "primaryAttributeValue": "/pricing",
                "attributes": [{"name": "Client IP Address", "value": "10.0.0.1"}]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let job = load_job(&server, &dir, "endpoint: activities\noutput_format: parquet");
    let outcome = extractor(job, &dir).run().await.unwrap();
    assert_eq!(outcome.records(), 1);
    assert_eq!(outcome.summary()["format"], "parquet");

    let file = std::fs::File::open(dir.path().join("out/data")).unwrap();
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap();
    let rows: usize = reader.map(|b| b.unwrap().num_rows()).sum();
    assert_eq!(rows, 1);
}

// ============================================================================
// Leads bulk export
// ============================================================================

#[tokio::test]
async fn test_leads_bulk_export_end_to_end() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_identity(&server).await;

    Mock::given(method("POST"))
        .and(path("/bulk/v1/leads/export/create.json"))
        .and(body_partial_json(json!({
            "fields": ["id", "email", "firstName"],
            "format": "CSV",
            "filter": {"updatedAt": {
                "startAt": "2024-01-01T00:00:00Z",
                "endAt": "2024-01-02T00:00:00Z"
            }}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": [{"exportId": "exp-1", "status": "Created"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/bulk/v1/leads/export/exp-1/enqueue.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": [{"exportId": "exp-1", "status": "Queued"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/bulk/v1/leads/export/exp-1/status.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": [{"exportId": "exp-1", "status": "Completed"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/bulk/v1/leads/export/exp-1/file.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "id,email,firstName\n0,skipped,row\n7,a@example.com,Ada\n8,null,\"Lee, Jr\"\n",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let job = load_job(
        &server,
        &dir,
        "endpoint: leads
start_at: '2024-01-01T00:00:00Z'
end_at: '2024-01-02T00:00:00Z'
fields: [id, email, firstName]",
    );
    let outcome = extractor(job, &dir).run().await.unwrap();

    assert_eq!(outcome.records(), 2);
    assert_eq!(
        read_lines(&dir),
        vec![
            json!({"id": "7", "email": "a@example.com", "first_name": "Ada"}),
            json!({"id": "8", "email": null, "first_name": "Lee, Jr"}),
        ]
    );
}
