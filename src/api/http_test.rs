use super::*;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

// =========================================================================
// stub Prefect API
// =========================================================================

#[derive(Clone, Default)]
struct Captured {
    bodies: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Captured {
    fn record(&self, endpoint: &str, body: Value) {
        self.bodies.lock().unwrap().push((endpoint.to_owned(), body));
    }

    fn take(&self) -> Vec<(String, Value)> {
        std::mem::take(&mut *self.bodies.lock().unwrap())
    }
}

fn stub_router(captured: Captured) -> Router {
    Router::new()
        .route(
            "/api/block_types/filter",
            post(|State(c): State<Captured>, Json(body): Json<Value>| async move {
                c.record("block_types/filter", body);
                Json(json!([{
                    "id": "00000000-0000-0000-0000-0000000000a1",
                    "name": "Slack Webhook",
                    "slug": "slack-webhook",
                    "created": "2024-01-01T00:00:00Z"
                }]))
            }),
        )
        .route(
            "/api/block_documents/filter",
            post(|State(c): State<Captured>, Json(body): Json<Value>| async move {
                c.record("block_documents/filter", body);
                Json(json!([{
                    "id": "00000000-0000-0000-0000-0000000000d1",
                    "name": "alerts",
                    "block_type_id": "00000000-0000-0000-0000-0000000000a1",
                    "block_type_name": "Slack Webhook",
                    "is_anonymous": false,
                    "data": {}
                }]))
            }),
        )
        .route(
            "/api/block_documents/count",
            post(|State(c): State<Captured>, Json(body): Json<Value>| async move {
                c.record("block_documents/count", body);
                Json(json!(42))
            }),
        )
        .with_state(captured)
}

fn failing_router() -> Router {
    Router::new()
        .route(
            "/api/block_types/filter",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable") }),
        )
        .route("/api/block_documents/count", post(|| async { "forty-two" }))
}

async fn spawn_stub(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn client_for(api_url: &str) -> HttpBlocksApi {
    HttpBlocksApi::new(&ClientConfig::default().with_api_url(api_url)).unwrap()
}

// =========================================================================
// tests
// =========================================================================

#[tokio::test]
async fn posts_filters_and_decodes_responses() {
    let captured = Captured::default();
    let api_url = spawn_stub(stub_router(captured.clone())).await;
    let api = client_for(&api_url);

    let types = api
        .filter_block_types(&BlockTypeFilterBody::default())
        .await
        .unwrap();
    let docs = api
        .filter_block_documents(&BlockDocumentFilterBody::default())
        .await
        .unwrap();
    let count = api
        .count_block_documents(&BlockDocumentFilterBody::default())
        .await
        .unwrap();

    assert_eq!(types.len(), 1);
    assert_eq!(types[0].slug, "slack-webhook");
    assert_eq!(docs[0].name.as_deref(), Some("alerts"));
    assert_eq!(count, 42);

    let bodies = captured.take();
    assert_eq!(bodies.len(), 3);
    assert_eq!(bodies[0], ("block_types/filter".to_owned(), json!({ "offset": 0 })));
    assert_eq!(bodies[1].0, "block_documents/filter");
    assert_eq!(bodies[1].1, json!({ "offset": 0, "sort": "NAME_ASC", "include_secrets": false }));
    assert_eq!(bodies[2].0, "block_documents/count");
}

#[tokio::test]
async fn non_success_status_keeps_body() {
    let api_url = spawn_stub(failing_router()).await;
    let api = client_for(&api_url);

    let err = api
        .filter_block_types(&BlockTypeFilterBody::default())
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Status { status: 500, body: "database unavailable".into() });
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let api_url = spawn_stub(failing_router()).await;
    let api = client_for(&api_url);

    let err = api
        .count_block_documents(&BlockDocumentFilterBody::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn unreachable_server_is_a_request_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client_for(&format!("http://{addr}/api"));
    let err = api
        .filter_block_documents(&BlockDocumentFilterBody::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Request(_)));
}

#[test]
fn endpoint_joins_without_double_slashes() {
    let api = client_for("http://localhost:4200/api/");
    assert_eq!(api.base_url(), "http://localhost:4200/api");
    assert_eq!(api.endpoint("/block_types/filter"), "http://localhost:4200/api/block_types/filter");
}
