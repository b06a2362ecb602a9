//! In-process API tests over the axum router, with the store replaced by
//! the in-memory gateway.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use keygrid_gateway_http::GatewaySettings;
use keygrid_query::{GatewayError, GatewayResult, KvGateway, MemoryGateway};
use keygrid_server::registry::{GatewayFactory, InstanceRegistry};
use keygrid_server::routes;
use serde_json::{json, Value};
use tower::ServiceExt;

struct MemoryFactory(Arc<MemoryGateway>);

impl GatewayFactory for MemoryFactory {
    fn create(&self, _settings: &GatewaySettings) -> GatewayResult<Arc<dyn KvGateway>> {
        Ok(self.0.clone())
    }
}

fn sample_gateway() -> Arc<MemoryGateway> {
    Arc::new(MemoryGateway::from_entries([
        ("env/prod/region", "eu-west-1"),
        ("env/prod/replicas", "3"),
        ("ns/alpha/name", "alpha"),
        ("ns/alpha/replicas", "42"),
    ]))
}

fn app_with(gateway: Arc<MemoryGateway>) -> Router {
    let registry = Arc::new(InstanceRegistry::new(Arc::new(MemoryFactory(gateway))));
    routes::router(registry)
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, uid: &str) {
    let (status, _) = send_json(
        app,
        "PUT",
        &format!("/api/instances/{}", uid),
        Some(json!({ "address": "http://127.0.0.1:8500" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn query_batch_roundtrip() {
    let app = app_with(sample_gateway());
    register(&app, "ds1").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/instances/ds1/query",
        Some(json!({
            "queries": [
                { "refId": "A", "target": "env/prod/replicas" },
                { "refId": "B", "format": "table", "target": "ns/*/name", "columns": "../name,../replicas" }
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);

    let series = &body["results"]["A"]["series"];
    assert_eq!(series[0]["name"], "env/prod/replicas");
    assert_eq!(series[0]["points"][0]["value"], 3.0);

    let table = &body["results"]["B"]["table"];
    assert_eq!(table["columns"], json!(["name", "replicas"]));
    assert_eq!(table["rows"], json!([["alpha", 42]]));
}

#[tokio::test]
async fn per_query_errors_are_embedded_in_the_response() {
    let app = app_with(sample_gateway());
    register(&app, "ds1").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/instances/ds1/query",
        Some(json!({
            "queries": [
                { "refId": "bad", "target": "env/prod/replicas", "type": "bogus" },
                { "refId": "good", "target": "env/prod/replicas" }
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let error = body["results"]["bad"]["error"].as_str().unwrap();
    assert!(error.contains("bogus"));
    assert!(body["results"]["good"]["series"].is_array());
}

#[tokio::test]
async fn empty_batch_is_a_request_error() {
    let app = app_with(sample_gateway());
    register(&app, "ds1").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/instances/ds1/query",
        Some(json!({ "queries": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("no queries found in request"));
}

#[tokio::test]
async fn unknown_instance_is_not_found() {
    let app = app_with(sample_gateway());

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/instances/nope/query",
        Some(json!({ "queries": [{ "refId": "A", "target": "x" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reflects_probe_outcome() {
    let gateway = sample_gateway();
    let app = app_with(gateway.clone());
    register(&app, "ds1").await;

    let (status, body) = send_json(&app, "GET", "/api/instances/ds1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "data source is working");

    gateway
        .fail_with(GatewayError::Transport("store down".to_string()))
        .await;
    let (status, body) = send_json(&app, "GET", "/api/instances/ds1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("store down"));
}

#[tokio::test]
async fn removed_instance_stops_serving() {
    let app = app_with(sample_gateway());
    register(&app, "ds1").await;

    let (status, _) = send_json(&app, "DELETE", "/api/instances/ds1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/instances/ds1/query",
        Some(json!({ "queries": [{ "refId": "A", "target": "x" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
