//! Router-level tests for the HTTP surface.
//!
//! Requests go through the full middleware stack with `tower::ServiceExt::oneshot`.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use threadkb::config::ServerConfig;
use threadkb::llm::ProviderSettings;
use threadkb::server::{self, AppState};
use threadkb::{AnalysisService, Credentials, ModelConfig, Provider};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app_with(service: AnalysisService, config: &ServerConfig) -> Router {
    server::router(AppState::new(service), config).unwrap()
}

fn local_app(server: &MockServer) -> Router {
    let service = AnalysisService::new(
        ModelConfig::default()
            .with_provider(Provider::Local)
            .with_local_endpoint(server.uri()),
        Credentials::new(),
        ProviderSettings::default(),
    );
    app_with(service, &ServerConfig::default())
}

fn offline_app() -> Router {
    let service = AnalysisService::new(
        ModelConfig::default(),
        Credentials::new(),
        ProviderSettings::default(),
    );
    app_with(service, &ServerConfig::default())
}

fn analyze_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn mount_generate(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(template)
        .mount(server)
        .await;
}

// ============================================================================
// Success
// ============================================================================

#[tokio::test]
async fn test_analyze_success_is_wrapped() {
    let server = MockServer::start().await;
    mount_generate(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "response": r#"[{"problem":"P1","solution":"S1"}]"#,
            "done": true
        })),
    )
    .await;

    let body = json!({"chatText": "user: help\nagent: fixed"}).to_string();
    let (status, body) = send(local_app(&server), analyze_request(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"results": [{"problem": "P1", "solution": "S1"}]})
    );
}

#[tokio::test]
async fn test_analyze_sets_security_headers_and_request_id() {
    let server = MockServer::start().await;
    mount_generate(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"response": "[]", "done": true})),
    )
    .await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header("x-request-id", "req-42")
        .body(Body::from(json!({"chatText": "hi"}).to_string()))
        .unwrap();
    let response = local_app(&server).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    assert_eq!(headers["x-request-id"], "req-42");
}

// ============================================================================
// Client errors
// ============================================================================

#[tokio::test]
async fn test_blank_chat_text_is_bad_request() {
    let body = json!({"chatText": "   "}).to_string();
    let (status, body) = send(offline_app(), analyze_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Chat text is required"}));
}

#[tokio::test]
async fn test_missing_chat_text_is_bad_request() {
    let (status, body) = send(offline_app(), analyze_request("{}")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Chat text is required");
}

#[tokio::test]
async fn test_unknown_provider_is_bad_request() {
    let body = json!({
        "chatText": "user: help",
        "modelConfig": {"provider": "unknown"}
    })
    .to_string();
    let (status, body) = send(offline_app(), analyze_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("unknown"));
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (status, body) = send(offline_app(), analyze_request("{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body")
    );
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let config = ServerConfig {
        max_body_bytes: 64,
        ..ServerConfig::default()
    };
    let service = AnalysisService::new(
        ModelConfig::default(),
        Credentials::new(),
        ProviderSettings::default(),
    );
    let body = json!({"chatText": "x".repeat(256)}).to_string();
    let (status, body) = send(app_with(service, &config), analyze_request(body)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());
}

// ============================================================================
// Server errors
// ============================================================================

#[tokio::test]
async fn test_provider_unavailable_is_server_error() {
    let server = MockServer::start().await;
    mount_generate(&server, ResponseTemplate::new(503)).await;

    let body = json!({"chatText": "user: help"}).to_string();
    let (status, body) = send(local_app(&server), analyze_request(body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_unparseable_output_is_server_error() {
    let server = MockServer::start().await;
    mount_generate(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"response": "not json", "done": true})),
    )
    .await;

    let body = json!({"chatText": "user: help"}).to_string();
    let (status, body) = send(local_app(&server), analyze_request(body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "failed to parse analysis results: model output is not valid JSON"
    );
    assert!(body.get("results").is_none());
}

// ============================================================================
// Health and CORS
// ============================================================================

#[tokio::test]
async fn test_health() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(offline_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_cors_preflight_when_origin_configured() {
    let config = ServerConfig {
        cors_origins: vec!["https://kb.example.com".to_string()],
        ..ServerConfig::default()
    };
    let service = AnalysisService::new(
        ModelConfig::default(),
        Credentials::new(),
        ProviderSettings::default(),
    );
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/analyze")
        .header(header::ORIGIN, "https://kb.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app_with(service, &config).oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://kb.example.com"
    );
}

#[tokio::test]
async fn test_no_cors_headers_by_default() {
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://kb.example.com")
        .body(Body::empty())
        .unwrap();
    let response = offline_app().oneshot(request).await.unwrap();

    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}
