//! HTTP surface for the analysis service.
//!
//! | Route | Method | Description |
//! |-------|--------|-------------|
//! | `/api/analyze` | POST | Runs one analysis; body is an [`AnalyzeRequest`] |
//! | `/health` | GET | Liveness check |
//!
//! Errors are returned as `{"error": "..."}` with status 400 for caller
//! mistakes, 413 for oversized bodies, and 500 otherwise.

use crate::config::ServerConfig;
use crate::models::{AnalysisResult, AnalyzeRequest};
use crate::observability::{RequestContext, scope_request_context};
use crate::services::AnalysisService;
use crate::{Error, Result};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Header carrying the correlation ID in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    service: Arc<AnalysisService>,
}

impl AppState {
    /// Wraps the service for sharing across handlers.
    #[must_use]
    pub fn new(service: AnalysisService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Builds the router with body limit, security headers, optional CORS and
/// request tracing.
///
/// # Errors
///
/// Returns an error if a configured CORS origin is not a valid header value.
pub fn router(state: AppState, config: &ServerConfig) -> Result<Router> {
    let mut app = Router::new()
        .route("/api/analyze", post(analyze))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    if !config.cors_origins.is_empty() {
        app = app.layer(cors_layer(&config.cors_origins)?);
    }

    Ok(app.layer(TraceLayer::new_for_http()).with_state(state))
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| Error::OperationFailed {
                operation: "configure_cors".to_string(),
                cause: format!("invalid origin '{origin}': {e}"),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Binds `config.bind_addr()` and serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the router cannot be built, the address cannot be
/// bound, or the server fails.
pub async fn serve(config: &ServerConfig, service: AnalysisService) -> Result<()> {
    let app = router(AppState::new(service), config)?;
    let addr = config.bind_addr();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::OperationFailed {
            operation: "bind".to_string(),
            cause: format!("{addr}: {e}"),
        })?;

    tracing::info!(addr = %addr, "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::OperationFailed {
            operation: "serve".to_string(),
            cause: e.to_string(),
        })?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    let context = request_context(&headers);
    let request_id = context.request_id().to_string();

    let mut response = match body {
        Ok(body) => scope_request_context(context, run_analysis(&state.service, &body)).await,
        Err(rejection) => {
            tracing::warn!(
                request_id = %request_id,
                status = %rejection.status(),
                "rejected request body"
            );
            failure(rejection.status(), rejection.body_text())
        },
    };

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

async fn run_analysis(service: &AnalysisService, body: &[u8]) -> Response {
    let request: AnalyzeRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(e) => {
            let err = Error::Validation(format!("Invalid request body: {e}"));
            return error_response(&err);
        },
    };

    match service.analyze(request).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Maps an error to its HTTP status and `{"error": ...}` body.
#[must_use]
pub fn error_response(err: &Error) -> Response {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    failure(status, err.to_string())
}

fn failure(status: StatusCode, message: String) -> Response {
    (status, Json(AnalysisResult::failure(message))).into_response()
}

/// Reuses a well-formed incoming request ID or generates a new one.
fn request_context(headers: &HeaderMap) -> RequestContext {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(RequestContext::new, RequestContext::from_id)
}
