//! HTTP surface: metrics JSON, raw probe text, health, and the dashboard page.
//!
//! Every response carries permissive CORS headers. Any `OPTIONS` request is
//! answered directly with `{"ok":true}` before routing.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CACHE_CONTROL, CONTENT_TYPE,
};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use metalbridge_probe::Prober;
use serde::Serialize;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

#[derive(Clone)]
pub struct AppState {
    prober: Arc<Prober>,
    dashboard: PathBuf,
}

impl AppState {
    pub fn new(prober: Prober, dashboard: PathBuf) -> Self {
        Self {
            prober: Arc::new(prober),
            dashboard,
        }
    }
}

#[derive(Serialize)]
struct OkResponse {
    ok: bool,
}

pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
            )
        })
        .on_response(|res: &Response, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    Router::new()
        .route("/metrics", get(metrics))
        .route("/raw", get(raw))
        .route("/health", get(health))
        .route("/", get(dashboard))
        .route("/index.html", get(dashboard))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(answer_options))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("content-type"),
        ))
        .layer(trace_layer)
}

fn json<T: Serialize>(value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => (
            [(CONTENT_TYPE, JSON_CONTENT_TYPE), (CACHE_CONTROL, "no-store")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn text(status: StatusCode, body: impl Into<String>) -> Response {
    (
        status,
        [(CONTENT_TYPE, TEXT_CONTENT_TYPE), (CACHE_CONTROL, "no-store")],
        body.into(),
    )
        .into_response()
}

async fn answer_options(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return json(&OkResponse { ok: true });
    }
    next.run(req).await
}

async fn metrics(State(state): State<AppState>) -> Response {
    json(&state.prober.snapshot().await)
}

async fn raw(State(state): State<AppState>) -> Response {
    text(StatusCode::OK, state.prober.raw_report().await)
}

async fn health() -> Response {
    json(&OkResponse { ok: true })
}

/// Read from disk per request, never cached
async fn dashboard(State(state): State<AppState>) -> Response {
    match tokio::fs::read(&state.dashboard).await {
        Ok(body) => ([(CONTENT_TYPE, HTML_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            info!(path = %state.dashboard.display(), error = %e, "Dashboard not available");
            text(StatusCode::NOT_FOUND, "Dashboard not found")
        }
    }
}

async fn not_found() -> Response {
    text(StatusCode::NOT_FOUND, "Not found")
}
