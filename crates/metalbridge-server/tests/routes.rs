//! Integration tests for the HTTP surface, driven by a scripted command runner
//! so no real diagnostic tools are spawned.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use metalbridge_core::ProbeConfig;
use metalbridge_probe::testing::ScriptedRunner;
use metalbridge_probe::{CommandOutput, Prober};
use metalbridge_server::{create_router, AppState};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn app_with(runner: ScriptedRunner, dashboard: PathBuf) -> Router {
    let prober = Prober::new(Arc::new(runner), ProbeConfig::default());
    create_router(AppState::new(prober, dashboard))
}

fn app(runner: ScriptedRunner) -> Router {
    app_with(runner, PathBuf::from("/nonexistent/metalbridge/index.html"))
}

fn healthy_runner() -> ScriptedRunner {
    let config = ProbeConfig::default();
    ScriptedRunner::new()
        .with(
            &config.gpu_sampler,
            CommandOutput::success(
                "GPU HW active frequency: 1398 MHz\nGPU HW active residency: 99.10%\nGPU idle residency: 0.90%\nGPU Power: 15210 mW\n",
            ),
        )
        .with(&config.memory_pressure, CommandOutput::success("System-wide memory free percentage: 55%"))
        .with(&config.swap_usage, CommandOutput::success("vm.swapusage: total = 4.00G  used = 2.50G  free = 1.50G"))
        .with(
            &config.power_state,
            CommandOutput::success(
                "Note: No thermal warning level has been recorded\nNote: No CPU power status has been recorded\n",
            ),
        )
        .with(&config.smc_sampler, CommandOutput::failure("powermetrics: unrecognized sampler: smc"))
        .with(&config.sensor_helper, CommandOutput::success(r#"{"PMU tdie1": 41.2, "PMU tdie4": 47.9}"#))
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn parse_json(response: axum::response::Response) -> serde_json::Value {
    let body = body_string(response).await;
    serde_json::from_str(&body).unwrap_or_else(|e| panic!("Expected valid JSON body: {e}"))
}

fn header<'a>(response: &'a axum::response::Response, name: &str) -> &'a str {
    response
        .headers()
        .get(name)
        .map(|v| v.to_str().unwrap_or(""))
        .unwrap_or("")
}

fn assert_json_headers(response: &axum::response::Response) {
    assert_eq!(header(response, "content-type"), "application/json; charset=utf-8");
    assert_eq!(header(response, "cache-control"), "no-store");
    assert_eq!(header(response, "access-control-allow-origin"), "*");
}

// ── GET /metrics ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn metrics_returns_full_snapshot() {
    let response = get(app(healthy_runner()), "/metrics").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_json_headers(&response);

    let json = parse_json(response).await;
    assert_eq!(json["gpu"]["freq_mhz"], 1398.0);
    assert_eq!(json["gpu"]["power_mw"], 15210.0);
    assert_eq!(json["derived"]["gpu_pinned"], true);
    assert_eq!(json["memory"]["pressure"], "green");
    assert_eq!(json["memory"]["swap_gb"], 2.5);
    assert_eq!(json["thermal"]["thermal_pressure"], "nominal");
    assert_eq!(json["thermal"]["cpu_speed_limit_pct"], 100.0);
    assert_eq!(json["thermal"]["cpu_temp_c"], 47.9);
    assert_eq!(json["thermal"]["soc_temp_c"], 47.9);
    assert_eq!(json["thermal"]["source"]["smc_ok"], false);
    assert!(json["perf"]["ms_per_step"].is_null());
    assert!(json["timestamp"].as_u64().unwrap() > 0);
    assert_eq!(json["warnings"].as_array().unwrap().len(), 0);
}

/// Nothing installed at all is still a 200 with every key present.
#[tokio::test]
async fn metrics_fully_degraded_is_still_200() {
    let response = get(app(ScriptedRunner::new()), "/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = parse_json(response).await;
    for key in ["freq_mhz", "active_pct", "idle_pct", "power_mw"] {
        assert!(json["gpu"][key].is_null(), "gpu.{key} should be null");
    }
    assert_eq!(json["memory"]["pressure"], "unknown");
    assert_eq!(json["thermal"]["thermal_pressure"], "unknown");
    assert_eq!(json["available"]["gpu"], false);
    assert_eq!(json["available"]["thermal"], false);
    assert_eq!(json["available"]["perf"], true);

    let warnings = json["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 3);
    assert!(warnings[1].as_str().unwrap().contains("pmset -g therm"));
}

#[tokio::test]
async fn metrics_gpu_failure_adds_privilege_warning_only() {
    let config = ProbeConfig::default();
    let runner = healthy_runner().with(&config.gpu_sampler, CommandOutput::failure(""));
    let json = parse_json(get(app(runner), "/metrics").await).await;

    assert!(json["gpu"]["freq_mhz"].is_null());
    assert!(json["gpu"]["power_mw"].is_null());
    assert_eq!(json["derived"]["gpu_pinned"], false);
    assert_eq!(json["memory"]["swap_gb"], 2.5);

    let warnings = json["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].as_str().unwrap().contains("elevated privileges"));
}

// ── GET /raw ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn raw_returns_labeled_sections() {
    let response = get(app(healthy_runner()), "/raw").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(header(&response, "content-type").starts_with("text/plain"));

    let body = body_string(response).await;
    let gpu = body.find("=== powermetrics --samplers gpu_power").unwrap();
    let memory = body.find("=== memory_pressure -Q ===").unwrap();
    let thermal = body.find("=== pmset -g therm ===").unwrap();
    assert!(gpu < memory && memory < thermal);
    assert!(body.contains("unrecognized sampler: smc"));
    assert!(body.contains("PMU tdie4"));
}

// ── Health, CORS, fallbacks ───────────────────────────────────────────────────

#[tokio::test]
async fn health_is_ok() {
    let response = get(app(ScriptedRunner::new()), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_json_headers(&response);
    assert_eq!(parse_json(response).await, serde_json::json!({ "ok": true }));
}

#[tokio::test]
async fn options_answers_ok_with_cors_on_any_path() {
    let runner = ScriptedRunner::new();
    for uri in ["/metrics", "/anything/else"] {
        let response = app(runner.clone())
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri(uri)
                    .header("origin", "http://localhost:3000")
                    .header("access-control-request-method", "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "OPTIONS {uri}");
        assert_json_headers(&response);
        assert_eq!(header(&response, "access-control-allow-methods"), "GET, OPTIONS");
        assert_eq!(header(&response, "access-control-allow-headers"), "content-type");
        assert_eq!(parse_json(response).await, serde_json::json!({ "ok": true }));
    }
    assert_eq!(runner.calls(), 0);
}

#[tokio::test]
async fn unknown_path_is_plain_404() {
    let response = get(app(ScriptedRunner::new()), "/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(header(&response, "content-type").starts_with("text/plain"));
    assert_eq!(header(&response, "access-control-allow-origin"), "*");
    assert_eq!(body_string(response).await, "Not found");
}

// ── Dashboard ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn dashboard_served_from_static_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.html");
    std::fs::write(&path, "<html>dash</html>").unwrap();

    for uri in ["/", "/index.html"] {
        let response = get(app_with(ScriptedRunner::new(), path.clone()), uri).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        assert!(header(&response, "content-type").starts_with("text/html"));
        assert_eq!(body_string(response).await, "<html>dash</html>");
    }
}

#[tokio::test]
async fn missing_dashboard_is_404() {
    let response = get(app(ScriptedRunner::new()), "/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(header(&response, "content-type").starts_with("text/plain"));
}
