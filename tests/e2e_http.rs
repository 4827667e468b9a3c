// LogSift - tests/e2e_http.rs
//
// End-to-end tests for the HTTP surface. Requests go through the full
// router and middleware stack in-process via `tower::ServiceExt::oneshot`,
// backed by the sample log directory on disk.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get as get_route;
use axum::Router;
use http_body_util::BodyExt;
use logsift::app::aggregator::LogAggregator;
use logsift::server::{self, AppState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

// =============================================================================
// Helpers
// =============================================================================

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("logs")
}

fn build_app(log_dir: &Path) -> Router {
    let state = AppState {
        aggregator: Arc::new(LogAggregator::new(log_dir, true)),
        default_page_size: 50,
    };
    server::router(state, Duration::from_secs(30))
}

async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_check_returns_ok_with_version() {
    let (status, json) = get(build_app(&fixture_dir()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let (status, _) = get(build_app(&fixture_dir()), "/api/v1/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// GET /api/v1/logs
// =============================================================================

#[tokio::test]
async fn logs_returns_success_envelope() {
    let (status, json) = get(build_app(&fixture_dir()), "/api/v1/logs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["totalEntries"], 11);
    assert_eq!(json["filteredEntries"], 11);
    assert_eq!(json["page"], 1);
    assert_eq!(json["totalPages"], 1);
    assert_eq!(json["entries"].as_array().unwrap().len(), 11);

    let filters = &json["filters"];
    for key in [
        "logTypes",
        "levels",
        "users",
        "ipAddresses",
        "devices",
        "browsers",
        "operatingSystems",
        "actions",
        "entities",
    ] {
        assert!(filters[key].is_array(), "missing facet {key}");
    }
}

#[tokio::test]
async fn logs_entry_shapes_follow_the_wire_format() {
    let (_, json) = get(build_app(&fixture_dir()), "/api/v1/logs").await;
    let entries = json["entries"].as_array().unwrap();

    // Newest entry is the JSON line from events.log; unknown keys survive.
    assert_eq!(entries[0]["logType"], "events");
    assert_eq!(entries[0]["message"], "Cache warmed");
    assert_eq!(entries[0]["durationMs"], 120);

    let exception = entries
        .iter()
        .find(|e| e["logType"] == "exceptions")
        .unwrap();
    assert_eq!(exception["errorType"], "TypeError");
    assert_eq!(exception["file"], "/srv/app/controllers/userController.js");
    assert_eq!(exception["line"], 57);
    assert_eq!(exception["column"], 23);

    // A line no rule recognised carries only its raw text and log type.
    let garbage = entries.last().unwrap();
    assert_eq!(
        *garbage,
        serde_json::json!({
            "logType": "errors",
            "raw": "garbage line without structure"
        })
    );
}

#[tokio::test]
async fn logs_audit_scenario_over_http() {
    let (status, json) = get(
        build_app(&fixture_dir()),
        "/api/v1/logs?logType=audit&entity=user&action=updated",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalEntries"], 3);
    assert_eq!(json["filteredEntries"], 1);
    let entry = &json["entries"][0];
    assert_eq!(entry["entity"], "user");
    assert_eq!(entry["action"], "updated");
    assert_eq!(entry["user"]["email"], "admin@example.com");
    assert_eq!(entry["changes"]["role"]["to"], "admin");
}

#[tokio::test]
async fn logs_paginates() {
    let (status, json) = get(build_app(&fixture_dir()), "/api/v1/logs?page=2&limit=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["page"], 2);
    assert_eq!(json["totalPages"], 3);
    assert_eq!(json["entries"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn logs_treats_all_and_empty_params_as_absent() {
    let (status, json) = get(
        build_app(&fixture_dir()),
        "/api/v1/logs?level=all&search=&user=&startDate=",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["filteredEntries"], 11);
}

#[tokio::test]
async fn logs_invalid_date_matches_nothing() {
    let (status, json) = get(build_app(&fixture_dir()), "/api/v1/logs?startDate=someday").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["filteredEntries"], 0);
    assert_eq!(json["totalEntries"], 11);
}

#[tokio::test]
async fn logs_rejects_bad_pagination() {
    for uri in [
        "/api/v1/logs?limit=0",
        "/api/v1/logs?limit=-5",
        "/api/v1/logs?limit=many",
        "/api/v1/logs?page=first",
    ] {
        let (status, json) = get(build_app(&fixture_dir()), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json["success"], false, "{uri}");
        assert!(json["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn logs_missing_directory_returns_500_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let (status, json) = get(build_app(&dir.path().join("gone")), "/api/v1/logs").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Error fetching consolidated logs");
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn logs_unknown_log_type_lists_available_types() {
    let (status, json) = get(build_app(&fixture_dir()), "/api/v1/logs?logType=nope&page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalEntries"], 0);
    assert_eq!(json["page"], 2);
    assert_eq!(json["totalPages"], 0);
    assert_eq!(
        json["filters"]["logTypes"],
        serde_json::json!(["audit", "errors", "events", "exceptions"])
    );
    assert_eq!(json["filters"]["levels"], serde_json::json!([]));
}

#[tokio::test]
async fn logs_malformed_query_string_returns_json_400() {
    let (status, json) = get(
        build_app(&fixture_dir()),
        "/api/v1/logs?level=info&level=error",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Invalid query parameters");
    assert!(json["error"].as_str().unwrap().contains("level"));
}

#[tokio::test]
async fn timed_out_request_returns_json_envelope() {
    let slow = Router::new().route(
        "/slow",
        get_route(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "late"
        }),
    );
    let app = server::with_middleware(slow, Duration::from_millis(20));

    let (status, json) = get(app, "/slow").await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Request timed out");
    assert!(json["error"].is_string());
}
