// LogSift - server/handlers.rs
//
// Route handlers. The aggregator does blocking filesystem work, so each
// query runs on tokio's blocking pool.

use crate::server::dto::{HealthResponse, LogsQuery, LogsResponse};
use crate::server::error::ApiError;
use crate::server::AppState;
use crate::util::constants::APP_VERSION;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use std::sync::Arc;

/// GET /api/v1/logs
pub async fn get_logs(
    State(state): State<AppState>,
    params: Result<Query<LogsQuery>, QueryRejection>,
) -> Result<Json<LogsResponse>, ApiError> {
    let Query(params) = params?;
    let req = params.page_request(state.default_page_size)?;
    let criteria = params.into_criteria();

    let aggregator = Arc::clone(&state.aggregator);
    let result = tokio::task::spawn_blocking(move || aggregator.query(&criteria, req))
        .await
        .map_err(|e| ApiError::Internal(format!("query task failed: {e}")))??;

    Ok(Json(result.into()))
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: APP_VERSION,
    })
}
