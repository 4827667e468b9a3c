// LogSift - server/error.rs
//
// HTTP error mapping. Every failure leaves the service as the JSON envelope
// `{ success: false, message, error }`.

use crate::util::constants::QUERY_FAILURE_MESSAGE;
use crate::util::error::{LogSiftError, QueryError};
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::any::Any;

/// Message for rejected query parameters.
const BAD_REQUEST_MESSAGE: &str = "Invalid query parameters";

/// Message for requests cut off by the request timeout.
const TIMEOUT_MESSAGE: &str = "Request timed out";

/// Error returned by HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Request parameters could not be turned into a query (400).
    BadRequest(QueryError),
    /// The query could not be served (500).
    Internal(String),
    /// The request outlived the configured timeout (408).
    Timeout,
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        Self::BadRequest(e)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(QueryError::Malformed {
            detail: rejection.body_text(),
        })
    }
}

impl From<LogSiftError> for ApiError {
    fn from(e: LogSiftError) -> Self {
        match e {
            LogSiftError::Query(q) => Self::BadRequest(q),
            other => Self::Internal(other.to_string()),
        }
    }
}

fn envelope(status: StatusCode, message: &str, error: String) -> Response {
    let body = json!({
        "success": false,
        "message": message,
        "error": error,
    });
    (status, Json(body)).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(e) => {
                tracing::debug!(error = %e, "Rejected query");
                envelope(StatusCode::BAD_REQUEST, BAD_REQUEST_MESSAGE, e.to_string())
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Query failed");
                envelope(StatusCode::INTERNAL_SERVER_ERROR, QUERY_FAILURE_MESSAGE, msg)
            }
            Self::Timeout => {
                tracing::warn!("Request timed out");
                envelope(
                    StatusCode::REQUEST_TIMEOUT,
                    TIMEOUT_MESSAGE,
                    "request exceeded the configured timeout".to_string(),
                )
            }
        }
    }
}

/// Replaces the bare 408 produced by `TimeoutLayer` with the JSON envelope.
pub async fn timeout_envelope(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        ApiError::Timeout.into_response()
    } else {
        response
    }
}

/// Response for a handler that panicked, used by `CatchPanicLayer`.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::Internal(format!("handler panicked: {detail}")).into_response()
}
