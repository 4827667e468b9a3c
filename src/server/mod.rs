// LogSift - server/mod.rs
//
// HTTP boundary: shared state, router and middleware stack, shutdown signal.
// Dependencies: app, core, util.
//
// Access control is expected in front of this service; no route here
// authenticates callers.

pub mod dto;
pub mod error;
pub mod handlers;

use crate::app::aggregator::LogAggregator;
use crate::util::constants::API_PREFIX;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<LogAggregator>,
    /// Page size used when a request omits `limit`.
    pub default_page_size: i64,
}

/// Build the application router with all middleware layers.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let api = Router::new().route("/logs", get(handlers::get_logs));

    let routes = Router::new()
        // Health check at root level (not under the API prefix).
        .route("/health", get(handlers::health))
        .nest(API_PREFIX, api);

    with_middleware(routes, request_timeout).with_state(state)
}

/// Wrap `routes` in the service middleware stack, applied bottom-up:
///
/// 1. Structured request/response tracing
/// 2. Timeout responses rewritten into the JSON envelope
/// 3. Request timeout
/// 4. Panic recovery (catch panics, return the 500 envelope)
pub fn with_middleware<S>(routes: Router<S>, request_timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    routes
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::map_response(error::timeout_envelope))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
