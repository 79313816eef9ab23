//! # Typing SVG Server Library
//!
//! Router, handlers and CLI types for the typing server.
//! This library is used by both the binary and integration tests.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use axum::{
    extract::State,
    http::Method,
    middleware,
    response::IntoResponse,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod cli;
pub mod health;
pub mod metrics;
pub mod routes;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    cache_max_age: u64,
}

impl AppState {
    /// State serving cards cacheable for `cache_max_age` seconds.
    #[must_use]
    pub fn new(cache_max_age: u64) -> Self {
        Self { cache_max_age }
    }

    /// Value of the `Cache-Control` header on rendered cards.
    #[must_use]
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.cache_max_age)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(cli::DEFAULT_CACHE_MAX_AGE)
    }
}

/// Build the application router.
///
/// `/metrics` is only mounted when a Prometheus handle is supplied.
pub fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let mut app = Router::new()
        .route("/api/typing", get(routes::typing_svg))
        .route("/api/typing/timeline", get(routes::typing_timeline))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/health", get(health::readiness))
        .route_layer(middleware::from_fn(metrics::track_http));

    if let Some(handle) = metrics_handle {
        let metrics_router = Router::new()
            .route("/metrics", get(metrics_handler))
            .with_state(handle);
        app = app.merge(metrics_router);
    }

    app
        // Request ID for distributed tracing correlation
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        // Cards are embedded from arbitrary origins
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET]),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Prometheus metrics endpoint.
#[tracing::instrument(name = "metrics", skip(handle))]
async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}
