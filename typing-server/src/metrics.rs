//! Prometheus metrics for typing-server.
//!
//! Provides metrics collection and a Prometheus-compatible `/metrics` endpoint.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use typing_core::Playback;

const HTTP_REQUESTS_TOTAL: &str = "typing_http_requests_total";
const HTTP_REQUEST_DURATION: &str = "typing_http_request_duration_seconds";
const RENDERS_TOTAL: &str = "typing_renders_total";
const RENDER_DURATION: &str = "typing_render_duration_seconds";

/// Initialize metrics and return the Prometheus handle.
///
/// # Errors
///
/// Returns an error if the Prometheus recorder cannot be installed
/// (e.g., if another recorder is already installed).
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record an HTTP request.
///
/// # Arguments
///
/// * `method` - HTTP method
/// * `path` - Matched route, or the raw path when no route matched
/// * `status` - HTTP status code
/// * `duration_secs` - Request duration in seconds
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        HTTP_REQUEST_DURATION,
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

/// Record one SVG render.
pub fn record_render(playback: Playback, duration_secs: f64) {
    let mode = match playback {
        Playback::Finite => "finite",
        Playback::Loop => "loop",
    };
    counter!(RENDERS_TOTAL, "playback" => mode).increment(1);
    histogram!(RENDER_DURATION, "playback" => mode).record(duration_secs);
}

/// Middleware recording count and latency of every routed request.
pub async fn track_http(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.extensions().get::<MatchedPath>().map_or_else(
        || request.uri().path().to_owned(),
        |matched| matched.as_str().to_owned(),
    );
    let started = Instant::now();

    let response = next.run(request).await;

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_metrics_are_exported() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_render(Playback::Loop, 0.002);
            record_render(Playback::Finite, 0.001);
        });

        let text = handle.render();
        assert!(text.contains("typing_renders_total{playback=\"loop\"} 1"));
        assert!(text.contains("typing_renders_total{playback=\"finite\"} 1"));
        assert!(text.contains(RENDER_DURATION));
    }

    #[test]
    fn test_http_metrics_are_labelled() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_http_request("GET", "/api/typing", 200, 0.01);
        });

        let text = handle.render();
        assert!(text.contains(HTTP_REQUESTS_TOTAL));
        assert!(text.contains("path=\"/api/typing\""));
        assert!(text.contains("status=\"200\""));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_render(Playback::Finite, 0.0);
        record_http_request("GET", "/health", 200, 0.0);
    }
}
