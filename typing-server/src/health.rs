//! Health check endpoints for Kubernetes probes.
//!
//! - `/health/live` - Liveness probe (restart if fails)
//! - `/health/ready` - Readiness probe (remove from LB if fails)
//! - `/health` - Same as readiness

use axum::{http::StatusCode, Json};
use serde::Serialize;
use typing_core::TypingParams;

/// Health status response.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Overall status: "healthy" or "unhealthy"
    pub status: &'static str,
    /// Server version
    pub version: &'static str,
    /// Individual component checks
    pub checks: HealthChecks,
}

/// Individual health checks.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// Default card compiles to a non-empty timeline
    pub compiler: bool,
}

/// Liveness probe - is the server running?
#[tracing::instrument(name = "liveness_probe")]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe - can the server compile cards?
#[tracing::instrument(name = "readiness_probe")]
pub async fn readiness() -> (StatusCode, Json<HealthStatus>) {
    let timeline = typing_core::compile_timeline(&TypingParams::new());
    let compiler_ok = !timeline.segments().is_empty() && timeline.total_ms() > 0;

    let status = HealthStatus {
        status: if compiler_ok { "healthy" } else { "unhealthy" },
        version: env!("CARGO_PKG_VERSION"),
        checks: HealthChecks {
            compiler: compiler_ok,
        },
    };

    let code = if compiler_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(status))
}
