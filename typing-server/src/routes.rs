//! API route handlers.

use std::time::Instant;

use axum::{
    extract::{RawQuery, State},
    http::header,
    response::IntoResponse,
    Json,
};
use typing_core::{Timeline, TypingParams};

use crate::metrics;
use crate::AppState;

/// Content type of rendered cards.
pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// Decode a raw query string into typing parameters.
///
/// Percent-escapes and `+` are decoded; when a key repeats, the first
/// occurrence wins.
#[must_use]
pub fn params_from_query(query: Option<&str>) -> TypingParams {
    query.map_or_else(TypingParams::new, |raw| {
        TypingParams::from_pairs(url::form_urlencoded::parse(raw.as_bytes()))
    })
}

/// Render the animated card.
///
/// Never fails: malformed parameters fall back to their defaults.
#[tracing::instrument(name = "typing_svg", skip_all)]
pub async fn typing_svg(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    let params = params_from_query(query.as_deref());
    let config = params.config();
    let lines = params.lines();

    let started = Instant::now();
    let svg = typing_core::render(&config, &lines);
    metrics::record_render(config.playback, started.elapsed().as_secs_f64());

    tracing::debug!(lines = lines.len(), bytes = svg.len(), "card rendered");

    (
        [
            (header::CONTENT_TYPE, SVG_CONTENT_TYPE.to_string()),
            (header::CACHE_CONTROL, state.cache_control()),
        ],
        svg,
    )
}

/// Compiled timeline as JSON.
#[tracing::instrument(name = "typing_timeline", skip_all)]
pub async fn typing_timeline(RawQuery(query): RawQuery) -> Json<Timeline> {
    Json(typing_core::compile_timeline(&params_from_query(query.as_deref())))
}
