//! # Typing SVG Core
//!
//! Compiles a list of text lines into a self-contained animated SVG that
//! types each line out behind a blinking cursor, over a field of rising
//! smoke particles.
//!
//! ## Pipeline
//!
//! ```text
//! TypingParams ──► Config + Lines ──► Timeline ──► SegmentTracks ──┐
//!                       │                                          ├──► TypingExporter ──► SVG
//!                       └──────────► ParticleField ────────────────┘
//! ```
//!
//! Everything except the particle field is deterministic: compiling the
//! same parameters twice yields the same [`Timeline`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod keyframes;
pub mod params;
pub mod particles;
pub mod timeline;

pub use error::{ParamError, ParamResult};
pub use export::{escape_xml, TypingExporter};
pub use keyframes::{Easing, Projection, Repeat, SegmentTracks, Track, Visibility};
pub use params::{Align, Color, Config, Line, Playback, TypingParams};
pub use particles::{
    Particle, ParticleField, RandomSource, RiseVariant, RngSource, PARTICLE_COUNT,
};
pub use timeline::{Segment, Timeline};

/// Typing core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Render a typing card from raw request parameters with a thread-local RNG.
#[must_use]
pub fn render_svg(params: &TypingParams) -> String {
    render(&params.config(), &params.lines())
}

/// Render already-normalized lines with a thread-local RNG.
#[must_use]
pub fn render(config: &Config, lines: &[Line]) -> String {
    render_with(config, lines, &mut RngSource(rand::thread_rng()))
}

/// Render drawing particle randomness from `rng`.
#[must_use]
pub fn render_with(config: &Config, lines: &[Line], rng: &mut impl RandomSource) -> String {
    let timeline = Timeline::compile(config, lines);
    let field = ParticleField::generate(config, rng, PARTICLE_COUNT);
    TypingExporter::new(config).render_to_svg(lines, &timeline, &field)
}

/// Compile only the timeline for raw request parameters.
#[must_use]
pub fn compile_timeline(params: &TypingParams) -> Timeline {
    Timeline::compile(&params.config(), &params.lines())
}
