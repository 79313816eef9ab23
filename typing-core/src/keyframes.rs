//! Keyframe tracks for the per-line animations.
//!
//! Both playback modes share one representation: a [`Track`] is a list of
//! stops at absolute millisecond offsets. At emission time a track is
//! projected either onto its own window (finite playback, one iteration,
//! forward fill) or onto the whole cycle as percentages of the timeline's
//! total duration (loop playback).

use std::fmt;

use crate::params::Playback;
use crate::timeline::{Segment, Timeline};

/// Timing function applied from a stop toward the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    /// Inherit the animation's linear timing.
    Linear,
    /// Discrete jumps, one per character.
    Steps(usize),
    /// Hold the value until the next stop.
    StepEnd,
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("linear"),
            Self::Steps(n) => write!(f, "steps({n}, end)"),
            Self::StepEnd => f.write_str("step-end"),
        }
    }
}

/// A value pinned to an absolute offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop<T> {
    /// Offset from the start of the cycle.
    pub at_ms: u64,
    /// Property value at this offset.
    pub value: T,
    /// Timing toward the next stop.
    pub easing: Easing,
}

/// Ordered stops of one animated property.
#[derive(Debug, Clone, PartialEq)]
pub struct Track<T> {
    stops: Vec<Stop<T>>,
}

impl<T> Default for Track<T> {
    fn default() -> Self {
        Self { stops: Vec::new() }
    }
}

impl<T> Track<T> {
    /// Create an empty track.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stop. A stop at the same offset as the previous one replaces it.
    #[must_use]
    pub fn stop(mut self, at_ms: u64, value: T, easing: Easing) -> Self {
        debug_assert!(
            !self.stops.last().is_some_and(|last| last.at_ms > at_ms),
            "stops must be appended in time order"
        );
        if self.stops.last().is_some_and(|last| last.at_ms == at_ms) {
            self.stops.pop();
        }
        self.stops.push(Stop {
            at_ms,
            value,
            easing,
        });
        self
    }

    /// Stops in time order.
    #[must_use]
    pub fn stops(&self) -> &[Stop<T>] {
        &self.stops
    }

    /// Place the track on the clock for the given playback mode.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn project(&self, timeline: &Timeline) -> Projection<'_, T> {
        match timeline.playback() {
            Playback::Finite => {
                let first = self.stops.first().map_or(0, |s| s.at_ms);
                let last = self.stops.last().map_or(0, |s| s.at_ms);
                let duration_ms = last - first;
                let stops = self
                    .stops
                    .iter()
                    .map(|stop| ProjectedStop {
                        percent: if duration_ms == 0 {
                            100.0
                        } else {
                            (stop.at_ms - first) as f64 * 100.0 / duration_ms as f64
                        },
                        value: &stop.value,
                        easing: stop.easing,
                    })
                    .collect();
                Projection {
                    delay_ms: first,
                    duration_ms,
                    repeat: Repeat::Once,
                    stops,
                }
            }
            Playback::Loop => Projection {
                delay_ms: 0,
                duration_ms: timeline.total_ms(),
                repeat: Repeat::Forever,
                stops: self
                    .stops
                    .iter()
                    .map(|stop| ProjectedStop {
                        percent: timeline.percent_of(stop.at_ms),
                        value: &stop.value,
                        easing: stop.easing,
                    })
                    .collect(),
            },
        }
    }
}

/// How often a projected animation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// One iteration, final value held afterwards.
    Once,
    /// Restart from the first stop forever.
    Forever,
}

/// A stop expressed as a percentage of its animation's duration.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedStop<'a, T> {
    /// Position within the animation, in `[0, 100]`.
    pub percent: f64,
    /// Property value.
    pub value: &'a T,
    /// Timing toward the next stop.
    pub easing: Easing,
}

/// A track placed on the clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection<'a, T> {
    /// Delay before the first stop.
    pub delay_ms: u64,
    /// Time from the first to the last stop.
    pub duration_ms: u64,
    /// Iteration behaviour.
    pub repeat: Repeat,
    /// Stops as percentages.
    pub stops: Vec<ProjectedStop<'a, T>>,
}

/// Cursor visibility state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Fully transparent.
    Hidden,
    /// Fully opaque.
    Shown,
}

impl Visibility {
    /// CSS opacity of this state.
    #[must_use]
    pub fn opacity(self) -> u8 {
        match self {
            Self::Hidden => 0,
            Self::Shown => 1,
        }
    }
}

/// All animated properties of one line.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentTracks {
    /// Width of the clip rectangle revealing the text, in pixels.
    pub reveal: Track<f64>,
    /// Horizontal offset of the cursor, in pixels.
    pub caret: Track<f64>,
    /// Whether the cursor is drawn.
    pub visibility: Track<Visibility>,
    /// Offset at which the cursor starts blinking.
    pub blink_delay_ms: u64,
}

impl SegmentTracks {
    /// Build the tracks of `segment` for the timeline's playback mode.
    ///
    /// Finite playback keeps the last line's cursor visible forever; loop
    /// playback hides every cursor at the end of its line so the cycle can
    /// restart cleanly.
    #[must_use]
    pub fn build(timeline: &Timeline, segment: &Segment) -> Self {
        let start = segment.start_ms;
        let reveal_end = segment.reveal_end_ms();
        let end = segment.end_ms();
        let steps = Easing::Steps(segment.steps());

        match timeline.playback() {
            Playback::Finite => {
                let motion = |to: f64| {
                    Track::new()
                        .stop(start, 0.0, steps)
                        .stop(reveal_end, to, Easing::Linear)
                };
                let mut visibility = Track::new().stop(start, Visibility::Shown, Easing::StepEnd);
                if !timeline.is_last(segment) {
                    visibility = visibility.stop(end, Visibility::Hidden, Easing::StepEnd);
                }
                Self {
                    reveal: motion(segment.width),
                    caret: motion(segment.width),
                    visibility,
                    blink_delay_ms: reveal_end,
                }
            }
            Playback::Loop => {
                let total = timeline.total_ms();
                let motion = |to: f64| {
                    Track::new()
                        .stop(0, 0.0, Easing::Linear)
                        .stop(start, 0.0, steps)
                        .stop(reveal_end, to, Easing::StepEnd)
                        .stop(total, to, Easing::Linear)
                };
                Self {
                    reveal: motion(segment.width),
                    caret: motion(segment.width),
                    visibility: Track::new()
                        .stop(0, Visibility::Hidden, Easing::StepEnd)
                        .stop(start, Visibility::Shown, Easing::StepEnd)
                        .stop(end, Visibility::Hidden, Easing::StepEnd)
                        .stop(total, Visibility::Hidden, Easing::StepEnd),
                    blink_delay_ms: 0,
                }
            }
        }
    }
}
