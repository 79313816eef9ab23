//! Timeline compilation.
//!
//! Lays the lines out on the canvas and on the clock: each line becomes a
//! [`Segment`] that types its characters one step at a time, holds for the
//! configured pause, and hands over to the next line.

use serde::Serialize;

use crate::params::{Align, Config, Line, Playback};

/// Gap between the canvas edge and a left- or right-aligned line.
pub const EDGE_MARGIN: f64 = 20.0;
/// Gap above the first line when vertical centering is off.
pub const TOP_MARGIN: f64 = 10.0;

/// Timing and geometry of one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// Position of the line in the input.
    pub index: usize,
    /// Number of characters revealed.
    pub char_count: usize,
    /// Offset at which typing starts.
    pub start_ms: u64,
    /// Time spent revealing characters.
    pub typing_ms: u64,
    /// Hold after the last character.
    pub pause_ms: u64,
    /// Rendered width of the full line in pixels.
    pub width: f64,
    /// Left edge of the line.
    pub x: f64,
    /// Baseline of the line.
    pub baseline_y: f64,
}

impl Segment {
    /// Typing plus pause.
    #[must_use]
    pub fn span_ms(&self) -> u64 {
        self.typing_ms.saturating_add(self.pause_ms)
    }

    /// Offset at which the last character appears.
    #[must_use]
    pub fn reveal_end_ms(&self) -> u64 {
        self.start_ms.saturating_add(self.typing_ms)
    }

    /// Offset at which the next segment starts.
    #[must_use]
    pub fn end_ms(&self) -> u64 {
        self.start_ms.saturating_add(self.span_ms())
    }

    /// Step count for the reveal timing function. Never zero.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.char_count.max(1)
    }
}

/// Ordered segments plus the length of one full cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    segments: Vec<Segment>,
    total_ms: u64,
    char_width: f64,
    line_height: f64,
    playback: Playback,
}

impl Timeline {
    /// Compile the timeline for `lines` under `config`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    #[tracing::instrument(name = "compile_timeline", skip_all, fields(lines = lines.len()))]
    pub fn compile(config: &Config, lines: &[Line]) -> Self {
        let size = f64::from(config.size);
        let char_width = size * 3.0 / 5.0;
        let line_height = size * 3.0 / 2.0;
        let text_height = lines.len() as f64 * line_height;
        let start_y = if config.v_center {
            (f64::from(config.height) - text_height) / 2.0 + size
        } else {
            size + TOP_MARGIN
        };
        let canvas_width = f64::from(config.width);

        let (segments, total_ms) = lines.iter().enumerate().fold(
            (Vec::with_capacity(lines.len()), 0_u64),
            |(mut segments, start_ms), (index, line)| {
                let width = line.char_count() as f64 * char_width;
                let segment = Segment {
                    index,
                    char_count: line.char_count(),
                    start_ms,
                    typing_ms: (line.char_count() as u64).saturating_mul(config.char_duration_ms),
                    pause_ms: config.pause_ms,
                    width,
                    x: horizontal_origin(config.align, canvas_width, width),
                    baseline_y: start_y + index as f64 * line_height,
                };
                let end_ms = segment.end_ms();
                segments.push(segment);
                (segments, end_ms)
            },
        );

        tracing::trace!(total_ms, "timeline compiled");

        Self {
            segments,
            total_ms,
            char_width,
            line_height,
            playback: config.playback,
        }
    }

    /// Segments in line order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Length of one full cycle, trailing pause included.
    #[must_use]
    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    /// Horizontal advance of one character.
    #[must_use]
    pub fn char_width(&self) -> f64 {
        self.char_width
    }

    /// Vertical distance between baselines.
    #[must_use]
    pub fn line_height(&self) -> f64 {
        self.line_height
    }

    /// Playback mode the timeline was compiled for.
    #[must_use]
    pub fn playback(&self) -> Playback {
        self.playback
    }

    /// Whether `segment` is the final line.
    #[must_use]
    pub fn is_last(&self, segment: &Segment) -> bool {
        segment.index + 1 == self.segments.len()
    }

    /// Express an absolute offset as a percentage of the cycle, in `[0, 100]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent_of(&self, offset_ms: u64) -> f64 {
        if self.total_ms == 0 {
            return 0.0;
        }
        (offset_ms as f64 * 100.0 / self.total_ms as f64).clamp(0.0, 100.0)
    }
}

/// Left edge of a line of `line_width` pixels.
fn horizontal_origin(align: Align, canvas_width: f64, line_width: f64) -> f64 {
    match align {
        Align::Left => EDGE_MARGIN,
        Align::Center => (canvas_width - line_width) / 2.0,
        Align::Right => canvas_width - line_width - EDGE_MARGIN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{parse_lines, TypingParams};

    fn compile(params: &TypingParams) -> Timeline {
        Timeline::compile(&params.config(), &params.lines())
    }

    #[test]
    fn test_single_line_example() {
        let params = TypingParams::from_pairs([
            ("lines", "Hi"),
            ("size", "24"),
            ("speed", "120"),
            ("pause", "1000"),
        ]);
        let timeline = compile(&params);

        assert_eq!(timeline.char_width(), 14.4);
        assert_eq!(timeline.segments().len(), 1);
        let segment = &timeline.segments()[0];
        assert_eq!(segment.start_ms, 0);
        assert_eq!(segment.typing_ms, 240);
        assert_eq!(segment.span_ms(), 1240);
        assert_eq!(segment.width, 2.0 * 14.4);
        assert_eq!(timeline.total_ms(), 1240);
        assert_eq!(timeline.playback(), Playback::Finite);
    }

    #[test]
    fn test_two_lines_loop_example() {
        let params = TypingParams::from_pairs([("lines", "Hi;Yo"), ("loop", "true")]);
        let timeline = compile(&params);

        assert_eq!(timeline.total_ms(), 2480);
        let second = &timeline.segments()[1];
        assert_eq!(second.start_ms, 1240);
        assert_eq!(timeline.percent_of(second.start_ms), 50.0);
        assert_eq!(timeline.playback(), Playback::Loop);
    }

    #[test]
    fn test_zero_length_line() {
        let params = TypingParams::from_pairs([("lines", "abc;;de")]);
        let timeline = compile(&params);

        let empty = &timeline.segments()[1];
        assert_eq!(empty.char_count, 0);
        assert_eq!(empty.typing_ms, 0);
        assert_eq!(empty.width, 0.0);
        assert_eq!(empty.steps(), 1);
        assert_eq!(empty.span_ms(), 1000);
        assert_eq!(timeline.total_ms(), 360 + 1000 + 1000 + 240 + 1000);
    }

    #[test]
    fn test_center_alignment_is_per_line() {
        let params = TypingParams::from_pairs([
            ("lines", "short;a much longer line"),
            ("align", "center"),
            ("width", "500"),
        ]);
        let timeline = compile(&params);

        for segment in timeline.segments() {
            assert_eq!(segment.x, (500.0 - segment.width) / 2.0);
        }
    }

    #[test]
    fn test_left_and_right_alignment() {
        let left = compile(&TypingParams::from_pairs([("lines", "abcd")]));
        assert_eq!(left.segments()[0].x, EDGE_MARGIN);

        let right = compile(&TypingParams::from_pairs([
            ("lines", "abcd"),
            ("align", "right"),
        ]));
        let segment = &right.segments()[0];
        assert_eq!(segment.x, 700.0 - segment.width - EDGE_MARGIN);
    }

    #[test]
    fn test_vertical_layout() {
        let centered = compile(&TypingParams::from_pairs([("lines", "a;b")]));
        // (150 - 2 * 36) / 2 + 24
        assert_eq!(centered.segments()[0].baseline_y, 63.0);
        assert_eq!(centered.segments()[1].baseline_y, 99.0);
        assert_eq!(centered.line_height(), 36.0);

        let top = compile(&TypingParams::from_pairs([("lines", "a;b"), ("vCenter", "false")]));
        assert_eq!(top.segments()[0].baseline_y, 34.0);
        assert_eq!(top.segments()[1].baseline_y, 70.0);
    }

    #[test]
    fn test_compile_is_deterministic() {
        let params = TypingParams::from_pairs([("lines", "one;two;three"), ("loop", "true")]);
        assert_eq!(compile(&params), compile(&params));
    }

    #[test]
    fn test_is_last() {
        let timeline = compile(&TypingParams::from_pairs([("lines", "a;b")]));
        assert!(!timeline.is_last(&timeline.segments()[0]));
        assert!(timeline.is_last(&timeline.segments()[1]));
    }

    #[test]
    fn test_serializes_to_json() {
        let timeline = compile(&TypingParams::from_pairs([("lines", "Hi")]));
        let json = serde_json::to_value(&timeline).expect("should serialize");
        assert_eq!(json["total_ms"], 1240);
        assert_eq!(json["playback"], "finite");
        assert_eq!(json["segments"][0]["typing_ms"], 240);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_lines() -> impl Strategy<Value = String> {
            prop::collection::vec("[a-zA-Z0-9 <>&]{0,20}", 1..8).prop_map(|lines| lines.join(";"))
        }

        proptest! {
            #[test]
            fn prop_segments_are_contiguous(
                raw in arb_lines(),
                speed in 1u32..500,
                pause in 1u32..5000,
                looped in any::<bool>(),
            ) {
                let lines = parse_lines(&raw);
                let params = TypingParams::from_pairs([
                    ("speed", speed.to_string()),
                    ("pause", pause.to_string()),
                    ("loop", looped.to_string()),
                ]);
                let timeline = Timeline::compile(&params.config(), &lines);

                prop_assert_eq!(timeline.segments().len(), lines.len());
                prop_assert_eq!(timeline.segments()[0].start_ms, 0);
                for pair in timeline.segments().windows(2) {
                    prop_assert_eq!(pair[0].end_ms(), pair[1].start_ms);
                }

                let span_sum: u64 = timeline.segments().iter().map(Segment::span_ms).sum();
                prop_assert_eq!(timeline.total_ms(), span_sum);

                for (segment, line) in timeline.segments().iter().zip(&lines) {
                    prop_assert_eq!(
                        segment.typing_ms,
                        line.char_count() as u64 * u64::from(speed)
                    );
                }
            }

            #[test]
            fn prop_percent_is_bounded(raw in arb_lines(), pause in 1u32..5000) {
                let lines = parse_lines(&raw);
                let params = TypingParams::from_pairs([("pause", pause.to_string())]);
                let timeline = Timeline::compile(&params.config(), &lines);

                for segment in timeline.segments() {
                    for offset in [segment.start_ms, segment.reveal_end_ms(), segment.end_ms()] {
                        let pct = timeline.percent_of(offset);
                        prop_assert!((0.0..=100.0).contains(&pct));
                    }
                }
                prop_assert_eq!(timeline.percent_of(timeline.total_ms()), 100.0);
            }
        }
    }
}
