//! SVG emission.
//!
//! Serializes a compiled [`Timeline`] and a [`ParticleField`] into one
//! self-contained SVG document. All motion is declared in an embedded
//! stylesheet: per-line keyframes for the clip reveal, cursor motion and
//! cursor visibility, plus three shared rise trajectories for the particles.

use std::fmt::{Display, Write};

use crate::keyframes::{Easing, Projection, Repeat, SegmentTracks, Visibility};
use crate::params::{Config, Line};
use crate::particles::{ParticleField, RiseVariant, SIZE_RADII};
use crate::timeline::{Segment, Timeline};

/// Blink period of the cursor.
pub const BLINK_PERIOD_MS: u64 = 1000;
/// Height of the cursor bar in pixels.
pub const CURSOR_HEIGHT: f64 = 3.0;
/// Offset of the cursor bar below the baseline.
pub const CURSOR_OFFSET_Y: f64 = 2.0;
/// Corner radius of the background.
pub const BACKGROUND_RADIUS: f64 = 6.0;

/// Writes typing animations as SVG documents.
#[derive(Debug, Clone)]
pub struct TypingExporter<'a> {
    config: &'a Config,
}

impl<'a> TypingExporter<'a> {
    /// Create an exporter for the given configuration.
    #[must_use]
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Render the full document.
    ///
    /// `lines` and `timeline` must come from the same compilation; the
    /// particle field is drawn beneath the text.
    #[must_use]
    #[tracing::instrument(
        name = "render_svg",
        skip_all,
        fields(lines = lines.len(), particles = field.len())
    )]
    pub fn render_to_svg(&self, lines: &[Line], timeline: &Timeline, field: &ParticleField) -> String {
        let width = self.config.width;
        let height = self.config.height;

        let mut svg = String::with_capacity(64 * 1024);
        let _ = write!(
            svg,
            "<svg width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" xmlns=\"http://www.w3.org/2000/svg\">",
        );

        write_defs(&mut svg);

        svg.push_str("<style>");
        self.write_base_css(&mut svg);
        write_rise_css(&mut svg, field.rise());
        for segment in timeline.segments() {
            write_segment_css(&mut svg, timeline, segment);
        }
        svg.push_str("</style>");

        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\" rx=\"{BACKGROUND_RADIUS}\"/>",
            escape_xml(self.config.background.as_str()),
        );

        write_particles(&mut svg, field);

        for (segment, line) in timeline.segments().iter().zip(lines) {
            self.write_segment_markup(&mut svg, timeline, segment, line);
        }

        svg.push_str("</svg>");
        tracing::debug!(bytes = svg.len(), "svg rendered");
        svg
    }

    /// Text, cursor, particle and blink rules.
    fn write_base_css(&self, svg: &mut String) {
        let font = escape_xml(&self.config.font);
        let color = escape_xml(self.config.text_color.as_str());
        let size = self.config.size;

        let _ = write!(
            svg,
            "text{{font-family:{font};font-size:{size}px;fill:{color};white-space:pre;filter:url(#glow);letter-spacing:1px;}}",
        );
        let _ = write!(svg, ".cursor{{fill:{color};filter:url(#glow);}}");
        svg.push_str(".p{animation:var(--a) var(--d) linear infinite;animation-delay:var(--y);}");
        svg.push_str("@keyframes blink{0%,100%{opacity:1;}50%{opacity:0;}}");
    }

    /// Clip region, text and cursor of one line.
    fn write_segment_markup(
        &self,
        svg: &mut String,
        timeline: &Timeline,
        segment: &Segment,
        line: &Line,
    ) {
        let i = segment.index;
        let _ = write!(
            svg,
            "<g transform=\"translate({}, {})\"><defs><clipPath id=\"clip{i}\"><rect class=\"clip-{i}\" x=\"0\" y=\"-{}\" width=\"0\" height=\"{}\"/></clipPath></defs>",
            segment.x,
            segment.baseline_y,
            self.config.size,
            timeline.line_height(),
        );
        let _ = write!(
            svg,
            "<text clip-path=\"url(#clip{i})\">{}</text>",
            escape_xml(line.text()),
        );
        let _ = write!(
            svg,
            "<g class=\"cursor-vis-{i}\"><rect class=\"cursor cursor-move-{i}\" x=\"0\" y=\"{CURSOR_OFFSET_Y}\" width=\"{}\" height=\"{CURSOR_HEIGHT}\"/></g></g>",
            timeline.char_width(),
        );
    }
}

/// Filters and the five particle templates.
fn write_defs(svg: &mut String) {
    svg.push_str("<defs>");
    svg.push_str(
        "<filter id=\"glow\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\"><feGaussianBlur stdDeviation=\"2\" result=\"blur\"/><feMerge><feMergeNode in=\"blur\"/><feMergeNode in=\"SourceGraphic\"/></feMerge></filter>",
    );
    svg.push_str(
        "<filter id=\"smoke\" filterUnits=\"userSpaceOnUse\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\"><feGaussianBlur in=\"SourceGraphic\" stdDeviation=\"2\"/></filter>",
    );
    for (class, radius) in SIZE_RADII.iter().enumerate() {
        let _ = write!(svg, "<circle id=\"p{class}\" r=\"{radius}\"/>");
    }
    svg.push_str("</defs>");
}

/// One `rise-N` keyframe block per trajectory.
fn write_rise_css(svg: &mut String, rise: f64) {
    for variant in RiseVariant::ALL {
        let _ = write!(
            svg,
            "@keyframes rise-{}{{0%{{opacity:0;transform:translate(0, 0) scale(1);}}",
            variant.index(),
        );
        for point in variant.waypoints() {
            let _ = write!(
                svg,
                "{}%{{opacity:{};transform:translate({}px, -{}px) scale({});}}",
                point.percent,
                point.opacity,
                point.dx,
                point.lift(rise),
                point.scale,
            );
        }
        let _ = write!(
            svg,
            "100%{{opacity:0;transform:translate({}px, -{rise}px) scale(4);}}}}",
            variant.final_dx(),
        );
    }
}

/// Keyframes and animation classes for one line.
fn write_segment_css(svg: &mut String, timeline: &Timeline, segment: &Segment) {
    let i = segment.index;
    let tracks = SegmentTracks::build(timeline, segment);

    let reveal = tracks.reveal.project(timeline);
    let caret = tracks.caret.project(timeline);
    let visibility = tracks.visibility.project(timeline);

    write_keyframes(svg, &format!("type{i}"), &reveal, |w| format!("width:{w}px"));
    write_keyframes(svg, &format!("move{i}"), &caret, |dx| {
        format!("transform:translateX({dx}px)")
    });
    write_keyframes(svg, &format!("vis{i}"), &visibility, |v: &Visibility| {
        format!("opacity:{}", v.opacity())
    });

    let _ = write!(
        svg,
        ".clip-{i}{{width:0;animation:{};}}",
        animation(&format!("type{i}"), &reveal),
    );
    let _ = write!(
        svg,
        ".cursor-vis-{i}{{opacity:0;animation:{};}}",
        animation(&format!("vis{i}"), &visibility),
    );
    let _ = write!(
        svg,
        ".cursor-move-{i}{{animation:{}, blink {BLINK_PERIOD_MS}ms step-end {}ms infinite;}}",
        animation(&format!("move{i}"), &caret),
        tracks.blink_delay_ms,
    );
}

/// A `@keyframes` block from a projected track.
fn write_keyframes<T>(
    svg: &mut String,
    name: &str,
    projection: &Projection<'_, T>,
    declare: impl Fn(&T) -> String,
) {
    let _ = write!(svg, "@keyframes {name}{{");
    for stop in &projection.stops {
        let _ = write!(svg, "{}%{{{};", stop.percent, declare(stop.value));
        if stop.easing != Easing::Linear {
            let _ = write!(svg, "animation-timing-function:{};", stop.easing);
        }
        svg.push('}');
    }
    svg.push('}');
}

/// The `animation` shorthand value for a projected track.
fn animation<T>(name: &str, projection: &Projection<'_, T>) -> impl Display {
    let (count, fill) = match projection.repeat {
        Repeat::Once => ("1", "forwards"),
        Repeat::Forever => ("infinite", "none"),
    };
    format!(
        "{name} {}ms linear {}ms {count} {fill}",
        projection.duration_ms, projection.delay_ms,
    )
}

/// One instanced template per particle, under a shared blur.
fn write_particles(svg: &mut String, field: &ParticleField) {
    let fill = escape_xml(field.fill().as_str());
    svg.push_str("<g filter=\"url(#smoke)\">");
    for p in field.particles() {
        let _ = write!(
            svg,
            "<g transform=\"translate({}, {})\"><use href=\"#p{}\" class=\"p\" style=\"--a:rise-{};--d:{}s;--y:-{}s;fill:{fill}\"/></g>",
            p.x,
            p.y,
            p.size_class,
            p.variant.index(),
            p.duration.as_secs_f64(),
            p.delay.as_secs_f64(),
        );
    }
    svg.push_str("</g>");
}

/// Escape special XML characters.
#[must_use]
pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::TypingParams;
    use crate::particles::{RngSource, PARTICLE_COUNT};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn render(params: &TypingParams, particles: usize) -> String {
        let config = params.config();
        let lines = params.lines();
        let timeline = Timeline::compile(&config, &lines);
        let mut rng = RngSource(StdRng::seed_from_u64(42));
        let field = ParticleField::generate(&config, &mut rng, particles);
        TypingExporter::new(&config).render_to_svg(&lines, &timeline, &field)
    }

    #[test]
    fn test_document_shell() {
        let svg = render(&TypingParams::new(), 0);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("width=\"700\""));
        assert!(svg.contains("height=\"150\""));
        assert!(svg.contains("viewBox=\"0 0 700 150\""));
        assert!(svg.contains("fill=\"#0d1117\" rx=\"6\""));
        for class in 0..5 {
            assert!(svg.contains(&format!("<circle id=\"p{class}\"")));
        }
    }

    #[test]
    fn test_particle_count_independent_of_text() {
        for lines in ["x", "a;b;c;d", ""] {
            let params = TypingParams::new().with("lines", lines);
            let svg = render(&params, PARTICLE_COUNT);
            assert_eq!(svg.matches("class=\"p\"").count(), PARTICLE_COUNT);
        }
    }

    #[test]
    fn test_one_group_per_line() {
        let svg = render(&TypingParams::new().with("lines", "a;b;c"), 0);
        assert_eq!(svg.matches("<clipPath").count(), 3);
        assert!(svg.contains("id=\"clip2\""));
        assert!(svg.contains("@keyframes type2{"));
        assert!(!svg.contains("clip3"));
    }

    #[test]
    fn test_finite_css() {
        let svg = render(&TypingParams::new().with("lines", "Hi;Yo"), 0);
        assert!(svg.contains(
            "@keyframes type1{0%{width:0px;animation-timing-function:steps(2, end);}100%{width:28.8px;}}"
        ));
        assert!(svg.contains(".clip-1{width:0;animation:type1 240ms linear 1240ms 1 forwards;}"));
        assert!(svg.contains(".cursor-vis-0{opacity:0;animation:vis0 1240ms linear 0ms 1 forwards;}"));
        assert!(svg.contains(".cursor-vis-1{opacity:0;animation:vis1 0ms linear 1240ms 1 forwards;}"));
        assert!(svg.contains("@keyframes vis1{100%{opacity:1;animation-timing-function:step-end;}}"));
        assert!(svg.contains("blink 1000ms step-end 1480ms infinite"));
    }

    #[test]
    fn test_loop_css() {
        let params = TypingParams::from_pairs([("lines", "Hi;Yo"), ("loop", "true")]);
        let svg = render(&params, 0);
        assert!(svg.contains("50%{width:0px;animation-timing-function:steps(2, end);}"));
        assert!(svg.contains(".clip-1{width:0;animation:type1 2480ms linear 0ms infinite none;}"));
        assert!(svg.contains(
            "@keyframes vis1{0%{opacity:0;animation-timing-function:step-end;}50%{opacity:1;animation-timing-function:step-end;}100%{opacity:0;animation-timing-function:step-end;}}"
        ));
        assert!(svg.contains("blink 1000ms step-end 0ms infinite"));
    }

    #[test]
    fn test_rise_keyframes_use_canvas_height() {
        let svg = render(&TypingParams::new(), 0);
        assert!(svg.contains("@keyframes rise-0{0%{opacity:0;transform:translate(0, 0) scale(1);}15%{opacity:0.8;transform:translate(8px, -30px) scale(1.5);}"));
        assert!(svg.contains("100%{opacity:0;transform:translate(6px, -200px) scale(4);}}"));
        assert!(svg.contains("@keyframes rise-2{"));
    }

    #[test]
    fn test_geometry_attributes() {
        let params = TypingParams::from_pairs([("lines", "Hi"), ("vCenter", "false")]);
        let svg = render(&params, 0);
        assert!(svg.contains("<g transform=\"translate(20, 34)\">"));
        assert!(svg.contains("y=\"-24\" width=\"0\" height=\"36\""));
        assert!(svg.contains("width=\"14.4\" height=\"3\""));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let params = TypingParams::from_pairs([
            ("lines", "<b>Tom & \"Jerry\"</b>;it's"),
            ("font", "'Fira Code', monospace"),
            ("color", "red\"/><script>"),
        ]);
        let svg = render(&params, 0);
        assert!(svg.contains("&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;"));
        assert!(svg.contains("it&apos;s"));
        assert!(svg.contains("font-family:&apos;Fira Code&apos;, monospace"));
        assert!(!svg.contains("<script>"));
        assert!(!svg.contains("<b>"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("A < B & C > D"), "A &lt; B &amp; C &gt; D");
        assert_eq!(escape_xml("\"'"), "&quot;&apos;");
        assert_eq!(escape_xml("plain"), "plain");
    }

    #[test]
    fn test_output_is_well_formed_svg() {
        let params = TypingParams::from_pairs([
            ("lines", "Hello <world> & co;;done"),
            ("loop", "true"),
            ("align", "center"),
        ]);
        let svg = render(&params, 50);
        let tree = usvg::Tree::from_str(&svg, &usvg::Options::default())
            .expect("usvg should accept the output");
        assert_eq!(tree.size().width(), 700.0);
        assert_eq!(tree.size().height(), 150.0);
    }
}
