//! Request parameter normalization.
//!
//! Turns the loosely typed query parameters of a typing card request into a
//! validated [`Config`] and the ordered list of [`Line`]s to animate. Every
//! parameter has a default, so normalization cannot fail: malformed numbers
//! are logged and replaced.

use std::collections::BTreeMap;
use std::fmt;
use std::num::IntErrorKind;

use serde::Serialize;

use crate::error::{ParamError, ParamResult};

/// Lines shown when the request names none.
pub const DEFAULT_LINES: &str = "Open Source Contributor;Building cool things";
/// Separator between lines in the `lines` parameter.
pub const LINE_SEPARATOR: char = ';';
/// Default canvas width in pixels.
pub const DEFAULT_WIDTH: u32 = 700;
/// Default canvas height in pixels.
pub const DEFAULT_HEIGHT: u32 = 150;
/// Default text color token.
pub const DEFAULT_COLOR: &str = "000000";
/// Default particle color token.
pub const DEFAULT_PARTICLE_COLOR: &str = "ffffff";
/// Default background color token.
pub const DEFAULT_BACKGROUND: &str = "0d1117";
/// Default font family.
pub const DEFAULT_FONT: &str = "monospace";
/// Default font size in points.
pub const DEFAULT_SIZE: u32 = 24;
/// Default reveal duration per character in milliseconds.
pub const DEFAULT_CHAR_DURATION_MS: u32 = 120;
/// Default hold after each line in milliseconds.
pub const DEFAULT_PAUSE_MS: u32 = 1000;

/// Raw, string-typed request parameters.
///
/// Keys use the public query names (`lines`, `particleColor`, `vCenter`, ...).
/// The first value supplied for a key wins and empty values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypingParams {
    values: BTreeMap<String, String>,
}

impl TypingParams {
    /// Create an empty parameter set (every value defaulted).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded query pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |params, (key, value)| params.with(key, value))
    }

    /// Add a parameter unless the key is already present.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.entry(key.into()).or_insert_with(|| value.into());
        self
    }

    /// Look up a non-empty parameter value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Normalize into the render configuration.
    #[must_use]
    pub fn config(&self) -> Config {
        Config {
            width: self.positive_or(&["width"], DEFAULT_WIDTH),
            height: self.positive_or(&["height"], DEFAULT_HEIGHT),
            text_color: Color::resolve(self.get("color").unwrap_or(DEFAULT_COLOR)),
            background: Color::resolve(
                self.get("bg")
                    .or_else(|| self.get("background"))
                    .unwrap_or(DEFAULT_BACKGROUND),
            ),
            particle_color: Color::resolve(
                self.get("particleColor").unwrap_or(DEFAULT_PARTICLE_COLOR),
            ),
            font: self.get("font").unwrap_or(DEFAULT_FONT).to_string(),
            size: self.positive_or(&["size"], DEFAULT_SIZE),
            char_duration_ms: u64::from(
                self.positive_or(&["speed", "duration"], DEFAULT_CHAR_DURATION_MS),
            ),
            pause_ms: u64::from(self.positive_or(&["pause"], DEFAULT_PAUSE_MS)),
            v_center: self.get("vCenter") != Some("false"),
            playback: if self.get("loop") == Some("true") {
                Playback::Loop
            } else {
                Playback::Finite
            },
            align: self.get("align").map_or(Align::Left, Align::parse),
        }
    }

    /// Split the `lines` parameter into trimmed lines.
    #[must_use]
    pub fn lines(&self) -> Vec<Line> {
        parse_lines(self.get("lines").unwrap_or(DEFAULT_LINES))
    }

    /// First present key among `keys` parsed as a positive integer, or `default`.
    fn positive_or(&self, keys: &[&'static str], default: u32) -> u32 {
        let Some((key, raw)) = keys
            .iter()
            .find_map(|key| self.get(key).map(|raw| (*key, raw)))
        else {
            return default;
        };

        parse_positive(key, raw).unwrap_or_else(|err| {
            tracing::debug!(%err, default, "invalid numeric parameter, using default");
            default
        })
    }
}

/// Split a delimiter-joined string into trimmed lines.
///
/// Always yields at least one line; empty segments are kept as empty lines.
#[must_use]
pub fn parse_lines(raw: &str) -> Vec<Line> {
    raw.split(LINE_SEPARATOR).map(|s| Line::new(s.trim())).collect()
}

/// Parse a strictly positive integer parameter.
///
/// Only the leading integer counts: surrounding whitespace and anything
/// after the digits is ignored, so `32px` reads as 32 and `1500.5` as 1500.
///
/// # Errors
///
/// Returns [`ParamError`] when the value has no leading integer, is not
/// positive, or does not fit in a `u32`.
pub fn parse_positive(key: &'static str, raw: &str) -> ParamResult<u32> {
    let trimmed = raw.trim();
    let unsigned = trimmed.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(trimmed);
    let digits = unsigned.len()
        - unsigned
            .trim_start_matches(|c: char| c.is_ascii_digit())
            .len();
    let leading = &trimmed[..trimmed.len() - unsigned.len() + digits];

    let value: i64 = leading.parse().map_err(|e: std::num::ParseIntError| {
        match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ParamError::OutOfRange {
                key,
                value: raw.to_string(),
            },
            _ => ParamError::NotANumber {
                key,
                value: raw.to_string(),
            },
        }
    })?;

    if value <= 0 {
        return Err(ParamError::NotPositive { key, value });
    }

    u32::try_from(value).map_err(|_| ParamError::OutOfRange {
        key,
        value: raw.to_string(),
    })
}

/// Validated render configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Fill of the text and cursor.
    pub text_color: Color,
    /// Fill of the background rectangle.
    pub background: Color,
    /// Fill of the smoke particles.
    pub particle_color: Color,
    /// CSS font family list.
    pub font: String,
    /// Font size in points.
    pub size: u32,
    /// Reveal duration per character in milliseconds.
    pub char_duration_ms: u64,
    /// Hold after each line in milliseconds.
    pub pause_ms: u64,
    /// Center the text block vertically.
    pub v_center: bool,
    /// One-shot or looping playback.
    pub playback: Playback,
    /// Horizontal alignment of every line.
    pub align: Align,
}

impl Default for Config {
    fn default() -> Self {
        TypingParams::new().config()
    }
}

/// Playback mode of the text animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Playback {
    /// Play once with absolute millisecond offsets, then hold.
    Finite,
    /// Repeat the whole timeline forever using percentage keyframes.
    Loop,
}

/// Horizontal alignment of a line within the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    /// Fixed left margin.
    Left,
    /// Centered on the canvas.
    Center,
    /// Fixed right margin.
    Right,
}

impl Align {
    /// Parse an alignment keyword. Unknown keywords align left.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "center" => Self::Center,
            "right" | "end" => Self::Right,
            _ => Self::Left,
        }
    }
}

/// A color as it will appear in the emitted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    /// Resolve a color token: bare 3- or 6-digit hex gets a `#` prefix,
    /// anything else (named colors, `rgb(...)`) passes through.
    #[must_use]
    pub fn resolve(token: &str) -> Self {
        let is_hex = matches!(token.len(), 3 | 6) && token.chars().all(|c| c.is_ascii_hexdigit());
        if is_hex {
            Self(format!("#{token}"))
        } else {
            Self(token.to_string())
        }
    }

    /// The resolved color string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line of text to type out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    text: String,
    char_count: usize,
}

impl Line {
    /// Create a line, counting Unicode scalar values.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let char_count = text.chars().count();
        Self { text, char_count }
    }

    /// The literal text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of characters revealed one step at a time.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.char_count
    }

    /// Whether the line has no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.char_count == 0
    }
}
