#![forbid(unsafe_code)]

//! Layout configuration: paragraph direction, alignment, spacing and
//! per-range formatting.
//!
//! # Design
//!
//! [`LayoutOptions`] is a plain `Copy` value with `const` presets. Any
//! change to it invalidates the engine's items and glyphs, so it carries
//! only what affects layout output.
//!
//! [`FormatRange`] carries per-range properties: case transform, a script
//! hint for neutral characters, and a direction override that acts like an
//! LRO/RLO ... PDF pair around the range.

use std::fmt;
use std::ops::Range;

use skein_core::Script;

// =========================================================================
// Direction
// =========================================================================

/// A resolved writing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    /// Direction implied by an embedding level.
    #[inline]
    #[must_use]
    pub const fn from_level(level: u8) -> Self {
        if level & 1 == 1 { Self::Rtl } else { Self::Ltr }
    }

    #[inline]
    #[must_use]
    pub const fn is_rtl(self) -> bool {
        matches!(self, Self::Rtl)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ltr => write!(f, "ltr"),
            Self::Rtl => write!(f, "rtl"),
        }
    }
}

/// Requested paragraph direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextDirection {
    /// Detect from the first strong character (rules P2/P3), LTR if none.
    #[default]
    Auto,
    Ltr,
    Rtl,
}

impl fmt::Display for TextDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Ltr => write!(f, "ltr"),
            Self::Rtl => write!(f, "rtl"),
        }
    }
}

// =========================================================================
// JustifyMode
// =========================================================================

/// Horizontal alignment of laid-out lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JustifyMode {
    #[default]
    Left,
    Right,
    Center,
    /// Stretch lines to the target width; the last line of the paragraph
    /// and lines ending in an explicit separator stay natural.
    Full,
    /// Like `Full`, but every line is justified.
    Distributed,
}

impl JustifyMode {
    /// Whether lines are stretched at all.
    #[must_use]
    pub const fn requires_justification(&self) -> bool {
        matches!(self, Self::Full | Self::Distributed)
    }

    /// Whether the paragraph's last line is stretched too.
    #[must_use]
    pub const fn justify_last_line(&self) -> bool {
        matches!(self, Self::Distributed)
    }
}

impl fmt::Display for JustifyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Center => write!(f, "center"),
            Self::Full => write!(f, "full"),
            Self::Distributed => write!(f, "distributed"),
        }
    }
}

// =========================================================================
// Spacing
// =========================================================================

/// Extra space added after every cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LetterSpacing {
    /// Fixed amount in layout units.
    Absolute(i32),
    /// Scale of the cluster advance in percent; 100 leaves it unchanged.
    Percentage(u32),
}

impl LetterSpacing {
    pub const NONE: Self = Self::Absolute(0);

    /// Whether applying this spacing changes nothing.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(self, Self::Absolute(0) | Self::Percentage(100))
    }

    /// The spaced advance for a cluster's last glyph.
    #[must_use]
    pub fn apply(&self, advance: i32) -> i32 {
        match *self {
            Self::Absolute(extra) => advance.saturating_add(extra),
            Self::Percentage(pct) => {
                let scaled = i64::from(advance) * i64::from(pct) / 100;
                scaled.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
            }
        }
    }
}

impl Default for LetterSpacing {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for LetterSpacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(v) => write!(f, "{v:+}"),
            Self::Percentage(p) => write!(f, "{p}%"),
        }
    }
}

// =========================================================================
// Capitalization and format ranges
// =========================================================================

/// Case transform applied by the itemizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Capitalization {
    #[default]
    MixedCase,
    AllUppercase,
    AllLowercase,
    /// Lowercase letters are shaped as uppercase with the small-caps font.
    SmallCaps,
    /// The first character of every word is uppercased.
    Capitalize,
}

impl fmt::Display for Capitalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MixedCase => write!(f, "mixed"),
            Self::AllUppercase => write!(f, "upper"),
            Self::AllLowercase => write!(f, "lower"),
            Self::SmallCaps => write!(f, "small-caps"),
            Self::Capitalize => write!(f, "capitalize"),
        }
    }
}

/// Formatting applied to a character range.
///
/// Ranges are in character indices. Overlapping ranges are resolved in
/// order: a later range starts where the previous one ends.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FormatRange {
    pub range: Range<usize>,
    pub capitalization: Capitalization,
    pub script_hint: Option<Script>,
    pub direction_override: Option<Direction>,
}

impl FormatRange {
    /// A range with default formatting.
    #[must_use]
    pub fn new(range: Range<usize>) -> Self {
        Self {
            range,
            capitalization: Capitalization::MixedCase,
            script_hint: None,
            direction_override: None,
        }
    }

    #[must_use]
    pub fn with_capitalization(mut self, capitalization: Capitalization) -> Self {
        self.capitalization = capitalization;
        self
    }

    #[must_use]
    pub fn with_script_hint(mut self, script: Script) -> Self {
        self.script_hint = Some(script);
        self
    }

    #[must_use]
    pub fn with_direction_override(mut self, direction: Direction) -> Self {
        self.direction_override = Some(direction);
        self
    }
}

/// A contiguous span with one capitalization, produced by
/// [`format_segments`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FormatSegment {
    pub start: usize,
    pub length: usize,
    pub capitalization: Capitalization,
}

/// Split `0..len` into segments following `formats`, filling gaps with
/// mixed case. Ranges are clamped to the text and to the end of the
/// previous range.
pub(crate) fn format_segments(len: usize, formats: &[FormatRange]) -> Vec<FormatSegment> {
    let mut segments = Vec::with_capacity(formats.len() * 2 + 1);
    let mut pos = 0;
    for format in formats {
        let start = format.range.start.max(pos).min(len);
        let end = format.range.end.min(len);
        if start >= end {
            continue;
        }
        if start > pos {
            segments.push(FormatSegment {
                start: pos,
                length: start - pos,
                capitalization: Capitalization::MixedCase,
            });
        }
        segments.push(FormatSegment {
            start,
            length: end - start,
            capitalization: format.capitalization,
        });
        pos = end;
    }
    if pos < len {
        segments.push(FormatSegment {
            start: pos,
            length: len - pos,
            capitalization: Capitalization::MixedCase,
        });
    }
    segments
}

// =========================================================================
// LayoutOptions
// =========================================================================

/// Engine-wide layout configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutOptions {
    pub direction: TextDirection,
    pub justify: JustifyMode,
    /// Reserve the trailing spaces of right-to-left lines, which sit on the
    /// visual left, out of the justification slack.
    pub include_trailing_spaces: bool,
    pub letter_spacing: LetterSpacing,
    /// Added once per run of spaces, in layout units.
    pub word_spacing: i32,
    /// Apply the font engine's pair kerning when shaping is off.
    pub kerning: bool,
    /// Full shaping through the font engine. When off, glyphs are mapped
    /// one by one and positioned from their advances.
    pub shaping: bool,
    /// Capacity of the cross-invalidation glyph cache, in items.
    pub cache_capacity: usize,
}

impl LayoutOptions {
    /// Natural layout: auto direction, left aligned, full shaping.
    pub const PLAIN: Self = Self {
        direction: TextDirection::Auto,
        justify: JustifyMode::Left,
        include_trailing_spaces: false,
        letter_spacing: LetterSpacing::NONE,
        word_spacing: 0,
        kerning: true,
        shaping: true,
        cache_capacity: 256,
    };

    /// Justified paragraphs with a larger glyph cache.
    pub const TYPOGRAPHIC: Self = Self {
        justify: JustifyMode::Full,
        cache_capacity: 1024,
        ..Self::PLAIN
    };

    /// Glyph-by-glyph mapping without shaping or kerning.
    pub const MAPPED: Self = Self {
        kerning: false,
        shaping: false,
        ..Self::PLAIN
    };

    #[must_use]
    pub const fn with_direction(mut self, direction: TextDirection) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub const fn with_justify(mut self, justify: JustifyMode) -> Self {
        self.justify = justify;
        self
    }

    #[must_use]
    pub const fn with_letter_spacing(mut self, spacing: LetterSpacing) -> Self {
        self.letter_spacing = spacing;
        self
    }

    #[must_use]
    pub const fn with_word_spacing(mut self, spacing: i32) -> Self {
        self.word_spacing = spacing;
        self
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self::PLAIN
    }
}

impl fmt::Display for LayoutOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dir={} align={} letter={} word={} shaping={}",
            self.direction, self.justify, self.letter_spacing, self.word_spacing, self.shaping
        )
    }
}
