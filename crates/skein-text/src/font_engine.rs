#![forbid(unsafe_code)]

//! Font engine contract and the engines shipped with the crate.
//!
//! A [`FontEngine`] maps characters to glyphs and answers metric queries.
//! The layout pipeline never mutates an engine; engines are shared as
//! `Arc<dyn FontEngine>` between any number of [`TextEngine`]s, possibly
//! on different threads, so every engine is `Send + Sync`. An engine whose
//! backend is not reentrant must serialize calls internally.
//!
//! # Engines
//!
//! | Engine              | Role                                                    |
//! |---------------------|---------------------------------------------------------|
//! | [`MonospaceEngine`] | Deterministic cell-grid engine: codepoint glyph ids, `unicode-width` advances |
//! | [`MultiEngine`]     | Picks a child engine per character by coverage          |
//! | `RustybuzzEngine`   | OpenType shaping through rustybuzz (`shaping` feature)  |
//!
//! # Glyph ids
//!
//! Glyphs produced through a [`MultiEngine`] carry the index of the child
//! engine in the top 8 bits of their [`GlyphId`]; metric queries on the
//! multi-engine dispatch on it.
//!
//! [`TextEngine`]: crate::engine::TextEngine

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use skein_core::{Script, TATWEEL};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::attributes::ItemFlag;
use crate::error::FontEngineError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque identifier of a font face, used for glyph cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FontId(pub u32);

/// A glyph index, optionally tagged with a sub-engine index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GlyphId(pub u32);

impl GlyphId {
    const GLYPH_MASK: u32 = 0x00FF_FFFF;

    /// The `.notdef` glyph.
    pub const NOTDEF: Self = Self(0);

    /// Sub-engine index stored in the top 8 bits.
    #[inline]
    #[must_use]
    pub const fn engine_index(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Glyph index without the sub-engine tag.
    #[inline]
    #[must_use]
    pub const fn glyph(self) -> u32 {
        self.0 & Self::GLYPH_MASK
    }

    /// This glyph tagged with sub-engine `index`.
    #[inline]
    #[must_use]
    pub const fn with_engine(self, index: u8) -> Self {
        Self((self.0 & Self::GLYPH_MASK) | ((index as u32) << 24))
    }
}

impl fmt::Display for GlyphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.engine_index(), self.glyph())
    }
}

bitflags! {
    /// Options for [`FontEngine::map_to_glyphs`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShaperFlags: u8 {
        /// The text is a right-to-left run.
        const RIGHT_TO_LEFT = 1;
        /// Map one glyph per character without shaping; advances are
        /// queried separately.
        const GLYPH_INDICES_ONLY = 1 << 1;
        /// Apply the font's kerning while shaping.
        const KERNING = 1 << 2;
    }
}

// ---------------------------------------------------------------------------
// Shaped output
// ---------------------------------------------------------------------------

/// One positioned glyph returned by a font engine.
///
/// Glyphs are in logical order. `cluster` is the index, relative to the
/// text passed in, of the first character of the glyph's cluster; it is
/// non-decreasing across the output and starts at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapedGlyph {
    pub glyph_id: GlyphId,
    pub cluster: u32,
    pub x_advance: i32,
    pub y_advance: i32,
    pub x_offset: i32,
    pub y_offset: i32,
}

impl ShapedGlyph {
    /// A glyph with an advance and no offsets.
    #[must_use]
    pub const fn new(glyph_id: GlyphId, cluster: u32, x_advance: i32) -> Self {
        Self {
            glyph_id,
            cluster,
            x_advance,
            y_advance: 0,
            x_offset: 0,
            y_offset: 0,
        }
    }
}

/// Ink box and advance of a glyph or glyph run.
///
/// `y` is measured downwards from the baseline, so a glyph rising above
/// the baseline has a negative `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphMetrics {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub x_advance: i32,
}

impl GlyphMetrics {
    /// Whether the box encloses nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Append `next`, placed at the end of this run's advance.
    #[must_use]
    pub fn union(self, next: GlyphMetrics) -> GlyphMetrics {
        let nx = self.x_advance + next.x;
        if self.is_empty() {
            return GlyphMetrics {
                x: nx,
                x_advance: self.x_advance + next.x_advance,
                ..next
            };
        }
        if next.is_empty() {
            return GlyphMetrics {
                x_advance: self.x_advance + next.x_advance,
                ..self
            };
        }
        let left = self.x.min(nx);
        let top = self.y.min(next.y);
        let right = (self.x + self.width).max(nx + next.width);
        let bottom = (self.y + self.height).max(next.y + next.height);
        GlyphMetrics {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
            x_advance: self.x_advance + next.x_advance,
        }
    }
}

// ---------------------------------------------------------------------------
// FontEngine trait
// ---------------------------------------------------------------------------

/// A font capability consumed by the shaping orchestrator.
pub trait FontEngine: Send + Sync {
    /// Identity used in glyph cache keys; two engines with the same id
    /// must produce the same glyphs.
    fn font_id(&self) -> FontId;

    /// Map `text` to glyphs.
    ///
    /// With [`ShaperFlags::GLYPH_INDICES_ONLY`] the result has exactly one
    /// glyph per character and advances may be left at zero.
    fn map_to_glyphs(
        &self,
        text: &[char],
        script: Script,
        flags: ShaperFlags,
    ) -> Result<Vec<ShapedGlyph>, FontEngineError>;

    /// Horizontal advance of a glyph.
    fn advance(&self, glyph: GlyphId) -> i32;

    /// Pair kerning adjustment added to the advance of `left`.
    fn kerning(&self, _left: GlyphId, _right: GlyphId) -> i32 {
        0
    }

    fn bounding_box(&self, glyph: GlyphId) -> GlyphMetrics;

    fn ascent(&self) -> i32;

    fn descent(&self) -> i32;

    fn leading(&self) -> i32 {
        0
    }

    /// Whether the font has a glyph for `c`.
    fn covers(&self, _c: char) -> bool {
        true
    }

    /// Advance of the TATWEEL glyph, or `None` if the font has none.
    fn kashida_width(&self) -> Option<i32> {
        let glyphs = self
            .map_to_glyphs(&[TATWEEL], Script::Arabic, ShaperFlags::GLYPH_INDICES_ONLY)
            .ok()?;
        let glyph = glyphs.first()?.glyph_id;
        (glyph.glyph() != 0).then(|| self.advance(glyph))
    }

    /// Whether glyphs from this engine carry sub-engine indices.
    fn is_multi_engine(&self) -> bool {
        false
    }

    /// The child engine with the given index.
    fn sub_engine(&self, _index: u8) -> Option<&dyn FontEngine> {
        None
    }

    /// Index of the child engine that owns `glyph`.
    fn sub_engine_for(&self, glyph: GlyphId) -> u8 {
        glyph.engine_index()
    }
}

// ---------------------------------------------------------------------------
// MonospaceEngine
// ---------------------------------------------------------------------------

/// Cell-grid engine with deterministic output.
///
/// Every grapheme cluster becomes one glyph whose id is the first
/// codepoint of the cluster (0 when the character is outside the coverage
/// ranges) and whose advance is the cluster's display width in cells
/// times `cell_advance`. A tab occupies one cell.
#[derive(Debug, Clone)]
pub struct MonospaceEngine {
    font_id: FontId,
    cell_advance: i32,
    ascent: i32,
    descent: i32,
    leading: i32,
    coverage: Option<Vec<RangeInclusive<char>>>,
    kerning: FxHashMap<(u32, u32), i32>,
}

impl Default for MonospaceEngine {
    fn default() -> Self {
        Self::new(FontId(0))
    }
}

impl MonospaceEngine {
    /// Default width of one cell in layout units.
    pub const CELL_ADVANCE: i32 = 256;

    #[must_use]
    pub fn new(font_id: FontId) -> Self {
        Self {
            font_id,
            cell_advance: Self::CELL_ADVANCE,
            ascent: 205,
            descent: 51,
            leading: 0,
            coverage: None,
            kerning: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn with_cell_advance(mut self, advance: i32) -> Self {
        self.cell_advance = advance;
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, ascent: i32, descent: i32, leading: i32) -> Self {
        self.ascent = ascent;
        self.descent = descent;
        self.leading = leading;
        self
    }

    /// Restrict the characters the engine has glyphs for.
    #[must_use]
    pub fn with_coverage(mut self, ranges: Vec<RangeInclusive<char>>) -> Self {
        self.coverage = Some(ranges);
        self
    }

    /// Add a kerning pair between two characters.
    #[must_use]
    pub fn with_kerning_pair(mut self, left: char, right: char, adjust: i32) -> Self {
        self.kerning.insert((left as u32, right as u32), adjust);
        self
    }

    fn glyph_for(&self, c: char) -> GlyphId {
        if self.covers(c) {
            GlyphId(c as u32)
        } else {
            GlyphId::NOTDEF
        }
    }

    fn cells(c: char) -> i32 {
        if c == '\t' {
            return 1;
        }
        c.width().unwrap_or(0) as i32
    }
}

impl FontEngine for MonospaceEngine {
    fn font_id(&self) -> FontId {
        self.font_id
    }

    fn map_to_glyphs(
        &self,
        text: &[char],
        _script: Script,
        flags: ShaperFlags,
    ) -> Result<Vec<ShapedGlyph>, FontEngineError> {
        if flags.contains(ShaperFlags::GLYPH_INDICES_ONLY) {
            return Ok(text
                .iter()
                .enumerate()
                .map(|(i, &c)| ShapedGlyph::new(self.glyph_for(c), i as u32, 0))
                .collect());
        }

        let s: String = text.iter().collect();
        let mut glyphs = Vec::with_capacity(text.len());
        let mut cluster = 0u32;
        for grapheme in s.graphemes(true) {
            let first = grapheme.chars().next().unwrap_or('\0');
            let cells = if first == '\t' {
                1
            } else {
                grapheme.width() as i32
            };
            glyphs.push(ShapedGlyph::new(
                self.glyph_for(first),
                cluster,
                cells * self.cell_advance,
            ));
            cluster += grapheme.chars().count() as u32;
        }
        if flags.contains(ShaperFlags::KERNING) {
            for i in 1..glyphs.len() {
                let adjust = self.kerning(glyphs[i - 1].glyph_id, glyphs[i].glyph_id);
                glyphs[i - 1].x_advance += adjust;
            }
        }
        Ok(glyphs)
    }

    fn advance(&self, glyph: GlyphId) -> i32 {
        match char::from_u32(glyph.glyph()) {
            Some(c) if glyph.glyph() != 0 => Self::cells(c) * self.cell_advance,
            _ => self.cell_advance,
        }
    }

    fn kerning(&self, left: GlyphId, right: GlyphId) -> i32 {
        self.kerning
            .get(&(left.glyph(), right.glyph()))
            .copied()
            .unwrap_or(0)
    }

    fn bounding_box(&self, glyph: GlyphId) -> GlyphMetrics {
        let advance = self.advance(glyph);
        GlyphMetrics {
            x: 0,
            y: -self.ascent,
            width: advance,
            height: self.ascent + self.descent,
            x_advance: advance,
        }
    }

    fn ascent(&self) -> i32 {
        self.ascent
    }

    fn descent(&self) -> i32 {
        self.descent
    }

    fn leading(&self) -> i32 {
        self.leading
    }

    fn covers(&self, c: char) -> bool {
        self.coverage
            .as_ref()
            .is_none_or(|ranges| ranges.iter().any(|r| r.contains(&c)))
    }
}

// ---------------------------------------------------------------------------
// MultiEngine
// ---------------------------------------------------------------------------

/// Multiplexes child engines by coverage.
///
/// Each character goes to the first child that covers it, or to child 0
/// when none does. Combining marks stay with the engine of their base.
pub struct MultiEngine {
    font_id: FontId,
    engines: Vec<Arc<dyn FontEngine>>,
}

impl fmt::Debug for MultiEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiEngine")
            .field("font_id", &self.font_id)
            .field("engines", &self.engines.len())
            .finish()
    }
}

impl MultiEngine {
    /// Maximum number of child engines (indices must fit in 8 bits).
    pub const MAX_ENGINES: usize = 256;

    /// Build a multi-engine. Children past [`Self::MAX_ENGINES`] are
    /// dropped.
    #[must_use]
    pub fn new(font_id: FontId, mut engines: Vec<Arc<dyn FontEngine>>) -> Self {
        engines.truncate(Self::MAX_ENGINES);
        Self { font_id, engines }
    }

    /// Number of child engines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Child engine index for every character of `text`.
    #[must_use]
    pub fn engine_indices(&self, text: &[char]) -> Vec<u8> {
        let mut indices = Vec::with_capacity(text.len());
        let mut prev = 0u8;
        for &c in text {
            let idx = if skein_core::char_script(c) == Script::Inherited && !indices.is_empty() {
                prev
            } else {
                self.engines
                    .iter()
                    .position(|e| e.covers(c))
                    .map_or(0, |p| p as u8)
            };
            indices.push(idx);
            prev = idx;
        }
        indices
    }

    fn child(&self, index: u8) -> Result<&dyn FontEngine, FontEngineError> {
        self.engines
            .get(usize::from(index))
            .map(|e| e.as_ref())
            .ok_or(FontEngineError::MissingSubEngine { index })
    }
}

impl FontEngine for MultiEngine {
    fn font_id(&self) -> FontId {
        self.font_id
    }

    fn map_to_glyphs(
        &self,
        text: &[char],
        script: Script,
        flags: ShaperFlags,
    ) -> Result<Vec<ShapedGlyph>, FontEngineError> {
        let indices = self.engine_indices(text);
        let mut glyphs = Vec::with_capacity(text.len());
        let mut start = 0;
        while start < text.len() {
            let idx = indices[start];
            let end = indices[start..]
                .iter()
                .position(|&i| i != idx)
                .map_or(text.len(), |p| start + p);
            let child = self.child(idx)?;
            for mut g in child.map_to_glyphs(&text[start..end], script, flags)? {
                g.glyph_id = g.glyph_id.with_engine(idx);
                g.cluster += start as u32;
                glyphs.push(g);
            }
            start = end;
        }
        Ok(glyphs)
    }

    fn advance(&self, glyph: GlyphId) -> i32 {
        self.child(glyph.engine_index())
            .map_or(0, |e| e.advance(GlyphId(glyph.glyph())))
    }

    fn kerning(&self, left: GlyphId, right: GlyphId) -> i32 {
        if left.engine_index() != right.engine_index() {
            return 0;
        }
        self.child(left.engine_index())
            .map_or(0, |e| e.kerning(GlyphId(left.glyph()), GlyphId(right.glyph())))
    }

    fn bounding_box(&self, glyph: GlyphId) -> GlyphMetrics {
        self.child(glyph.engine_index())
            .map(|e| e.bounding_box(GlyphId(glyph.glyph())))
            .unwrap_or_default()
    }

    fn ascent(&self) -> i32 {
        self.engines.iter().map(|e| e.ascent()).max().unwrap_or(0)
    }

    fn descent(&self) -> i32 {
        self.engines.iter().map(|e| e.descent()).max().unwrap_or(0)
    }

    fn leading(&self) -> i32 {
        self.engines.iter().map(|e| e.leading()).max().unwrap_or(0)
    }

    fn covers(&self, c: char) -> bool {
        self.engines.iter().any(|e| e.covers(c))
    }

    fn kashida_width(&self) -> Option<i32> {
        self.engines
            .iter()
            .find(|e| e.covers(TATWEEL))
            .and_then(|e| e.kashida_width())
    }

    fn is_multi_engine(&self) -> bool {
        true
    }

    fn sub_engine(&self, index: u8) -> Option<&dyn FontEngine> {
        self.engines.get(usize::from(index)).map(|e| e.as_ref())
    }
}

// ---------------------------------------------------------------------------
// FontSet
// ---------------------------------------------------------------------------

/// The engines a [`TextEngine`](crate::engine::TextEngine) shapes with.
#[derive(Clone)]
pub struct FontSet {
    default: Arc<dyn FontEngine>,
    by_script: FxHashMap<Script, Arc<dyn FontEngine>>,
    small_caps: Option<Arc<dyn FontEngine>>,
}

impl fmt::Debug for FontSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontSet")
            .field("default", &self.default.font_id())
            .field("scripts", &self.by_script.len())
            .field("small_caps", &self.small_caps.as_ref().map(|e| e.font_id()))
            .finish()
    }
}

impl Default for FontSet {
    fn default() -> Self {
        Self::new(Arc::new(MonospaceEngine::default()))
    }
}

impl FontSet {
    #[must_use]
    pub fn new(default: Arc<dyn FontEngine>) -> Self {
        Self {
            default,
            by_script: FxHashMap::default(),
            small_caps: None,
        }
    }

    /// Use `engine` for items of `script`.
    #[must_use]
    pub fn with_script(mut self, script: Script, engine: Arc<dyn FontEngine>) -> Self {
        self.by_script.insert(script, engine);
        self
    }

    /// Use `engine` for small-caps items.
    #[must_use]
    pub fn with_small_caps(mut self, engine: Arc<dyn FontEngine>) -> Self {
        self.small_caps = Some(engine);
        self
    }

    /// Engine for an item with the given script and flag.
    #[must_use]
    pub fn engine_for(&self, script: Script, flag: ItemFlag) -> &Arc<dyn FontEngine> {
        if flag == ItemFlag::SmallCaps
            && let Some(engine) = &self.small_caps
        {
            return engine;
        }
        self.by_script.get(&script).unwrap_or(&self.default)
    }
}

// ---------------------------------------------------------------------------
// RustybuzzEngine: OpenType shaping (feature-gated)
// ---------------------------------------------------------------------------

#[cfg(feature = "shaping")]
mod rustybuzz_backend {
    use super::*;
    use rustybuzz::ttf_parser;

    /// Shapes with rustybuzz over a `'static` font face.
    ///
    /// The face data must outlive the engine; the font loading layer
    /// usually keeps it in a leaked or `'static` buffer.
    pub struct RustybuzzEngine {
        face: rustybuzz::Face<'static>,
        font_id: FontId,
    }

    impl RustybuzzEngine {
        #[must_use]
        pub fn new(face: rustybuzz::Face<'static>, font_id: FontId) -> Self {
            Self { face, font_id }
        }

        /// Parse face `index` of `data`.
        pub fn from_static(
            data: &'static [u8],
            index: u32,
            font_id: FontId,
        ) -> Result<Self, FontEngineError> {
            let face = rustybuzz::Face::from_slice(data, index).ok_or(FontEngineError::InvalidFont)?;
            Ok(Self::new(face, font_id))
        }

        fn to_rb_script(script: Script) -> rustybuzz::Script {
            use rustybuzz::script;
            match script {
                Script::Latin => script::LATIN,
                Script::Greek => script::GREEK,
                Script::Cyrillic => script::CYRILLIC,
                Script::Armenian => script::ARMENIAN,
                Script::Hebrew => script::HEBREW,
                Script::Arabic => script::ARABIC,
                Script::Syriac => script::SYRIAC,
                Script::Thaana => script::THAANA,
                Script::Nko => script::NKO,
                Script::Mandaic => script::MANDAIC,
                Script::Devanagari => script::DEVANAGARI,
                Script::Bengali => script::BENGALI,
                Script::Gurmukhi => script::GURMUKHI,
                Script::Gujarati => script::GUJARATI,
                Script::Oriya => script::ORIYA,
                Script::Tamil => script::TAMIL,
                Script::Telugu => script::TELUGU,
                Script::Kannada => script::KANNADA,
                Script::Malayalam => script::MALAYALAM,
                Script::Sinhala => script::SINHALA,
                Script::Thai => script::THAI,
                Script::Lao => script::LAO,
                Script::Tibetan => script::TIBETAN,
                Script::Myanmar => script::MYANMAR,
                Script::Georgian => script::GEORGIAN,
                Script::Hangul => script::HANGUL,
                Script::Ethiopic => script::ETHIOPIC,
                Script::Khmer => script::KHMER,
                Script::Mongolian => script::MONGOLIAN,
                Script::Han => script::HAN,
                Script::Hiragana => script::HIRAGANA,
                Script::Katakana => script::KATAKANA,
                Script::Bopomofo => script::BOPOMOFO,
                Script::Common | Script::Inherited | Script::Unknown => script::COMMON,
            }
        }

        fn ttf_glyph(glyph: GlyphId) -> ttf_parser::GlyphId {
            ttf_parser::GlyphId(u16::try_from(glyph.glyph()).unwrap_or(0))
        }
    }

    impl FontEngine for RustybuzzEngine {
        fn font_id(&self) -> FontId {
            self.font_id
        }

        fn map_to_glyphs(
            &self,
            text: &[char],
            script: Script,
            flags: ShaperFlags,
        ) -> Result<Vec<ShapedGlyph>, FontEngineError> {
            if flags.contains(ShaperFlags::GLYPH_INDICES_ONLY) {
                return Ok(text
                    .iter()
                    .enumerate()
                    .map(|(i, &c)| {
                        let glyph = self.face.glyph_index(c).map_or(0, |g| u32::from(g.0));
                        ShapedGlyph::new(GlyphId(glyph), i as u32, 0)
                    })
                    .collect());
            }

            let mut buffer = rustybuzz::UnicodeBuffer::new();
            for (i, &c) in text.iter().enumerate() {
                buffer.add(c, i as u32);
            }
            buffer.set_script(Self::to_rb_script(script));
            buffer.set_direction(if flags.contains(ShaperFlags::RIGHT_TO_LEFT) {
                rustybuzz::Direction::RightToLeft
            } else {
                rustybuzz::Direction::LeftToRight
            });

            let mut features = Vec::new();
            if !flags.contains(ShaperFlags::KERNING) {
                features.push(rustybuzz::Feature::new(
                    ttf_parser::Tag::from_bytes(b"kern"),
                    0,
                    ..,
                ));
            }
            let output = rustybuzz::shape(&self.face, &features, buffer);

            let mut glyphs: Vec<ShapedGlyph> = output
                .glyph_infos()
                .iter()
                .zip(output.glyph_positions())
                .map(|(info, pos)| ShapedGlyph {
                    glyph_id: GlyphId(info.glyph_id),
                    cluster: info.cluster,
                    x_advance: pos.x_advance,
                    y_advance: pos.y_advance,
                    x_offset: pos.x_offset,
                    y_offset: pos.y_offset,
                })
                .collect();
            // rustybuzz returns right-to-left runs in visual order.
            if flags.contains(ShaperFlags::RIGHT_TO_LEFT) {
                glyphs.reverse();
            }
            Ok(glyphs)
        }

        fn advance(&self, glyph: GlyphId) -> i32 {
            self.face
                .glyph_hor_advance(Self::ttf_glyph(glyph))
                .map_or(0, i32::from)
        }

        fn bounding_box(&self, glyph: GlyphId) -> GlyphMetrics {
            let x_advance = self.advance(glyph);
            match self.face.glyph_bounding_box(Self::ttf_glyph(glyph)) {
                Some(rect) => GlyphMetrics {
                    x: i32::from(rect.x_min),
                    y: -i32::from(rect.y_max),
                    width: i32::from(rect.x_max) - i32::from(rect.x_min),
                    height: i32::from(rect.y_max) - i32::from(rect.y_min),
                    x_advance,
                },
                None => GlyphMetrics {
                    x_advance,
                    ..GlyphMetrics::default()
                },
            }
        }

        fn ascent(&self) -> i32 {
            i32::from(self.face.ascender())
        }

        fn descent(&self) -> i32 {
            -i32::from(self.face.descender())
        }

        fn leading(&self) -> i32 {
            i32::from(self.face.line_gap())
        }

        fn covers(&self, c: char) -> bool {
            self.face.glyph_index(c).is_some()
        }
    }
}

#[cfg(feature = "shaping")]
pub use rustybuzz_backend::RustybuzzEngine;

// ===========================================================================
// Tests
// ===========================================================================
