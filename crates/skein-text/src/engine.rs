#![forbid(unsafe_code)]

//! The text engine: owner of one logical string and everything derived
//! from it.
//!
//! # Design
//!
//! ```text
//! set_text / set_formats / set_options
//!        │
//!        ▼
//!  itemize()  ── bidi::resolve ─▶ attributes (levels, flags, scripts)
//!        │    ── Itemizer      ─▶ items
//!        ▼
//!  shape(item)     per item, lazily, cached across edits
//!        ▼
//!  layout_line / visual_runs / justify   per line
//! ```
//!
//! Every pass takes `&mut self` and runs to completion. Readiness only
//! moves forward: an item is shaped once (`num_glyphs > 0`) until an
//! invalidation resets it, and itemization runs once until the text,
//! formats or options change.
//!
//! # Example
//!
//! ```
//! use skein_text::engine::TextEngine;
//!
//! let mut engine = TextEngine::new("abc");
//! engine.itemize();
//! assert_eq!(engine.items().len(), 1);
//! assert_eq!(engine.shape(0).unwrap(), 3);
//! ```

use std::sync::Arc;

use skein_core::script::resolve_scripts;
use skein_core::{LINE_SEPARATOR, OBJECT_REPLACEMENT, PARAGRAPH_SEPARATOR};

use crate::attributes::{CharAttr, ItemFlag};
use crate::bidi::{self, BidiOutcome, DirectionOverride};
use crate::font_engine::{FontEngine, FontSet};
use crate::glyphs::{GlyphLayout, GlyphStorage};
use crate::itemize::{Itemizer, ScriptItem};
use crate::options::{FormatRange, LayoutOptions, format_segments};
use crate::shape_cache::{ShapeCache, ShapeCacheStats};

/// Layout state for one logical string.
#[derive(Debug)]
pub struct TextEngine {
    pub(crate) text: Vec<char>,
    formats: Vec<FormatRange>,
    pub(crate) options: LayoutOptions,
    pub(crate) fonts: FontSet,
    pub(crate) attributes: Vec<CharAttr>,
    pub(crate) base_level: u8,
    bidi: Option<BidiOutcome>,
    pub(crate) items: Vec<ScriptItem>,
    itemized: bool,
    pub(crate) glyphs: GlyphStorage,
    /// Item-relative index of the first glyph of each character's cluster.
    pub(crate) log_clusters: Vec<u32>,
    pub(crate) cache: ShapeCache,
}

impl TextEngine {
    /// Engine over `text` with default options and the monospace engine.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self::with_options(text, LayoutOptions::default())
    }

    #[must_use]
    pub fn with_options(text: &str, options: LayoutOptions) -> Self {
        let text: Vec<char> = text.chars().collect();
        Self {
            log_clusters: vec![0; text.len()],
            text,
            formats: Vec::new(),
            options,
            fonts: FontSet::default(),
            attributes: Vec::new(),
            base_level: 0,
            bidi: None,
            items: Vec::new(),
            itemized: false,
            glyphs: GlyphStorage::new(),
            cache: ShapeCache::new(options.cache_capacity),
        }
    }

    // -----------------------------------------------------------------------
    // Inputs
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn text(&self) -> &[char] {
        &self.text
    }

    /// Replace the text. Formats are kept and clamped to the new length.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.chars().collect();
        self.invalidate();
    }

    /// Replace the per-range formats. Ranges are applied in order and
    /// may not overlap; later overlapping ranges are clipped.
    pub fn set_formats(&mut self, formats: Vec<FormatRange>) {
        self.formats = formats;
        self.invalidate();
    }

    #[must_use]
    pub fn formats(&self) -> &[FormatRange] {
        &self.formats
    }

    #[must_use]
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: LayoutOptions) {
        if options.cache_capacity != self.options.cache_capacity {
            self.cache.resize(options.cache_capacity);
        }
        self.options = options;
        self.invalidate();
    }

    #[must_use]
    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    /// Replace the font engines. Items are kept; glyphs are dropped.
    pub fn set_fonts(&mut self, fonts: FontSet) {
        self.fonts = fonts;
        self.invalidate_shaping();
    }

    // -----------------------------------------------------------------------
    // Invalidation
    // -----------------------------------------------------------------------

    /// Drop items and glyphs after a text, format or option change.
    ///
    /// The glyph cache survives, so unchanged items are not shaped again.
    pub fn invalidate(&mut self) {
        self.itemized = false;
        self.items.clear();
        self.attributes.clear();
        self.bidi = None;
        self.glyphs.clear();
        self.log_clusters.clear();
        self.log_clusters.resize(self.text.len(), 0);
    }

    /// Drop glyphs but keep items, after a font change.
    pub fn invalidate_shaping(&mut self) {
        self.cache.invalidate();
        self.glyphs.clear();
        self.log_clusters.iter_mut().for_each(|c| *c = 0);
        for item in &mut self.items {
            item.num_glyphs = 0;
            item.glyph_offset = 0;
            item.metrics = Default::default();
        }
    }

    #[must_use]
    pub fn cache_stats(&self) -> ShapeCacheStats {
        self.cache.stats()
    }

    // -----------------------------------------------------------------------
    // Itemization
    // -----------------------------------------------------------------------

    /// Resolve bidi levels, analyse characters and build items. Runs once
    /// per invalidation.
    pub fn itemize(&mut self) {
        if self.itemized {
            return;
        }
        let _span = tracing::debug_span!("itemize", len = self.text.len()).entered();

        let len = self.text.len();
        self.attributes.clear();
        self.attributes.resize(len, CharAttr::default());
        self.base_level = bidi::paragraph_level(&self.text, self.options.direction);

        let overrides: Vec<DirectionOverride> = self
            .formats
            .iter()
            .filter_map(|f| {
                f.direction_override.map(|direction| DirectionOverride {
                    start: f.range.start,
                    end: f.range.end,
                    direction,
                })
            })
            .collect();
        self.bidi = Some(bidi::resolve(
            &self.text,
            &mut self.attributes,
            self.base_level,
            &overrides,
        ));

        self.analyse_characters();

        self.items.clear();
        let mut itemizer = Itemizer::new(&self.text, &self.attributes, &mut self.items);
        for segment in format_segments(len, &self.formats) {
            itemizer.generate(segment.start, segment.length, segment.capitalization);
        }
        self.itemized = true;
        tracing::debug!(items = self.items.len(), base_level = self.base_level, "itemized");
    }

    /// Item flags and scripts.
    fn analyse_characters(&mut self) {
        for (attr, &c) in self.attributes.iter_mut().zip(&self.text) {
            attr.flag = match c {
                LINE_SEPARATOR | PARAGRAPH_SEPARATOR | '\n' => ItemFlag::Separator,
                '\t' => {
                    attr.level = self.base_level;
                    ItemFlag::Tab
                }
                OBJECT_REPLACEMENT => ItemFlag::Object,
                _ => ItemFlag::None,
            };
        }

        let mut scripts = resolve_scripts(&self.text, None);
        let len = self.text.len();
        for format in &self.formats {
            let Some(hint) = format.script_hint else {
                continue;
            };
            let end = format.range.end.min(len);
            let start = format.range.start.min(end);
            let hinted = resolve_scripts(&self.text[start..end], Some(hint));
            scripts[start..end].copy_from_slice(&hinted);
        }
        for (attr, script) in self.attributes.iter_mut().zip(scripts) {
            attr.script = script;
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Items in logical order; empty until [`itemize`](Self::itemize).
    #[must_use]
    pub fn items(&self) -> &[ScriptItem] {
        &self.items
    }

    /// Per-character analysis; empty until itemized.
    #[must_use]
    pub fn attributes(&self) -> &[CharAttr] {
        &self.attributes
    }

    /// Resolved levels, one per character; empty until itemized.
    #[must_use]
    pub fn levels(&self) -> Vec<u8> {
        self.attributes.iter().map(|a| a.level).collect()
    }

    #[must_use]
    pub fn base_level(&self) -> u8 {
        self.base_level
    }

    /// Outcome of the last bidi resolution.
    #[must_use]
    pub fn bidi_outcome(&self) -> Option<&BidiOutcome> {
        self.bidi.as_ref()
    }

    /// Index of the item containing character `pos`.
    #[must_use]
    pub fn find_item(&self, pos: usize) -> Option<usize> {
        let idx = self.items.partition_point(|item| item.end() <= pos);
        self.items.get(idx).filter(|item| item.contains(pos)).map(|_| idx)
    }

    /// Glyphs of a shaped item; empty when the item is unknown or not
    /// shaped yet.
    #[must_use]
    pub fn glyphs(&self, item: usize) -> GlyphLayout<'_> {
        match self.items.get(item) {
            Some(si) if si.is_shaped() => self
                .glyphs
                .layout(si.glyph_offset..si.glyph_offset + si.num_glyphs),
            _ => self.glyphs.layout(0..0),
        }
    }

    /// Cluster map of an item: for each of its characters, the index of
    /// the first glyph of its cluster.
    #[must_use]
    pub fn log_clusters(&self, item: usize) -> &[u32] {
        match self.items.get(item) {
            Some(si) if si.is_shaped() => &self.log_clusters[si.position..si.end()],
            _ => &[],
        }
    }

    /// Font engine used for an item.
    pub(crate) fn engine_for(&self, item: &ScriptItem) -> Arc<dyn FontEngine> {
        Arc::clone(self.fonts.engine_for(item.script, item.flag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Capitalization, TextDirection};
    use crate::options::Direction;
    use skein_core::Script;

    // ── Itemization ──

    #[test]
    fn plain_latin_scenario() {
        let mut engine = TextEngine::new("abc");
        engine.itemize();
        assert_eq!(engine.items().len(), 1);
        assert_eq!(engine.levels(), vec![0, 0, 0]);
        assert_eq!(engine.bidi_outcome(), Some(&BidiOutcome::NotNeeded));
    }

    #[test]
    fn auto_direction_from_first_strong() {
        let mut engine = TextEngine::new("\u{05D0}\u{05D1} ab");
        engine.itemize();
        assert_eq!(engine.base_level(), 1);
        assert_eq!(engine.levels(), vec![1, 1, 1, 2, 2]);
    }

    #[test]
    fn tabs_sit_at_base_level() {
        let mut engine = TextEngine::with_options(
            "\u{05D0}\t\u{05D1}",
            LayoutOptions::PLAIN.with_direction(TextDirection::Ltr),
        );
        engine.itemize();
        assert_eq!(engine.attributes()[1].flag, ItemFlag::Tab);
        assert_eq!(engine.attributes()[1].level, 0);
        assert_eq!(engine.items().len(), 3);
    }

    #[test]
    fn script_hint_applies_to_neutrals() {
        let mut engine = TextEngine::new("12 ab");
        engine.set_formats(vec![FormatRange::new(0..3).with_script_hint(Script::Arabic)]);
        engine.itemize();
        assert_eq!(engine.attributes()[0].script, Script::Arabic);
        assert_eq!(engine.attributes()[3].script, Script::Latin);
        assert_eq!(engine.items().len(), 2);
    }

    #[test]
    fn format_ranges_drive_capitalization() {
        let mut engine = TextEngine::new("ab cd");
        engine.set_formats(vec![
            FormatRange::new(3..5).with_capitalization(Capitalization::AllUppercase),
        ]);
        engine.itemize();
        let flags: Vec<ItemFlag> = engine.items().iter().map(|i| i.flag).collect();
        assert_eq!(flags, vec![ItemFlag::None, ItemFlag::Uppercase]);
    }

    #[test]
    fn direction_override_from_format() {
        let mut engine = TextEngine::new("abcd");
        engine.set_formats(vec![
            FormatRange::new(1..3).with_direction_override(Direction::Rtl),
        ]);
        engine.itemize();
        assert_eq!(engine.levels(), vec![0, 1, 1, 0]);
    }

    #[test]
    fn find_item_by_position() {
        let mut engine = TextEngine::new("ab\u{0628}\u{0628}cd");
        engine.itemize();
        assert_eq!(engine.find_item(0), Some(0));
        assert_eq!(engine.find_item(3), Some(1));
        assert_eq!(engine.find_item(5), Some(2));
        assert_eq!(engine.find_item(6), None);
    }

    // ── Invalidation ──

    #[test]
    fn set_text_drops_items() {
        let mut engine = TextEngine::new("abc");
        engine.itemize();
        engine.set_text("\u{05D0}");
        assert!(engine.items().is_empty());
        engine.itemize();
        assert_eq!(engine.levels(), vec![1]);
    }

    #[test]
    fn unknown_item_queries_are_empty() {
        let mut engine = TextEngine::new("abc");
        engine.itemize();
        assert!(engine.glyphs(0).is_empty());
        assert!(engine.glyphs(9).is_empty());
        assert!(engine.log_clusters(9).is_empty());
    }
}
