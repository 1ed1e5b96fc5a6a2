#![forbid(unsafe_code)]

//! Shaping orchestration: from a script item to positioned glyphs.
//!
//! # Architecture
//!
//! ```text
//! ScriptItem
//!     │  case transform (1:1 chars)
//!     ▼
//! ┌───────────────┐
//! │ ShapeCache     │──hit──▶ raw glyphs
//! │ (LRU + gen)    │
//! └───────┬───────┘
//!         │ miss
//!         ▼
//! ┌───────────────┐   multi-engine: map indices, split by sub-engine,
//! │ FontEngine     │   shape each range, tag ids with the engine index
//! └───────┬───────┘
//!         ▼
//!  validate clusters ─▶ attributes ─▶ spacing ─▶ GlyphStorage
//! ```
//!
//! Raw glyphs are cached before letter and word spacing, so a change of
//! spacing options reuses them.

use std::borrow::Cow;
use std::sync::Arc;

use skein_core::{Script, to_lower_single, to_upper_single};

use crate::attributes::ItemFlag;
use crate::engine::TextEngine;
use crate::error::{FontEngineError, LayoutError, Result};
use crate::font_engine::{FontEngine, ShapedGlyph, ShaperFlags};
use crate::glyphs::GlyphAttributes;
use crate::itemize::ItemMetrics;
use crate::justification::{JustificationClass, char_classes};
use crate::options::LetterSpacing;
use crate::shape_cache::ShapeKey;

impl TextEngine {
    /// Shape item `index` and return its glyph count.
    ///
    /// Already shaped items return immediately, and an unknown index
    /// returns 0. On error the item stays unshaped.
    pub fn shape(&mut self, index: usize) -> Result<usize> {
        let Some(&item) = self.items.get(index) else {
            return Ok(0);
        };
        if item.is_shaped() {
            return Ok(item.num_glyphs);
        }
        let _span = tracing::debug_span!(
            "shape",
            item = index,
            len = item.length,
            script = %item.script
        )
        .entered();

        let engine = self.engine_for(&item);
        let chars = &self.text[item.position..item.end()];
        let text = case_transformed(chars, item.flag);

        let mut flags = ShaperFlags::empty();
        if item.is_rtl() {
            flags |= ShaperFlags::RIGHT_TO_LEFT;
        }
        if self.options.kerning {
            flags |= ShaperFlags::KERNING;
        }
        if !self.options.shaping {
            flags |= ShaperFlags::GLYPH_INDICES_ONLY;
        }

        let key = ShapeKey::new(
            &text,
            item.script,
            item.flag,
            engine.font_id(),
            flags,
            self.cache.generation(),
        );
        let raw = match self.cache.get(&key) {
            Some(glyphs) => glyphs,
            None => {
                let glyphs = shape_with(engine.as_ref(), &text, item.script, flags)?;
                if glyphs.is_empty() {
                    tracing::warn!(item = index, len = item.length, "font engine produced no glyphs");
                    return Err(LayoutError::ShapingFailed {
                        item: index,
                        length: item.length,
                    });
                }
                validate_clusters(&glyphs, text.len())?;
                let glyphs: Arc<[ShapedGlyph]> = glyphs.into();
                self.cache.put(key, Arc::clone(&glyphs));
                glyphs
            }
        };

        let mut glyphs = raw.to_vec();
        let attrs = self.glyph_attributes(&glyphs, item.position, item.length, item.script);
        self.apply_spacing(&mut glyphs, &attrs);

        let offset = self.glyphs.try_append(&glyphs, &attrs)?;

        let clusters = &mut self.log_clusters[item.position..item.end()];
        let (mut first, mut next) = (0, 0);
        for (c, slot) in clusters.iter_mut().enumerate() {
            while next < glyphs.len() && glyphs[next].cluster as usize <= c {
                if attrs[next].cluster_start {
                    first = next;
                }
                next += 1;
            }
            *slot = first as u32;
        }

        let metrics = item_metrics(engine.as_ref(), &glyphs);
        let slot = &mut self.items[index];
        slot.glyph_offset = offset;
        slot.num_glyphs = glyphs.len();
        slot.metrics = metrics;
        tracing::trace!(glyphs = glyphs.len(), offset, "item shaped");
        Ok(glyphs.len())
    }

    /// Shape every item.
    pub fn shape_all(&mut self) -> Result<()> {
        self.itemize();
        for index in 0..self.items.len() {
            self.shape(index)?;
        }
        Ok(())
    }

    fn glyph_attributes(
        &self,
        glyphs: &[ShapedGlyph],
        position: usize,
        length: usize,
        script: Script,
    ) -> Vec<GlyphAttributes> {
        let chars = &self.text[position..position + length];
        let char_attrs = &self.attributes[position..position + length];
        let classes = char_classes(chars, script);

        let mut attrs = vec![GlyphAttributes::default(); glyphs.len()];
        let mut start = 0;
        while start < glyphs.len() {
            let cluster = glyphs[start].cluster as usize;
            let end = glyphs[start..]
                .iter()
                .position(|g| g.cluster as usize != cluster)
                .map_or(glyphs.len(), |p| start + p);
            let cluster_end = glyphs.get(end).map_or(length, |g| g.cluster as usize);

            let dont_print = char_attrs[cluster..cluster_end].iter().all(|a| a.is_removed());
            for attr in &mut attrs[start..end] {
                attr.dont_print = dont_print;
            }
            attrs[start].cluster_start = true;
            attrs[end - 1].justification = classes[cluster];
            start = end;
        }
        attrs
    }

    fn apply_spacing(&self, glyphs: &mut [ShapedGlyph], attrs: &[GlyphAttributes]) {
        let letter = self.options.letter_spacing;
        if !letter.is_noop() {
            for i in 0..glyphs.len() {
                if attrs[i].dont_print {
                    continue;
                }
                let cluster_end = attrs.get(i + 1).is_none_or(|next| next.cluster_start);
                if cluster_end {
                    glyphs[i].x_advance = letter.apply(glyphs[i].x_advance);
                }
            }
        }

        let word = self.options.word_spacing;
        if word != 0 {
            let is_space = |a: &GlyphAttributes| {
                matches!(
                    a.justification,
                    JustificationClass::Space | JustificationClass::ArabicSpace
                )
            };
            for i in 0..glyphs.len() {
                if is_space(&attrs[i]) && attrs.get(i + 1).is_none_or(|next| !is_space(next)) {
                    glyphs[i].x_advance += word;
                }
            }
        }
    }
}

/// Characters handed to the font engine for an item with `flag`.
fn case_transformed(chars: &[char], flag: ItemFlag) -> Cow<'_, [char]> {
    match flag {
        ItemFlag::Uppercase | ItemFlag::SmallCaps => {
            Cow::Owned(chars.iter().map(|&c| to_upper_single(c)).collect())
        }
        ItemFlag::Lowercase => Cow::Owned(chars.iter().map(|&c| to_lower_single(c)).collect()),
        _ => Cow::Borrowed(chars),
    }
}

/// Raw glyphs for `text`, splitting across sub-engines when `engine`
/// multiplexes.
fn shape_with(
    engine: &dyn FontEngine,
    text: &[char],
    script: Script,
    flags: ShaperFlags,
) -> Result<Vec<ShapedGlyph>> {
    if !engine.is_multi_engine() {
        return shape_single(engine, text, script, flags);
    }

    let mapped = engine.map_to_glyphs(text, script, flags | ShaperFlags::GLYPH_INDICES_ONLY)?;
    let mut owners: Vec<Option<u8>> = vec![None; text.len()];
    for g in &mapped {
        if let Some(slot) = owners.get_mut(g.cluster as usize) {
            slot.get_or_insert(engine.sub_engine_for(g.glyph_id));
        }
    }
    let mut prev = 0u8;
    let owners: Vec<u8> = owners
        .into_iter()
        .map(|o| {
            prev = o.unwrap_or(prev);
            prev
        })
        .collect();

    let mut glyphs = Vec::with_capacity(mapped.len());
    let mut start = 0;
    while start < text.len() {
        let index = owners[start];
        let end = owners[start..]
            .iter()
            .position(|&o| o != index)
            .map_or(text.len(), |p| start + p);
        let sub = engine
            .sub_engine(index)
            .ok_or(FontEngineError::MissingSubEngine { index })?;
        let part = shape_single(sub, &text[start..end], script, flags)?;
        if part.is_empty() {
            // A sub-range without glyphs fails the whole item.
            tracing::debug!(engine = index, start, end, "sub-engine produced no glyphs");
            return Ok(Vec::new());
        }
        for mut g in part {
            g.glyph_id = g.glyph_id.with_engine(index);
            g.cluster += start as u32;
            glyphs.push(g);
        }
        start = end;
    }
    Ok(glyphs)
}

fn shape_single(
    engine: &dyn FontEngine,
    text: &[char],
    script: Script,
    flags: ShaperFlags,
) -> Result<Vec<ShapedGlyph>> {
    let mut glyphs = engine.map_to_glyphs(text, script, flags)?;
    if flags.contains(ShaperFlags::GLYPH_INDICES_ONLY) {
        for g in &mut glyphs {
            g.x_advance = engine.advance(g.glyph_id);
        }
        if flags.contains(ShaperFlags::KERNING) {
            for i in 1..glyphs.len() {
                glyphs[i - 1].x_advance += engine.kerning(glyphs[i - 1].glyph_id, glyphs[i].glyph_id);
            }
        }
    }
    Ok(glyphs)
}

/// Clusters must start at 0, never decrease and stay inside the text.
fn validate_clusters(glyphs: &[ShapedGlyph], len: usize) -> Result<()> {
    let mut prev = 0u32;
    for (i, g) in glyphs.iter().enumerate() {
        let bad = (i == 0 && g.cluster != 0) || g.cluster < prev || g.cluster as usize >= len;
        if bad {
            return Err(FontEngineError::InvalidClusters {
                glyph: i,
                cluster: g.cluster,
                len,
            }
            .into());
        }
        prev = g.cluster;
    }
    Ok(())
}

/// Vertical metrics over the engines that produced `glyphs`.
fn item_metrics(engine: &dyn FontEngine, glyphs: &[ShapedGlyph]) -> ItemMetrics {
    let own = |e: &dyn FontEngine| ItemMetrics {
        ascent: e.ascent(),
        descent: e.descent(),
        leading: e.leading(),
    };
    if !engine.is_multi_engine() {
        return own(engine);
    }
    let mut used = [false; 256];
    for g in glyphs {
        used[usize::from(engine.sub_engine_for(g.glyph_id))] = true;
    }
    (0..=u8::MAX)
        .filter(|&i| used[usize::from(i)])
        .filter_map(|i| engine.sub_engine(i))
        .map(own)
        .fold(ItemMetrics::default(), |acc, m| ItemMetrics {
            ascent: acc.ascent.max(m.ascent),
            descent: acc.descent.max(m.descent),
            leading: acc.leading.max(m.leading),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::font_engine::{FontId, FontSet, GlyphId, GlyphMetrics, MonospaceEngine, MultiEngine};
    use crate::options::{Capitalization, FormatRange, LayoutOptions};

    /// Monospace engine that counts backend calls.
    struct Counting {
        inner: MonospaceEngine,
        calls: Arc<AtomicUsize>,
    }

    impl FontEngine for Counting {
        fn font_id(&self) -> FontId {
            self.inner.font_id()
        }
        fn map_to_glyphs(
            &self,
            text: &[char],
            script: Script,
            flags: ShaperFlags,
        ) -> std::result::Result<Vec<ShapedGlyph>, FontEngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.map_to_glyphs(text, script, flags)
        }
        fn advance(&self, glyph: GlyphId) -> i32 {
            self.inner.advance(glyph)
        }
        fn bounding_box(&self, glyph: GlyphId) -> GlyphMetrics {
            self.inner.bounding_box(glyph)
        }
        fn ascent(&self) -> i32 {
            self.inner.ascent()
        }
        fn descent(&self) -> i32 {
            self.inner.descent()
        }
    }

    /// Engine returning a fixed glyph list regardless of input.
    struct Fixed(Vec<ShapedGlyph>);

    impl FontEngine for Fixed {
        fn font_id(&self) -> FontId {
            FontId(99)
        }
        fn map_to_glyphs(
            &self,
            _text: &[char],
            _script: Script,
            _flags: ShaperFlags,
        ) -> std::result::Result<Vec<ShapedGlyph>, FontEngineError> {
            Ok(self.0.clone())
        }
        fn advance(&self, _glyph: GlyphId) -> i32 {
            10
        }
        fn bounding_box(&self, _glyph: GlyphId) -> GlyphMetrics {
            GlyphMetrics::default()
        }
        fn ascent(&self) -> i32 {
            10
        }
        fn descent(&self) -> i32 {
            2
        }
    }

    fn counting_engine(text: &str) -> (TextEngine, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut engine = TextEngine::new(text);
        engine.set_fonts(FontSet::new(Arc::new(Counting {
            inner: MonospaceEngine::default(),
            calls: Arc::clone(&calls),
        })));
        engine.itemize();
        (engine, calls)
    }

    // ── Idempotence and caching ──

    #[test]
    fn shaping_is_idempotent() {
        let (mut engine, calls) = counting_engine("abc");
        assert_eq!(engine.shape(0).unwrap(), 3);
        assert_eq!(engine.shape(0).unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(engine.glyphs(0).advances, &[256, 256, 256]);
    }

    #[test]
    fn unknown_item_is_zero() {
        let (mut engine, _) = counting_engine("abc");
        assert_eq!(engine.shape(5).unwrap(), 0);
    }

    #[test]
    fn cache_survives_text_edit() {
        let (mut engine, calls) = counting_engine("abc");
        engine.shape(0).unwrap();
        engine.set_text("abc");
        engine.itemize();
        engine.shape(0).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(engine.cache_stats().hits, 1);
    }

    #[test]
    fn font_change_reshapes() {
        let (mut engine, calls) = counting_engine("abc");
        engine.shape(0).unwrap();
        let fonts = engine.fonts().clone();
        engine.set_fonts(fonts);
        assert!(!engine.items()[0].is_shaped());
        engine.shape(0).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    // ── Clusters and attributes ──

    #[test]
    fn grapheme_clusters_map() {
        let mut engine = TextEngine::new("e\u{0301}x");
        engine.itemize();
        assert_eq!(engine.shape(0).unwrap(), 2);
        assert_eq!(engine.log_clusters(0), &[0, 0, 1]);
        let attrs = engine.glyphs(0).attributes;
        assert!(attrs[0].cluster_start && attrs[1].cluster_start);
        assert_eq!(attrs[0].justification, JustificationClass::Character);
    }

    #[test]
    fn removed_characters_do_not_print() {
        let mut engine = TextEngine::new("a\u{200B}b");
        engine.itemize();
        engine.shape(0).unwrap();
        let layout = engine.glyphs(0);
        assert!(layout.attributes[1].dont_print);
        assert_eq!(layout.advances[1], 0);
        assert_eq!(layout.width(), 512);
    }

    #[test]
    fn zero_glyphs_fail() {
        let mut engine = TextEngine::new("abc");
        engine.set_fonts(FontSet::new(Arc::new(Fixed(Vec::new()))));
        engine.itemize();
        let err = engine.shape(0).unwrap_err();
        assert!(matches!(err, LayoutError::ShapingFailed { item: 0, length: 3 }));
        assert!(!engine.items()[0].is_shaped());
    }

    #[test]
    fn bad_clusters_are_rejected() {
        let mut engine = TextEngine::new("abc");
        engine.set_fonts(FontSet::new(Arc::new(Fixed(vec![
            ShapedGlyph::new(GlyphId(1), 0, 10),
            ShapedGlyph::new(GlyphId(2), 2, 10),
            ShapedGlyph::new(GlyphId(3), 1, 10),
        ]))));
        engine.itemize();
        let err = engine.shape(0).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::Backend(FontEngineError::InvalidClusters { glyph: 2, cluster: 1, len: 3 })
        ));
    }

    // ── Case transforms ──

    #[test]
    fn uppercase_items_shape_uppercase() {
        let mut engine = TextEngine::new("ab cd");
        engine.set_formats(vec![
            FormatRange::new(0..2).with_capitalization(Capitalization::AllUppercase),
        ]);
        engine.shape_all().unwrap();
        assert_eq!(engine.glyphs(0).glyphs, &[GlyphId('A' as u32), GlyphId('B' as u32)]);
        assert_eq!(engine.glyphs(1).glyphs[1], GlyphId('c' as u32));
    }

    #[test]
    fn small_caps_use_their_engine() {
        let mut engine = TextEngine::new("Ab");
        engine.set_formats(vec![
            FormatRange::new(0..2).with_capitalization(Capitalization::SmallCaps),
        ]);
        engine.set_fonts(FontSet::default().with_small_caps(Arc::new(
            MonospaceEngine::new(FontId(7)).with_cell_advance(200),
        )));
        engine.shape_all().unwrap();
        assert_eq!(engine.glyphs(0).advances, &[256]);
        assert_eq!(engine.glyphs(1).glyphs, &[GlyphId('B' as u32)]);
        assert_eq!(engine.glyphs(1).advances, &[200]);
    }

    // ── Multi-engine ──

    #[test]
    fn multi_engine_tags_glyph_ids() {
        let letters = MonospaceEngine::new(FontId(1)).with_coverage(vec!['a'..='z']);
        let digits = MonospaceEngine::new(FontId(2))
            .with_coverage(vec!['0'..='9'])
            .with_cell_advance(100)
            .with_metrics(300, 80, 5);
        let multi = MultiEngine::new(FontId(3), vec![Arc::new(letters), Arc::new(digits)]);
        let mut engine = TextEngine::new("ab12");
        engine.set_fonts(FontSet::new(Arc::new(multi)));
        engine.shape_all().unwrap();

        let layout = engine.glyphs(0);
        let owners: Vec<u8> = layout.glyphs.iter().map(|g| g.engine_index()).collect();
        assert_eq!(owners, vec![0, 0, 1, 1]);
        assert_eq!(layout.glyphs[2].glyph(), '1' as u32);
        assert_eq!(layout.advances, &[256, 256, 100, 100]);
        assert_eq!(engine.items()[0].metrics.ascent, 300);
        assert_eq!(engine.items()[0].metrics.leading, 5);
    }

    // ── Spacing and kerning ──

    #[test]
    fn absolute_letter_spacing() {
        let mut engine = TextEngine::with_options(
            "ab",
            LayoutOptions::PLAIN.with_letter_spacing(LetterSpacing::Absolute(10)),
        );
        engine.shape_all().unwrap();
        assert_eq!(engine.glyphs(0).advances, &[266, 266]);
    }

    #[test]
    fn percentage_letter_spacing() {
        let mut engine = TextEngine::with_options(
            "ab",
            LayoutOptions::PLAIN.with_letter_spacing(LetterSpacing::Percentage(150)),
        );
        engine.shape_all().unwrap();
        assert_eq!(engine.glyphs(0).advances, &[384, 384]);
    }

    #[test]
    fn percentage_spacing_widens_cluster_once() {
        let mut engine = TextEngine::with_options(
            "x",
            LayoutOptions::PLAIN.with_letter_spacing(LetterSpacing::Percentage(200)),
        );
        engine.set_fonts(FontSet::new(Arc::new(Fixed(vec![
            ShapedGlyph::new(GlyphId(1), 0, 10),
            ShapedGlyph::new(GlyphId(2), 0, 10),
        ]))));
        engine.shape_all().unwrap();
        assert_eq!(engine.glyphs(0).advances, &[10, 20]);
    }

    #[test]
    fn word_spacing_once_per_run() {
        let mut engine =
            TextEngine::with_options("a  b", LayoutOptions::PLAIN.with_word_spacing(5));
        engine.shape_all().unwrap();
        assert_eq!(engine.glyphs(0).advances, &[256, 256, 261, 256]);
    }

    #[test]
    fn mapped_mode_applies_kerning() {
        let font = MonospaceEngine::default().with_kerning_pair('A', 'V', -30);
        let mut options = LayoutOptions::MAPPED;
        options.kerning = true;
        let mut engine = TextEngine::with_options("AV", options);
        engine.set_fonts(FontSet::new(Arc::new(font)));
        engine.shape_all().unwrap();
        assert_eq!(engine.glyphs(0).advances, &[226, 256]);
    }

    #[test]
    fn spacing_change_reuses_cached_glyphs() {
        let (mut engine, calls) = counting_engine("ab");
        engine.shape(0).unwrap();
        engine.set_options(LayoutOptions::PLAIN.with_word_spacing(3));
        engine.shape_all().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
