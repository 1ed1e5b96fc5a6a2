//! Diagnostics emitted through `tracing` by the shaping and justification
//! passes.

use std::sync::Arc;

use skein_text::font_engine::{
    FontEngine, FontId, FontSet, GlyphId, GlyphMetrics, MonospaceEngine, MultiEngine, ShapedGlyph,
    ShaperFlags,
};
use skein_text::options::{JustifyMode, LayoutOptions};
use skein_text::{FontEngineError, JustifyOutcome, LayoutError, Script, TextEngine};
use tracing_test::traced_test;

/// A font engine that never produces glyphs.
struct Silent;

impl FontEngine for Silent {
    fn font_id(&self) -> FontId {
        FontId(42)
    }

    fn map_to_glyphs(
        &self,
        _text: &[char],
        _script: Script,
        _flags: ShaperFlags,
    ) -> Result<Vec<ShapedGlyph>, FontEngineError> {
        Ok(Vec::new())
    }

    fn advance(&self, _glyph: GlyphId) -> i32 {
        0
    }

    fn bounding_box(&self, _glyph: GlyphId) -> GlyphMetrics {
        GlyphMetrics::default()
    }

    fn ascent(&self) -> i32 {
        0
    }

    fn descent(&self) -> i32 {
        0
    }
}

#[traced_test]
#[test]
fn empty_shaping_is_logged() {
    let mut engine = TextEngine::new("abc");
    engine.set_fonts(FontSet::new(Arc::new(Silent)));
    let err = engine.shape_all().unwrap_err();
    assert!(matches!(err, LayoutError::ShapingFailed { item: 0, .. }));
    assert!(err.is_backend());
    assert!(logs_contain("font engine produced no glyphs"));
}

/// Maps glyph indices for its coverage but shapes nothing.
struct IndicesOnly(MonospaceEngine);

impl FontEngine for IndicesOnly {
    fn font_id(&self) -> FontId {
        self.0.font_id()
    }

    fn map_to_glyphs(
        &self,
        text: &[char],
        script: Script,
        flags: ShaperFlags,
    ) -> Result<Vec<ShapedGlyph>, FontEngineError> {
        if flags.contains(ShaperFlags::GLYPH_INDICES_ONLY) {
            self.0.map_to_glyphs(text, script, flags)
        } else {
            Ok(Vec::new())
        }
    }

    fn advance(&self, glyph: GlyphId) -> i32 {
        self.0.advance(glyph)
    }

    fn bounding_box(&self, glyph: GlyphId) -> GlyphMetrics {
        self.0.bounding_box(glyph)
    }

    fn ascent(&self) -> i32 {
        self.0.ascent()
    }

    fn descent(&self) -> i32 {
        self.0.descent()
    }

    fn covers(&self, c: char) -> bool {
        self.0.covers(c)
    }
}

#[traced_test]
#[test]
fn empty_sub_engine_run_fails_the_item() {
    let letters = MonospaceEngine::new(FontId(1)).with_coverage(vec!['a'..='z']);
    let digits = IndicesOnly(MonospaceEngine::new(FontId(2)).with_coverage(vec!['0'..='9']));
    let children: Vec<Arc<dyn FontEngine>> = vec![Arc::new(letters), Arc::new(digits)];
    let multi = MultiEngine::new(FontId(3), children);
    let mut engine = TextEngine::with_options("ab12", LayoutOptions::PLAIN);
    engine.set_fonts(FontSet::new(Arc::new(multi)));
    let err = engine.shape_all().unwrap_err();
    assert!(matches!(err, LayoutError::ShapingFailed { item: 0, length: 4 }));
    assert!(!engine.items()[0].is_shaped());
    assert!(logs_contain("font engine produced no glyphs"));
}

#[traced_test]
#[test]
fn failed_item_does_not_poison_others() {
    let mut engine = TextEngine::new("ab\u{05D0}\u{05D1}");
    engine.set_fonts(
        FontSet::default().with_script(Script::Hebrew, Arc::new(Silent)),
    );
    engine.itemize();
    assert_eq!(engine.shape(0).unwrap(), 2);
    assert!(engine.shape(1).is_err());
    assert!(engine.items()[0].is_shaped());
    assert!(!engine.items()[1].is_shaped());
    assert!(logs_contain("font engine produced no glyphs"));
}

#[traced_test]
#[test]
fn justification_outcome_is_logged() {
    let mut engine = TextEngine::with_options(
        "ab cd",
        LayoutOptions::PLAIN.with_justify(JustifyMode::Distributed),
    );
    let mut line = engine.layout_line(0, 5, 2000).unwrap();
    assert_eq!(engine.justify(&mut line).unwrap(), JustifyOutcome::Justified);
    assert!(logs_contain("line justified"));
}

#[traced_test]
#[test]
fn overflow_is_logged() {
    let mut engine = TextEngine::with_options(
        "abcdef",
        LayoutOptions::PLAIN.with_justify(JustifyMode::Distributed),
    );
    let mut line = engine.layout_line(0, 6, 10).unwrap();
    assert_eq!(engine.justify(&mut line).unwrap(), JustifyOutcome::Overflow);
    assert!(logs_contain("line overflows its width"));
}
