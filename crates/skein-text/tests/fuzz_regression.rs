//! Deterministic fuzz-style regression tests.
//!
//! These exercise the same code paths as the libfuzzer targets under
//! `fuzz/` but run in CI through proptest. Inputs are arbitrary scalar
//! values, so every bidi class, control and separator shows up. The
//! pipeline must never panic and must keep its structural invariants.
//!
//! When a libfuzzer crash is found, add the reproducing input as a
//! concrete case at the bottom of this file.

use skein_text::options::{
    Capitalization, Direction, FormatRange, JustifyMode, LayoutOptions, LetterSpacing,
    TextDirection,
};
use skein_text::TextEngine;

use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn arb_fuzzy_text(max_len: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<char>(), 0..max_len).prop_map(|chars| chars.into_iter().collect())
}

fn arb_capitalization() -> impl Strategy<Value = Capitalization> {
    prop_oneof![
        Just(Capitalization::MixedCase),
        Just(Capitalization::AllUppercase),
        Just(Capitalization::AllLowercase),
        Just(Capitalization::SmallCaps),
        Just(Capitalization::Capitalize),
    ]
}

fn arb_format() -> impl Strategy<Value = FormatRange> {
    (0usize..80, 0usize..80, arb_capitalization(), any::<Option<bool>>()).prop_map(
        |(a, b, caps, rtl)| {
            let mut format = FormatRange::new(a.min(b)..a.max(b)).with_capitalization(caps);
            if let Some(rtl) = rtl {
                format = format.with_direction_override(if rtl { Direction::Rtl } else { Direction::Ltr });
            }
            format
        },
    )
}

/// Run every pass over `text` and check the cheap invariants.
fn run_pipeline(text: &str, options: LayoutOptions, formats: Vec<FormatRange>, width: i32) {
    let mut engine = TextEngine::with_options(text, options);
    engine.set_formats(formats);
    engine.shape_all().unwrap();

    let len = engine.text().len();
    let mut from = 0;
    // Fixed-size lines; breaking policy does not matter here.
    while from < len {
        let length = 7.min(len - from);
        let mut line = engine.layout_line(from, length, width).unwrap();
        let runs = engine.visual_runs(&line);
        let covered: usize = runs.iter().map(|r| r.len()).sum();
        assert_eq!(covered, length);
        let _ = engine.justify(&mut line).unwrap();
        let _ = engine.bounding_box(from, length).unwrap();
        from += length;
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Pipeline fuzz
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn fuzz_pipeline_no_panic(text in arb_fuzzy_text(120), width in -100i32..10_000) {
        run_pipeline(
            &text,
            LayoutOptions::PLAIN.with_justify(JustifyMode::Distributed),
            Vec::new(),
            width,
        );
    }

    #[test]
    fn fuzz_formats_no_panic(
        text in arb_fuzzy_text(80),
        formats in prop::collection::vec(arb_format(), 0..4),
    ) {
        run_pipeline(&text, LayoutOptions::TYPOGRAPHIC, formats, 3000);
    }

    #[test]
    fn fuzz_mapped_mode_no_panic(text in arb_fuzzy_text(80), spacing in -50i32..50) {
        let options = LayoutOptions::MAPPED
            .with_direction(TextDirection::Rtl)
            .with_letter_spacing(LetterSpacing::Absolute(spacing))
            .with_word_spacing(spacing);
        run_pipeline(&text, options, Vec::new(), 2000);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Concrete regressions
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn deep_embeddings() {
    let text: String = "\u{202B}".repeat(300) + "abc" + &"\u{202C}".repeat(300);
    run_pipeline(&text, LayoutOptions::PLAIN, Vec::new(), 1000);
}

#[test]
fn deep_isolates() {
    let text: String = "\u{2067}a".repeat(200) + &"\u{2069}".repeat(50);
    run_pipeline(&text, LayoutOptions::PLAIN, Vec::new(), 1000);
}

#[test]
fn bracket_stack_overflow() {
    let text = format!("\u{05D0}{}a{}", "(".repeat(100), ")".repeat(100));
    run_pipeline(&text, LayoutOptions::PLAIN, Vec::new(), 1000);
}

#[test]
fn lone_terminators() {
    run_pipeline("\u{2069}\u{202C}\u{2069}a\u{202C}", LayoutOptions::PLAIN, Vec::new(), 100);
}

#[test]
fn separators_only() {
    run_pipeline("\u{2029}\u{2029}\n\u{2028}\t", LayoutOptions::TYPOGRAPHIC, Vec::new(), 100);
}

#[test]
fn override_past_end_of_text() {
    let formats = vec![FormatRange::new(2..500).with_direction_override(Direction::Rtl)];
    run_pipeline("abc", LayoutOptions::PLAIN, formats, 100);
}
