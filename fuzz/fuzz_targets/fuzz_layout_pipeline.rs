#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use skein_text::options::{
    Capitalization, Direction, FormatRange, JustifyMode, LayoutOptions, LetterSpacing,
};
use skein_text::TextEngine;

#[derive(Debug, Arbitrary)]
struct Format {
    start: u8,
    end: u8,
    caps: u8,
    rtl: Option<bool>,
}

#[derive(Debug, Arbitrary)]
struct Input {
    text: String,
    formats: Vec<Format>,
    line_len: u8,
    width: i16,
    letter_spacing: i8,
    word_spacing: i8,
    mapped: bool,
}

fn to_format(f: &Format) -> FormatRange {
    let (a, b) = (f.start as usize, f.end as usize);
    let caps = match f.caps % 5 {
        0 => Capitalization::MixedCase,
        1 => Capitalization::AllUppercase,
        2 => Capitalization::AllLowercase,
        3 => Capitalization::SmallCaps,
        _ => Capitalization::Capitalize,
    };
    let mut format = FormatRange::new(a.min(b)..a.max(b)).with_capitalization(caps);
    if let Some(rtl) = f.rtl {
        format = format.with_direction_override(if rtl { Direction::Rtl } else { Direction::Ltr });
    }
    format
}

fuzz_target!(|input: Input| {
    if input.text.len() > 1024 || input.formats.len() > 8 {
        return;
    }
    let base = if input.mapped { LayoutOptions::MAPPED } else { LayoutOptions::TYPOGRAPHIC };
    let options = base
        .with_justify(JustifyMode::Distributed)
        .with_letter_spacing(LetterSpacing::Absolute(i32::from(input.letter_spacing)))
        .with_word_spacing(i32::from(input.word_spacing));

    let mut engine = TextEngine::with_options(&input.text, options);
    engine.set_formats(input.formats.iter().map(to_format).collect());
    engine.shape_all().expect("default engine shapes any text");

    let len = engine.text().len();
    let step = usize::from(input.line_len.max(1));
    let mut from = 0;
    while from < len {
        let length = step.min(len - from);
        let mut line = engine
            .layout_line(from, length, i32::from(input.width))
            .expect("line inside the text");
        let covered: usize = engine.visual_runs(&line).iter().map(|r| r.len()).sum();
        assert_eq!(covered, length, "visual runs must cover the line");
        engine.justify(&mut line).expect("justify a laid out line");
        engine.bounding_box(from, length).expect("bounding box of a laid out line");
        from += length;
    }
});
