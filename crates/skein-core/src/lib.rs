#![forbid(unsafe_code)]

//! Character property lookups for the skein text engine.
//!
//! Everything here is a pure function of a single code point (or of a short
//! character slice for contextual properties) and backed by read-only
//! tables, so the lookups are safe to call from any thread.
//!
//! - [`bidi`]: bidi class, paired brackets, mirroring.
//! - [`script`]: Unicode script and contextual resolution.
//! - [`joining`]: Arabic joining type, group and contextual form.

pub mod bidi;
pub mod joining;
pub mod script;

pub use bidi::{BidiClass, bidi_class};
pub use script::{Script, char_script};

/// Object replacement character, laid out as an inline object.
pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';
/// Unicode line separator.
pub const LINE_SEPARATOR: char = '\u{2028}';
/// Unicode paragraph separator.
pub const PARAGRAPH_SEPARATOR: char = '\u{2029}';
/// Arabic tatweel, the glyph inserted for kashida justification.
pub const TATWEEL: char = '\u{0640}';

/// Whether `c` is a lowercase letter for small-caps splitting.
#[inline]
pub fn is_lowercase_letter(c: char) -> bool {
    c.is_lowercase() && c.is_alphabetic()
}

/// Single-character uppercase mapping.
///
/// Mappings that expand to several characters (`ß` → `SS`) would break the
/// one-to-one correspondence between logical and shaped characters, so the
/// original character is kept for them.
pub fn to_upper_single(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Single-character lowercase mapping; see [`to_upper_single`].
pub fn to_lower_single(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Whether `c` is a letter or a number (an inter-character justification
/// opportunity follows it).
#[inline]
pub fn is_letter_or_number(c: char) -> bool {
    c.is_alphanumeric()
}

/// Whether `c` is a word-separating space for justification and word
/// spacing.
#[inline]
pub fn is_space(c: char) -> bool {
    c.is_whitespace() && !matches!(c, LINE_SEPARATOR | PARAGRAPH_SEPARATOR | '\n' | '\r')
}
