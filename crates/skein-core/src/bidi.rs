#![forbid(unsafe_code)]

//! Bidi character properties: class, paired brackets and mirroring.
//!
//! Classes come from the UCD tables compiled into `unicode-bidi`. Paired
//! brackets are normalized to their canonical decomposition so that
//! U+2329/U+232A pair with U+3008/U+3009, as rule BD16 requires.

use unicode_bidi::{BidiDataSource, HardcodedBidiData};
use unicode_normalization::char::decompose_canonical;

pub use unicode_bidi::BidiClass;

/// First code point that can make a paragraph need bidi processing.
///
/// Text consisting only of characters below this value, resolved at base
/// level 0, is entirely left-to-right at level 0.
pub const BIDI_SIGNIFICANT_START: u32 = 0x0590;

/// The bidi class of a character.
#[inline]
pub fn bidi_class(c: char) -> BidiClass {
    HardcodedBidiData.bidi_class(c)
}

/// Whether `c` forces the resolver to run on a level-0 paragraph.
#[inline]
pub fn is_bidi_significant(c: char) -> bool {
    c as u32 >= BIDI_SIGNIFICANT_START
}

/// Whether the class is strong (L, R or AL).
#[inline]
pub const fn is_strong(class: BidiClass) -> bool {
    matches!(class, BidiClass::L | BidiClass::R | BidiClass::AL)
}

/// Whether the class is an explicit embedding, override or pop.
#[inline]
pub const fn is_embedding_control(class: BidiClass) -> bool {
    matches!(
        class,
        BidiClass::LRE | BidiClass::RLE | BidiClass::LRO | BidiClass::RLO | BidiClass::PDF
    )
}

/// Whether the class starts an isolate.
#[inline]
pub const fn is_isolate_initiator(class: BidiClass) -> bool {
    matches!(class, BidiClass::LRI | BidiClass::RLI | BidiClass::FSI)
}

/// Whether the class is a neutral or isolate formatting character (NI).
#[inline]
pub const fn is_neutral_or_isolate(class: BidiClass) -> bool {
    matches!(
        class,
        BidiClass::B
            | BidiClass::S
            | BidiClass::WS
            | BidiClass::ON
            | BidiClass::LRI
            | BidiClass::RLI
            | BidiClass::FSI
            | BidiClass::PDI
    )
}

/// Role of a character in bracket pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BracketKind {
    /// An opening paired bracket.
    Open,
    /// A closing paired bracket.
    Close,
}

/// Paired-bracket data for one character.
///
/// `opening` identifies the pair: it is the canonical opening bracket for
/// both halves, so an opener and a closer match when their `opening`
/// fields are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairedBracket {
    pub opening: char,
    pub kind: BracketKind,
}

/// Paired-bracket properties of `c`, or `None` for non-brackets.
pub fn paired_bracket(c: char) -> Option<PairedBracket> {
    let matched = HardcodedBidiData.bidi_matched_opening_bracket(c)?;
    Some(PairedBracket {
        opening: canonical(matched.opening),
        kind: if matched.is_open {
            BracketKind::Open
        } else {
            BracketKind::Close
        },
    })
}

/// Single-character canonical decomposition, or `c` itself.
fn canonical(c: char) -> char {
    let mut first = None;
    let mut count = 0usize;
    decompose_canonical(c, |d| {
        if first.is_none() {
            first = Some(d);
        }
        count += 1;
    });
    match (first, count) {
        (Some(d), 1) => d,
        _ => c,
    }
}

/// Whether `c` has the Bidi_Mirrored property.
///
/// Every paired bracket is mirrored; beyond those, the common mirrored
/// mathematical and quotation characters are listed explicitly.
pub fn is_mirrored(c: char) -> bool {
    if paired_bracket(c).is_some() {
        return true;
    }
    matches!(
        c,
        '<' | '>'
            | '\u{00AB}'
            | '\u{00BB}'
            | '\u{2039}'
            | '\u{203A}'
            | '\u{2264}'
            | '\u{2265}'
            | '\u{226A}'
            | '\u{226B}'
            | '\u{2208}'..='\u{220D}'
            | '\u{2282}'..='\u{228B}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_of_common_characters() {
        assert_eq!(bidi_class('a'), BidiClass::L);
        assert_eq!(bidi_class('\u{05D0}'), BidiClass::R);
        assert_eq!(bidi_class('\u{0627}'), BidiClass::AL);
        assert_eq!(bidi_class('1'), BidiClass::EN);
        assert_eq!(bidi_class('\u{0661}'), BidiClass::AN);
        assert_eq!(bidi_class(' '), BidiClass::WS);
        assert_eq!(bidi_class('\t'), BidiClass::S);
        assert_eq!(bidi_class('\u{2029}'), BidiClass::B);
        assert_eq!(bidi_class('\u{2067}'), BidiClass::RLI);
        assert_eq!(bidi_class('\u{200D}'), BidiClass::BN);
    }

    #[test]
    fn significance_threshold() {
        assert!(!is_bidi_significant('z'));
        assert!(!is_bidi_significant('\u{00E9}'));
        assert!(is_bidi_significant('\u{05D0}'));
        assert!(is_bidi_significant('\u{202E}'));
    }

    #[test]
    fn ascii_brackets_pair() {
        let open = paired_bracket('(').unwrap();
        let close = paired_bracket(')').unwrap();
        assert_eq!(open.kind, BracketKind::Open);
        assert_eq!(close.kind, BracketKind::Close);
        assert_eq!(open.opening, close.opening);
        assert!(paired_bracket('a').is_none());
        assert!(paired_bracket('<').is_none());
    }

    #[test]
    fn angle_brackets_are_canonically_equivalent() {
        let a = paired_bracket('\u{2329}').unwrap();
        let b = paired_bracket('\u{3009}').unwrap();
        assert_eq!(a.kind, BracketKind::Open);
        assert_eq!(b.kind, BracketKind::Close);
        assert_eq!(a.opening, b.opening);
    }

    #[test]
    fn mirrored_covers_brackets_and_relations() {
        assert!(is_mirrored('['));
        assert!(is_mirrored('<'));
        assert!(is_mirrored('\u{2264}'));
        assert!(!is_mirrored('a'));
    }

    #[test]
    fn class_groups() {
        assert!(is_strong(BidiClass::AL));
        assert!(!is_strong(BidiClass::EN));
        assert!(is_embedding_control(BidiClass::PDF));
        assert!(!is_embedding_control(BidiClass::PDI));
        assert!(is_isolate_initiator(BidiClass::FSI));
        assert!(is_neutral_or_isolate(BidiClass::PDI));
        assert!(!is_neutral_or_isolate(BidiClass::BN));
    }
}
