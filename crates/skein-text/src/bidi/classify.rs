//! First pass: bidi classes, flags and isolate pairs.

use skein_core::bidi::{BidiClass, bidi_class, is_mirrored};
use smallvec::SmallVec;

use crate::attributes::{BidiFlags, CharAttr};

/// Isolate nesting depth up to which pairs are recorded.
pub const MAX_ISOLATE_PAIRS_DEPTH: usize = 128;

/// An isolate initiator and the character that closes it.
///
/// `end` is the matching PDI, the paragraph separator that terminated the
/// isolate, or the text length when it was never closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IsolatePair {
    pub start: usize,
    pub end: usize,
}

/// Fill in raw classes and flags, and collect isolate pairs in order of
/// their initiators.
///
/// Initiators nested deeper than [`MAX_ISOLATE_PAIRS_DEPTH`] are counted
/// so that their PDIs stay balanced, but are not recorded.
pub(crate) fn classify(text: &[char], attrs: &mut [CharAttr]) -> Vec<IsolatePair> {
    let len = text.len();
    let mut pairs = Vec::new();
    let mut open: SmallVec<[usize; 16]> = SmallVec::new();
    let mut depth = 0usize;

    for (pos, (&c, attr)) in text.iter().zip(attrs.iter_mut()).enumerate() {
        let class = bidi_class(c);
        attr.raw_class = class;
        attr.class = class;
        attr.bidi_flags = match class {
            BidiClass::ON if is_mirrored(c) => BidiFlags::MIRRORED,
            BidiClass::LRE
            | BidiClass::RLE
            | BidiClass::LRO
            | BidiClass::RLO
            | BidiClass::PDF
            | BidiClass::BN => BidiFlags::MAYBE_RESET | BidiFlags::BN,
            BidiClass::LRI | BidiClass::RLI | BidiClass::FSI => {
                if depth < MAX_ISOLATE_PAIRS_DEPTH {
                    open.push(pairs.len());
                    pairs.push(IsolatePair { start: pos, end: len });
                }
                depth += 1;
                BidiFlags::MAYBE_RESET
            }
            BidiClass::PDI => {
                if depth > 0 {
                    depth -= 1;
                    if depth < MAX_ISOLATE_PAIRS_DEPTH
                        && let Some(idx) = open.pop()
                    {
                        pairs[idx].end = pos;
                    }
                }
                BidiFlags::MAYBE_RESET
            }
            BidiClass::WS => BidiFlags::MAYBE_RESET,
            BidiClass::S => BidiFlags::RESET,
            BidiClass::B => {
                // A paragraph separator closes every open isolate.
                while let Some(idx) = open.pop() {
                    pairs[idx].end = pos;
                }
                depth = 0;
                BidiFlags::RESET
            }
            _ => BidiFlags::empty(),
        };
    }
    pairs
}
