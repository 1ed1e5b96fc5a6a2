#![forbid(unsafe_code)]

//! Unicode Bidirectional Algorithm (UAX #9) over a character attribute array.
//!
//! # Design
//!
//! The resolver runs three passes over one `&mut [CharAttr]` buffer, each
//! pass owning the buffer exclusively while it runs:
//!
//! 1. **Classify** ([`classify`]): raw classes, flags and isolate pairs.
//! 2. **Explicit** ([`explicit`]): rules X1–X8 produce directional runs,
//!    chained into isolating run sequences through an index arena.
//! 3. **Implicit** ([`implicit`]): W1–W7, N0–N2 and I1–I2 per sequence.
//!
//! A post-pass gives removed characters (X9) the level of their neighbour
//! and applies rule L1 at the end of every paragraph. All stacks are
//! explicit and depth-capped; nothing recurses over the input.
//!
//! Text whose paragraph level is 0 and which contains no character at or
//! above U+0590 is reported as [`BidiOutcome::NotNeeded`] after the
//! classification pass: every level stays 0.
//!
//! # Example
//!
//! ```
//! use skein_text::attributes::CharAttr;
//! use skein_text::bidi::{BidiOutcome, resolve};
//!
//! let text: Vec<char> = "ab \u{05D0}\u{05D1}".chars().collect();
//! let mut attrs = vec![CharAttr::default(); text.len()];
//! let outcome = resolve(&text, &mut attrs, 0, &[]);
//! assert!(matches!(outcome, BidiOutcome::Resolved(_)));
//! let levels: Vec<u8> = attrs.iter().map(|a| a.level).collect();
//! assert_eq!(levels, vec![0, 0, 0, 1, 1]);
//! ```

mod classify;
mod explicit;
mod implicit;

use skein_core::bidi::{BidiClass, is_bidi_significant, is_isolate_initiator};

pub use classify::{IsolatePair, MAX_ISOLATE_PAIRS_DEPTH};
pub use explicit::{Continuation, DirectionOverride, DirectionalRun, RunId};
pub use implicit::MAX_BRACKET_DEPTH;

use crate::attributes::{BidiFlags, CharAttr};
use crate::options::{Direction, TextDirection};

/// Diagnostics collected while resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BidiStats {
    pub runs: usize,
    pub sequences: usize,
    pub isolate_pairs: usize,
    pub isolates_opened: usize,
    pub isolates_closed: usize,
    pub overflow_isolates: usize,
    pub overflow_embeddings: usize,
}

/// Result of [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidiOutcome {
    /// The text is purely left-to-right; all levels are 0.
    NotNeeded,
    /// The full algorithm ran.
    Resolved(BidiStats),
}

impl BidiOutcome {
    #[must_use]
    pub fn stats(&self) -> Option<&BidiStats> {
        match self {
            Self::NotNeeded => None,
            Self::Resolved(stats) => Some(stats),
        }
    }
}

/// Whether resolving `text` can produce any level other than 0.
#[must_use]
pub fn needs_bidi(text: &[char], base_level: u8, overrides: &[DirectionOverride]) -> bool {
    base_level != 0
        || overrides.iter().any(|o| o.start < o.end)
        || text.iter().any(|&c| is_bidi_significant(c))
}

/// Direction of the first strong character (rules P2/P3).
///
/// Characters between an isolate initiator and its matching PDI are
/// skipped, and the scan stops at the first paragraph separator.
#[must_use]
pub fn first_strong(text: &[char]) -> Option<Direction> {
    let mut isolate_depth = 0usize;
    for &c in text {
        let class = skein_core::bidi_class(c);
        match class {
            BidiClass::B => return None,
            _ if is_isolate_initiator(class) => isolate_depth += 1,
            BidiClass::PDI => isolate_depth = isolate_depth.saturating_sub(1),
            BidiClass::L if isolate_depth == 0 => return Some(Direction::Ltr),
            BidiClass::R | BidiClass::AL if isolate_depth == 0 => return Some(Direction::Rtl),
            _ => {}
        }
    }
    None
}

/// Paragraph embedding level for the requested direction.
#[must_use]
pub fn paragraph_level(text: &[char], direction: TextDirection) -> u8 {
    match direction {
        TextDirection::Ltr => 0,
        TextDirection::Rtl => 1,
        TextDirection::Auto => match first_strong(text) {
            Some(Direction::Rtl) => 1,
            _ => 0,
        },
    }
}

/// Resolve embedding levels for `text` into `attrs`.
///
/// Every paragraph separator in the text starts a new paragraph; all
/// paragraphs share `base_level`. `overrides` act as directional override
/// controls wrapped around their ranges.
pub fn resolve(
    text: &[char],
    attrs: &mut [CharAttr],
    base_level: u8,
    overrides: &[DirectionOverride],
) -> BidiOutcome {
    debug_assert_eq!(text.len(), attrs.len());
    let _span = tracing::debug_span!("bidi_resolve", len = text.len(), base_level).entered();

    let pairs = classify::classify(text, attrs);
    if !needs_bidi(text, base_level, overrides) {
        return BidiOutcome::NotNeeded;
    }

    let (runs, explicit) = explicit::resolve_explicit(text, attrs, &pairs, base_level, overrides);
    let sequences = implicit::resolve_implicit(text, attrs, &runs, base_level);
    assign_removed_levels(attrs, base_level);
    reset_trailing_levels(attrs, base_level);

    let stats = BidiStats {
        runs: runs.len(),
        sequences,
        isolate_pairs: pairs.len(),
        isolates_opened: explicit.isolates_opened,
        isolates_closed: explicit.isolates_closed,
        overflow_isolates: explicit.overflow_isolates,
        overflow_embeddings: explicit.overflow_embeddings,
    };
    if stats.overflow_isolates + stats.overflow_embeddings > 0 {
        tracing::trace!(
            overflow_isolates = stats.overflow_isolates,
            overflow_embeddings = stats.overflow_embeddings,
            "explicit stack overflow"
        );
    }
    BidiOutcome::Resolved(stats)
}

/// Removed characters take the level of the previous character; at the
/// start of the text, the level of the next kept character.
fn assign_removed_levels(attrs: &mut [CharAttr], base_level: u8) {
    let mut prev: Option<u8> = None;
    for i in 0..attrs.len() {
        if attrs[i].class == BidiClass::BN {
            attrs[i].level = match prev {
                Some(level) => level,
                None => attrs[i + 1..]
                    .iter()
                    .find(|a| a.class != BidiClass::BN)
                    .map_or(base_level, |a| a.level),
            };
        }
        prev = Some(attrs[i].level);
    }
}

/// Rule L1 at paragraph ends: separators and the whitespace, isolate
/// controls and removed characters before them go back to `base_level`.
fn reset_trailing_levels(attrs: &mut [CharAttr], base_level: u8) {
    let mut resetting = true;
    for attr in attrs.iter_mut().rev() {
        if attr.bidi_flags.contains(BidiFlags::RESET) {
            attr.level = base_level;
            resetting = true;
        } else if resetting && attr.bidi_flags.contains(BidiFlags::MAYBE_RESET) {
            attr.level = base_level;
        } else {
            resetting = false;
        }
    }
}
