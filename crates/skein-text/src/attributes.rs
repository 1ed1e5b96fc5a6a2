#![forbid(unsafe_code)]

//! Per-character analysis shared by the bidi resolver and the itemizer.

use bitflags::bitflags;
use skein_core::{BidiClass, Script};

/// Highest explicit embedding level (UAX #9 `max_depth`).
pub const MAX_DEPTH: u8 = 125;

bitflags! {
    /// Bidi bookkeeping flags set during classification.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BidiFlags: u8 {
        /// Removed by rule X9: embedding controls and boundary neutrals.
        const BN = 1;
        /// Reset to the paragraph level when trailing (rule L1).
        const MAYBE_RESET = 1 << 1;
        /// Always reset to the paragraph level: segment and paragraph
        /// separators (rule L1).
        const RESET = 1 << 2;
        /// Has the Bidi_Mirrored property.
        const MIRRORED = 1 << 3;
    }
}

/// Item-level character flag.
///
/// Variants from `Separator` on force single-character items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum ItemFlag {
    #[default]
    None,
    Lowercase,
    Uppercase,
    SmallCaps,
    /// Line or paragraph separator.
    Separator,
    Tab,
    /// Inline object (U+FFFC).
    Object,
}

impl ItemFlag {
    /// Whether the character always forms an item of its own.
    #[inline]
    #[must_use]
    pub const fn is_isolated(self) -> bool {
        matches!(self, Self::Separator | Self::Tab | Self::Object)
    }

    /// Whether the flag requests a case transform before shaping.
    #[inline]
    #[must_use]
    pub const fn is_case_transform(self) -> bool {
        matches!(self, Self::Lowercase | Self::Uppercase | Self::SmallCaps)
    }
}

/// Analysis of one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharAttr {
    /// Bidi class from the character database.
    pub raw_class: BidiClass,
    /// Class as rewritten by the resolver's passes.
    pub class: BidiClass,
    /// Resolved embedding level.
    pub level: u8,
    pub bidi_flags: BidiFlags,
    pub script: Script,
    pub flag: ItemFlag,
}

impl Default for CharAttr {
    fn default() -> Self {
        Self {
            raw_class: BidiClass::L,
            class: BidiClass::L,
            level: 0,
            bidi_flags: BidiFlags::empty(),
            script: Script::Common,
            flag: ItemFlag::None,
        }
    }
}

impl CharAttr {
    /// Whether the character was removed by rule X9.
    #[inline]
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.bidi_flags.contains(BidiFlags::BN)
    }

    /// Whether the character sits at an odd (right-to-left) level.
    #[inline]
    #[must_use]
    pub fn is_rtl(&self) -> bool {
        self.level & 1 == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolated_flags() {
        assert!(ItemFlag::Tab.is_isolated());
        assert!(ItemFlag::Object.is_isolated());
        assert!(!ItemFlag::SmallCaps.is_isolated());
        assert!(ItemFlag::Separator > ItemFlag::SmallCaps);
    }

    #[test]
    fn default_attr_is_ltr() {
        let attr = CharAttr::default();
        assert!(!attr.is_rtl());
        assert!(!attr.is_removed());
    }
}
