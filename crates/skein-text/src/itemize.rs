#![forbid(unsafe_code)]

//! Segmentation of analysed text into script items.
//!
//! An item is a maximal run of characters that can be shaped in one call:
//! same embedding level, same item flag, same script. Tabs, inline objects
//! and line/paragraph separators always form items of their own, and no
//! item is longer than [`MAX_ITEM_LENGTH`] characters.
//!
//! A `'.'` never starts a new item because of its script, so host names
//! such as `example.com` inside another script's text stay in one item.

use skein_core::{Script, is_lowercase_letter};
use unicode_segmentation::UnicodeSegmentation;

use crate::attributes::{CharAttr, ItemFlag};
use crate::options::Capitalization;

/// Upper bound on item length, which keeps per-item glyph indices small.
pub const MAX_ITEM_LENGTH: usize = 4096;

/// Vertical metrics of a shaped item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemMetrics {
    pub ascent: i32,
    pub descent: i32,
    pub leading: i32,
}

/// A homogeneous run of text, shaped as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptItem {
    /// Index of the first character.
    pub position: usize,
    pub length: usize,
    pub level: u8,
    pub flag: ItemFlag,
    pub script: Script,
    /// First glyph of the item in the engine's glyph storage.
    pub glyph_offset: usize,
    /// Glyph count; 0 until the item is shaped.
    pub num_glyphs: usize,
    pub metrics: ItemMetrics,
}

impl ScriptItem {
    fn new(position: usize, length: usize, attr: &CharAttr, flag: ItemFlag) -> Self {
        Self {
            position,
            length,
            level: attr.level,
            flag,
            script: attr.script,
            glyph_offset: 0,
            num_glyphs: 0,
            metrics: ItemMetrics::default(),
        }
    }

    /// One past the last character.
    #[inline]
    #[must_use]
    pub fn end(&self) -> usize {
        self.position + self.length
    }

    #[inline]
    #[must_use]
    pub fn is_rtl(&self) -> bool {
        self.level & 1 == 1
    }

    #[inline]
    #[must_use]
    pub fn is_shaped(&self) -> bool {
        self.num_glyphs > 0
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.position && pos < self.end()
    }
}

/// Appends items for ranges of analysed text.
pub struct Itemizer<'a> {
    text: &'a [char],
    attrs: &'a [CharAttr],
    items: &'a mut Vec<ScriptItem>,
}

impl<'a> Itemizer<'a> {
    #[must_use]
    pub fn new(text: &'a [char], attrs: &'a [CharAttr], items: &'a mut Vec<ScriptItem>) -> Self {
        debug_assert_eq!(text.len(), attrs.len());
        Self { text, attrs, items }
    }

    /// Append the items of `start .. start + length`.
    ///
    /// The range is clamped to the text; an empty range appends nothing.
    pub fn generate(&mut self, start: usize, length: usize, capitalization: Capitalization) {
        let start = start.min(self.text.len());
        let end = start.saturating_add(length).min(self.text.len());
        if start >= end {
            return;
        }
        match capitalization {
            Capitalization::MixedCase => self.split(start, end, |_, attr| attr.flag, &[]),
            Capitalization::SmallCaps => {
                let text = self.text;
                self.split(
                    start,
                    end,
                    |i, attr| {
                        if !attr.flag.is_isolated() && is_lowercase_letter(text[i]) {
                            ItemFlag::SmallCaps
                        } else {
                            attr.flag
                        }
                    },
                    &[],
                );
            }
            Capitalization::Capitalize => {
                let word_starts = self.word_starts(start, end);
                self.split(
                    start,
                    end,
                    |i, attr| {
                        if !attr.flag.is_isolated() && word_starts.binary_search(&i).is_ok() {
                            ItemFlag::Uppercase
                        } else {
                            attr.flag
                        }
                    },
                    &word_starts,
                );
            }
            Capitalization::AllUppercase | Capitalization::AllLowercase => {
                let first = self.items.len();
                self.split(start, end, |_, attr| attr.flag, &[]);
                let flag = if capitalization == Capitalization::AllUppercase {
                    ItemFlag::Uppercase
                } else {
                    ItemFlag::Lowercase
                };
                for item in &mut self.items[first..] {
                    if !item.flag.is_isolated() {
                        item.flag = flag;
                    }
                }
            }
        }
    }

    /// Character indices in `start..end` that begin a word.
    fn word_starts(&self, start: usize, end: usize) -> Vec<usize> {
        let s: String = self.text[start..end].iter().collect();
        let mut starts = Vec::new();
        let mut pos = start;
        for segment in s.split_word_bounds() {
            if segment.chars().next().is_some_and(char::is_alphanumeric) {
                starts.push(pos);
            }
            pos += segment.chars().count();
        }
        starts
    }

    /// Core splitter. `flag_of` gives each character's effective flag;
    /// `breaks` (sorted) lists positions that must start a new item, and
    /// the character after a break position is split off too.
    fn split(
        &mut self,
        start: usize,
        end: usize,
        flag_of: impl Fn(usize, &CharAttr) -> ItemFlag,
        breaks: &[usize],
    ) {
        let forced = |i: usize| {
            breaks.binary_search(&i).is_ok() || (i > 0 && breaks.binary_search(&(i - 1)).is_ok())
        };

        let mut item_start = start;
        let mut item_flag = flag_of(start, &self.attrs[start]);
        for i in start + 1..end {
            let attr = &self.attrs[i];
            let head = &self.attrs[item_start];
            let flag = flag_of(i, attr);
            let boundary = attr.level != head.level
                || flag != item_flag
                || item_flag.is_isolated()
                || flag.is_isolated()
                || (attr.script != head.script && self.text[i] != '.')
                || i - item_start >= MAX_ITEM_LENGTH
                || forced(i);
            if boundary {
                self.items.push(ScriptItem::new(item_start, i - item_start, head, item_flag));
                item_start = i;
                item_flag = flag;
            }
        }
        self.items.push(ScriptItem::new(
            item_start,
            end - item_start,
            &self.attrs[item_start],
            item_flag,
        ));
    }
}
