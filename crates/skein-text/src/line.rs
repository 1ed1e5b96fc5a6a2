#![forbid(unsafe_code)]

//! Lines: caller-chosen character ranges measured, reordered and
//! justified as a unit.
//!
//! Line breaking is the caller's business. [`TextEngine::layout_line`]
//! takes the range as given, splits off trailing whitespace and collects
//! width and vertical metrics from the items it touches.
//!
//! # Example
//!
//! ```
//! use skein_text::engine::TextEngine;
//!
//! let mut engine = TextEngine::new("ab \u{05D0}\u{05D1}");
//! let line = engine.layout_line(0, 5, 10_000).unwrap();
//! let runs = engine.visual_runs(&line);
//! // The Hebrew run comes after the Latin one on an LTR line.
//! assert_eq!(runs.len(), 2);
//! assert!(runs[1].is_rtl());
//! ```

use std::ops::Range;

use skein_core::{LINE_SEPARATOR, PARAGRAPH_SEPARATOR, Script, is_space};

use crate::attributes::ItemFlag;
use crate::engine::TextEngine;
use crate::error::Result;
use crate::font_engine::GlyphMetrics;
use crate::itemize::ItemMetrics;
use crate::reorder::{line_levels, reorder_visual};

/// One laid-out line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Line {
    /// First character.
    pub from: usize,
    /// Character count, trailing whitespace included.
    pub length: usize,
    pub trailing_spaces: usize,
    /// Target width for justification.
    pub width: i32,
    /// Advance of the line without its trailing whitespace.
    pub text_width: i32,
    pub ascent: i32,
    pub descent: i32,
    pub leading: i32,
    pub justified: bool,
    pub gridfitted: bool,
    /// Last line of its paragraph.
    pub ends_paragraph: bool,
    /// Ends with a line separator.
    pub hard_break: bool,
}

impl Line {
    /// One past the last character.
    #[inline]
    #[must_use]
    pub fn end(&self) -> usize {
        self.from + self.length
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> i32 {
        self.ascent + self.descent
    }
}

/// A maximal range of a line with one item and one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualRun {
    pub start: usize,
    /// Exclusive.
    pub end: usize,
    pub level: u8,
    pub item: usize,
}

impl VisualRun {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    #[must_use]
    pub fn is_rtl(&self) -> bool {
        self.level & 1 == 1
    }
}

/// The glyphs of one item that belong to a character range.
#[derive(Debug, Clone)]
pub(crate) struct GlyphSpan {
    pub item: usize,
    /// Absolute indices into the glyph storage.
    pub glyphs: Range<usize>,
}

impl TextEngine {
    /// Lay out the characters `from .. from + length` as one line with a
    /// target `width`.
    ///
    /// Out-of-range arguments are clamped to the text. Any justification
    /// left on the range by an earlier layout is dropped.
    pub fn layout_line(&mut self, from: usize, length: usize, width: i32) -> Result<Line> {
        self.itemize();
        let len = self.text.len();
        let from = from.min(len);
        let length = length.min(len - from);
        let end = from + length;

        let trailing_spaces = self.text[from..end]
            .iter()
            .rev()
            .take_while(|&&c| is_space(c))
            .count();
        self.reset_line_justification(from, end)?;
        let text_width = self.width(from, length - trailing_spaces)?;

        let spans = self.glyph_spans(from, end)?;
        let metrics = if spans.is_empty() {
            let engine = self.fonts.engine_for(Script::Common, ItemFlag::None);
            ItemMetrics {
                ascent: engine.ascent(),
                descent: engine.descent(),
                leading: engine.leading(),
            }
        } else {
            spans
                .iter()
                .map(|s| self.items[s.item].metrics)
                .fold(ItemMetrics::default(), |acc, m| ItemMetrics {
                    ascent: acc.ascent.max(m.ascent),
                    descent: acc.descent.max(m.descent),
                    leading: acc.leading.max(m.leading),
                })
        };

        let last = end.checked_sub(1).filter(|_| length > 0).map(|i| self.text[i]);
        Ok(Line {
            from,
            length,
            trailing_spaces,
            width,
            text_width,
            ascent: metrics.ascent,
            descent: metrics.descent,
            leading: metrics.leading,
            justified: false,
            gridfitted: false,
            ends_paragraph: end == len || matches!(last, Some(PARAGRAPH_SEPARATOR | '\n')),
            hard_break: last == Some(LINE_SEPARATOR),
        })
    }

    /// Advance of the characters `from .. from + len`, justification
    /// included. Shapes items as needed; 0 when out of range.
    pub fn width(&mut self, from: usize, len: usize) -> Result<i32> {
        let spans = self.glyph_spans(from, from.saturating_add(len))?;
        Ok(spans
            .into_iter()
            .map(|s| self.glyphs.layout(s.glyphs).width())
            .sum())
    }

    /// Ink box of the characters `from .. from + len` in logical order,
    /// with `x` measured from the pen position of the first glyph.
    pub fn bounding_box(&mut self, from: usize, len: usize) -> Result<GlyphMetrics> {
        let spans = self.glyph_spans(from, from.saturating_add(len))?;
        let mut acc = GlyphMetrics::default();
        for span in spans {
            let engine = self.engine_for(&self.items[span.item]);
            let layout = self.glyphs.layout(span.glyphs);
            for i in 0..layout.len() {
                let mut m = engine.bounding_box(layout.glyphs[i]);
                m.x += layout.offsets[i].x;
                m.y += layout.offsets[i].y;
                m.x_advance = layout.effective_advance(i);
                acc = acc.union(m);
            }
        }
        Ok(acc)
    }

    /// Runs of `line` in visual order.
    ///
    /// Runs split at item boundaries and level changes. Levels include
    /// the line-end reset of trailing whitespace, so trailing spaces of a
    /// right-to-left run sit at the paragraph level.
    pub fn visual_runs(&mut self, line: &Line) -> Vec<VisualRun> {
        self.itemize();
        let end = line.end().min(self.text.len());
        let from = line.from.min(end);
        let Some(mut item) = self.find_item(from) else {
            return Vec::new();
        };
        let levels = line_levels(&self.attributes, from..end, self.base_level);

        let mut runs: Vec<VisualRun> = Vec::new();
        for (pos, &level) in (from..end).zip(&levels) {
            while pos >= self.items[item].end() {
                item += 1;
            }
            match runs.last_mut() {
                Some(run) if run.level == level && run.item == item => run.end = pos + 1,
                _ => runs.push(VisualRun {
                    start: pos,
                    end: pos + 1,
                    level,
                    item,
                }),
            }
        }

        let run_levels: Vec<u8> = runs.iter().map(|r| r.level).collect();
        reorder_visual(&run_levels)
            .into_iter()
            .map(|i| runs[i])
            .collect()
    }

    /// Glyph spans covering the characters `from..to`, one per item,
    /// shaping items on the way.
    pub(crate) fn glyph_spans(&mut self, from: usize, to: usize) -> Result<Vec<GlyphSpan>> {
        self.itemize();
        let to = to.min(self.text.len());
        if from >= to {
            return Ok(Vec::new());
        }
        let first = self.items.partition_point(|item| item.end() <= from);
        let mut spans = Vec::new();
        for index in first..self.items.len() {
            if self.items[index].position >= to {
                break;
            }
            self.shape(index)?;
            let item = self.items[index];
            let clusters = &self.log_clusters[item.position..item.end()];
            let start = clusters[from.max(item.position) - item.position] as usize;
            let stop = if to >= item.end() {
                item.num_glyphs
            } else {
                clusters[to - item.position] as usize
            };
            spans.push(GlyphSpan {
                item: index,
                glyphs: item.glyph_offset + start..item.glyph_offset + stop.max(start),
            });
        }
        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{LayoutOptions, TextDirection};

    const ALEF: char = '\u{05D0}';
    const BET: char = '\u{05D1}';

    // ── layout_line ──

    #[test]
    fn trailing_spaces_are_split_off() {
        let mut engine = TextEngine::new("ab  cd");
        let line = engine.layout_line(0, 4, 0).unwrap();
        assert_eq!(line.trailing_spaces, 2);
        assert_eq!(line.text_width, 512);
        assert!(!line.ends_paragraph);
        assert_eq!((line.ascent, line.descent), (205, 51));
    }

    #[test]
    fn separators_end_lines() {
        let mut engine = TextEngine::new("ab\u{2028}cd\u{2029}ef");
        let first = engine.layout_line(0, 3, 0).unwrap();
        assert!(first.hard_break);
        assert!(!first.ends_paragraph);
        let second = engine.layout_line(3, 3, 0).unwrap();
        assert!(second.ends_paragraph);
        let third = engine.layout_line(6, 2, 0).unwrap();
        assert!(third.ends_paragraph && !third.hard_break);
    }

    #[test]
    fn out_of_range_line_is_clamped() {
        let mut engine = TextEngine::new("abc");
        let line = engine.layout_line(10, 5, 100).unwrap();
        assert_eq!((line.from, line.length, line.text_width), (3, 0, 0));
        assert_eq!(line.ascent, 205);
    }

    // ── Queries ──

    #[test]
    fn width_inside_clusters() {
        let mut engine = TextEngine::new("e\u{0301}xy");
        assert_eq!(engine.width(0, 4).unwrap(), 768);
        assert_eq!(engine.width(2, 1).unwrap(), 256);
        // A range ending inside a cluster excludes it.
        assert_eq!(engine.width(0, 1).unwrap(), 0);
        assert_eq!(engine.width(7, 2).unwrap(), 0);
    }

    #[test]
    fn width_spans_items() {
        let mut engine = TextEngine::new(&format!("ab{ALEF}{BET}cd"));
        assert_eq!(engine.width(1, 4).unwrap(), 4 * 256);
        assert_eq!(engine.items().len(), 3);
    }

    #[test]
    fn bounding_box_unions_glyphs() {
        let mut engine = TextEngine::new("abc");
        let bbox = engine.bounding_box(0, 3).unwrap();
        assert_eq!(bbox.width, 768);
        assert_eq!(bbox.x_advance, 768);
        assert_eq!(bbox.y, -205);
        assert_eq!(bbox.height, 256);
        assert!(engine.bounding_box(5, 1).unwrap().is_empty());
    }

    // ── Visual runs ──

    #[test]
    fn ltr_paragraph_with_hebrew() {
        let mut engine = TextEngine::new(&format!("ab {ALEF}{BET} cd"));
        let line = engine.layout_line(0, 8, 0).unwrap();
        let runs: Vec<(usize, usize, u8)> = engine
            .visual_runs(&line)
            .iter()
            .map(|r| (r.start, r.end, r.level))
            .collect();
        // The space after the Hebrew word takes its script, so the Latin
        // tail is a separate item.
        assert_eq!(runs, vec![(0, 3, 0), (3, 5, 1), (5, 6, 0), (6, 8, 0)]);
    }

    #[test]
    fn rtl_paragraph_reverses_runs() {
        let mut engine = TextEngine::with_options(
            &format!("{ALEF} ab {BET}"),
            LayoutOptions::PLAIN.with_direction(TextDirection::Rtl),
        );
        let line = engine.layout_line(0, 6, 0).unwrap();
        let runs: Vec<(usize, usize)> = engine
            .visual_runs(&line)
            .iter()
            .map(|r| (r.start, r.end))
            .collect();
        assert_eq!(runs, vec![(5, 6), (4, 5), (2, 4), (0, 2)]);
    }

    #[test]
    fn trailing_space_of_rtl_run_resets() {
        let mut engine = TextEngine::new(&format!("ab {ALEF}{BET} "));
        let line = engine.layout_line(0, 6, 0).unwrap();
        let runs = engine.visual_runs(&line);
        let last = runs.last().unwrap();
        assert_eq!((last.start, last.end, last.level), (5, 6, 0));
    }

    #[test]
    fn empty_line_has_no_runs() {
        let mut engine = TextEngine::new("abc");
        let line = engine.layout_line(3, 0, 0).unwrap();
        assert!(engine.visual_runs(&line).is_empty());
    }
}
