#![forbid(unsafe_code)]

//! Shaped glyph storage.
//!
//! All items of a [`TextEngine`](crate::engine::TextEngine) share one
//! struct-of-arrays arena. An item owns the contiguous span
//! `glyph_offset .. glyph_offset + num_glyphs`; spans are appended in the
//! order items are shaped, which need not be logical order.
//!
//! # Invariants
//!
//! * All columns have the same length.
//! * Growth goes through `try_reserve`; a failed reservation leaves the
//!   storage untouched.

use std::ops::Range;

use crate::error::{LayoutError, Result};
use crate::font_engine::{GlyphId, ShapedGlyph};
use crate::justification::JustificationClass;

/// Per-glyph flags recorded by the shaping orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphAttributes {
    /// First glyph of its cluster.
    pub cluster_start: bool,
    /// Produced only by removed or format characters; has no advance.
    pub dont_print: bool,
    pub justification: JustificationClass,
}

/// Space added to a glyph by the justifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphJustification {
    /// Kashida glyphs to draw after the glyph.
    pub nkashidas: u16,
    /// Total extra advance, kashidas included.
    pub space_adjust: i32,
}

/// Offset of a glyph from its pen position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphOffset {
    pub x: i32,
    pub y: i32,
}

/// Glyph arena shared by all items.
#[derive(Debug, Clone, Default)]
pub struct GlyphStorage {
    pub(crate) glyphs: Vec<GlyphId>,
    pub(crate) advances: Vec<i32>,
    pub(crate) offsets: Vec<GlyphOffset>,
    pub(crate) attributes: Vec<GlyphAttributes>,
    pub(crate) justifications: Vec<GlyphJustification>,
}

impl GlyphStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn clear(&mut self) {
        self.glyphs.clear();
        self.advances.clear();
        self.offsets.clear();
        self.attributes.clear();
        self.justifications.clear();
    }

    fn try_reserve(&mut self, additional: usize) -> Result<()> {
        let alloc = |source| LayoutError::Allocation {
            requested: additional,
            source,
        };
        self.glyphs.try_reserve(additional).map_err(alloc)?;
        self.advances.try_reserve(additional).map_err(alloc)?;
        self.offsets.try_reserve(additional).map_err(alloc)?;
        self.attributes.try_reserve(additional).map_err(alloc)?;
        self.justifications.try_reserve(additional).map_err(alloc)?;
        Ok(())
    }

    /// Append shaped glyphs with their attributes; returns the offset of
    /// the first appended glyph.
    pub fn try_append(
        &mut self,
        shaped: &[ShapedGlyph],
        attributes: &[GlyphAttributes],
    ) -> Result<usize> {
        debug_assert_eq!(shaped.len(), attributes.len());
        self.try_reserve(shaped.len())?;
        let offset = self.len();
        for (g, attr) in shaped.iter().zip(attributes) {
            self.glyphs.push(g.glyph_id);
            self.advances.push(if attr.dont_print { 0 } else { g.x_advance });
            self.offsets.push(GlyphOffset {
                x: g.x_offset,
                y: g.y_offset,
            });
            self.attributes.push(*attr);
            self.justifications.push(GlyphJustification::default());
        }
        Ok(offset)
    }

    /// Read-only view of a glyph span. Out-of-range spans are clamped.
    #[must_use]
    pub fn layout(&self, range: Range<usize>) -> GlyphLayout<'_> {
        let end = range.end.min(self.len());
        let range = range.start.min(end)..end;
        GlyphLayout {
            glyphs: &self.glyphs[range.clone()],
            advances: &self.advances[range.clone()],
            offsets: &self.offsets[range.clone()],
            attributes: &self.attributes[range.clone()],
            justifications: &self.justifications[range],
        }
    }

    /// Drop all justification adjustments in a span.
    pub(crate) fn reset_justification(&mut self, range: Range<usize>) {
        let end = range.end.min(self.len());
        for j in &mut self.justifications[range.start.min(end)..end] {
            *j = GlyphJustification::default();
        }
    }
}

/// Borrowed view of the glyphs of one item.
#[derive(Debug, Clone, Copy)]
pub struct GlyphLayout<'a> {
    pub glyphs: &'a [GlyphId],
    pub advances: &'a [i32],
    pub offsets: &'a [GlyphOffset],
    pub attributes: &'a [GlyphAttributes],
    pub justifications: &'a [GlyphJustification],
}

impl GlyphLayout<'_> {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Advance of glyph `i` including justification.
    #[inline]
    #[must_use]
    pub fn effective_advance(&self, i: usize) -> i32 {
        if self.attributes[i].dont_print {
            0
        } else {
            self.advances[i] + self.justifications[i].space_adjust
        }
    }

    /// Sum of effective advances.
    #[must_use]
    pub fn width(&self) -> i32 {
        (0..self.len()).map(|i| self.effective_advance(i)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(id: u32, cluster: u32, advance: i32) -> ShapedGlyph {
        ShapedGlyph::new(GlyphId(id), cluster, advance)
    }

    #[test]
    fn append_returns_offsets() {
        let mut storage = GlyphStorage::new();
        let attrs = [GlyphAttributes::default(); 2];
        let first = storage
            .try_append(&[glyph(1, 0, 10), glyph(2, 1, 20)], &attrs)
            .unwrap();
        let second = storage
            .try_append(&[glyph(3, 0, 30), glyph(4, 1, 40)], &attrs)
            .unwrap();
        assert_eq!(first, 0);
        assert_eq!(second, 2);
        assert_eq!(storage.len(), 4);
        assert_eq!(storage.layout(2..4).advances, &[30, 40]);
    }

    #[test]
    fn dont_print_glyphs_have_no_advance() {
        let mut storage = GlyphStorage::new();
        let attrs = [
            GlyphAttributes::default(),
            GlyphAttributes {
                dont_print: true,
                ..GlyphAttributes::default()
            },
        ];
        storage
            .try_append(&[glyph(1, 0, 10), glyph(2, 1, 20)], &attrs)
            .unwrap();
        let layout = storage.layout(0..2);
        assert_eq!(layout.advances, &[10, 0]);
        assert_eq!(layout.width(), 10);
    }

    #[test]
    fn justification_adds_to_width() {
        let mut storage = GlyphStorage::new();
        storage
            .try_append(&[glyph(1, 0, 10)], &[GlyphAttributes::default()])
            .unwrap();
        storage.justifications[0].space_adjust = 5;
        assert_eq!(storage.layout(0..1).width(), 15);
        storage.reset_justification(0..1);
        assert_eq!(storage.layout(0..1).width(), 10);
    }

    #[test]
    fn out_of_range_layout_is_empty() {
        let storage = GlyphStorage::new();
        assert!(storage.layout(3..7).is_empty());
    }
}
