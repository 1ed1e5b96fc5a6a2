#![forbid(unsafe_code)]

//! Visual reordering of resolved levels (UAX #9 rule L2).

use std::ops::Range;

use crate::attributes::{BidiFlags, CharAttr};

/// Reorder `visual_order` in place according to `levels` (rule L2).
///
/// `visual_order` is reset to the identity permutation first. From the
/// highest level down to the lowest odd level, every maximal run of
/// entries at or above the current level is reversed. Equal levels keep
/// their logical order.
pub fn bidi_reorder(levels: &[u8], visual_order: &mut [usize]) {
    debug_assert_eq!(levels.len(), visual_order.len());
    for (i, slot) in visual_order.iter_mut().enumerate() {
        *slot = i;
    }
    let (Some(&max), Some(&min)) = (levels.iter().max(), levels.iter().min()) else {
        return;
    };
    let lowest_odd = min | 1;
    if max < lowest_odd {
        return;
    }

    let n = levels.len();
    let mut level = max;
    while level >= lowest_odd {
        let mut i = 0;
        while i < n {
            if levels[i] < level {
                i += 1;
                continue;
            }
            let start = i;
            while i < n && levels[i] >= level {
                i += 1;
            }
            visual_order[start..i].reverse();
        }
        level -= 1;
    }
}

/// Visual order of `levels` as a fresh permutation.
#[must_use]
pub fn reorder_visual(levels: &[u8]) -> Vec<usize> {
    let mut order = vec![0; levels.len()];
    bidi_reorder(levels, &mut order);
    order
}

/// Levels for a line `range` of a resolved paragraph.
///
/// Applies rule L1 at the line end: trailing whitespace, isolate controls
/// and removed characters before the wrap point go back to `base_level`.
#[must_use]
pub fn line_levels(attrs: &[CharAttr], range: Range<usize>, base_level: u8) -> Vec<u8> {
    let end = range.end.min(attrs.len());
    let line = &attrs[range.start.min(end)..end];
    let mut levels: Vec<u8> = line.iter().map(|a| a.level).collect();
    for (level, attr) in levels.iter_mut().zip(line).rev() {
        if !attr
            .bidi_flags
            .intersects(BidiFlags::MAYBE_RESET | BidiFlags::RESET)
        {
            break;
        }
        *level = base_level;
    }
    levels
}
