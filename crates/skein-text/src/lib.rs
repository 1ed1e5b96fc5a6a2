#![forbid(unsafe_code)]

//! Text: bidi itemization, shaping orchestration, reordering and
//! justification.
//!
//! # Role in skein
//! `skein-text` turns a logical string into positioned glyphs. Character
//! properties come from `skein-core`; glyphs come from whatever
//! [`FontEngine`] the caller installs.
//!
//! # Primary responsibilities
//! - **Itemization**: script/level/case-homogeneous items ([`itemize`]).
//! - **Bidi**: UAX #9 levels in three passes over an attribute array ([`bidi`]).
//! - **Shaping**: per-item, cached, multi-engine aware ([`shaping`]).
//! - **Lines**: reordering (rule L2), metrics and justification
//!   ([`line`], [`reorder`], [`justification`]).
//!
//! # How it fits together
//! [`TextEngine`] owns the string and everything derived from it. Each
//! pass runs lazily on first use and stays valid until an edit
//! invalidates it; raw shaping output outlives invalidation in a
//! [`ShapeCache`].

pub mod attributes;
pub mod bidi;
pub mod engine;
pub mod error;
pub mod font_engine;
pub mod glyphs;
pub mod itemize;
pub mod justification;
pub mod line;
pub mod options;
pub mod reorder;
pub mod shape_cache;
pub mod shaping;

pub use attributes::{BidiFlags, CharAttr, ItemFlag};
pub use bidi::{BidiOutcome, BidiStats};
pub use engine::TextEngine;
pub use error::{FontEngineError, LayoutError, Result};
#[cfg(feature = "shaping")]
pub use font_engine::RustybuzzEngine;
pub use font_engine::{
    FontEngine, FontId, FontSet, GlyphId, GlyphMetrics, MonospaceEngine, MultiEngine, ShapedGlyph,
    ShaperFlags,
};
pub use glyphs::{GlyphAttributes, GlyphJustification, GlyphLayout};
pub use itemize::{ItemMetrics, MAX_ITEM_LENGTH, ScriptItem};
pub use justification::{JustificationClass, JustifyOutcome};
pub use line::{Line, VisualRun};
pub use options::{
    Capitalization, Direction, FormatRange, JustifyMode, LayoutOptions, LetterSpacing,
    TextDirection,
};
pub use reorder::{bidi_reorder, reorder_visual};
pub use shape_cache::{ShapeCache, ShapeCacheStats};

pub use skein_core::Script;
