use std::collections::TryReserveError;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors reported by a [`FontEngine`](crate::font_engine::FontEngine).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FontEngineError {
    #[error("font data could not be parsed")]
    InvalidFont,

    #[error("sub-engine {index} is not available")]
    MissingSubEngine { index: u8 },

    #[error("cluster {cluster} of glyph {glyph} is out of order or out of range ({len} characters)")]
    InvalidClusters { glyph: usize, cluster: u32, len: usize },
}

/// Errors surfaced by the layout pipeline.
///
/// Malformed bidi input never produces an error; only resource exhaustion
/// and font-engine contract violations do.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("glyph storage could not grow by {requested} glyphs")]
    Allocation {
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("font engine produced no glyphs for item {item} ({length} characters)")]
    ShapingFailed { item: usize, length: usize },

    #[error("font engine error: {0}")]
    Backend(#[from] FontEngineError),
}

impl LayoutError {
    /// Whether the error came from the font engine rather than from memory
    /// pressure.
    #[must_use]
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::ShapingFailed { .. } | Self::Backend(_))
    }
}
