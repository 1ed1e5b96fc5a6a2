#![forbid(unsafe_code)]

//! LRU cache of raw shaping output with generation-based invalidation.
//!
//! Entries hold the glyphs a font engine returned for an item's
//! (case-transformed) text, before letter spacing, word spacing and
//! justification are applied. They therefore survive
//! [`TextEngine::invalidate`](crate::engine::TextEngine::invalidate): when
//! the text is edited, every item whose content did not change is served
//! from the cache.
//!
//! # Key schema
//!
//! | Field        | Purpose                                   |
//! |--------------|-------------------------------------------|
//! | `text_hash`  | FxHash of the characters handed to shaping |
//! | `text_len`   | Character count (collision avoidance)     |
//! | `script`     | Script of the item                        |
//! | `rtl`        | Item direction                            |
//! | `flag`       | Case transform                            |
//! | `font_id`    | Engine identity                           |
//! | `flags`      | Shaping mode and kerning                  |
//! | `generation` | Invalidation epoch                        |
//!
//! # Invalidation
//!
//! Font changes bump the generation. The generation lives only in the key;
//! a lookup with an older key evicts its entry and counts it as stale, the
//! rest age out through the LRU.

use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use rustc_hash::FxHasher;
use skein_core::Script;

use crate::attributes::ItemFlag;
use crate::font_engine::{FontId, ShapedGlyph, ShaperFlags};

/// Cache key for one shaping request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeKey {
    pub text_hash: u64,
    pub text_len: u32,
    pub script: Script,
    pub rtl: bool,
    pub flag: ItemFlag,
    pub font_id: FontId,
    pub flags: ShaperFlags,
    pub generation: u64,
}

impl ShapeKey {
    #[must_use]
    pub fn new(
        text: &[char],
        script: Script,
        flag: ItemFlag,
        font_id: FontId,
        flags: ShaperFlags,
        generation: u64,
    ) -> Self {
        let mut hasher = FxHasher::default();
        text.hash(&mut hasher);
        Self {
            text_hash: hasher.finish(),
            text_len: text.len() as u32,
            script,
            rtl: flags.contains(ShaperFlags::RIGHT_TO_LEFT),
            flag,
            font_id,
            flags,
            generation,
        }
    }
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShapeCacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries found with an older generation.
    pub stale_evictions: u64,
    pub size: usize,
    pub capacity: usize,
    pub generation: u64,
}

/// LRU cache of shaped glyph runs.
#[derive(Debug)]
pub struct ShapeCache {
    cache: LruCache<ShapeKey, Arc<[ShapedGlyph]>>,
    generation: u64,
    stats: ShapeCacheStats,
}

fn non_zero(capacity: usize) -> NonZeroUsize {
    NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN)
}

impl ShapeCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(non_zero(capacity)),
            generation: 0,
            stats: ShapeCacheStats {
                capacity,
                ..Default::default()
            },
        }
    }

    /// Current invalidation epoch; part of every key.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Look up a run, counting the hit or miss. A key from an older
    /// generation evicts its entry.
    pub fn get(&mut self, key: &ShapeKey) -> Option<Arc<[ShapedGlyph]>> {
        if key.generation != self.generation {
            if self.cache.pop(key).is_some() {
                self.stats.stale_evictions += 1;
                self.stats.size = self.cache.len();
            }
        } else if let Some(glyphs) = self.cache.get(key) {
            self.stats.hits += 1;
            return Some(Arc::clone(glyphs));
        }
        self.stats.misses += 1;
        None
    }

    /// Store a run under `key`.
    pub fn put(&mut self, key: ShapeKey, glyphs: Arc<[ShapedGlyph]>) {
        self.cache.put(key, glyphs);
        self.stats.size = self.cache.len();
    }

    /// Bump the generation. Stale entries are evicted lazily.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.stats.generation = self.generation;
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> ShapeCacheStats {
        ShapeCacheStats {
            size: self.cache.len(),
            ..self.stats
        }
    }

    /// Change the capacity, evicting least recently used entries.
    pub fn resize(&mut self, capacity: usize) {
        self.cache.resize(non_zero(capacity));
        self.stats.capacity = capacity;
        self.stats.size = self.cache.len();
    }
}
