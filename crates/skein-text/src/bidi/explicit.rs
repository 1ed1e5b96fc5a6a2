//! Second pass: explicit levels (X1–X8) and directional runs.
//!
//! Runs are stored in an arena and chained into isolating run sequences by
//! [`Continuation`] links. A run ending in an isolate initiator continues at
//! the run starting with the matching PDI; runs at the same level that are
//! separated only by removed characters continue each other as well (BD13).

use skein_core::bidi::{BidiClass, is_isolate_initiator};
use smallvec::SmallVec;

use super::classify::IsolatePair;
use super::first_strong;
use crate::attributes::{CharAttr, MAX_DEPTH};
use crate::options::Direction;

/// Index of a run in the run arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(pub usize);

/// Where an isolating run sequence continues after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Continuation {
    /// The sequence ends with this run.
    #[default]
    None,
    /// The sequence continues with another run.
    Run(RunId),
    /// The run ends with an isolate initiator that is never closed; the
    /// sequence's `eos` is taken from the paragraph level.
    ParagraphEnd,
}

/// A maximal span of characters at one explicit level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionalRun {
    pub start: usize,
    /// Exclusive end.
    pub end: usize,
    pub level: u8,
    pub continuation: Continuation,
    /// Reached through another run's continuation link; not the start of
    /// an isolating run sequence.
    pub is_continuation: bool,
    /// Contains at least one character that is not removed by X9.
    pub has_content: bool,
    /// Index of the paragraph the run belongs to.
    pub paragraph: usize,
}

/// A per-character direction override coming from formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionOverride {
    pub start: usize,
    pub end: usize,
    pub direction: Direction,
}

/// Counters describing the explicit pass, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExplicitStats {
    /// Isolate initiators that pushed a stack entry.
    pub isolates_opened: usize,
    /// PDIs that popped a valid isolate entry.
    pub isolates_closed: usize,
    /// Isolate initiators rejected by the depth limit.
    pub overflow_isolates: usize,
    /// Embeddings and overrides rejected by the depth limit.
    pub overflow_embeddings: usize,
}

#[derive(Debug, Clone, Copy)]
struct StatusEntry {
    level: u8,
    is_override: bool,
    is_isolate: bool,
    run_before_isolate: Option<RunId>,
}

struct RunBuilder<'a> {
    attrs: &'a mut [CharAttr],
    base_level: u8,
    runs: Vec<DirectionalRun>,
    stack: SmallVec<[StatusEntry; 16]>,
    level: u8,
    is_override: bool,
    overflow_isolates: usize,
    overflow_embeddings: usize,
    valid_isolates: usize,
    run_start: usize,
    continuation_from: Option<RunId>,
    last_run_with_content: Option<RunId>,
    run_has_content: bool,
    paragraph: usize,
    stats: ExplicitStats,
}

#[inline]
fn override_class(level: u8) -> BidiClass {
    if level & 1 == 1 {
        BidiClass::R
    } else {
        BidiClass::L
    }
}

impl<'a> RunBuilder<'a> {
    fn new(attrs: &'a mut [CharAttr], base_level: u8) -> Self {
        let mut stack = SmallVec::new();
        stack.push(StatusEntry {
            level: base_level,
            is_override: false,
            is_isolate: false,
            run_before_isolate: None,
        });
        Self {
            attrs,
            base_level,
            runs: Vec::new(),
            stack,
            level: base_level,
            is_override: false,
            overflow_isolates: 0,
            overflow_embeddings: 0,
            valid_isolates: 0,
            run_start: 0,
            continuation_from: None,
            last_run_with_content: None,
            run_has_content: false,
            paragraph: 0,
            stats: ExplicitStats::default(),
        }
    }

    fn top(&self) -> StatusEntry {
        // The base entry is never popped.
        self.stack[self.stack.len() - 1]
    }

    fn restore_from_top(&mut self) {
        let top = self.top();
        self.level = top.level;
        self.is_override = top.is_override;
    }

    /// Close the current run at `end` (exclusive); empty runs are skipped.
    fn append_run(&mut self, end: usize) {
        if end <= self.run_start {
            return;
        }
        let id = RunId(self.runs.len());
        let mut is_continuation = false;
        if let Some(from) = self.continuation_from.take() {
            self.runs[from.0].continuation = Continuation::Run(id);
            is_continuation = true;
        } else if let Some(last) = self.last_run_with_content
            && self.runs[last.0].level == self.level
        {
            self.runs[last.0].continuation = Continuation::Run(id);
            is_continuation = true;
        }
        if self.run_has_content {
            self.last_run_with_content = Some(id);
        }
        for attr in &mut self.attrs[self.run_start..end] {
            attr.level = self.level;
        }
        self.runs.push(DirectionalRun {
            start: self.run_start,
            end,
            level: self.level,
            continuation: Continuation::None,
            is_continuation,
            has_content: self.run_has_content,
            paragraph: self.paragraph,
        });
        self.run_has_content = false;
        self.run_start = end;
    }

    /// X2–X5c. `run_end` is where the run preceding the new level stops.
    fn push(&mut self, run_end: usize, rtl: bool, is_override: bool, is_isolate: bool) {
        let top = self.top().level;
        let new_level = if rtl { (top + 1) | 1 } else { (top + 2) & !1 };
        if new_level <= MAX_DEPTH && self.overflow_isolates == 0 && self.overflow_embeddings == 0
        {
            let run_before_isolate = if is_isolate {
                self.valid_isolates += 1;
                self.stats.isolates_opened += 1;
                Some(RunId(self.runs.len()))
            } else {
                None
            };
            self.append_run(run_end);
            self.stack.push(StatusEntry {
                level: new_level,
                is_override,
                is_isolate,
                run_before_isolate,
            });
            self.level = new_level;
            self.is_override = is_override;
        } else if is_isolate {
            self.overflow_isolates += 1;
            self.stats.overflow_isolates += 1;
        } else {
            if self.overflow_isolates == 0 {
                self.overflow_embeddings += 1;
            }
            self.stats.overflow_embeddings += 1;
        }
    }

    /// X7.
    fn pop_embedding(&mut self, run_end: usize) {
        if self.overflow_isolates > 0 {
            return;
        }
        if self.overflow_embeddings > 0 {
            self.overflow_embeddings -= 1;
        } else if !self.top().is_isolate && self.stack.len() >= 2 {
            self.append_run(run_end);
            self.stack.pop();
            self.restore_from_top();
        }
    }

    /// X6a.
    fn pop_isolate(&mut self, pos: usize) {
        if self.overflow_isolates > 0 {
            self.overflow_isolates -= 1;
        } else if self.valid_isolates > 0 {
            self.append_run(pos);
            self.overflow_embeddings = 0;
            while !self.top().is_isolate {
                self.stack.pop();
            }
            let entry = self.stack.pop();
            self.continuation_from = entry.and_then(|e| e.run_before_isolate);
            self.restore_from_top();
            self.last_run_with_content = None;
            self.valid_isolates -= 1;
            self.stats.isolates_closed += 1;
        }
        // The PDI opens the run that continues the initiator's sequence.
        self.run_has_content = true;
        if self.is_override {
            self.attrs[pos].class = override_class(self.level);
        }
    }

    /// Unwind to the base entry, marking isolates left open.
    fn close_open_isolates(&mut self) {
        while self.stack.len() > 1 {
            if let Some(entry) = self.stack.pop()
                && entry.is_isolate
                && let Some(run) = entry.run_before_isolate
            {
                self.runs[run.0].continuation = Continuation::ParagraphEnd;
            }
        }
    }

    /// X8.
    fn end_paragraph(&mut self, pos: usize) {
        self.append_run(pos);
        self.close_open_isolates();
        self.continuation_from = None;
        self.last_run_with_content = None;
        self.valid_isolates = 0;
        self.overflow_isolates = 0;
        self.overflow_embeddings = 0;
        self.level = self.base_level;
        self.is_override = false;
        self.paragraph += 1;
    }
}

/// Run the explicit pass, rewriting classes and assigning explicit levels.
///
/// Returns the run arena in text order.
pub(crate) fn resolve_explicit(
    text: &[char],
    attrs: &mut [CharAttr],
    pairs: &[IsolatePair],
    base_level: u8,
    overrides: &[DirectionOverride],
) -> (Vec<DirectionalRun>, ExplicitStats) {
    let len = attrs.len();
    let mut builder = RunBuilder::new(attrs, base_level);

    // Formatting overrides act as LRO/RLO before their start and PDF after
    // their end. Pops sort before pushes at the same position.
    let mut events: Vec<(usize, Option<Direction>)> = Vec::with_capacity(overrides.len() * 2);
    for ov in overrides {
        if ov.start < ov.end && ov.start < len {
            events.push((ov.start, Some(ov.direction)));
            events.push((ov.end.min(len), None));
        }
    }
    events.sort_by_key(|&(pos, dir)| (pos, dir.is_some()));
    let mut next_event = 0;
    let mut next_pair = 0;

    for i in 0..len {
        while let Some(&(pos, dir)) = events.get(next_event) {
            if pos != i {
                break;
            }
            match dir {
                Some(d) => builder.push(i, d.is_rtl(), true, false),
                None => builder.pop_embedding(i),
            }
            next_event += 1;
        }

        let class = builder.attrs[i].raw_class;
        match class {
            BidiClass::LRE | BidiClass::RLE | BidiClass::LRO | BidiClass::RLO => {
                let rtl = matches!(class, BidiClass::RLE | BidiClass::RLO);
                let is_override = matches!(class, BidiClass::LRO | BidiClass::RLO);
                builder.push(i, rtl, is_override, false);
                builder.attrs[i].class = BidiClass::BN;
            }
            BidiClass::PDF => {
                builder.pop_embedding(i + 1);
                builder.attrs[i].class = BidiClass::BN;
            }
            _ if is_isolate_initiator(class) => {
                if builder.is_override {
                    builder.attrs[i].class = override_class(builder.level);
                }
                builder.run_has_content = true;
                let rtl = match class {
                    BidiClass::RLI => true,
                    BidiClass::LRI => false,
                    _ => {
                        while pairs.get(next_pair).is_some_and(|p| p.start < i) {
                            next_pair += 1;
                        }
                        pairs
                            .get(next_pair)
                            .filter(|p| p.start == i)
                            .and_then(|p| first_strong(&text[p.start + 1..p.end]))
                            == Some(Direction::Rtl)
                    }
                };
                builder.push(i + 1, rtl, false, true);
            }
            BidiClass::PDI => builder.pop_isolate(i),
            BidiClass::B => builder.end_paragraph(i),
            BidiClass::BN => {}
            _ => {
                builder.run_has_content = true;
                if builder.is_override {
                    builder.attrs[i].class = override_class(builder.level);
                }
            }
        }
    }
    builder.append_run(len);
    builder.close_open_isolates();

    let RunBuilder { runs, stats, .. } = builder;
    (runs, stats)
}
