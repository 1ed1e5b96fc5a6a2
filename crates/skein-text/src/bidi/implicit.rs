//! Third pass: weak types, neutrals and implicit levels (W1–W7, N0–N2,
//! I1–I2), applied to one isolating run sequence at a time.
//!
//! A sequence is flattened into the list of its character indices. Removed
//! characters (class BN) stay in the list and are skipped by every rule.

use skein_core::bidi::{BidiClass, BracketKind, paired_bracket};
use smallvec::SmallVec;

use super::explicit::{Continuation, DirectionalRun};
use crate::attributes::CharAttr;

/// Bracket pairs tracked at once by rule BD16.
pub const MAX_BRACKET_DEPTH: usize = 63;

#[inline]
fn embedding_class(level: u8) -> BidiClass {
    if level & 1 == 1 {
        BidiClass::R
    } else {
        BidiClass::L
    }
}

/// Strong direction of a class for N0/N1: EN and AN count as R.
#[inline]
fn strong_direction(class: BidiClass) -> Option<BidiClass> {
    match class {
        BidiClass::L => Some(BidiClass::L),
        BidiClass::R | BidiClass::AL | BidiClass::EN | BidiClass::AN => Some(BidiClass::R),
        _ => None,
    }
}

/// Resolve every isolating run sequence. Returns the number of sequences.
pub(crate) fn resolve_implicit(
    text: &[char],
    attrs: &mut [CharAttr],
    runs: &[DirectionalRun],
    base_level: u8,
) -> usize {
    let mut sequence: Vec<usize> = Vec::new();
    let mut count = 0;
    for (idx, run) in runs.iter().enumerate() {
        if run.is_continuation {
            continue;
        }
        count += 1;

        sequence.clear();
        let mut last = idx;
        sequence.extend(run.start..run.end);
        while let Continuation::Run(next) = runs[last].continuation {
            last = next.0;
            sequence.extend(runs[last].start..runs[last].end);
        }

        let level = run.level;
        let before = runs[..idx]
            .iter()
            .rev()
            .take_while(|r| r.paragraph == run.paragraph)
            .find(|r| r.has_content)
            .map_or(base_level, |r| r.level);
        let after = match runs[last].continuation {
            Continuation::ParagraphEnd => base_level,
            _ => runs[last + 1..]
                .iter()
                .take_while(|r| r.paragraph == runs[last].paragraph)
                .find(|r| r.has_content)
                .map_or(base_level, |r| r.level),
        };
        let sos = embedding_class(before.max(level));
        let eos = embedding_class(after.max(level));

        resolve_weak(attrs, &sequence, sos);
        resolve_brackets(text, attrs, &sequence, level, sos);
        resolve_neutrals(attrs, &sequence, level, sos, eos);
        resolve_levels(attrs, &sequence, level);
    }
    count
}

// ---------------------------------------------------------------------------
// Weak types
// ---------------------------------------------------------------------------

/// W1–W7.
fn resolve_weak(attrs: &mut [CharAttr], seq: &[usize], sos: BidiClass) {
    use BidiClass::*;

    // W1: NSM takes the type of the previous character, ON after isolates.
    let mut prev = sos;
    for &i in seq {
        match attrs[i].class {
            BN => continue,
            NSM => attrs[i].class = prev,
            _ => {}
        }
        prev = match attrs[i].class {
            LRI | RLI | FSI | PDI => ON,
            other => other,
        };
    }

    // W2 and W3.
    let mut last_strong = sos;
    for &i in seq {
        match attrs[i].class {
            EN if last_strong == AL => attrs[i].class = AN,
            L | R => last_strong = attrs[i].class,
            AL => {
                last_strong = AL;
                attrs[i].class = R;
            }
            _ => {}
        }
    }

    // W4: a single separator between two numbers of the same type.
    let mut prev_prev: Option<BidiClass> = None;
    let mut prev: Option<(usize, BidiClass)> = None;
    for &i in seq {
        let cur = attrs[i].class;
        if cur == BN {
            continue;
        }
        if let (Some(pp), Some((pi, p))) = (prev_prev, prev.as_mut()) {
            let joined = match (pp, *p, cur) {
                (EN, ES, EN) | (EN, CS, EN) => Some(EN),
                (AN, CS, AN) => Some(AN),
                _ => None,
            };
            if let Some(class) = joined {
                attrs[*pi].class = class;
                *p = class;
            }
        }
        prev_prev = prev.map(|(_, c)| c);
        prev = Some((i, cur));
    }

    // W5: terminators adjacent to European numbers.
    let mut et_start: Option<usize> = None;
    let mut prev_class = sos;
    for (k, &i) in seq.iter().enumerate() {
        let cur = attrs[i].class;
        match cur {
            BN => continue,
            ET => {
                if prev_class == EN {
                    attrs[i].class = EN;
                } else if et_start.is_none() {
                    et_start = Some(k);
                }
            }
            _ => {
                if let Some(start) = et_start.take()
                    && cur == EN
                {
                    for &j in &seq[start..k] {
                        if attrs[j].class == ET {
                            attrs[j].class = EN;
                        }
                    }
                }
            }
        }
        prev_class = attrs[i].class;
    }

    // W6 and W7.
    let mut last_strong = sos;
    for &i in seq {
        match attrs[i].class {
            ES | ET | CS => attrs[i].class = ON,
            EN if last_strong == L => attrs[i].class = L,
            L | R => last_strong = attrs[i].class,
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Paired brackets
// ---------------------------------------------------------------------------

/// BD16: bracket pairs as positions within `seq`, sorted by opener.
fn find_bracket_pairs(text: &[char], attrs: &[CharAttr], seq: &[usize]) -> Vec<(usize, usize)> {
    let mut stack: SmallVec<[(char, usize); 16]> = SmallVec::new();
    let mut pairs = Vec::new();
    for (k, &i) in seq.iter().enumerate() {
        if attrs[i].class != BidiClass::ON {
            continue;
        }
        let Some(bracket) = paired_bracket(text[i]) else {
            continue;
        };
        match bracket.kind {
            BracketKind::Open => {
                if stack.len() == MAX_BRACKET_DEPTH {
                    tracing::trace!(position = i, "bracket stack overflow");
                    break;
                }
                stack.push((bracket.opening, k));
            }
            BracketKind::Close => {
                if let Some(depth) = stack.iter().rposition(|&(o, _)| o == bracket.opening) {
                    pairs.push((stack[depth].1, k));
                    stack.truncate(depth);
                }
            }
        }
    }
    pairs.sort_unstable();
    pairs
}

/// N0.
fn resolve_brackets(
    text: &[char],
    attrs: &mut [CharAttr],
    seq: &[usize],
    level: u8,
    sos: BidiClass,
) {
    let pairs = find_bracket_pairs(text, attrs, seq);
    if pairs.is_empty() {
        return;
    }
    let embedding = embedding_class(level);

    for (open, close) in pairs {
        let mut found_embedding = false;
        let mut found_opposite = false;
        for &i in &seq[open + 1..close] {
            match strong_direction(attrs[i].class) {
                Some(d) if d == embedding => {
                    found_embedding = true;
                    break;
                }
                Some(_) => found_opposite = true,
                None => {}
            }
        }

        let resolved = if found_embedding {
            embedding
        } else if found_opposite {
            let context = seq[..open]
                .iter()
                .rev()
                .find_map(|&i| strong_direction(attrs[i].class))
                .unwrap_or(sos);
            if context != embedding { context } else { embedding }
        } else {
            continue;
        };

        for k in [open, close] {
            attrs[seq[k]].class = resolved;
            // Marks that followed the bracket originally follow it again.
            for &j in &seq[k + 1..] {
                match attrs[j].raw_class {
                    BidiClass::BN => continue,
                    BidiClass::NSM => attrs[j].class = resolved,
                    _ => break,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Neutrals and levels
// ---------------------------------------------------------------------------

/// N1 and N2.
fn resolve_neutrals(
    attrs: &mut [CharAttr],
    seq: &[usize],
    level: u8,
    sos: BidiClass,
    eos: BidiClass,
) {
    let embedding = embedding_class(level);
    let mut last_strong = sos;
    let mut neutral_start: Option<usize> = None;

    for k in 0..=seq.len() {
        let class = match seq.get(k) {
            Some(&i) => attrs[i].class,
            None => eos,
        };
        match strong_direction(class) {
            Some(strong) => {
                if let Some(start) = neutral_start.take() {
                    let resolved = if strong == last_strong { strong } else { embedding };
                    for &j in &seq[start..k] {
                        if attrs[j].class != BidiClass::BN {
                            attrs[j].class = resolved;
                        }
                    }
                }
                last_strong = strong;
            }
            None => {
                if class != BidiClass::BN && neutral_start.is_none() {
                    neutral_start = Some(k);
                }
            }
        }
    }
}

/// I1 and I2.
fn resolve_levels(attrs: &mut [CharAttr], seq: &[usize], level: u8) {
    for &i in seq {
        let attr = &mut attrs[i];
        attr.level = match (level & 1 == 1, attr.class) {
            (_, BidiClass::BN) => continue,
            (false, BidiClass::R) => level + 1,
            (false, BidiClass::AN | BidiClass::EN) => level + 2,
            (true, BidiClass::L | BidiClass::EN | BidiClass::AN) => level + 1,
            _ => level,
        };
    }
}
