#![forbid(unsafe_code)]

//! Inter-glyph justification of a laid-out line.
//!
//! # Design
//!
//! Every glyph that ends a cluster carries a [`JustificationClass`]
//! assigned during shaping. Justifying a line collects one opportunity
//! ("point") per eligible glyph and spends the slack in two phases:
//!
//! 1. **Kashida.** In joined scripts, each word offers at most one point:
//!    its best-ranked letter. Kashidas are inserted from the best class
//!    down, one per point per round, while the slack still covers the
//!    narrowest kashida.
//! 2. **Space.** The remainder goes to the highest class at or below
//!    [`JustificationClass::Space`] that has points, split exactly: each
//!    point receives `need / n` with `n` counting down, so the total
//!    added equals the slack in integer units.
//!
//! Trailing whitespace and the line's last character never receive
//! space. If slack remains after both phases, every adjustment on the
//! line is rolled back.

use std::fmt;

use skein_core::joining::{JoiningForm, JoiningGroup, JoiningType, joining, joining_forms};
use skein_core::script::SpaceJustification;
use skein_core::{Script, TATWEEL, is_letter_or_number, is_space};

use crate::engine::TextEngine;
use crate::error::Result;
use crate::line::Line;

// =========================================================================
// JustificationClass
// =========================================================================

/// Justification opportunity after a glyph, ordered by priority.
///
/// The Arabic classes rank kashida positions: a kashida before a Seen or
/// after a letter joining a Hah/Dal looks better than one in front of an
/// ordinary medial letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum JustificationClass {
    #[default]
    Prohibited = 0,
    ArabicSpace = 1,
    Character = 2,
    Space = 4,
    ArabicNormal = 7,
    ArabicWaw = 8,
    ArabicBaRa = 9,
    ArabicAlef = 10,
    ArabicHahDal = 11,
    ArabicSeen = 12,
    ArabicKashida = 13,
}

impl JustificationClass {
    /// Whether the class is filled with kashidas rather than space.
    #[inline]
    #[must_use]
    pub const fn is_kashida(self) -> bool {
        (self as u8) >= (Self::ArabicNormal as u8)
    }

    fn for_space(script: Script) -> Self {
        match script.space_justification() {
            SpaceJustification::Space => Self::Space,
            SpaceJustification::ArabicSpace => Self::ArabicSpace,
            SpaceJustification::Character => Self::Character,
        }
    }
}

impl fmt::Display for JustificationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Prohibited => "prohibited",
            Self::ArabicSpace => "arabic-space",
            Self::Character => "character",
            Self::Space => "space",
            Self::ArabicNormal => "arabic-normal",
            Self::ArabicWaw => "arabic-waw",
            Self::ArabicBaRa => "arabic-ba-ra",
            Self::ArabicAlef => "arabic-alef",
            Self::ArabicHahDal => "arabic-hah-dal",
            Self::ArabicSeen => "arabic-seen",
            Self::ArabicKashida => "arabic-kashida",
        };
        f.write_str(name)
    }
}

/// Justification class of every character of an item's text.
pub(crate) fn char_classes(text: &[char], script: Script) -> Vec<JustificationClass> {
    let space = JustificationClass::for_space(script);
    if !script.uses_kashida() {
        return text
            .iter()
            .map(|&c| {
                if is_space(c) {
                    space
                } else if is_letter_or_number(c) {
                    JustificationClass::Character
                } else {
                    JustificationClass::Prohibited
                }
            })
            .collect();
    }

    let forms = joining_forms(text);
    let joins: Vec<(JoiningType, JoiningGroup)> = text.iter().map(|&c| joining(c)).collect();
    (0..text.len())
        .map(|i| {
            if is_space(text[i]) {
                space
            } else {
                kashida_class(text, &forms, &joins, i)
            }
        })
        .collect()
}

/// Rank of a kashida inserted after character `i`.
fn kashida_class(
    text: &[char],
    forms: &[JoiningForm],
    joins: &[(JoiningType, JoiningGroup)],
    i: usize,
) -> JustificationClass {
    use JoiningGroup as G;
    use JustificationClass as J;

    if text[i] == TATWEEL {
        return J::ArabicKashida;
    }
    if !matches!(forms[i], JoiningForm::Initial | JoiningForm::Medial) {
        return J::Prohibited;
    }
    let next_letter = |from: usize| {
        (from + 1..text.len()).find(|&j| joins[j].0 != JoiningType::Transparent)
    };

    let mut class = match joins[i].1 {
        G::Seen | G::Sad => J::ArabicSeen,
        _ => J::ArabicNormal,
    };
    if let Some(n) = next_letter(i) {
        let by_next = match joins[n].1 {
            G::Waw | G::Ain | G::Qaf | G::Feh => J::ArabicWaw,
            G::Beh | G::Noon | G::Yeh
                if forms[n] == JoiningForm::Medial
                    && next_letter(n).is_some_and(|m| {
                        forms[m] == JoiningForm::Final
                            && matches!(joins[m].1, G::Reh | G::Yeh | G::AlefMaksura)
                    }) =>
            {
                J::ArabicBaRa
            }
            G::Alef | G::Tah | G::Lam | G::Kaf | G::Gaf => J::ArabicAlef,
            G::Hah | G::Dal | G::TehMarbuta => J::ArabicHahDal,
            _ => J::ArabicNormal,
        };
        class = class.max(by_next);
    }
    class
}

// =========================================================================
// Justify
// =========================================================================

/// Result of [`TextEngine::justify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JustifyOutcome {
    /// The slack was distributed; the line now has its target width.
    Justified,
    /// The line is wider than its target. Nothing was added and the line
    /// is marked justified.
    Overflow,
    /// The line has slack but no point can take it. Nothing was added.
    InsufficientPoints,
    /// The alignment mode does not stretch this line.
    Skipped,
    AlreadyJustified,
}

impl fmt::Display for JustifyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Justified => write!(f, "justified"),
            Self::Overflow => write!(f, "overflow"),
            Self::InsufficientPoints => write!(f, "insufficient-points"),
            Self::Skipped => write!(f, "skipped"),
            Self::AlreadyJustified => write!(f, "already-justified"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Point {
    /// Absolute glyph index.
    glyph: usize,
    class: JustificationClass,
    /// Width of one kashida; 0 for space points.
    kashida: i32,
}

impl TextEngine {
    /// Stretch `line` to its target width.
    ///
    /// On success the glyphs of the line carry their extra advance and
    /// `line.text_width` equals `line.width`.
    pub fn justify(&mut self, line: &mut Line) -> Result<JustifyOutcome> {
        if line.justified {
            return Ok(JustifyOutcome::AlreadyJustified);
        }
        let mode = self.options.justify;
        if !mode.requires_justification()
            || (!mode.justify_last_line() && (line.ends_paragraph || line.hard_break))
        {
            return Ok(JustifyOutcome::Skipped);
        }
        let _span = tracing::debug_span!("justify", from = line.from, length = line.length).entered();
        self.itemize();
        line.gridfitted = true;

        let line_end = line.from + line.length;
        let end = line_end - line.trailing_spaces.min(line.length);
        self.reset_line_justification(line.from, line_end)?;

        let mut need = line.width - line.text_width;
        if self.base_level & 1 == 1 && self.options.include_trailing_spaces {
            need -= self.width(end, line_end - end)?;
        }
        if need < 0 {
            line.justified = true;
            tracing::debug!(need, "line overflows its width");
            return Ok(JustifyOutcome::Overflow);
        }
        if need == 0 {
            line.justified = true;
            return Ok(JustifyOutcome::Justified);
        }

        let points = self.collect_points(line.from, end)?;
        let total = need;

        // Kashida phase.
        let min_kashida = points
            .iter()
            .filter(|p| p.class.is_kashida())
            .map(|p| p.kashida)
            .min();
        if let Some(min_kashida) = min_kashida {
            let max_class = points.iter().map(|p| p.class).max().unwrap_or_default();
            while need >= min_kashida {
                let before = need;
                for class in kashida_classes_down_from(max_class) {
                    for p in points.iter().filter(|p| p.class == class) {
                        if need < min_kashida {
                            break;
                        }
                        if p.kashida <= need {
                            let j = &mut self.glyphs.justifications[p.glyph];
                            j.nkashidas += 1;
                            j.space_adjust += p.kashida;
                            need -= p.kashida;
                        }
                    }
                }
                if need == before {
                    break;
                }
            }
        }

        // Space phase.
        if need > 0 {
            let space_class = points
                .iter()
                .map(|p| p.class)
                .filter(|&c| c != JustificationClass::Prohibited && c <= JustificationClass::Space)
                .max();
            if let Some(class) = space_class {
                let mut n = points.iter().filter(|p| p.class == class).count() as i32;
                for p in points.iter().filter(|p| p.class == class) {
                    let add = need / n;
                    self.glyphs.justifications[p.glyph].space_adjust += add;
                    need -= add;
                    n -= 1;
                }
            }
        }

        if need != 0 {
            self.reset_line_justification(line.from, line_end)?;
            tracing::debug!(need, points = points.len(), "no points left for the slack");
            return Ok(JustifyOutcome::InsufficientPoints);
        }
        line.text_width += total;
        line.justified = true;
        tracing::debug!(added = total, points = points.len(), "line justified");
        Ok(JustifyOutcome::Justified)
    }

    /// Justification points of the characters `from..end`, in logical
    /// order. Kashida points are limited to one per word.
    fn collect_points(&mut self, from: usize, end: usize) -> Result<Vec<Point>> {
        let spans = self.glyph_spans(from, end)?;
        let last_glyph = spans
            .iter()
            .rev()
            .find(|s| !s.glyphs.is_empty())
            .map(|s| s.glyphs.end - 1);

        let mut points = Vec::new();
        for span in &spans {
            let item = self.items[span.item];
            let kashida = if item.script.uses_kashida() {
                self.engine_for(&item).kashida_width().filter(|&w| w > 0)
            } else {
                None
            };

            let mut word_best: Option<Point> = None;
            for g in span.glyphs.clone() {
                if Some(g) == last_glyph {
                    break;
                }
                let class = self.glyphs.attributes[g].justification;
                match class {
                    JustificationClass::Prohibited => {}
                    c if c.is_kashida() => {
                        if let Some(width) = kashida
                            && word_best.is_none_or(|best| c >= best.class)
                        {
                            word_best = Some(Point {
                                glyph: g,
                                class: c,
                                kashida: width,
                            });
                        }
                    }
                    c => {
                        if matches!(c, JustificationClass::Space | JustificationClass::ArabicSpace) {
                            points.extend(word_best.take());
                        }
                        points.push(Point {
                            glyph: g,
                            class: c,
                            kashida: 0,
                        });
                    }
                }
            }
            points.extend(word_best);
        }
        Ok(points)
    }

    /// Drop the justification of every glyph of `from..to`.
    pub(crate) fn reset_line_justification(&mut self, from: usize, to: usize) -> Result<()> {
        for span in self.glyph_spans(from, to)? {
            self.glyphs.reset_justification(span.glyphs);
        }
        Ok(())
    }
}

fn kashida_classes_down_from(max: JustificationClass) -> impl Iterator<Item = JustificationClass> {
    use JustificationClass as J;
    [
        J::ArabicKashida,
        J::ArabicSeen,
        J::ArabicHahDal,
        J::ArabicAlef,
        J::ArabicBaRa,
        J::ArabicWaw,
        J::ArabicNormal,
    ]
    .into_iter()
    .filter(move |&c| c <= max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{JustifyMode, LayoutOptions};

    const BEH: char = '\u{0628}';
    const SEEN: char = '\u{0633}';
    const HAH: char = '\u{062D}';
    const ALEF: char = '\u{0627}';
    const REH: char = '\u{0631}';

    fn classes(s: &str, script: Script) -> Vec<JustificationClass> {
        let text: Vec<char> = s.chars().collect();
        char_classes(&text, script)
    }

    // ── Classes ──

    #[test]
    fn class_priorities_are_ordered() {
        assert!(JustificationClass::ArabicKashida > JustificationClass::ArabicSeen);
        assert!(JustificationClass::Space > JustificationClass::Character);
        assert!(JustificationClass::Character > JustificationClass::ArabicSpace);
        assert!(JustificationClass::ArabicNormal.is_kashida());
        assert!(!JustificationClass::Space.is_kashida());
        assert_eq!(JustificationClass::default(), JustificationClass::Prohibited);
    }

    #[test]
    fn latin_classes() {
        use JustificationClass as J;
        assert_eq!(
            classes("a1 ,", Script::Latin),
            vec![J::Character, J::Character, J::Space, J::Prohibited]
        );
    }

    #[test]
    fn spaces_follow_script() {
        assert_eq!(classes(" ", Script::Han), vec![JustificationClass::Character]);
        assert_eq!(classes(" ", Script::Arabic), vec![JustificationClass::ArabicSpace]);
    }

    #[test]
    fn arabic_kashida_classes() {
        use JustificationClass as J;
        // beh seen hah: beh is initial before seen, seen medial before hah,
        // hah final.
        let text = format!("{BEH}{SEEN}{HAH}");
        assert_eq!(
            classes(&text, Script::Arabic),
            vec![J::ArabicNormal, J::ArabicSeen, J::Prohibited]
        );
    }

    #[test]
    fn alef_and_tatweel_classes() {
        use JustificationClass as J;
        let text = format!("{BEH}{ALEF}\u{0640}");
        let got = classes(&text, Script::Arabic);
        assert_eq!(got[0], J::ArabicAlef);
        // Alef does not join forward.
        assert_eq!(got[1], J::Prohibited);
        assert_eq!(got[2], J::ArabicKashida);
    }

    #[test]
    fn ba_ra_before_final_reh() {
        let text = format!("{SEEN}{BEH}{REH}");
        let got = classes(&text, Script::Arabic);
        assert_eq!(got[0], JustificationClass::ArabicSeen);
        assert_eq!(got[1], JustificationClass::ArabicNormal);

        let text = format!("{HAH}{BEH}{REH}");
        assert_eq!(classes(&text, Script::Arabic)[0], JustificationClass::ArabicBaRa);
    }

    // ── Justify ──

    fn justified_engine(text: &str) -> TextEngine {
        TextEngine::with_options(text, LayoutOptions::PLAIN.with_justify(JustifyMode::Full))
    }

    fn adjustments(engine: &TextEngine) -> Vec<i32> {
        engine.glyphs.justifications.iter().map(|j| j.space_adjust).collect()
    }

    #[test]
    fn skipped_when_left_aligned() {
        let mut engine = TextEngine::new("a b");
        let mut line = engine.layout_line(0, 3, 1000).unwrap();
        assert_eq!(engine.justify(&mut line).unwrap(), JustifyOutcome::Skipped);
    }

    #[test]
    fn full_skips_last_line_distributed_does_not() {
        let mut engine = justified_engine("a b");
        let mut line = engine.layout_line(0, 3, 1000).unwrap();
        assert!(line.ends_paragraph);
        assert_eq!(engine.justify(&mut line).unwrap(), JustifyOutcome::Skipped);

        engine.set_options(LayoutOptions::PLAIN.with_justify(JustifyMode::Distributed));
        let mut line = engine.layout_line(0, 3, 1000).unwrap();
        assert_eq!(engine.justify(&mut line).unwrap(), JustifyOutcome::Justified);
        assert_eq!(line.text_width, 1000);
    }

    #[test]
    fn slack_goes_to_spaces_exactly() {
        let mut engine = justified_engine("a b c d");
        let mut line = engine.layout_line(0, 6, 7 * 256).unwrap();
        assert_eq!(line.trailing_spaces, 1);
        assert_eq!(line.text_width, 5 * 256);
        assert_eq!(engine.justify(&mut line).unwrap(), JustifyOutcome::Justified);
        assert_eq!(line.text_width, line.width);
        assert_eq!(engine.width(0, 5).unwrap(), 7 * 256);
        let adj = adjustments(&engine);
        assert_eq!(adj.iter().sum::<i32>(), 512);
        assert_eq!(adj[1] + adj[3], 512);
        assert_eq!(engine.justify(&mut line).unwrap(), JustifyOutcome::AlreadyJustified);
    }

    #[test]
    fn uneven_slack_is_conserved() {
        let mut engine = justified_engine("a b c d ");
        let mut line = engine.layout_line(0, 7, 7 * 256 + 1000).unwrap();
        assert_eq!(engine.justify(&mut line).unwrap(), JustifyOutcome::Justified);
        let adj = adjustments(&engine);
        assert_eq!(adj.iter().sum::<i32>(), 1000);
        assert_eq!([adj[1], adj[3], adj[5]], [333, 333, 334]);
    }

    #[test]
    fn characters_when_no_spaces() {
        let mut engine = justified_engine("abcd ");
        let mut line = engine.layout_line(0, 4, 4 * 256 + 30).unwrap();
        assert_eq!(engine.justify(&mut line).unwrap(), JustifyOutcome::Justified);
        // No point after the last character.
        assert_eq!(adjustments(&engine)[..4], [10, 10, 10, 0]);
    }

    #[test]
    fn overflow_marks_line() {
        let mut engine = justified_engine("abcd ");
        let mut line = engine.layout_line(0, 4, 100).unwrap();
        assert_eq!(engine.justify(&mut line).unwrap(), JustifyOutcome::Overflow);
        assert!(line.justified);
        assert_eq!(line.text_width, 4 * 256);
    }

    #[test]
    fn insufficient_points_leaves_line_unchanged() {
        let mut engine = justified_engine(",;.: ");
        let mut line = engine.layout_line(0, 4, 2000).unwrap();
        let before = line.text_width;
        assert_eq!(
            engine.justify(&mut line).unwrap(),
            JustifyOutcome::InsufficientPoints
        );
        assert!(!line.justified);
        assert_eq!(line.text_width, before);
        assert!(adjustments(&engine).iter().all(|&a| a == 0));
    }

    #[test]
    fn kashida_before_spaces() {
        // beh beh beh, space, beh beh beh, then a trailing space.
        let word = format!("{BEH}{BEH}{BEH}");
        let text = format!("{word} {word} ");
        let mut engine = justified_engine(&text);
        let mut line = engine.layout_line(0, 7, 7 * 256 + 2 * 256 + 10).unwrap();
        assert_eq!(engine.justify(&mut line).unwrap(), JustifyOutcome::Justified);

        let j = &engine.glyphs.justifications;
        let kashidas: u16 = j.iter().map(|j| j.nkashidas).sum();
        assert_eq!(kashidas, 2);
        // The remaining 10 units go to the one space point.
        assert_eq!(j[3].space_adjust, 10);
        assert_eq!(line.text_width, line.width);
    }
}
