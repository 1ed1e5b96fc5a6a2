#![forbid(unsafe_code)]

//! Arabic joining types and joining groups.
//!
//! Kashida justification needs to know, for each letter, whether it
//! connects to its neighbours and which family of letter shapes it belongs
//! to (the stretching opportunity before a final Waw differs from the one
//! before a final Alef). The table covers the Arabic block and U+0640
//! TATWEEL; everything else is non-joining, except nonspacing marks, which
//! are transparent.

/// Unicode `Joining_Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoiningType {
    /// Joins on both sides (D).
    Dual,
    /// Joins only to the preceding letter (R).
    Right,
    /// Forces joining on both sides, e.g. TATWEEL (C).
    Causing,
    /// Skipped when deciding joins, e.g. harakat (T).
    Transparent,
    /// Does not join (U).
    NonJoining,
}

impl JoiningType {
    /// Whether a letter of this type connects to the following letter.
    #[inline]
    pub const fn joins_forward(self) -> bool {
        matches!(self, JoiningType::Dual | JoiningType::Causing)
    }

    /// Whether a letter of this type accepts a connection from the
    /// preceding letter.
    #[inline]
    pub const fn joins_backward(self) -> bool {
        matches!(
            self,
            JoiningType::Dual | JoiningType::Right | JoiningType::Causing
        )
    }
}

/// Unicode `Joining_Group`, reduced to the families that matter for
/// kashida placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoiningGroup {
    Alef,
    Beh,
    TehMarbuta,
    Hah,
    Dal,
    Reh,
    Seen,
    Sad,
    Tah,
    Ain,
    Feh,
    Qaf,
    Kaf,
    Gaf,
    Lam,
    Meem,
    Noon,
    Heh,
    Waw,
    Yeh,
    AlefMaksura,
    YehBarree,
    /// Letters without a group, marks, and TATWEEL.
    None,
}

/// Joining type and group of a character.
pub fn joining(c: char) -> (JoiningType, JoiningGroup) {
    use JoiningGroup as G;
    use JoiningType::{Causing, Dual, NonJoining, Right, Transparent};

    match c as u32 {
        0x0610..=0x061A | 0x064B..=0x065F | 0x0670 => (Transparent, G::None),
        0x06D6..=0x06DC | 0x06DF..=0x06E4 | 0x06E7..=0x06E8 | 0x06EA..=0x06ED => {
            (Transparent, G::None)
        }
        0x200D => (Causing, G::None),
        0x0640 => (Causing, G::None),
        0x0622 | 0x0623 | 0x0625 | 0x0627 => (Right, G::Alef),
        0x0624 => (Right, G::Waw),
        0x0626 => (Dual, G::Yeh),
        0x0628 | 0x062A | 0x062B => (Dual, G::Beh),
        0x0629 => (Right, G::TehMarbuta),
        0x062C..=0x062E => (Dual, G::Hah),
        0x062F | 0x0630 => (Right, G::Dal),
        0x0631 | 0x0632 => (Right, G::Reh),
        0x0633 | 0x0634 => (Dual, G::Seen),
        0x0635 | 0x0636 => (Dual, G::Sad),
        0x0637 | 0x0638 => (Dual, G::Tah),
        0x0639 | 0x063A => (Dual, G::Ain),
        0x063B | 0x063C => (Dual, G::Gaf),
        0x063D..=0x063F => (Dual, G::Yeh),
        0x0641 => (Dual, G::Feh),
        0x0642 => (Dual, G::Qaf),
        0x0643 => (Dual, G::Kaf),
        0x0644 => (Dual, G::Lam),
        0x0645 => (Dual, G::Meem),
        0x0646 => (Dual, G::Noon),
        0x0647 => (Dual, G::Heh),
        0x0648 => (Right, G::Waw),
        0x0649 => (Dual, G::AlefMaksura),
        0x064A => (Dual, G::Yeh),
        0x066E => (Dual, G::Beh),
        0x066F => (Dual, G::Qaf),
        0x0671..=0x0673 | 0x0675 => (Right, G::Alef),
        0x0676 | 0x0677 => (Right, G::Waw),
        0x0678 => (Dual, G::Yeh),
        0x0679..=0x0680 => (Dual, G::Beh),
        0x0681..=0x0687 => (Dual, G::Hah),
        0x0688..=0x0690 => (Right, G::Dal),
        0x0691..=0x0699 => (Right, G::Reh),
        0x069A..=0x069C => (Dual, G::Seen),
        0x069D | 0x069E => (Dual, G::Sad),
        0x069F => (Dual, G::Tah),
        0x06A0 => (Dual, G::Ain),
        0x06A1..=0x06A6 => (Dual, G::Feh),
        0x06A7 | 0x06A8 => (Dual, G::Qaf),
        0x06A9..=0x06B4 => (Dual, G::Gaf),
        0x06B5..=0x06B8 => (Dual, G::Lam),
        0x06B9..=0x06BD => (Dual, G::Noon),
        0x06BE => (Dual, G::Heh),
        0x06BF => (Dual, G::Hah),
        0x06C0 => (Right, G::TehMarbuta),
        0x06C1 | 0x06C2 => (Dual, G::Heh),
        0x06C3 => (Right, G::TehMarbuta),
        0x06C4..=0x06CB => (Right, G::Waw),
        0x06CC => (Dual, G::Yeh),
        0x06CD => (Right, G::Yeh),
        0x06CE => (Dual, G::Yeh),
        0x06CF => (Right, G::Waw),
        0x06D0 | 0x06D1 => (Dual, G::Yeh),
        0x06D2 | 0x06D3 => (Right, G::YehBarree),
        0x06D5 => (Right, G::TehMarbuta),
        0x06EE => (Right, G::Dal),
        0x06EF => (Right, G::Reh),
        0x06FA => (Dual, G::Seen),
        0x06FB => (Dual, G::Sad),
        0x06FC => (Dual, G::Ain),
        0x06FF => (Dual, G::Heh),
        _ => {
            if is_nonspacing_mark(c) {
                (Transparent, G::None)
            } else {
                (NonJoining, G::None)
            }
        }
    }
}

/// Combining marks outside the Arabic block that never break a join.
fn is_nonspacing_mark(c: char) -> bool {
    matches!(
        c as u32,
        0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF | 0xFE20..=0xFE2F
    )
}

/// Cursive form a joining letter takes in context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoiningForm {
    Isolated,
    Initial,
    Medial,
    Final,
}

/// Compute the contextual form of every character in `text`.
///
/// Transparent characters are skipped when looking for neighbours and take
/// the `Isolated` form themselves.
pub fn joining_forms(text: &[char]) -> Vec<JoiningForm> {
    let types: Vec<JoiningType> = text.iter().map(|&c| joining(c).0).collect();
    let mut forms = vec![JoiningForm::Isolated; text.len()];

    let mut prev: Option<usize> = None;
    for i in 0..text.len() {
        if types[i] == JoiningType::Transparent {
            continue;
        }
        let next = (i + 1..text.len()).find(|&j| types[j] != JoiningType::Transparent);
        let joins_prev = types[i].joins_backward()
            && prev.is_some_and(|p| types[p].joins_forward());
        let joins_next =
            types[i].joins_forward() && next.is_some_and(|n| types[n].joins_backward());
        forms[i] = match (joins_prev, joins_next) {
            (false, false) => JoiningForm::Isolated,
            (false, true) => JoiningForm::Initial,
            (true, true) => JoiningForm::Medial,
            (true, false) => JoiningForm::Final,
        };
        prev = Some(i);
    }
    forms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn basic_letter_properties() {
        assert_eq!(joining('\u{0628}'), (JoiningType::Dual, JoiningGroup::Beh));
        assert_eq!(joining('\u{0627}'), (JoiningType::Right, JoiningGroup::Alef));
        assert_eq!(joining('\u{0648}'), (JoiningType::Right, JoiningGroup::Waw));
        assert_eq!(joining('\u{0640}').0, JoiningType::Causing);
        assert_eq!(joining('\u{064E}').0, JoiningType::Transparent);
        assert_eq!(joining('a').0, JoiningType::NonJoining);
    }

    #[test]
    fn forms_of_three_dual_letters() {
        // beh beh beh
        let forms = joining_forms(&chars("\u{0628}\u{0628}\u{0628}"));
        assert_eq!(
            forms,
            vec![JoiningForm::Initial, JoiningForm::Medial, JoiningForm::Final]
        );
    }

    #[test]
    fn right_joining_letter_breaks_the_chain() {
        // beh alef beh: alef joins back only, so the last beh is isolated.
        let forms = joining_forms(&chars("\u{0628}\u{0627}\u{0628}"));
        assert_eq!(
            forms,
            vec![JoiningForm::Initial, JoiningForm::Final, JoiningForm::Isolated]
        );
    }

    #[test]
    fn marks_are_skipped() {
        // beh fatha beh
        let forms = joining_forms(&chars("\u{0628}\u{064E}\u{0628}"));
        assert_eq!(forms[0], JoiningForm::Initial);
        assert_eq!(forms[1], JoiningForm::Isolated);
        assert_eq!(forms[2], JoiningForm::Final);
    }

    #[test]
    fn space_breaks_joining() {
        let forms = joining_forms(&chars("\u{0628} \u{0628}"));
        assert_eq!(forms[0], JoiningForm::Isolated);
        assert_eq!(forms[2], JoiningForm::Isolated);
    }
}
