#![forbid(unsafe_code)]

//! Unicode script lookup and contextual script resolution.
//!
//! Scripts are looked up from a sorted block table with a binary search.
//! Characters in `Common` (spaces, digits, punctuation) and `Inherited`
//! (combining marks) take the script of their surroundings during
//! [`resolve_scripts`], so that a word followed by a space and a comma does
//! not split into three shaping items.
//!
//! # Example
//!
//! ```
//! use skein_core::script::{Script, char_script, resolve_scripts};
//!
//! assert_eq!(char_script('a'), Script::Latin);
//! assert_eq!(char_script('\u{0628}'), Script::Arabic);
//!
//! let text: Vec<char> = "abc, \u{05D0}".chars().collect();
//! let scripts = resolve_scripts(&text, None);
//! assert_eq!(scripts[3], Script::Latin);
//! assert_eq!(scripts[5], Script::Hebrew);
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// Script enum
// ---------------------------------------------------------------------------

/// Unicode script classification used for itemization and shaping.
///
/// `Common` and `Inherited` are resolved from context before items are
/// built. Scripts outside the table are `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Script {
    /// Script-neutral: spaces, digits, basic punctuation, symbols.
    Common = 0,
    /// Combining marks that inherit the base character's script.
    Inherited,
    Latin,
    Greek,
    Cyrillic,
    Armenian,
    Hebrew,
    Arabic,
    Syriac,
    Thaana,
    Nko,
    Mandaic,
    Devanagari,
    Bengali,
    Gurmukhi,
    Gujarati,
    Oriya,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
    Sinhala,
    Thai,
    Lao,
    Tibetan,
    Myanmar,
    Georgian,
    Hangul,
    Ethiopic,
    Khmer,
    Mongolian,
    Han,
    Hiragana,
    Katakana,
    Bopomofo,
    /// Unknown or unrecognized script.
    Unknown,
}

/// How a script distributes justification slack at word separators.
///
/// Scripts with kashida (Arabic and its relatives) prefer stretching
/// letters over widening spaces; ideographic and unspaced scripts have no
/// word separators and stretch between characters only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceJustification {
    /// Spaces are the preferred justification point.
    Space,
    /// Spaces yield to inter-character points; kashida analysis applies.
    ArabicSpace,
    /// Spaces justify like any other character boundary.
    Character,
}

impl Script {
    /// Whether this script should be resolved from context.
    #[inline]
    pub const fn is_common_or_inherited(self) -> bool {
        matches!(self, Script::Common | Script::Inherited)
    }

    /// Whether this script is written right-to-left.
    #[inline]
    pub const fn is_rtl(self) -> bool {
        matches!(
            self,
            Script::Arabic
                | Script::Hebrew
                | Script::Syriac
                | Script::Thaana
                | Script::Nko
                | Script::Mandaic
        )
    }

    /// Whether letters of this script are joined and can take kashida.
    #[inline]
    pub const fn uses_kashida(self) -> bool {
        matches!(self, Script::Arabic | Script::Syriac)
    }

    /// The justification behaviour of word separators in this script.
    pub const fn space_justification(self) -> SpaceJustification {
        match self {
            Script::Arabic
            | Script::Syriac
            | Script::Nko
            | Script::Mandaic
            | Script::Mongolian => SpaceJustification::ArabicSpace,
            Script::Tibetan
            | Script::Han
            | Script::Hiragana
            | Script::Katakana
            | Script::Bopomofo
            | Script::Thai
            | Script::Lao
            | Script::Khmer => SpaceJustification::Character,
            _ => SpaceJustification::Space,
        }
    }

    /// Four-letter ISO 15924 tag.
    pub const fn iso15924(self) -> &'static str {
        match self {
            Script::Common => "Zyyy",
            Script::Inherited => "Zinh",
            Script::Latin => "Latn",
            Script::Greek => "Grek",
            Script::Cyrillic => "Cyrl",
            Script::Armenian => "Armn",
            Script::Hebrew => "Hebr",
            Script::Arabic => "Arab",
            Script::Syriac => "Syrc",
            Script::Thaana => "Thaa",
            Script::Nko => "Nkoo",
            Script::Mandaic => "Mand",
            Script::Devanagari => "Deva",
            Script::Bengali => "Beng",
            Script::Gurmukhi => "Guru",
            Script::Gujarati => "Gujr",
            Script::Oriya => "Orya",
            Script::Tamil => "Taml",
            Script::Telugu => "Telu",
            Script::Kannada => "Knda",
            Script::Malayalam => "Mlym",
            Script::Sinhala => "Sinh",
            Script::Thai => "Thai",
            Script::Lao => "Laoo",
            Script::Tibetan => "Tibt",
            Script::Myanmar => "Mymr",
            Script::Georgian => "Geor",
            Script::Hangul => "Hang",
            Script::Ethiopic => "Ethi",
            Script::Khmer => "Khmr",
            Script::Mongolian => "Mong",
            Script::Han => "Hani",
            Script::Hiragana => "Hira",
            Script::Katakana => "Kana",
            Script::Bopomofo => "Bopo",
            Script::Unknown => "Zzzz",
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.iso15924())
    }
}

// ---------------------------------------------------------------------------
// Block table
// ---------------------------------------------------------------------------

/// Sorted, non-overlapping `(first, last, script)` ranges.
///
/// Anything not covered is `Unknown`.
const SCRIPT_RANGES: &[(u32, u32, Script)] = &[
    (0x0000, 0x0040, Script::Common),
    (0x0041, 0x005A, Script::Latin),
    (0x005B, 0x0060, Script::Common),
    (0x0061, 0x007A, Script::Latin),
    (0x007B, 0x00A9, Script::Common),
    (0x00AA, 0x00AA, Script::Latin),
    (0x00AB, 0x00B9, Script::Common),
    (0x00BA, 0x00BA, Script::Latin),
    (0x00BB, 0x00BF, Script::Common),
    (0x00C0, 0x00D6, Script::Latin),
    (0x00D7, 0x00D7, Script::Common),
    (0x00D8, 0x00F6, Script::Latin),
    (0x00F7, 0x00F7, Script::Common),
    (0x00F8, 0x02AF, Script::Latin),
    (0x02B0, 0x02FF, Script::Common),
    (0x0300, 0x036F, Script::Inherited),
    (0x0370, 0x03FF, Script::Greek),
    (0x0400, 0x052F, Script::Cyrillic),
    (0x0530, 0x058F, Script::Armenian),
    (0x0590, 0x05FF, Script::Hebrew),
    (0x0600, 0x060B, Script::Arabic),
    (0x060C, 0x060C, Script::Common),
    (0x060D, 0x061A, Script::Arabic),
    (0x061B, 0x061B, Script::Common),
    (0x061C, 0x061E, Script::Arabic),
    (0x061F, 0x061F, Script::Common),
    (0x0620, 0x063F, Script::Arabic),
    (0x0640, 0x0640, Script::Common),
    (0x0641, 0x064A, Script::Arabic),
    (0x064B, 0x0655, Script::Inherited),
    (0x0656, 0x066F, Script::Arabic),
    (0x0670, 0x0670, Script::Inherited),
    (0x0671, 0x06DC, Script::Arabic),
    (0x06DD, 0x06DD, Script::Common),
    (0x06DE, 0x06FF, Script::Arabic),
    (0x0700, 0x074F, Script::Syriac),
    (0x0750, 0x077F, Script::Arabic),
    (0x0780, 0x07BF, Script::Thaana),
    (0x07C0, 0x07FF, Script::Nko),
    (0x0840, 0x085F, Script::Mandaic),
    (0x0860, 0x086F, Script::Syriac),
    (0x0870, 0x08FF, Script::Arabic),
    (0x0900, 0x0950, Script::Devanagari),
    (0x0951, 0x0954, Script::Inherited),
    (0x0955, 0x0963, Script::Devanagari),
    (0x0964, 0x0965, Script::Common),
    (0x0966, 0x097F, Script::Devanagari),
    (0x0980, 0x09FF, Script::Bengali),
    (0x0A00, 0x0A7F, Script::Gurmukhi),
    (0x0A80, 0x0AFF, Script::Gujarati),
    (0x0B00, 0x0B7F, Script::Oriya),
    (0x0B80, 0x0BFF, Script::Tamil),
    (0x0C00, 0x0C7F, Script::Telugu),
    (0x0C80, 0x0CFF, Script::Kannada),
    (0x0D00, 0x0D7F, Script::Malayalam),
    (0x0D80, 0x0DFF, Script::Sinhala),
    (0x0E00, 0x0E7F, Script::Thai),
    (0x0E80, 0x0EFF, Script::Lao),
    (0x0F00, 0x0FFF, Script::Tibetan),
    (0x1000, 0x109F, Script::Myanmar),
    (0x10A0, 0x10FF, Script::Georgian),
    (0x1100, 0x11FF, Script::Hangul),
    (0x1200, 0x139F, Script::Ethiopic),
    (0x1780, 0x17FF, Script::Khmer),
    (0x1800, 0x18AF, Script::Mongolian),
    (0x19E0, 0x19FF, Script::Khmer),
    (0x1AB0, 0x1AFF, Script::Inherited),
    (0x1C80, 0x1C8F, Script::Cyrillic),
    (0x1C90, 0x1CBF, Script::Georgian),
    (0x1DC0, 0x1DFF, Script::Inherited),
    (0x1E00, 0x1EFF, Script::Latin),
    (0x1F00, 0x1FFF, Script::Greek),
    (0x2000, 0x200B, Script::Common),
    (0x200C, 0x200D, Script::Inherited),
    (0x200E, 0x20CF, Script::Common),
    (0x20D0, 0x20FF, Script::Inherited),
    (0x2100, 0x2BFF, Script::Common),
    (0x2C60, 0x2C7F, Script::Latin),
    (0x2D00, 0x2D2F, Script::Georgian),
    (0x2D80, 0x2DDF, Script::Ethiopic),
    (0x2DE0, 0x2DFF, Script::Cyrillic),
    (0x2E00, 0x2E7F, Script::Common),
    (0x2E80, 0x2FDF, Script::Han),
    (0x3000, 0x3004, Script::Common),
    (0x3005, 0x3005, Script::Han),
    (0x3006, 0x3006, Script::Common),
    (0x3007, 0x3007, Script::Han),
    (0x3008, 0x3020, Script::Common),
    (0x3021, 0x3029, Script::Han),
    (0x302A, 0x302D, Script::Inherited),
    (0x302E, 0x303F, Script::Common),
    (0x3040, 0x3098, Script::Hiragana),
    (0x3099, 0x309A, Script::Inherited),
    (0x309B, 0x309C, Script::Common),
    (0x309D, 0x309F, Script::Hiragana),
    (0x30A0, 0x30A0, Script::Common),
    (0x30A1, 0x30FA, Script::Katakana),
    (0x30FB, 0x30FC, Script::Common),
    (0x30FD, 0x30FF, Script::Katakana),
    (0x3100, 0x312F, Script::Bopomofo),
    (0x3130, 0x318F, Script::Hangul),
    (0x31A0, 0x31BF, Script::Bopomofo),
    (0x31F0, 0x31FF, Script::Katakana),
    (0x3400, 0x4DBF, Script::Han),
    (0x4E00, 0x9FFF, Script::Han),
    (0xA640, 0xA69F, Script::Cyrillic),
    (0xA720, 0xA7FF, Script::Latin),
    (0xA8E0, 0xA8FF, Script::Devanagari),
    (0xA960, 0xA97F, Script::Hangul),
    (0xAA60, 0xAA7F, Script::Myanmar),
    (0xAB00, 0xAB2F, Script::Ethiopic),
    (0xAB30, 0xAB6F, Script::Latin),
    (0xAC00, 0xD7FF, Script::Hangul),
    (0xF900, 0xFAFF, Script::Han),
    (0xFB00, 0xFB06, Script::Latin),
    (0xFB13, 0xFB17, Script::Armenian),
    (0xFB1D, 0xFB4F, Script::Hebrew),
    (0xFB50, 0xFD3D, Script::Arabic),
    (0xFD3E, 0xFD3F, Script::Common),
    (0xFD40, 0xFDFF, Script::Arabic),
    (0xFE00, 0xFE0F, Script::Inherited),
    (0xFE10, 0xFE1F, Script::Common),
    (0xFE20, 0xFE2F, Script::Inherited),
    (0xFE30, 0xFE6F, Script::Common),
    (0xFE70, 0xFEFE, Script::Arabic),
    (0xFEFF, 0xFEFF, Script::Common),
    (0xFF01, 0xFF20, Script::Common),
    (0xFF21, 0xFF3A, Script::Latin),
    (0xFF3B, 0xFF40, Script::Common),
    (0xFF41, 0xFF5A, Script::Latin),
    (0xFF5B, 0xFF64, Script::Common),
    (0xFF65, 0xFF9F, Script::Katakana),
    (0xFFA0, 0xFFDF, Script::Hangul),
    (0xFFE0, 0xFFFF, Script::Common),
    (0x1B000, 0x1B000, Script::Katakana),
    (0x1B001, 0x1B11F, Script::Hiragana),
    (0x1D400, 0x1D7FF, Script::Common),
    (0x1EE00, 0x1EEFF, Script::Arabic),
    (0x1F000, 0x1FAFF, Script::Common),
    (0x20000, 0x2EBEF, Script::Han),
    (0x30000, 0x3134F, Script::Han),
    (0xE0000, 0xE007F, Script::Common),
    (0xE0100, 0xE01EF, Script::Inherited),
];

/// Look up the Unicode script of a character.
pub fn char_script(c: char) -> Script {
    let cp = c as u32;
    match SCRIPT_RANGES.binary_search_by(|&(first, last, _)| {
        if last < cp {
            std::cmp::Ordering::Less
        } else if first > cp {
            std::cmp::Ordering::Greater
        } else {
            std::cmp::Ordering::Equal
        }
    }) {
        Ok(idx) => SCRIPT_RANGES[idx].2,
        Err(_) => Script::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Contextual resolution
// ---------------------------------------------------------------------------

/// Resolve `Common` and `Inherited` characters to a specific script.
///
/// * Inherited characters take the script of the preceding character.
/// * Common characters take the script of the preceding specific character;
///   leading Common characters take the first specific script found.
/// * All-neutral text resolves to `hint`, or `Common` when there is none.
///
/// When `hint` is given, characters whose own script is Common, Inherited
/// or Unknown are assigned the hint outright.
pub fn resolve_scripts(chars: &[char], hint: Option<Script>) -> Vec<Script> {
    let mut scripts: Vec<Script> = chars.iter().map(|&c| char_script(c)).collect();
    if let Some(hint) = hint {
        for script in &mut scripts {
            if script.is_common_or_inherited() || *script == Script::Unknown {
                *script = hint;
            }
        }
        return scripts;
    }

    let first_specific = scripts
        .iter()
        .copied()
        .find(|s| !s.is_common_or_inherited())
        .unwrap_or(Script::Common);

    let mut current = first_specific;
    for script in &mut scripts {
        if script.is_common_or_inherited() {
            *script = current;
        } else {
            current = *script;
        }
    }
    scripts
}
