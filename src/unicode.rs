//! Resolution of `\p{NAME}` property escapes against the simplified tables.

use crate::codepointset::{CodePointSet, Interval};
use crate::unicodetables as tables;

/// The supported scripts, addressed as `\p{Script=NAME}` or bare `\p{NAME}`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Script {
    Latin,
    Greek,
    Cyrillic,
    Hebrew,
    Arabic,
    Hiragana,
    Katakana,
    Han,
}

impl Script {
    fn from_name(s: &str) -> Option<Self> {
        use Script::*;
        match s {
            "Latin" => Some(Latin),
            "Greek" => Some(Greek),
            "Cyrillic" => Some(Cyrillic),
            "Hebrew" => Some(Hebrew),
            "Arabic" => Some(Arabic),
            "Hiragana" => Some(Hiragana),
            "Katakana" => Some(Katakana),
            "Han" => Some(Han),
            _ => None,
        }
    }

    fn intervals(self) -> &'static [Interval] {
        use Script::*;
        match self {
            Latin => &tables::SCRIPT_LATIN,
            Greek => &tables::SCRIPT_GREEK,
            Cyrillic => &tables::SCRIPT_CYRILLIC,
            Hebrew => &tables::SCRIPT_HEBREW,
            Arabic => &tables::SCRIPT_ARABIC,
            Hiragana => &tables::SCRIPT_HIRAGANA,
            Katakana => &tables::SCRIPT_KATAKANA,
            Han => &tables::SCRIPT_HAN,
        }
    }
}

/// A resolved property name: a general category, a script, or a binary
/// property. This is a closed enumeration; anything else is a parse error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PropertyClass {
    Letter,
    LetterLower,
    LetterUpper,
    Number,
    NumberDecimal,
    Punctuation,
    Symbol,
    Separator,
    SpaceSeparator,
    Script(Script),
    Ascii,
    AsciiHexDigit,
    WhiteSpace,
}

impl PropertyClass {
    /// Resolve the NAME inside `\p{NAME}`.
    /// Accepts `Script=NAME` as well as bare script names.
    pub fn from_name(name: &str) -> Option<Self> {
        use PropertyClass::*;
        if let Some(value) = name.strip_prefix("Script=") {
            return crate::unicode::Script::from_name(value).map(PropertyClass::Script);
        }
        match name {
            "L" | "Letter" => Some(Letter),
            "Ll" => Some(LetterLower),
            "Lu" => Some(LetterUpper),
            "N" | "Number" => Some(Number),
            "Nd" => Some(NumberDecimal),
            "P" | "Punctuation" => Some(Punctuation),
            "S" | "Symbol" => Some(Symbol),
            "Z" | "Separator" => Some(Separator),
            "Zs" | "Space_Separator" => Some(SpaceSeparator),
            "ASCII" => Some(Ascii),
            "AHex" | "ASCII_Hex_Digit" => Some(AsciiHexDigit),
            "space" | "White_Space" => Some(WhiteSpace),
            other => crate::unicode::Script::from_name(other).map(PropertyClass::Script),
        }
    }

    pub fn intervals(self) -> &'static [Interval] {
        use PropertyClass::*;
        match self {
            Letter => &tables::LETTER,
            LetterLower => &tables::LETTER_LOWER,
            LetterUpper => &tables::LETTER_UPPER,
            Number => &tables::NUMBER,
            NumberDecimal => &tables::NUMBER_DECIMAL,
            Punctuation => &tables::PUNCTUATION,
            Symbol => &tables::SYMBOL,
            Separator => &tables::SEPARATOR,
            SpaceSeparator => &tables::SPACE_SEPARATOR,
            Script(s) => s.intervals(),
            Ascii => &tables::ASCII,
            AsciiHexDigit => &tables::ASCII_HEX_DIGIT,
            WhiteSpace => &tables::WHITE_SPACE,
        }
    }

    /// \return the property as a code point set; \p positive false negates
    /// it (the `\P` form).
    pub fn codepoints(self, positive: bool) -> CodePointSet {
        let cps = CodePointSet::from_sorted_disjoint_intervals(self.intervals().to_vec());
        if positive {
            cps
        } else {
            cps.inverted()
        }
    }
}
