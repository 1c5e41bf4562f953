use crate::codepointset::{CodePointSet, Interval};

// Predefined character classes like \d or \S.

/// Construct an interval from an inclusive range of char.
const fn r(first: char, last: char) -> Interval {
    Interval {
        first: first as u32,
        last: last as u32,
    }
}

/// Construct an interval from a single char.
const fn r1(c: char) -> Interval {
    Interval {
        first: c as u32,
        last: c as u32,
    }
}

// Note all of these are sorted and disjoint.

/// \d
pub const DIGITS: [Interval; 1] = [r('0', '9')];

/// \w
pub const WORD_CHARS: [Interval; 4] = [r('0', '9'), r('A', 'Z'), r1('_'), r('a', 'z')];

/// \s: space, tab, carriage return, newline, vertical tab, form feed.
/// TAB..CR is the contiguous run U+0009..U+000D.
pub const WHITESPACE: [Interval; 2] = [r('\u{0009}', '\u{000D}'), r1(' ')];

/// The three predefined class escapes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PredefinedClass {
    Digits,
    Words,
    Spaces,
}

impl PredefinedClass {
    pub fn intervals(self) -> &'static [Interval] {
        match self {
            PredefinedClass::Digits => &DIGITS,
            PredefinedClass::Words => &WORD_CHARS,
            PredefinedClass::Spaces => &WHITESPACE,
        }
    }

    /// \return the class as a code point set; \p positive false negates it.
    pub fn codepoints(self, positive: bool) -> CodePointSet {
        let cps = CodePointSet::from_sorted_disjoint_intervals(self.intervals().to_vec());
        if positive {
            cps
        } else {
            cps.inverted()
        }
    }
}
