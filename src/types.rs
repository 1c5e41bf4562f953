use crate::bytesearch::AsciiBitmap;
use crate::codepointset::CodePointSet;
use core::ops;

/// A capture group index.
/// Group 0 is the whole match; explicit groups are numbered from 1.
pub type GroupId = u16;

/// The maximum number of explicit capture groups supported.
pub const MAX_GROUPS: usize = 65535;

/// The maximum number of NFA states a single pattern may lower to.
/// Exceeding this is reported as memory exhaustion.
pub const MAX_STATES: usize = 1 << 16;

/// The contents of a character class: a set of code point intervals, an
/// optional negation, and an optional bitmap fast path for the ASCII
/// subrange.
#[derive(Debug, Clone)]
pub struct ClassContents {
    pub negated: bool,
    pub cps: CodePointSet,
    /// Present iff the class covers any ASCII code point; consistent with
    /// `cps` restricted to 0..=127 and consulted only for such code points.
    pub ascii: Option<AsciiBitmap>,
}

impl ClassContents {
    pub fn new(negated: bool, cps: CodePointSet) -> Self {
        let mut ascii = None;
        for iv in cps.intervals() {
            if iv.first > 127 {
                break;
            }
            let bitmap = ascii.get_or_insert_with(AsciiBitmap::default);
            for cp in iv.first..=iv.last.min(127) {
                bitmap.set(cp as u8);
            }
        }
        ClassContents {
            negated,
            cps,
            ascii,
        }
    }

    /// A class matching every code point.
    pub fn anything() -> Self {
        Self::new(false, CodePointSet::new().inverted())
    }

    /// \return whether the class matches the code point \p cp.
    /// Respects `negated`.
    #[inline(always)]
    pub fn matches(&self, cp: u32) -> bool {
        let contained = match &self.ascii {
            Some(bitmap) if cp <= 127 => bitmap.contains(cp as u8),
            _ => self.cps.contains(cp),
        };
        contained != self.negated
    }

    /// \return true if no code point can match.
    pub fn match_always_fails(&self) -> bool {
        if self.negated {
            self.cps.inverted().is_empty()
        } else {
            self.cps.is_empty()
        }
    }
}

/// Recorded extent of one capture group, as byte offsets into the input.
/// Either side may be unset if the group was not (fully) entered.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct GroupData {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl GroupData {
    pub fn new() -> GroupData {
        GroupData {
            start: None,
            end: None,
        }
    }

    pub fn as_range(&self) -> Option<ops::Range<usize>> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start <= end => Some(start..end),
            _ => None,
        }
    }

    /// Reset the group to "not entered."
    pub fn reset(&mut self) {
        self.start = None;
        self.end = None;
    }
}
