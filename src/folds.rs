//! Simple case folding over the ASCII and Latin-1 blocks.
//!
//! Folding is never applied by default; it is consulted at parse time when a
//! caller compiles with `case_insensitive` set programmatically.

use crate::codepointset::{CodePointSet, Interval};
use crate::unicodetables::{FoldRange, FOLDS};
use core::cmp::Ordering;

impl FoldRange {
    fn add_delta(&self, cp: u32) -> u32 {
        let folded = (cp as i32) + self.delta;
        debug_assert!(0 <= folded && folded as u32 <= 0x10FFFF);
        folded as u32
    }

    /// The interval of code points this range folds *to*.
    fn transformed_to(&self) -> Interval {
        Interval {
            first: self.add_delta(self.first),
            last: self.add_delta(self.last),
        }
    }

    fn apply(&self, cp: u32) -> u32 {
        debug_assert!(self.first <= cp && cp <= self.last);
        if (cp - self.first) % self.modulo != 0 {
            cp
        } else {
            self.add_delta(cp)
        }
    }
}

/// \return the simple case fold of \p cp.
/// Code points outside the fold table fold to themselves.
pub fn fold(cp: u32) -> u32 {
    let searched = FOLDS.binary_search_by(|fr| {
        if fr.first > cp {
            Ordering::Greater
        } else if fr.last < cp {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    });
    match searched {
        Ok(idx) => FOLDS[idx].apply(cp),
        Err(_) => cp,
    }
}

/// Widen a code point set with every code point that folds into it and every
/// code point it folds to, so that folded comparison becomes set membership.
pub fn fold_code_points(input: CodePointSet) -> CodePointSet {
    let mut result = input.clone();
    for fr in FOLDS.iter() {
        let from = Interval {
            first: fr.first,
            last: fr.last,
        };
        let to = fr.transformed_to();
        for iv in input.intervals() {
            if iv.overlaps(from) {
                // Add the folds of the overlapping part.
                let lo = iv.first.max(from.first);
                let hi = iv.last.min(from.last);
                for cp in lo..=hi {
                    result.add_one(fr.apply(cp));
                }
            }
            if iv.overlaps(to) {
                // Add the prefolds of the overlapping part.
                let lo = iv.first.max(to.first);
                let hi = iv.last.min(to.last);
                for cp in lo..=hi {
                    result.add_one((cp as i32 - fr.delta) as u32);
                }
            }
        }
    }
    result
}
