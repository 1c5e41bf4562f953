//! Set-based simulation of the Thompson NFA.
//!
//! The simulator maintains a frontier of active states, advancing it one
//! decoded code point at a time. Matching is leftmost-longest: an attempt
//! keeps consuming while the frontier is non-empty and reports the last
//! accepting position observed.

use crate::api::Match;
use crate::exec::MatchProducer;
use crate::nfa::{Condition, Nfa, StateHandle};
use crate::startpredicate::StartPredicate;
use crate::types::GroupData;
use crate::utf8;
use crate::util::{is_word_char, VisitBitmap};

/// Zero-width context at one input position.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Assertions {
    pub at_start: bool,
    pub at_end: bool,
    pub prev_is_word: bool,
    pub next_is_word: bool,
}

impl Assertions {
    /// Compute the context at absolute position \p pos of \p input.
    pub(crate) fn at(input: &[u8], pos: usize) -> Assertions {
        Assertions {
            at_start: pos == 0,
            at_end: pos == input.len(),
            prev_is_word: utf8::decode_last(input, pos).is_some_and(|(cp, _)| is_word_char(cp)),
            next_is_word: utf8::decode(input, pos).is_some_and(|(cp, _)| is_word_char(cp)),
        }
    }

    /// \return whether the zero-width condition \p cond may be taken here.
    /// Consuming conditions are never taken by the closure.
    pub(crate) fn allows(&self, cond: &Condition) -> bool {
        match cond {
            Condition::Epsilon | Condition::GroupStart(..) | Condition::GroupEnd(..) => true,
            Condition::AssertStart => self.at_start,
            Condition::AssertEnd => self.at_end,
            Condition::AssertWordBoundary { invert } => {
                (self.prev_is_word != self.next_is_word) != *invert
            }
            Condition::Char(..) | Condition::AnyChar | Condition::Class(..) => false,
        }
    }
}

/// Add the ε-closure of \p seed at position \p pos to \p out.
/// States already marked in \p visited are skipped, which both deduplicates
/// the frontier and guards against epsilon cycles. Group transitions record
/// into \p groups each time they are taken; an empty table disables
/// recording.
///
/// When the goal state enters the closure, the group table is snapshot into
/// \p accepted right away: edges traversed later in the same closure (such
/// as a quantifier looping back over its own group) must not leak into the
/// accepting path's captures.
#[allow(clippy::too_many_arguments)]
pub(crate) fn closure(
    nfa: &Nfa,
    seed: StateHandle,
    asserts: &Assertions,
    pos: usize,
    groups: &mut [GroupData],
    accepted: &mut Vec<GroupData>,
    visited: &mut VisitBitmap,
    work: &mut Vec<StateHandle>,
    out: &mut Vec<StateHandle>,
) {
    if visited.test_and_set(seed as usize) {
        return;
    }
    debug_assert!(work.is_empty());
    work.push(seed);
    out.push(seed);
    if nfa.is_goal(seed) {
        accepted.clear();
        accepted.extend_from_slice(groups);
    }
    while let Some(state) = work.pop() {
        for (cond, target) in nfa.state(state).transitions.iter() {
            if cond.is_consuming() || !asserts.allows(cond) {
                continue;
            }
            match cond {
                Condition::GroupStart(id) => {
                    if let Some(slot) = groups.get_mut(*id as usize - 1) {
                        // A fresh pass over the group invalidates any stale
                        // end from a previous iteration.
                        slot.start = Some(pos);
                        slot.end = None;
                    }
                }
                Condition::GroupEnd(id) => {
                    if let Some(slot) = groups.get_mut(*id as usize - 1) {
                        slot.end = Some(pos);
                    }
                }
                _ => {}
            }
            if !visited.test_and_set(*target as usize) {
                work.push(*target);
                out.push(*target);
                if nfa.is_goal(*target) {
                    accepted.clear();
                    accepted.extend_from_slice(groups);
                }
            }
        }
    }
}

/// The reusable scratch state for simulating one NFA.
/// Not shareable across threads; the compiled regex itself is immutable.
#[derive(Debug)]
pub struct Simulator<'r> {
    nfa: &'r Nfa,
    current: Vec<StateHandle>,
    next: Vec<StateHandle>,
    work: Vec<StateHandle>,
    visited: VisitBitmap,
    groups: Vec<GroupData>,
    accepted_groups: Vec<GroupData>,
}

impl<'r> Simulator<'r> {
    pub fn new(nfa: &'r Nfa) -> Self {
        Simulator {
            nfa,
            current: Vec::new(),
            next: Vec::new(),
            work: Vec::new(),
            visited: VisitBitmap::new(nfa.state_count()),
            groups: Vec::new(),
            accepted_groups: Vec::new(),
        }
    }

    /// Run one attempt anchored at \p start.
    /// \return the end offset of the longest match beginning there.
    /// With \p stop_early, the first accepting position is returned instead;
    /// this is the `is_match` fast path and never records groups.
    pub fn try_at(
        &mut self,
        input: &[u8],
        start: usize,
        track_groups: bool,
        stop_early: bool,
    ) -> Option<usize> {
        let nfa = self.nfa;
        let Simulator {
            current,
            next,
            work,
            visited,
            groups,
            accepted_groups,
            ..
        } = self;

        groups.clear();
        if track_groups {
            groups.resize(nfa.group_count() as usize, GroupData::new());
        }

        current.clear();
        visited.clear();
        let asserts = Assertions::at(input, start);
        closure(
            nfa,
            nfa.start(),
            &asserts,
            start,
            groups,
            accepted_groups,
            visited,
            work,
            current,
        );

        let mut pos = start;
        let mut last_accept = None;
        loop {
            if current.iter().any(|&s| nfa.is_goal(s)) {
                last_accept = Some(pos);
                if stop_early {
                    return last_accept;
                }
            }
            if pos >= input.len() || current.is_empty() {
                break;
            }
            let (cp, width) = match utf8::decode(input, pos) {
                Some(decoded) => decoded,
                // Invalid UTF-8 matches no transition; the attempt is over.
                None => break,
            };
            let next_pos = pos + width;
            let next_asserts = Assertions::at(input, next_pos);
            visited.clear();
            next.clear();
            for &state in current.iter() {
                for (cond, target) in nfa.state(state).transitions.iter() {
                    if cond.is_consuming() && cond.matches_codepoint(cp) {
                        closure(
                            nfa,
                            *target,
                            &next_asserts,
                            next_pos,
                            groups,
                            accepted_groups,
                            visited,
                            work,
                            next,
                        );
                    }
                }
            }
            core::mem::swap(current, next);
            pos = next_pos;
        }
        last_accept
    }

    /// The group table recorded at the last accepting position of the most
    /// recent successful `try_at` with group tracking.
    pub fn captures(&self) -> &[GroupData] {
        &self.accepted_groups
    }
}

/// Drives the simulator across start offsets, producing matches.
#[derive(Debug)]
pub struct NfaExecutor<'r, 't> {
    sim: Simulator<'r>,
    predicate: &'r StartPredicate,
    input: &'t [u8],
    track_groups: bool,
}

impl<'r, 't> NfaExecutor<'r, 't> {
    pub fn new(
        nfa: &'r Nfa,
        predicate: &'r StartPredicate,
        input: &'t [u8],
        track_groups: bool,
    ) -> Self {
        Self {
            sim: Simulator::new(nfa),
            predicate,
            input,
            track_groups,
        }
    }

    /// \return whether any match exists at or after \p pos.
    pub fn has_match(&mut self, mut pos: usize) -> bool {
        loop {
            let candidate = match self.predicate.next_candidate(self.input, pos) {
                Some(c) => c,
                None => return false,
            };
            if self
                .sim
                .try_at(self.input, candidate, false, true)
                .is_some()
            {
                return true;
            }
            pos = candidate + 1;
            if pos > self.input.len() {
                return false;
            }
        }
    }
}

impl MatchProducer for NfaExecutor<'_, '_> {
    fn next_match(&mut self, mut pos: usize, next_start: &mut Option<usize>) -> Option<Match> {
        loop {
            let candidate = match self.predicate.next_candidate(self.input, pos) {
                Some(c) => c,
                None => {
                    *next_start = None;
                    return None;
                }
            };
            if let Some(end) = self.sim.try_at(self.input, candidate, self.track_groups, false) {
                // Guarantee forward progress past zero-width matches.
                *next_start = Some(if end > candidate { end } else { candidate + 1 });
                let captures = if self.track_groups {
                    self.sim.captures().iter().map(GroupData::as_range).collect()
                } else {
                    Vec::new()
                };
                return Some(Match {
                    range: candidate..end,
                    captures,
                });
            }
            pos = candidate + 1;
            if pos > self.input.len() {
                *next_start = None;
                return None;
            }
        }
    }
}
