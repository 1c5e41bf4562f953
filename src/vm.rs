//! Thread-based interpreter for the bytecode path.
//!
//! Threads are explored depth-first from an explicit stack; a `Split`
//! pushes the fallback branch and continues on the preferred one. All
//! completed threads for a start offset are compared and the longest match
//! is kept, matching the simulator's leftmost-longest policy.

use crate::api::Match;
use crate::exec::MatchProducer;
use crate::insn::{Insn, Program};
use crate::startpredicate::StartPredicate;
use crate::types::GroupData;
use crate::utf8;
use crate::util::is_word_char;
use std::collections::HashSet;

#[derive(Debug, Clone)]
struct Thread {
    /// Offset in the bytecode.
    pc: usize,

    /// Position in the input.
    pos: usize,

    /// Group table; empty when capture tracking is off.
    groups: Vec<GroupData>,
}

enum ThreadStep {
    /// Keep running this thread.
    Continue,

    /// Drop this thread.
    Fail,

    /// Keep running this thread and queue another.
    Split(Thread),

    /// The thread reached MatchFound at its current position.
    Complete,
}

fn step_thread(program: &Program, input: &[u8], t: &mut Thread) -> ThreadStep {
    macro_rules! advance_or_fail {
        ($matched:expr, $width:expr) => {
            if $matched {
                t.pos += $width;
                t.pc += 1;
                ThreadStep::Continue
            } else {
                ThreadStep::Fail
            }
        };
    }
    match &program.insns[t.pc] {
        &Insn::Char(b) => match utf8::decode(input, t.pos) {
            Some((cp, width)) => advance_or_fail!(cp == b as u32, width),
            None => ThreadStep::Fail,
        },

        &Insn::CharUnicode(expected) => match utf8::decode(input, t.pos) {
            Some((cp, width)) => advance_or_fail!(cp == expected, width),
            None => ThreadStep::Fail,
        },

        &Insn::Class(idx) => match utf8::decode(input, t.pos) {
            Some((cp, width)) => {
                advance_or_fail!(program.classes[idx as usize].matches(cp), width)
            }
            None => ThreadStep::Fail,
        },

        Insn::AnyChar => match utf8::decode(input, t.pos) {
            Some((cp, width)) => advance_or_fail!(cp != '\n' as u32, width),
            None => ThreadStep::Fail,
        },

        &Insn::Split {
            primary,
            secondary,
            greedy,
        } => {
            let (first, second) = if greedy {
                (primary, secondary)
            } else {
                (secondary, primary)
            };
            let mut other = t.clone();
            other.pc = second as usize;
            t.pc = first as usize;
            ThreadStep::Split(other)
        }

        &Insn::Jump(target) => {
            t.pc = target as usize;
            ThreadStep::Continue
        }

        Insn::AssertStart => {
            if t.pos == 0 {
                t.pc += 1;
                ThreadStep::Continue
            } else {
                ThreadStep::Fail
            }
        }

        Insn::AssertEnd => {
            if t.pos == input.len() {
                t.pc += 1;
                ThreadStep::Continue
            } else {
                ThreadStep::Fail
            }
        }

        &Insn::AssertWordBoundary { invert } => {
            let prev = utf8::decode_last(input, t.pos).is_some_and(|(cp, _)| is_word_char(cp));
            let next = utf8::decode(input, t.pos).is_some_and(|(cp, _)| is_word_char(cp));
            if (prev != next) != invert {
                t.pc += 1;
                ThreadStep::Continue
            } else {
                ThreadStep::Fail
            }
        }

        &Insn::GroupStart(id) => {
            if let Some(slot) = t.groups.get_mut(id as usize - 1) {
                slot.start = Some(t.pos);
                slot.end = None;
            }
            t.pc += 1;
            ThreadStep::Continue
        }

        &Insn::GroupEnd(id) => {
            if let Some(slot) = t.groups.get_mut(id as usize - 1) {
                slot.end = Some(t.pos);
            }
            t.pc += 1;
            ThreadStep::Continue
        }

        Insn::MatchFound => ThreadStep::Complete,

        Insn::Fail => ThreadStep::Fail,
    }
}

/// Executes a program against one input, reusing its thread stack across
/// attempts.
#[derive(Debug)]
pub struct VmExecutor<'r, 't> {
    program: &'r Program,
    predicate: &'r StartPredicate,
    input: &'t [u8],
    track_groups: bool,
    stack: Vec<Thread>,

    /// (pc, pos) pairs already explored in this attempt. Epsilon cycles in
    /// the program (from quantifier loop-backs) revisit the same pair and
    /// are cut off here.
    seen: HashSet<(usize, usize)>,

    /// Longest completed match of the current attempt.
    best: Option<(usize, Vec<GroupData>)>,
}

impl<'r, 't> VmExecutor<'r, 't> {
    pub fn new(
        program: &'r Program,
        predicate: &'r StartPredicate,
        input: &'t [u8],
        track_groups: bool,
    ) -> Self {
        Self {
            program,
            predicate,
            input,
            track_groups,
            stack: Vec::new(),
            seen: HashSet::new(),
            best: None,
        }
    }

    /// Run every thread spawned from \p start to completion, keeping the
    /// longest match. With \p stop_early, the first completed thread wins.
    fn try_at(&mut self, start: usize, stop_early: bool) -> Option<usize> {
        let group_count = if self.track_groups {
            self.program.group_count as usize
        } else {
            0
        };
        self.stack.clear();
        self.seen.clear();
        self.best = None;
        self.stack.push(Thread {
            pc: 0,
            pos: start,
            groups: vec![GroupData::new(); group_count],
        });
        while let Some(mut t) = self.stack.pop() {
            loop {
                if !self.seen.insert((t.pc, t.pos)) {
                    break;
                }
                match step_thread(self.program, self.input, &mut t) {
                    ThreadStep::Continue => {}
                    ThreadStep::Fail => break,
                    ThreadStep::Split(other) => self.stack.push(other),
                    ThreadStep::Complete => {
                        let longer = match &self.best {
                            None => true,
                            Some((end, _)) => t.pos > *end,
                        };
                        if longer {
                            self.best = Some((t.pos, t.groups.clone()));
                        }
                        if stop_early {
                            return Some(t.pos);
                        }
                        break;
                    }
                }
            }
        }
        self.best.as_ref().map(|(end, _)| *end)
    }

    /// \return whether the remaining input can possibly hold a match.
    fn length_permits(&self, candidate: usize) -> bool {
        self.input.len() - candidate >= self.program.min_match_len as usize
    }

    fn next_candidate(&self, pos: usize) -> Option<usize> {
        if self.program.is_anchored_start {
            return (pos == 0).then_some(0);
        }
        self.predicate.next_candidate(self.input, pos)
    }

    /// \return whether any match exists at or after \p pos.
    pub fn has_match(&mut self, mut pos: usize) -> bool {
        loop {
            let candidate = match self.next_candidate(pos) {
                Some(c) => c,
                None => return false,
            };
            if self.length_permits(candidate) && self.try_at(candidate, true).is_some() {
                return true;
            }
            pos = candidate + 1;
            if pos > self.input.len() {
                return false;
            }
        }
    }
}

impl MatchProducer for VmExecutor<'_, '_> {
    fn next_match(&mut self, mut pos: usize, next_start: &mut Option<usize>) -> Option<Match> {
        loop {
            let candidate = match self.next_candidate(pos) {
                Some(c) => c,
                None => {
                    *next_start = None;
                    return None;
                }
            };
            if self.length_permits(candidate) {
                if let Some(end) = self.try_at(candidate, false) {
                    *next_start = Some(if end > candidate { end } else { candidate + 1 });
                    let captures = match self.best.take() {
                        Some((_, groups)) if self.track_groups => {
                            groups.iter().map(GroupData::as_range).collect()
                        }
                        _ => Vec::new(),
                    };
                    return Some(Match {
                        range: candidate..end,
                        captures,
                    });
                }
            }
            pos = candidate + 1;
            if pos > self.input.len() {
                *next_start = None;
                return None;
            }
        }
    }
}
