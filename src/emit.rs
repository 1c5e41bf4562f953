//! Compiler from the NFA to a linear bytecode program.

use crate::ast::Ast;
use crate::insn::{Insn, JumpTarget, Program};
use crate::nfa::{Condition, Nfa, StateHandle};
use std::collections::VecDeque;

/// How many links a jump chain may have before the peephole gives up.
/// Epsilon cycles in the NFA become jump cycles in the program.
const MAX_JUMP_CHAIN: usize = 32;

/// Type which wraps up the context needed to emit a Program.
struct Emitter<'r> {
    nfa: &'r Nfa,
    result: Program,

    /// Entry instruction index per state, filled as states are emitted.
    entry: Vec<Option<JumpTarget>>,

    /// Jump instructions still holding a state handle instead of an
    /// instruction index.
    fixups: Vec<(usize, StateHandle)>,
}

impl Emitter<'_> {
    fn next_offset(&self) -> JumpTarget {
        self.result.insns.len() as JumpTarget
    }

    fn emit_insn(&mut self, insn: Insn) -> JumpTarget {
        let at = self.next_offset();
        self.result.insns.push(insn);
        at
    }

    /// Emit a jump whose target is a state, resolved in the second pass.
    fn emit_jump_to_state(&mut self, target: StateHandle) {
        let at = self.emit_insn(Insn::Jump(0));
        self.fixups.push((at as usize, target));
    }

    /// Emit the instruction for a condition, if it needs one.
    /// Epsilon transitions become bare jumps.
    fn emit_condition(&mut self, cond: &Condition) {
        match cond {
            Condition::Epsilon => {}
            Condition::Char(b) => {
                self.emit_insn(Insn::Char(*b));
            }
            Condition::AnyChar => {
                self.emit_insn(Insn::AnyChar);
            }
            Condition::Class(cc) => {
                // Single code points compile to direct comparisons.
                let single = !cc.negated
                    && cc.cps.intervals().len() == 1
                    && cc.cps.intervals()[0].count_codepoints() == 1;
                if single {
                    let cp = cc.cps.intervals()[0].first;
                    if cp <= 0x7F {
                        self.emit_insn(Insn::Char(cp as u8));
                    } else {
                        self.emit_insn(Insn::CharUnicode(cp));
                    }
                } else {
                    let idx = self.result.classes.len() as u32;
                    self.result.classes.push(cc.clone());
                    self.emit_insn(Insn::Class(idx));
                }
            }
            Condition::AssertStart => {
                self.emit_insn(Insn::AssertStart);
            }
            Condition::AssertEnd => {
                self.emit_insn(Insn::AssertEnd);
            }
            Condition::AssertWordBoundary { invert } => {
                self.emit_insn(Insn::AssertWordBoundary { invert: *invert });
            }
            Condition::GroupStart(id) => {
                self.emit_insn(Insn::GroupStart(*id));
            }
            Condition::GroupEnd(id) => {
                self.emit_insn(Insn::GroupEnd(*id));
            }
        }
    }

    /// Emit the instructions for one state.
    fn emit_state(&mut self, state: StateHandle) {
        debug_assert!(self.entry[state as usize].is_none());
        self.entry[state as usize] = Some(self.next_offset());

        let transitions = &self.nfa.state(state).transitions;
        match transitions.len() {
            0 => {
                if self.nfa.is_goal(state) {
                    self.emit_insn(Insn::MatchFound);
                } else {
                    self.emit_insn(Insn::Fail);
                }
            }
            1 => {
                let (cond, target) = transitions[0].clone();
                self.emit_condition(&cond);
                self.emit_jump_to_state(target);
            }
            n => {
                // A fan-out becomes a chain of splits over per-transition
                // stubs. Transition order encodes preference, so the
                // primary branch of every split is the earlier one.
                let splits: Vec<JumpTarget> = (0..n - 1)
                    .map(|_| {
                        self.emit_insn(Insn::Split {
                            primary: 0,
                            secondary: 0,
                            greedy: true,
                        })
                    })
                    .collect();
                let mut stubs = Vec::with_capacity(n);
                for (cond, target) in transitions.clone() {
                    stubs.push(self.next_offset());
                    self.emit_condition(&cond);
                    self.emit_jump_to_state(target);
                }
                for (i, &split_at) in splits.iter().enumerate() {
                    let secondary = if i + 1 < splits.len() {
                        splits[i + 1]
                    } else {
                        stubs[n - 1]
                    };
                    match &mut self.result.insns[split_at as usize] {
                        Insn::Split {
                            primary: p,
                            secondary: s,
                            ..
                        } => {
                            *p = stubs[i];
                            *s = secondary;
                        }
                        _ => unreachable!("split chain entry is not a Split"),
                    }
                }
            }
        }
    }

    /// Rewrite jump targets from state handles to instruction indices.
    fn resolve_fixups(&mut self) {
        for &(at, state) in &self.fixups {
            let target = self.entry[state as usize].expect("target state was never emitted");
            match &mut self.result.insns[at] {
                Insn::Jump(t) => *t = target,
                _ => unreachable!("fixup does not point at a Jump"),
            }
        }
        self.fixups.clear();
    }

    /// Follow a chain of jumps to its final destination.
    fn chase(&self, mut target: JumpTarget) -> JumpTarget {
        for _ in 0..MAX_JUMP_CHAIN {
            match self.result.insns[target as usize] {
                Insn::Jump(next) => target = next,
                _ => break,
            }
        }
        target
    }

    /// Peephole pass: collapse chained jumps.
    fn collapse_jumps(&mut self) {
        for idx in 0..self.result.insns.len() {
            match self.result.insns[idx] {
                Insn::Jump(target) => {
                    self.result.insns[idx] = Insn::Jump(self.chase(target));
                }
                Insn::Split {
                    primary,
                    secondary,
                    greedy,
                } => {
                    self.result.insns[idx] = Insn::Split {
                        primary: self.chase(primary),
                        secondary: self.chase(secondary),
                        greedy,
                    };
                }
                _ => {}
            }
        }
    }
}

/// Compile \p nfa to a linear program. The AST supplies the metadata the VM
/// consults: anchoring and match-length bounds.
pub fn emit(nfa: &Nfa, ast: &Ast) -> Program {
    let mut emitter = Emitter {
        nfa,
        result: Program {
            group_count: nfa.group_count(),
            is_anchored_start: ast.root.is_start_anchored(),
            is_anchored_end: ast.root.is_end_anchored(),
            min_match_len: ast.root.min_match_bytes(),
            max_match_len: ast.root.max_match_bytes(),
            ..Program::default()
        },
        entry: vec![None; nfa.state_count()],
        fixups: Vec::new(),
    };

    // Worklist traversal from the start state, assigning each reachable
    // state an instruction range in discovery order.
    let mut queue = VecDeque::new();
    let mut enqueued = vec![false; nfa.state_count()];
    queue.push_back(nfa.start());
    enqueued[nfa.start() as usize] = true;
    while let Some(state) = queue.pop_front() {
        emitter.emit_state(state);
        for (_, target) in nfa.state(state).transitions.iter() {
            if !enqueued[*target as usize] {
                enqueued[*target as usize] = true;
                queue.push_back(*target);
            }
        }
    }

    emitter.resolve_fixups();
    emitter.collapse_jumps();
    emitter.result
}
