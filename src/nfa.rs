//! Thompson lowering of the AST to a nondeterministic finite automaton.

use crate::ast::{Ast, Node};
use crate::error::Error;
use crate::types::{ClassContents, GroupId, MAX_STATES};
use crate::util::to_char_sat;
use core::fmt;
use smallvec::SmallVec;

/// A handle to a state, implemented as an index into a flat state vector.
pub type StateHandle = u32;

/// The condition guarding a transition.
#[derive(Debug, Clone)]
pub enum Condition {
    /// No input consumed; always taken.
    Epsilon,

    /// Consume one code point equal to the given ASCII byte.
    Char(u8),

    /// Consume one code point other than newline.
    AnyChar,

    /// Consume one code point matched by the class.
    Class(ClassContents),

    /// Zero-width: requires absolute position 0.
    AssertStart,

    /// Zero-width: requires position equal to the input length.
    AssertEnd,

    /// Zero-width: requires a word/non-word boundary (or its negation).
    AssertWordBoundary { invert: bool },

    /// Zero-width: records the current position as the start of a group.
    GroupStart(GroupId),

    /// Zero-width: records the current position as the end of a group.
    GroupEnd(GroupId),
}

impl Condition {
    /// \return whether this condition consumes input.
    #[inline]
    pub fn is_consuming(&self) -> bool {
        matches!(
            self,
            Condition::Char(..) | Condition::AnyChar | Condition::Class(..)
        )
    }

    /// \return whether a consuming condition matches the code point \p cp.
    #[inline]
    pub fn matches_codepoint(&self, cp: u32) -> bool {
        match self {
            Condition::Char(b) => cp == *b as u32,
            Condition::AnyChar => cp != '\n' as u32,
            Condition::Class(cc) => cc.matches(cp),
            _ => false,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Epsilon => write!(f, "ε"),
            Condition::Char(b) => write!(f, "'{}'", to_char_sat(*b as u32)),
            Condition::AnyChar => write!(f, "any"),
            Condition::Class(cc) => {
                write!(f, "class{}", if cc.negated { "^" } else { "" })
            }
            Condition::AssertStart => write!(f, "^"),
            Condition::AssertEnd => write!(f, "$"),
            Condition::AssertWordBoundary { invert } => {
                write!(f, "{}", if *invert { "\\B" } else { "\\b" })
            }
            Condition::GroupStart(id) => write!(f, "grp{}(", id),
            Condition::GroupEnd(id) => write!(f, ")grp{}", id),
        }
    }
}

/// One NFA state: an ordered list of outgoing transitions.
/// Earlier transitions are preferred by the bytecode path.
#[derive(Debug, Default)]
pub struct State {
    pub transitions: SmallVec<[(Condition, StateHandle); 2]>,
}

/// The lowered automaton: a flat state vector, a start state, and the
/// accepting goal state produced by Thompson construction.
#[derive(Debug)]
pub struct Nfa {
    states: Box<[State]>,
    start: StateHandle,
    goal: StateHandle,
    group_count: GroupId,
    has_boundary_asserts: bool,
}

impl Nfa {
    /// Lower \p ast to an NFA.
    pub fn from_ast(ast: &Ast) -> Result<Nfa, Error> {
        let mut builder = Builder { states: Vec::new() };
        let frag = builder.build(&ast.root)?;
        let has_boundary_asserts = builder.states.iter().any(|s| {
            s.transitions
                .iter()
                .any(|(c, _)| matches!(c, Condition::AssertStart | Condition::AssertEnd))
        });
        Ok(Nfa {
            states: builder.states.into_boxed_slice(),
            start: frag.start,
            goal: frag.end,
            group_count: ast.group_count,
            has_boundary_asserts,
        })
    }

    #[inline]
    pub fn state(&self, handle: StateHandle) -> &State {
        &self.states[handle as usize]
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn start(&self) -> StateHandle {
        self.start
    }

    pub fn goal(&self) -> StateHandle {
        self.goal
    }

    #[inline]
    pub fn is_goal(&self, handle: StateHandle) -> bool {
        handle == self.goal
    }

    pub fn group_count(&self) -> GroupId {
        self.group_count
    }

    /// \return whether any transition asserts a start or end position.
    /// Such automata are excluded from the bytecode path.
    pub fn has_boundary_asserts(&self) -> bool {
        self.has_boundary_asserts
    }
}

impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "NFA({} states)", self.states.len())?;
        for (idx, state) in self.states.iter().enumerate() {
            let handle = idx as StateHandle;
            let marker = if handle == self.start {
                "S"
            } else if handle == self.goal {
                "G"
            } else {
                " "
            };
            write!(f, "[{}{}]", marker, handle)?;
            for (cond, target) in &state.transitions {
                write!(f, " {}→{}", cond, target)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A piece of the automaton under construction: a start state and a single
/// dangling end state awaiting its continuation.
#[derive(Clone, Copy)]
struct Fragment {
    start: StateHandle,
    end: StateHandle,
}

struct Builder {
    states: Vec<State>,
}

impl Builder {
    /// Try adding a new state, returning its handle.
    fn make(&mut self) -> Result<StateHandle, Error> {
        if self.states.len() >= MAX_STATES {
            return Err(Error::OutOfMemory(format!(
                "pattern needs more than {} automaton states",
                MAX_STATES
            )));
        }
        self.states.push(State::default());
        Ok((self.states.len() - 1) as StateHandle)
    }

    fn link(&mut self, from: StateHandle, cond: Condition, to: StateHandle) {
        self.states[from as usize].transitions.push((cond, to));
    }

    /// A fresh two-state fragment joined by \p cond.
    fn leaf(&mut self, cond: Condition) -> Result<Fragment, Error> {
        let start = self.make()?;
        let end = self.make()?;
        self.link(start, cond, end);
        Ok(Fragment { start, end })
    }

    fn build(&mut self, node: &Node) -> Result<Fragment, Error> {
        match node {
            Node::Empty => self.leaf(Condition::Epsilon),
            Node::Literal(b) => self.leaf(Condition::Char(*b)),
            Node::AnyChar => self.leaf(Condition::AnyChar),
            Node::Class(cc) => self.leaf(Condition::Class(cc.clone())),
            Node::AnchorStart => self.leaf(Condition::AssertStart),
            Node::AnchorEnd => self.leaf(Condition::AssertEnd),
            Node::WordBoundary { invert } => {
                self.leaf(Condition::AssertWordBoundary { invert: *invert })
            }
            Node::Cat(left, right) => {
                let lf = self.build(left)?;
                let rf = self.build(right)?;
                self.link(lf.end, Condition::Epsilon, rf.start);
                Ok(Fragment {
                    start: lf.start,
                    end: rf.end,
                })
            }
            Node::Alt(left, right) => {
                let start = self.make()?;
                let lf = self.build(left)?;
                let rf = self.build(right)?;
                let end = self.make()?;
                // The left branch has priority.
                self.link(start, Condition::Epsilon, lf.start);
                self.link(start, Condition::Epsilon, rf.start);
                self.link(lf.end, Condition::Epsilon, end);
                self.link(rf.end, Condition::Epsilon, end);
                Ok(Fragment { start, end })
            }
            Node::CaptureGroup(inner, id) => {
                let start = self.make()?;
                let inner = self.build(inner)?;
                let end = self.make()?;
                self.link(start, Condition::GroupStart(*id), inner.start);
                self.link(inner.end, Condition::GroupEnd(*id), end);
                Ok(Fragment { start, end })
            }
            Node::NonCaptureGroup(inner) => self.build(inner),
            Node::Loop {
                node,
                min,
                max,
                greedy,
            } => self.build_loop(node, *min, *max, *greedy),
        }
    }

    /// Chain \p next onto \p frag with an epsilon, or start a chain.
    fn chain(&mut self, frag: Option<Fragment>, next: Fragment) -> Fragment {
        match frag {
            None => next,
            Some(prev) => {
                self.link(prev.end, Condition::Epsilon, next.start);
                Fragment {
                    start: prev.start,
                    end: next.end,
                }
            }
        }
    }

    /// An optional wrapper around a fresh copy of \p node.
    fn optional_of(&mut self, node: &Node, greedy: bool) -> Result<Fragment, Error> {
        let start = self.make()?;
        let body = self.build(node)?;
        let end = self.make()?;
        if greedy {
            self.link(start, Condition::Epsilon, body.start);
            self.link(start, Condition::Epsilon, end);
        } else {
            self.link(start, Condition::Epsilon, end);
            self.link(start, Condition::Epsilon, body.start);
        }
        self.link(body.end, Condition::Epsilon, end);
        Ok(Fragment { start, end })
    }

    fn build_loop(
        &mut self,
        node: &Node,
        min: u32,
        max: Option<u32>,
        greedy: bool,
    ) -> Result<Fragment, Error> {
        match max {
            None if min == 0 => {
                // Kleene star.
                let start = self.make()?;
                let body = self.build(node)?;
                let end = self.make()?;
                if greedy {
                    self.link(start, Condition::Epsilon, body.start);
                    self.link(start, Condition::Epsilon, end);
                    self.link(body.end, Condition::Epsilon, body.start);
                    self.link(body.end, Condition::Epsilon, end);
                } else {
                    self.link(start, Condition::Epsilon, end);
                    self.link(start, Condition::Epsilon, body.start);
                    self.link(body.end, Condition::Epsilon, end);
                    self.link(body.end, Condition::Epsilon, body.start);
                }
                Ok(Fragment { start, end })
            }
            None => {
                // Mandatory copies; the last one may repeat.
                let mut frag: Option<Fragment> = None;
                let mut last: Option<Fragment> = None;
                for _ in 0..min {
                    let body = self.build(node)?;
                    last = Some(body);
                    frag = Some(self.chain(frag, body));
                }
                let frag = frag.expect("min is at least 1");
                let last = last.expect("min is at least 1");
                let end = self.make()?;
                if greedy {
                    self.link(last.end, Condition::Epsilon, last.start);
                    self.link(last.end, Condition::Epsilon, end);
                } else {
                    self.link(last.end, Condition::Epsilon, end);
                    self.link(last.end, Condition::Epsilon, last.start);
                }
                Ok(Fragment {
                    start: frag.start,
                    end,
                })
            }
            Some(max) => {
                // Mandatory copies followed by optional ones.
                debug_assert!(min <= max);
                let mut frag: Option<Fragment> = None;
                for _ in 0..min {
                    let body = self.build(node)?;
                    frag = Some(self.chain(frag, body));
                }
                for _ in min..max {
                    let opt = self.optional_of(node, greedy)?;
                    frag = Some(self.chain(frag, opt));
                }
                match frag {
                    Some(frag) => Ok(frag),
                    // {0,0}: matches exactly the empty string.
                    None => self.leaf(Condition::Epsilon),
                }
            }
        }
    }
}
