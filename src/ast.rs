//! Abstract syntax tree for parsed patterns.

use crate::types::{ClassContents, GroupId};
use crate::util::to_char_sat;
use core::fmt;

/// The node types of the pattern AST.
/// Each parent exclusively owns its child subtrees.
#[derive(Debug)]
pub enum Node {
    /// Matches the empty string.
    Empty,

    /// Match a literal ASCII byte.
    Literal(u8),

    /// Match any code point except a newline.
    AnyChar,

    /// Match one code point against a character class.
    Class(ClassContents),

    /// The ^ anchor: zero-width, requires position 0.
    AnchorStart,

    /// The $ anchor: zero-width, requires end of input.
    AnchorEnd,

    /// \b or \B.
    WordBoundary { invert: bool },

    /// A capturing group. Ids are assigned in left-paren order from 1.
    CaptureGroup(Box<Node>, GroupId),

    /// A (?:...) group; lowered transparently.
    NonCaptureGroup(Box<Node>),

    /// An alternation like a|b. '|' associates left.
    Alt(Box<Node>, Box<Node>),

    /// Concatenation of exactly two nodes; sequences are left-folded.
    Cat(Box<Node>, Box<Node>),

    /// A quantified node like a*, a+?, or a{2,5}.
    /// `max` of None means unbounded.
    Loop {
        node: Box<Node>,
        min: u32,
        max: Option<u32>,
        greedy: bool,
    },
}

impl Node {
    /// \return a lower bound on the number of bytes this node consumes.
    pub fn min_match_bytes(&self) -> u32 {
        match self {
            Node::Empty | Node::AnchorStart | Node::AnchorEnd | Node::WordBoundary { .. } => 0,
            Node::Literal(..) | Node::AnyChar | Node::Class(..) => 1,
            Node::CaptureGroup(inner, ..) | Node::NonCaptureGroup(inner) => {
                inner.min_match_bytes()
            }
            Node::Alt(left, right) => left.min_match_bytes().min(right.min_match_bytes()),
            Node::Cat(left, right) => left
                .min_match_bytes()
                .saturating_add(right.min_match_bytes()),
            Node::Loop { node, min, .. } => node.min_match_bytes().saturating_mul(*min),
        }
    }

    /// \return an upper bound on the number of bytes this node consumes,
    /// or None if unbounded.
    pub fn max_match_bytes(&self) -> Option<u32> {
        match self {
            Node::Empty | Node::AnchorStart | Node::AnchorEnd | Node::WordBoundary { .. } => {
                Some(0)
            }
            Node::Literal(..) => Some(1),
            // A code point is at most four bytes.
            Node::AnyChar | Node::Class(..) => Some(4),
            Node::CaptureGroup(inner, ..) | Node::NonCaptureGroup(inner) => {
                inner.max_match_bytes()
            }
            Node::Alt(left, right) => Some(left.max_match_bytes()?.max(right.max_match_bytes()?)),
            Node::Cat(left, right) => {
                Some(left.max_match_bytes()?.saturating_add(right.max_match_bytes()?))
            }
            Node::Loop { node, max, .. } => {
                let per_iter = node.max_match_bytes()?;
                if per_iter == 0 {
                    return Some(0);
                }
                max.map(|m| per_iter.saturating_mul(m))
            }
        }
    }

    /// \return whether every match of this node begins at position 0.
    pub fn is_start_anchored(&self) -> bool {
        match self {
            Node::AnchorStart => true,
            Node::Cat(left, ..) => left.is_start_anchored(),
            Node::CaptureGroup(inner, ..) | Node::NonCaptureGroup(inner) => {
                inner.is_start_anchored()
            }
            Node::Alt(left, right) => left.is_start_anchored() && right.is_start_anchored(),
            _ => false,
        }
    }

    /// \return whether every match of this node ends at the input end.
    pub fn is_end_anchored(&self) -> bool {
        match self {
            Node::AnchorEnd => true,
            Node::Cat(.., right) => right.is_end_anchored(),
            Node::CaptureGroup(inner, ..) | Node::NonCaptureGroup(inner) => {
                inner.is_end_anchored()
            }
            Node::Alt(left, right) => left.is_end_anchored() && right.is_end_anchored(),
            _ => false,
        }
    }
}

/// A parsed pattern: the root node plus the number of explicit groups.
#[derive(Debug)]
pub struct Ast {
    pub root: Node,
    pub group_count: GroupId,
}

fn display_node(node: &Node, depth: usize, f: &mut fmt::Formatter) -> fmt::Result {
    for _ in 0..depth {
        write!(f, "..")?;
    }
    match node {
        Node::Empty => writeln!(f, "Empty"),
        Node::Literal(b) => writeln!(f, "'{}'", to_char_sat(*b as u32)),
        Node::AnyChar => writeln!(f, "AnyChar"),
        Node::Class(cc) => {
            let negated = if cc.negated { " negated" } else { "" };
            writeln!(f, "Class{} ({} intervals)", negated, cc.cps.intervals().len())
        }
        Node::AnchorStart => writeln!(f, "AnchorStart"),
        Node::AnchorEnd => writeln!(f, "AnchorEnd"),
        Node::WordBoundary { invert } => {
            writeln!(f, "WordBoundary {}", if *invert { "\\B" } else { "\\b" })
        }
        Node::CaptureGroup(inner, id) => {
            writeln!(f, "CaptureGroup {}", id)?;
            display_node(inner, depth + 1, f)
        }
        Node::NonCaptureGroup(inner) => {
            writeln!(f, "NonCaptureGroup")?;
            display_node(inner, depth + 1, f)
        }
        Node::Alt(left, right) => {
            writeln!(f, "Alt")?;
            display_node(left, depth + 1, f)?;
            display_node(right, depth + 1, f)
        }
        Node::Cat(left, right) => {
            writeln!(f, "Cat")?;
            display_node(left, depth + 1, f)?;
            display_node(right, depth + 1, f)
        }
        Node::Loop {
            node,
            min,
            max,
            greedy,
        } => {
            let max_desc = match max {
                Some(m) => m.to_string(),
                None => "inf".to_string(),
            };
            let greedy_desc = if *greedy { "" } else { " non-greedy" };
            writeln!(f, "Loop {}..{}{}", min, max_desc, greedy_desc)?;
            display_node(node, depth + 1, f)
        }
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        display_node(&self.root, 0, f)
    }
}
