//! Support for quickly finding potential match locations.

use crate::ast::{Ast, Node};
use crate::bytesearch::{find_literal, ByteBitmap};
use crate::util::utf8_first_byte;

/// The peeled prefix start predicate: a fast way of locating the first
/// position a match could possibly begin at.
#[derive(Debug, Clone)]
pub enum StartPredicate {
    /// May match starting anywhere.
    Arbitrary,

    /// The match must begin with this literal byte sequence.
    Literal(Vec<u8>),

    /// The match must begin with a byte contained in the bitmap.
    FirstBytes(ByteBitmap),

    /// The pattern is anchored to the start of the input; only offset 0 can
    /// begin a match.
    StartAnchored,
}

impl StartPredicate {
    /// \return the next candidate start offset at or after \p from, or None
    /// when no further candidate exists.
    pub fn next_candidate(&self, input: &[u8], from: usize) -> Option<usize> {
        if from > input.len() {
            return None;
        }
        match self {
            StartPredicate::Arbitrary => Some(from),
            StartPredicate::StartAnchored => (from == 0).then_some(0),
            StartPredicate::Literal(seq) => find_literal(input, seq, from),
            StartPredicate::FirstBytes(bitmap) => {
                bitmap.find_in(&input[from..]).map(|idx| idx + from)
            }
        }
    }
}

/// The pre-resolution form of a predicate.
enum AbstractPredicate {
    Arbitrary,
    Literal(Vec<u8>),
    Set(ByteBitmap),
}

impl AbstractPredicate {
    /// \return a predicate matching either \p x or \p y.
    fn disjunction(x: Self, y: Self) -> Self {
        use AbstractPredicate::*;
        match (x, y) {
            (Arbitrary, _) | (_, Arbitrary) => Arbitrary,
            (Literal(s1), Literal(s2)) => {
                // Use the shared prefix if there is one, otherwise fall back
                // to a set of the two first bytes.
                let shared = s1
                    .iter()
                    .zip(s2.iter())
                    .take_while(|(a, b)| a == b)
                    .count();
                if shared > 0 {
                    Literal(s1[..shared].to_vec())
                } else {
                    Set(ByteBitmap::new(&[s1[0], s2[0]]))
                }
            }
            (Set(mut s1), Set(s2)) => {
                s1.bitor(&s2);
                Set(s1)
            }
            (Set(mut set), Literal(seq)) | (Literal(seq), Set(mut set)) => {
                set.set(seq[0]);
                Set(set)
            }
        }
    }

    fn resolve(self) -> StartPredicate {
        match self {
            AbstractPredicate::Arbitrary => StartPredicate::Arbitrary,
            AbstractPredicate::Literal(seq) => {
                debug_assert!(!seq.is_empty());
                StartPredicate::Literal(seq)
            }
            AbstractPredicate::Set(bitmap) => match bitmap.count_bits() {
                0 => StartPredicate::Arbitrary,
                _ => StartPredicate::FirstBytes(bitmap),
            },
        }
    }
}

/// Compute the predicate for a node.
/// None means the node is zero-width and does not constrain the first byte;
/// the caller moves on to whatever follows it.
fn compute_predicate(node: &Node) -> Option<AbstractPredicate> {
    let arbitrary = Some(AbstractPredicate::Arbitrary);
    match node {
        // Zero-width nodes impose nothing.
        Node::Empty
        | Node::AnchorStart
        | Node::AnchorEnd
        | Node::WordBoundary { .. } => None,

        Node::Literal(b) => Some(AbstractPredicate::Literal(vec![*b])),

        // Dot is too common to justify a scan.
        Node::AnyChar => arbitrary,

        Node::Class(cc) => {
            // Assume negated classes contain most bytes.
            if cc.negated || cc.cps.is_empty() {
                return arbitrary;
            }
            let mut bitmap = ByteBitmap::default();
            for iv in cc.cps.intervals() {
                // The UTF-8 lead byte is monotonic in the code point.
                for b in utf8_first_byte(iv.first)..=utf8_first_byte(iv.last) {
                    bitmap.set(b);
                }
            }
            Some(AbstractPredicate::Set(bitmap))
        }

        // Concatenations constrain by their first constraining child.
        Node::Cat(left, right) => compute_predicate(left).or_else(|| compute_predicate(right)),

        Node::Alt(left, right) => {
            match (compute_predicate(left), compute_predicate(right)) {
                (Some(x), Some(y)) => Some(AbstractPredicate::disjunction(x, y)),
                // A zero-width branch can match empty; no constraint.
                _ => arbitrary,
            }
        }

        Node::CaptureGroup(inner, ..) | Node::NonCaptureGroup(inner) => compute_predicate(inner),

        Node::Loop { node, min, .. } => {
            if *min > 0 {
                compute_predicate(node)
            } else {
                arbitrary
            }
        }
    }
}

/// Glue adjacent literal nodes into longer sequences: a concatenation of
/// literals yields one searchable byte string. \return whether the whole
/// node was consumed as literal text, so the caller may keep extending.
fn literal_prefix(node: &Node, out: &mut Vec<u8>) -> bool {
    match node {
        Node::Literal(b) => {
            out.push(*b);
            true
        }
        // Zero-width nodes contribute nothing and do not end the prefix.
        Node::Empty | Node::AnchorStart | Node::WordBoundary { .. } => true,
        Node::Cat(left, right) => literal_prefix(left, out) && literal_prefix(right, out),
        Node::CaptureGroup(inner, ..) | Node::NonCaptureGroup(inner) => {
            literal_prefix(inner, out)
        }
        _ => false,
    }
}

/// \return the start predicate for a parsed pattern.
pub fn predicate_for(ast: &Ast) -> StartPredicate {
    if ast.root.is_start_anchored() {
        return StartPredicate::StartAnchored;
    }
    // Prefer a multi-byte literal prefix when one exists.
    let mut prefix = Vec::new();
    literal_prefix(&ast.root, &mut prefix);
    if prefix.len() > 1 {
        return StartPredicate::Literal(prefix);
    }
    compute_predicate(&ast.root)
        .unwrap_or(AbstractPredicate::Arbitrary)
        .resolve()
}
