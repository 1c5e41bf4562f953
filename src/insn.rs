//! Bytecode instructions for the linear execution path.

use crate::types::{ClassContents, GroupId};
use crate::util::to_char_sat;
use core::fmt;

/// An instruction index in a program.
pub type JumpTarget = u32;

/// The instruction set of the thread VM.
#[derive(Debug, Clone)]
pub enum Insn {
    /// Consume one code point equal to the given ASCII byte.
    Char(u8),

    /// Consume one code point equal to the given code point.
    CharUnicode(u32),

    /// Consume one code point matched by the class at this index in the
    /// program's class pool.
    Class(u32),

    /// Consume one code point other than newline.
    AnyChar,

    /// Fork execution: `primary` is preferred, `secondary` is the fallback.
    Split {
        primary: JumpTarget,
        secondary: JumpTarget,
        greedy: bool,
    },

    /// Continue at the target instruction.
    Jump(JumpTarget),

    /// Zero-width: requires absolute position 0.
    AssertStart,

    /// Zero-width: requires position equal to the input length.
    AssertEnd,

    /// Zero-width: requires a word/non-word boundary (or its negation).
    AssertWordBoundary { invert: bool },

    /// Record the current position as the start of a group.
    GroupStart(GroupId),

    /// Record the current position as the end of a group.
    GroupEnd(GroupId),

    /// The match was successful; the current position is the match end.
    MatchFound,

    /// Drop the current thread.
    Fail,
}

/// A compiled linear program plus the metadata the VM consults.
#[derive(Debug, Clone, Default)]
pub struct Program {
    /// The instruction sequence.
    pub insns: Vec<Insn>,

    /// Class contents referenced by `Insn::Class`.
    pub classes: Vec<ClassContents>,

    /// Number of explicit capture groups threads must track.
    pub group_count: GroupId,

    /// Whether every match begins at offset 0.
    pub is_anchored_start: bool,

    /// Whether every match ends at the input end.
    pub is_anchored_end: bool,

    /// A lower bound on match length in bytes.
    pub min_match_len: u32,

    /// An upper bound on match length in bytes, or None if unbounded.
    pub max_match_len: Option<u32>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Program({} insns, {} classes, len {}..{})",
            self.insns.len(),
            self.classes.len(),
            self.min_match_len,
            match self.max_match_len {
                Some(max) => max.to_string(),
                None => "inf".to_string(),
            }
        )?;
        for (idx, insn) in self.insns.iter().enumerate() {
            write!(f, "{:4}: ", idx)?;
            match insn {
                Insn::Char(b) => writeln!(f, "char '{}'", to_char_sat(*b as u32))?,
                Insn::CharUnicode(cp) => writeln!(f, "char U+{:04X}", cp)?,
                Insn::Class(idx) => writeln!(f, "class #{}", idx)?,
                Insn::AnyChar => writeln!(f, "any")?,
                Insn::Split {
                    primary,
                    secondary,
                    greedy,
                } => writeln!(
                    f,
                    "split {} {}{}",
                    primary,
                    secondary,
                    if *greedy { "" } else { " non-greedy" }
                )?,
                Insn::Jump(target) => writeln!(f, "jump {}", target)?,
                Insn::AssertStart => writeln!(f, "assert ^")?,
                Insn::AssertEnd => writeln!(f, "assert $")?,
                Insn::AssertWordBoundary { invert } => {
                    writeln!(f, "assert {}", if *invert { "\\B" } else { "\\b" })?
                }
                Insn::GroupStart(id) => writeln!(f, "group {} start", id)?,
                Insn::GroupEnd(id) => writeln!(f, "group {} end", id)?,
                Insn::MatchFound => writeln!(f, "match")?,
                Insn::Fail => writeln!(f, "fail")?,
            }
        }
        Ok(())
    }
}
