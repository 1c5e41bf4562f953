//! The public surface: compiling patterns and running matches.

use crate::ast::Ast;
use crate::error::Error;
use crate::exec::{self, MatchProducer};
use crate::nfa::Nfa;
use crate::parse;
use crate::startpredicate::{self, StartPredicate};
use crate::thompson::NfaExecutor;

#[cfg(feature = "backend-bytecode")]
use crate::emit;
#[cfg(feature = "backend-bytecode")]
use crate::insn::Program;
#[cfg(feature = "backend-bytecode")]
use crate::vm::VmExecutor;

#[cfg(feature = "streaming")]
use crate::stream::StreamingMatcher;

use core::fmt;
use core::str::FromStr;

/// Range is used to express the extent of a match, as byte indexes into the
/// input.
pub type Range = core::ops::Range<usize>;

/// Per-regex compile flags.
/// None of these is settable from pattern syntax; they are all programmatic.
#[derive(Debug, Copy, Clone)]
pub struct Flags {
    /// If set, literals and classes also match their ASCII/Latin-1 simple
    /// case variants.
    pub case_insensitive: bool,

    /// Carried for callers that record it; `^` and `$` always match only
    /// the input boundaries.
    pub multiline: bool,

    /// If set, `.` matches newline as well.
    pub dot_all: bool,

    /// If set, `\p{...}` property escapes are recognised.
    pub unicode: bool,

    /// If set, the regex may carry a bytecode program.
    pub jit_enabled: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Flags {
            case_insensitive: false,
            multiline: false,
            dot_all: false,
            unicode: true,
            jit_enabled: true,
        }
    }
}

/// The engine feature record, threaded through `compile_with` explicitly:
/// there is no process-wide feature state.
#[derive(Debug, Copy, Clone)]
pub struct Features {
    /// Permit bytecode compilation.
    pub jit_enabled: bool,

    /// Enable property tables and `\p` escapes.
    pub unicode_enabled: bool,

    /// Permit streaming matcher construction.
    pub streaming_enabled: bool,

    /// Permit capture group tracking.
    pub capture_groups: bool,

    /// Reserved.
    pub backtracking: bool,

    // Runtime toggles.
    /// Prefer the bytecode path when it is eligible.
    pub prefer_jit: bool,

    /// Advisory: callers that can stream should.
    pub prefer_streaming: bool,

    /// Never take the bytecode path.
    pub force_nfa: bool,

    /// Surface verbose diagnostics (consulted by front ends).
    pub enable_diagnostics: bool,

    /// Dump compile phases to the log.
    pub debug_mode: bool,
}

impl Default for Features {
    fn default() -> Self {
        Features {
            jit_enabled: true,
            unicode_enabled: true,
            streaming_enabled: true,
            capture_groups: true,
            backtracking: false,
            prefer_jit: true,
            prefer_streaming: false,
            force_nfa: false,
            enable_diagnostics: false,
            debug_mode: false,
        }
    }
}

/// A Match represents a portion of the input which matched a compiled
/// regex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The total extent of the match. May be empty for patterns that match
    /// the empty string.
    pub range: Range,

    /// One entry per capture group in the pattern. None means the group did
    /// not participate in the match (for example, it sat in a not-taken
    /// branch of an alternation).
    pub captures: Vec<Option<Range>>,
}

impl Match {
    /// Access a group by index. Index 0 is the total match; explicit groups
    /// are numbered from 1 in left-paren order.
    #[inline]
    pub fn group(&self, idx: usize) -> Option<Range> {
        if idx == 0 {
            Some(self.range.clone())
        } else {
            self.captures.get(idx - 1).cloned().flatten()
        }
    }

    /// The matched text.
    #[inline]
    pub fn slice<'t>(&self, input: &'t str) -> &'t str {
        &input[self.range.clone()]
    }

    /// Returns the range over the byte offsets of the match.
    #[inline]
    pub fn range(&self) -> Range {
        self.range.clone()
    }

    /// The starting byte offset of the match.
    #[inline]
    pub fn start(&self) -> usize {
        self.range.start
    }

    /// The ending byte offset of the match.
    #[inline]
    pub fn end(&self) -> usize {
        self.range.end
    }

    /// Iterate over the match and its capture groups: the first value is
    /// the total match, subsequent values are the groups.
    #[inline]
    pub fn groups(&self) -> Groups {
        Groups { mat: self, idx: 0 }
    }
}

/// An iterator over the capture groups of a [`Match`], produced by
/// [`Match::groups`].
#[derive(Clone)]
pub struct Groups<'m> {
    mat: &'m Match,
    idx: usize,
}

impl Iterator for Groups<'_> {
    type Item = Option<Range>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.idx > self.mat.captures.len() {
            return None;
        }
        let group = self.mat.group(self.idx);
        self.idx += 1;
        Some(group)
    }
}

/// A Regex is the compiled version of a pattern.
///
/// Compilation is the expensive step; a compiled regex is immutable and may
/// be shared freely across threads for matching.
#[derive(Debug)]
pub struct Regex {
    pattern: String,
    ast: Ast,
    nfa: Nfa,
    predicate: StartPredicate,
    #[cfg(feature = "backend-bytecode")]
    program: Option<Program>,
    flags: Flags,
    features: Features,
}

/// Parse, lower, and optionally compile bytecode for \p pattern with
/// default flags and features.
pub fn compile(pattern: &str) -> Result<Regex, Error> {
    compile_with(pattern, Flags::default(), Features::default())
}

/// Parse, lower, and optionally compile bytecode for \p pattern.
pub fn compile_with(pattern: &str, flags: Flags, features: Features) -> Result<Regex, Error> {
    let mut flags = flags;
    if !features.unicode_enabled {
        flags.unicode = false;
    }
    let ast = parse::try_parse(pattern, flags)?;
    log::trace!("parsed /{}/ with {} groups", pattern, ast.group_count);
    if features.debug_mode {
        log::debug!("ast:\n{}", ast);
    }

    let nfa = Nfa::from_ast(&ast)?;
    log::trace!("lowered to {} states", nfa.state_count());
    if features.debug_mode {
        log::debug!("nfa:\n{}", nfa);
    }

    let predicate = startpredicate::predicate_for(&ast);

    #[cfg(feature = "backend-bytecode")]
    let program = {
        let eligible =
            flags.jit_enabled && features.jit_enabled && !nfa.has_boundary_asserts();
        if eligible {
            let program = emit::emit(&nfa, &ast);
            log::trace!("emitted {} bytecode instructions", program.insns.len());
            if features.debug_mode {
                log::debug!("program:\n{}", program);
            }
            Some(program)
        } else {
            None
        }
    };

    Ok(Regex {
        pattern: pattern.to_string(),
        ast,
        nfa,
        predicate,
        #[cfg(feature = "backend-bytecode")]
        program,
        flags,
        features,
    })
}

impl Regex {
    /// Construct a regex by parsing \p pattern using the default flags.
    /// Note that this is rather expensive; prefer to cache a Regex which is
    /// intended to be used more than once.
    #[inline]
    pub fn new(pattern: &str) -> Result<Regex, Error> {
        compile(pattern)
    }

    /// The pattern text this regex was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn features(&self) -> Features {
        self.features
    }

    /// The number of explicit capture groups in the pattern.
    pub fn group_count(&self) -> u16 {
        self.nfa.group_count()
    }

    /// Whether capture-returning calls on this regex track groups.
    fn track_groups(&self) -> bool {
        self.features.capture_groups && self.nfa.group_count() > 0
    }

    /// The bytecode path is taken iff a program was compiled, the runtime
    /// toggles allow it, and the call does not require capture groups.
    #[cfg(feature = "backend-bytecode")]
    fn use_bytecode(&self, groups_required: bool) -> bool {
        self.program.is_some()
            && self.features.prefer_jit
            && !self.features.force_nfa
            && !groups_required
    }

    fn executor<'r, 't>(&'r self, text: &'t str, groups_required: bool) -> ExecutorKind<'r, 't> {
        #[cfg(feature = "backend-bytecode")]
        if self.use_bytecode(groups_required) {
            let program = self.program.as_ref().expect("eligibility implies a program");
            return ExecutorKind::Vm(VmExecutor::new(
                program,
                &self.predicate,
                text.as_bytes(),
                false,
            ));
        }
        let track = groups_required && self.track_groups();
        ExecutorKind::Nfa(NfaExecutor::new(
            &self.nfa,
            &self.predicate,
            text.as_bytes(),
            track,
        ))
    }

    /// Scan \p text for any match, without recording group extents.
    pub fn is_match(&self, text: &str) -> bool {
        match self.executor(text, false) {
            ExecutorKind::Nfa(mut exec) => exec.has_match(0),
            #[cfg(feature = "backend-bytecode")]
            ExecutorKind::Vm(mut exec) => exec.has_match(0),
        }
    }

    /// Searches \p text to find the first match.
    #[inline]
    pub fn find(&self, text: &str) -> Option<Match> {
        self.find_iter(text).next()
    }

    /// Searches \p text, returning an iterator over non-overlapping
    /// matches.
    #[inline]
    pub fn find_iter<'r, 't>(&'r self, text: &'t str) -> Matches<'r, 't> {
        self.find_from(text, 0)
    }

    /// Returns an iterator over matches found in \p text starting at byte
    /// index \p start.
    pub fn find_from<'r, 't>(&'r self, text: &'t str, start: usize) -> Matches<'r, 't> {
        exec::Matches::new(self.executor(text, self.track_groups()), start)
    }

    /// All non-overlapping matches, left to right.
    pub fn find_all(&self, text: &str) -> Vec<Match> {
        self.find_iter(text).collect()
    }

    /// Construct a streaming matcher borrowing this regex.
    #[cfg(feature = "streaming")]
    pub fn streaming(&self) -> Result<StreamingMatcher<'_>, Error> {
        if !self.features.streaming_enabled {
            return Err(Error::UnsupportedFeature(
                "streaming is disabled by the feature record".to_string(),
            ));
        }
        Ok(StreamingMatcher::new(
            &self.nfa,
            self.track_groups(),
            self.ast.root.min_match_bytes() == 0,
        ))
    }

    /// A human-readable dump of the parsed AST.
    pub fn dump_ast(&self) -> String {
        self.ast.to_string()
    }

    /// A human-readable dump of the lowered NFA.
    pub fn dump_nfa(&self) -> String {
        self.nfa.to_string()
    }

    /// A human-readable dump of the bytecode program, when one exists.
    #[cfg(feature = "backend-bytecode")]
    pub fn dump_program(&self) -> Option<String> {
        self.program.as_ref().map(|p| p.to_string())
    }
}

impl FromStr for Regex {
    type Err = Error;

    /// Attempts to parse a string into a regular expression.
    #[inline]
    fn from_str(s: &str) -> Result<Self, Error> {
        Self::new(s)
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.pattern)
    }
}

/// Runtime-selected backend for one search.
#[derive(Debug)]
pub enum ExecutorKind<'r, 't> {
    Nfa(NfaExecutor<'r, 't>),
    #[cfg(feature = "backend-bytecode")]
    Vm(VmExecutor<'r, 't>),
}

impl MatchProducer for ExecutorKind<'_, '_> {
    fn next_match(&mut self, pos: usize, next_start: &mut Option<usize>) -> Option<Match> {
        match self {
            ExecutorKind::Nfa(exec) => exec.next_match(pos, next_start),
            #[cfg(feature = "backend-bytecode")]
            ExecutorKind::Vm(exec) => exec.next_match(pos, next_start),
        }
    }
}

/// An iterator type which yields `Match`es found in an input.
pub type Matches<'r, 't> = exec::Matches<ExecutorKind<'r, 't>>;
