//! Streaming execution: incremental feeding with cross-chunk matches.
//!
//! The matcher keeps a frontier of NFA states, each tagged with the
//! cumulative offset its match attempt began at, so matches that start in
//! the middle of one chunk and end in another are reported with exact
//! offsets. Between chunks the frontier is held in "seed" form (the targets
//! of the last consuming step, not yet ε-closed), because closing requires
//! knowing the next character for word-boundary assertions.
//!
//! Accepted-but-undecided matches live in a small queue of non-overlapping
//! candidates ordered by start offset. The head is emitted once no active
//! attempt that began at or before its start can still improve on it;
//! extending a candidate evicts any queued successor it has grown over.
//! This reproduces batch `find_all` semantics over any chunking.

use crate::api::Match;
use crate::nfa::{Nfa, StateHandle};
use crate::thompson::{closure, Assertions};
use crate::types::GroupData;
use crate::utf8;
use crate::util::{is_word_char, VisitBitmap};
use core::ops::Range;

/// A match found in the cumulative stream, tagged with the chunks it
/// starts and ends in.
#[derive(Debug, Clone)]
pub struct StreamMatch {
    /// Byte offsets into the cumulative stream.
    pub range: Range<usize>,

    /// Capture groups, as in a non-streaming `Match`.
    pub captures: Vec<Option<Range<usize>>>,

    /// Index of the chunk the match starts in.
    pub start_chunk: usize,

    /// Index of the chunk the match ends in.
    pub end_chunk: usize,

    /// Whether the match spans a chunk boundary.
    pub crosses_boundary: bool,
}

/// An accepted match that may still be extended by its own attempt or
/// overtaken by an earlier-starting one.
#[derive(Debug, Clone)]
struct Candidate {
    start: usize,
    end: usize,
    groups: Vec<GroupData>,
}

impl Candidate {
    /// The offset the next non-overlapping match may begin at.
    fn resume(&self) -> usize {
        self.end.max(self.start + 1)
    }
}

/// A matcher that ingests input in arbitrary byte chunks and reports
/// matches with offsets in the cumulative stream. Single-threaded and
/// stateful; construct one per concurrent scan.
#[derive(Debug)]
pub struct StreamingMatcher<'r> {
    nfa: &'r Nfa,
    track_groups: bool,

    /// Whether the pattern can match the empty string; gates the per-offset
    /// zero-width accept probe.
    may_match_empty: bool,

    /// Post-step states awaiting closure at offset `committed`, paired with
    /// the origin of the attempt that produced them.
    seeds: Vec<(StateHandle, usize)>,

    /// The closed frontier at the position currently being processed.
    frontier: Vec<StateHandle>,

    /// Origin offset per state; valid for states in `frontier`.
    origin: Vec<usize>,

    visited: VisitBitmap,
    work: Vec<StateHandle>,

    /// Shared group table, written by closure traversal.
    groups: Vec<GroupData>,

    /// Snapshot of `groups` taken when the goal state entered the closure.
    goal_groups: Vec<GroupData>,

    /// Scratch for the zero-width accept probe.
    probe_visited: VisitBitmap,
    probe_out: Vec<StateHandle>,
    probe_groups: Vec<GroupData>,
    probe_accepted: Vec<GroupData>,

    /// Accepted matches not yet emitted, ordered by start, non-overlapping.
    candidates: Vec<Candidate>,

    /// No new attempt may begin before this offset.
    resume_at: usize,

    /// Offset of the next byte to simulate.
    committed: usize,

    /// Total bytes fed so far.
    total: usize,

    /// Bytes in `committed..total`: an undecodable tail awaiting more input.
    carry: Vec<u8>,

    /// The code point ending at `committed`, for word-boundary context.
    prev_cp: Option<u32>,

    /// Cumulative start offset of every chunk fed.
    boundaries: Vec<usize>,

    matches: Vec<StreamMatch>,
    finished: bool,
}

impl<'r> StreamingMatcher<'r> {
    pub fn new(nfa: &'r Nfa, track_groups: bool, may_match_empty: bool) -> Self {
        let group_count = if track_groups {
            nfa.group_count() as usize
        } else {
            0
        };
        StreamingMatcher {
            nfa,
            track_groups,
            may_match_empty,
            seeds: Vec::new(),
            frontier: Vec::new(),
            origin: vec![0; nfa.state_count()],
            visited: VisitBitmap::new(nfa.state_count()),
            work: Vec::new(),
            groups: vec![GroupData::new(); group_count],
            goal_groups: Vec::new(),
            probe_visited: VisitBitmap::new(nfa.state_count()),
            probe_out: Vec::new(),
            probe_groups: vec![GroupData::new(); group_count],
            probe_accepted: Vec::new(),
            candidates: Vec::new(),
            resume_at: 0,
            committed: 0,
            total: 0,
            carry: Vec::new(),
            prev_cp: None,
            boundaries: Vec::new(),
            matches: Vec::new(),
            finished: false,
        }
    }

    /// Record a chunk boundary, append the bytes, and advance simulation
    /// over everything that is now decodable.
    pub fn feed(&mut self, bytes: &[u8]) {
        debug_assert!(!self.finished, "feed after finalize");
        if self.finished {
            return;
        }
        self.boundaries.push(self.total);
        self.total += bytes.len();
        self.carry.extend_from_slice(bytes);
        self.drain(false);
    }

    /// Consume any buffered tail, apply end-of-input assertions, and record
    /// the final matches.
    pub fn finalize(&mut self) {
        if self.finished {
            return;
        }
        // Whatever remains in the carry can never decode; treat it as
        // invalid input rather than waiting for bytes that will not come.
        self.drain(true);
        debug_assert!(self.carry.is_empty());
        // Empty matches may stack up at the stream end; keep processing the
        // final position until an iteration yields nothing.
        loop {
            let emitted_before = self.matches.len();
            self.process_position(None, true);
            self.seeds.clear();
            if self.matches.len() == emitted_before {
                break;
            }
        }
        self.finished = true;
    }

    /// The matches recorded so far, in cumulative-offset order.
    pub fn matches(&self) -> &[StreamMatch] {
        &self.matches
    }

    /// Reconstruct the matched bytes from the original chunk list,
    /// splicing across boundaries when needed.
    pub fn slice_of(&self, m: &StreamMatch, chunks: &[&[u8]]) -> Vec<u8> {
        let mut out = Vec::with_capacity(m.range.len());
        let mut offset = 0usize;
        for chunk in chunks {
            let begin = m.range.start.max(offset);
            let end = m.range.end.min(offset + chunk.len());
            if begin < end {
                out.extend_from_slice(&chunk[begin - offset..end - offset]);
            }
            offset += chunk.len();
        }
        out
    }

    /// Return to the initial state: position 0, no chunks, no matches.
    pub fn reset(&mut self) {
        self.seeds.clear();
        self.frontier.clear();
        self.groups.iter_mut().for_each(GroupData::reset);
        self.candidates.clear();
        self.resume_at = 0;
        self.committed = 0;
        self.total = 0;
        self.carry.clear();
        self.prev_cp = None;
        self.boundaries.clear();
        self.matches.clear();
        self.finished = false;
    }

    /// Advance over the carry while full code points are available.
    /// With \p at_end, undecodable bytes are consumed as invalid instead of
    /// being left to wait for the rest of their sequence.
    fn drain(&mut self, at_end: bool) {
        while !self.carry.is_empty() {
            let lead = self.carry[0];
            let incomplete = match utf8::sequence_len(lead) {
                Some(width) => self.carry.len() < width,
                None => false,
            };
            if incomplete && !at_end {
                break;
            }
            let decoded = utf8::decode(&self.carry, 0);
            self.process_position(decoded.map(|(cp, _)| cp), false);
            match decoded {
                Some((cp, width)) => {
                    self.step(cp);
                    self.prev_cp = Some(cp);
                    self.carry.drain(..width);
                    self.committed += width;
                }
                None => {
                    // An invalid byte matches no transition; every active
                    // attempt dies here.
                    self.seeds.clear();
                    self.frontier.clear();
                    self.prev_cp = None;
                    self.carry.drain(..1);
                    self.committed += 1;
                }
            }
        }
    }

    /// Close the carried seeds (plus a fresh attempt, when allowed) at the
    /// current offset, then look for accepts and emit what is decided.
    fn process_position(&mut self, next_cp: Option<u32>, at_end: bool) {
        let pos = self.committed;
        let asserts = Assertions {
            at_start: pos == 0,
            at_end,
            prev_is_word: self.prev_cp.is_some_and(is_word_char),
            next_is_word: next_cp.is_some_and(is_word_char),
        };

        self.visited.clear();
        self.frontier.clear();
        // Seeds are ordered by ascending origin, so the first state to win
        // the visited check carries the leftmost origin.
        let seeds = core::mem::take(&mut self.seeds);
        for &(state, origin) in &seeds {
            self.close_with_origin(state, origin, &asserts, pos);
        }
        self.seeds = seeds;
        self.seeds.clear();

        // Begin a fresh attempt at this offset.
        if pos >= self.resume_at {
            self.close_with_origin(self.nfa.start(), pos, &asserts, pos);
        }

        // The goal can be reachable from this offset alone yet owned by an
        // older attempt in the frontier; probe for the zero-width accept
        // the dedup hides.
        if self.may_match_empty && pos >= self.resume_at {
            self.probe_empty_accept(&asserts, pos);
        }

        self.accept_and_flush(pos, at_end);
    }

    fn close_with_origin(
        &mut self,
        state: StateHandle,
        origin: usize,
        asserts: &Assertions,
        pos: usize,
    ) {
        let before = self.frontier.len();
        closure(
            self.nfa,
            state,
            asserts,
            pos,
            &mut self.groups,
            &mut self.goal_groups,
            &mut self.visited,
            &mut self.work,
            &mut self.frontier,
        );
        for &added in &self.frontier[before..] {
            self.origin[added as usize] = origin;
        }
    }

    /// Run an isolated ε-closure of the start state to see whether an
    /// attempt beginning here accepts the empty string, and record it as a
    /// candidate if so.
    fn probe_empty_accept(&mut self, asserts: &Assertions, pos: usize) {
        self.probe_visited.clear();
        self.probe_out.clear();
        self.probe_groups.iter_mut().for_each(GroupData::reset);
        closure(
            self.nfa,
            self.nfa.start(),
            asserts,
            pos,
            &mut self.probe_groups,
            &mut self.probe_accepted,
            &mut self.probe_visited,
            &mut self.work,
            &mut self.probe_out,
        );
        if self.probe_out.contains(&self.nfa.goal()) {
            let groups = core::mem::take(&mut self.probe_accepted);
            self.accept(pos, pos, &groups);
            self.probe_accepted = groups;
        }
    }

    /// Fold an observed accept into the candidate queue.
    fn accept(&mut self, start: usize, end: usize, groups: &[GroupData]) {
        // Extending an existing candidate evicts successors it grows over.
        if let Some(idx) = self.candidates.iter().position(|c| c.start == start) {
            let candidate = &mut self.candidates[idx];
            if end > candidate.end {
                candidate.end = end;
                candidate.groups.clear();
                candidate.groups.extend_from_slice(groups);
                let resume = self.candidates[idx].resume();
                self.candidates
                    .retain(|c| c.start <= start || c.start >= resume);
            }
            return;
        }
        // A new candidate is admitted only where its predecessor leaves
        // room; it in turn evicts any successor it overlaps.
        let insert_at = self.candidates.partition_point(|c| c.start < start);
        if insert_at > 0 && start < self.candidates[insert_at - 1].resume() {
            return;
        }
        let candidate = Candidate {
            start,
            end,
            groups: groups.to_vec(),
        };
        let resume = candidate.resume();
        self.candidates
            .retain(|c| c.start <= start || c.start >= resume);
        let insert_at = self.candidates.partition_point(|c| c.start < start);
        self.candidates.insert(insert_at, candidate);
    }

    /// Record an accept at \p pos if the goal state is active, then emit
    /// queue heads once no earlier-origin attempt can still improve on them
    /// (or unconditionally at the end of input).
    fn accept_and_flush(&mut self, pos: usize, at_end: bool) {
        loop {
            let goal = self.nfa.goal();
            if self.frontier.contains(&goal) {
                let origin = self.origin[goal as usize];
                let groups = core::mem::take(&mut self.goal_groups);
                self.accept(origin, pos, &groups);
                self.goal_groups = groups;
            }

            let head_start = match self.candidates.first() {
                Some(head) => head.start,
                None => return,
            };
            if !at_end {
                // An attempt with origin at or before the head's start may
                // still produce a leftmost or longer match.
                let nfa = self.nfa;
                let origins = &self.origin;
                let blocked = self
                    .frontier
                    .iter()
                    .any(|&s| !nfa.is_goal(s) && origins[s as usize] <= head_start);
                if blocked {
                    return;
                }
            }

            let head = self.candidates.remove(0);
            self.resume_at = head.resume();
            self.record_match(&head);
            // Attempts overtaken by the emitted match are dead, and so are
            // queued candidates it grew over.
            let origins = &self.origin;
            let resume_at = self.resume_at;
            self.frontier.retain(|&s| origins[s as usize] >= resume_at);
            self.candidates.retain(|c| c.start >= resume_at);
            // The frontier may still hold the goal for a later attempt;
            // loop to consider it.
        }
    }

    fn record_match(&mut self, candidate: &Candidate) {
        let captures = if self.track_groups {
            candidate.groups.iter().map(GroupData::as_range).collect()
        } else {
            Vec::new()
        };
        let (start, end) = (candidate.start, candidate.end);
        let start_chunk = self.chunk_index(start);
        let end_chunk = if end > start {
            self.chunk_index(end - 1)
        } else {
            start_chunk
        };
        self.matches.push(StreamMatch {
            range: start..end,
            captures,
            start_chunk,
            end_chunk,
            crosses_boundary: start_chunk != end_chunk,
        });
    }

    /// Map an absolute offset to the index of the chunk containing it.
    fn chunk_index(&self, offset: usize) -> usize {
        self.boundaries
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    /// Advance the frontier over one decoded code point, leaving the
    /// resulting states as seeds for the next position.
    fn step(&mut self, cp: u32) {
        debug_assert!(self.seeds.is_empty());
        for &state in &self.frontier {
            let origin = self.origin[state as usize];
            for (cond, target) in self.nfa.state(state).transitions.iter() {
                if cond.is_consuming() && cond.matches_codepoint(cp) {
                    self.seeds.push((*target, origin));
                }
            }
        }
        self.frontier.clear();
    }
}

/// Convert a stream match to the plain `Match` shape.
impl From<&StreamMatch> for Match {
    fn from(m: &StreamMatch) -> Match {
        Match {
            range: m.range.clone(),
            captures: m.captures.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Flags;
    use crate::parse;

    fn matcher_parts(pattern: &str) -> (Nfa, bool, bool) {
        let ast = parse::try_parse(pattern, Flags::default()).expect("should parse");
        let track = ast.group_count > 0;
        let nullable = ast.root.min_match_bytes() == 0;
        (Nfa::from_ast(&ast).expect("should lower"), track, nullable)
    }

    fn stream_ranges(pattern: &str, chunks: &[&str]) -> Vec<(usize, usize)> {
        let (nfa, track, nullable) = matcher_parts(pattern);
        let mut matcher = StreamingMatcher::new(&nfa, track, nullable);
        for chunk in chunks {
            matcher.feed(chunk.as_bytes());
        }
        matcher.finalize();
        matcher
            .matches()
            .iter()
            .map(|m| (m.range.start, m.range.end))
            .collect()
    }

    #[test]
    fn match_within_one_chunk() {
        assert_eq!(stream_ranges("world", &["hello world"]), vec![(6, 11)]);
    }

    #[test]
    fn match_across_chunks() {
        let (nfa, ..) = matcher_parts("hello");
        let mut matcher = StreamingMatcher::new(&nfa, false, false);
        matcher.feed(b"hel");
        matcher.feed(b"lo wor");
        matcher.feed(b"ld");
        matcher.finalize();
        let matches = matcher.matches();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].range, 0..5);
        assert_eq!(matches[0].start_chunk, 0);
        assert_eq!(matches[0].end_chunk, 1);
        assert!(matches[0].crosses_boundary);

        let text = matcher.slice_of(&matches[0], &[b"hel", b"lo wor", b"ld"]);
        assert_eq!(text, b"hello");
    }

    #[test]
    fn mid_buffer_match_start_is_exact() {
        // The match begins well inside the second chunk.
        assert_eq!(
            stream_ranges("needle", &["hayhayhay", "hayneedlehay"]),
            vec![(12, 18)]
        );
    }

    #[test]
    fn multiple_matches_in_order() {
        assert_eq!(
            stream_ranges("ll", &["hello a", "ll y'a", "ll"]),
            vec![(2, 4), (7, 9), (13, 15)]
        );
    }

    #[test]
    fn anchors_in_streaming() {
        // ^ fires only at absolute position 0.
        assert_eq!(stream_ranges("^ab", &["a", "b"]), vec![(0, 2)]);
        assert_eq!(stream_ranges("^b", &["a", "b"]), Vec::<(usize, usize)>::new());
        // $ is only applied at finalize.
        assert_eq!(stream_ranges("ab$", &["xa", "b"]), vec![(1, 3)]);
        assert_eq!(
            stream_ranges("ab$", &["ab", "c"]),
            Vec::<(usize, usize)>::new()
        );
        assert_eq!(stream_ranges("^ab$", &["a", "b"]), vec![(0, 2)]);
    }

    #[test]
    fn empty_stream() {
        assert_eq!(stream_ranges("a*", &[]), vec![(0, 0)]);
        assert_eq!(stream_ranges("a", &[]), Vec::<(usize, usize)>::new());
    }

    #[test]
    fn zero_width_matches_between_tokens() {
        // a* over "baab" must report the same empty matches batch does.
        assert_eq!(
            stream_ranges("a*", &["ba", "ab"]),
            vec![(0, 0), (1, 3), (3, 3), (4, 4)]
        );
    }

    #[test]
    fn utf8_split_across_chunks() {
        let bytes = "héllo".as_bytes();
        let (nfa, ..) = matcher_parts("héllo");
        let mut matcher = StreamingMatcher::new(&nfa, false, false);
        // Split in the middle of the two-byte é.
        matcher.feed(&bytes[..2]);
        matcher.feed(&bytes[2..]);
        matcher.finalize();
        assert_eq!(matcher.matches().len(), 1);
        assert_eq!(matcher.matches()[0].range, 0..6);
    }

    #[test]
    fn streaming_matches_batch_for_chunkings() {
        let pattern = "a+b";
        let input = "aabxabaaab";
        let expected = vec![(0, 3), (4, 6), (6, 10)];
        for split in 0..=input.len() {
            let (left, right) = input.split_at(split);
            assert_eq!(
                stream_ranges(pattern, &[left, right]),
                expected,
                "split at {}",
                split
            );
        }
    }

    #[test]
    fn captures_across_chunks() {
        let (nfa, track, nullable) = matcher_parts("(a+)(b+)");
        assert!(track);
        let mut matcher = StreamingMatcher::new(&nfa, track, nullable);
        matcher.feed(b"xaa");
        matcher.feed(b"bby");
        matcher.finalize();
        let matches = matcher.matches();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].range, 1..5);
        assert_eq!(matches[0].captures[0], Some(1..3));
        assert_eq!(matches[0].captures[1], Some(3..5));
    }

    #[test]
    fn reset_restores_position_zero() {
        let (nfa, ..) = matcher_parts("^a");
        let mut matcher = StreamingMatcher::new(&nfa, false, false);
        matcher.feed(b"xa");
        matcher.finalize();
        assert!(matcher.matches().is_empty());
        matcher.reset();
        matcher.feed(b"ab");
        matcher.finalize();
        assert_eq!(matcher.matches().len(), 1);
        assert_eq!(matcher.matches()[0].range, 0..1);
    }

    #[test]
    fn word_boundary_at_chunk_edge() {
        // The boundary between 'd' and ' ' falls exactly on the chunk seam.
        assert_eq!(
            stream_ranges(r"\bword\b", &["a word", " here"]),
            vec![(2, 6)]
        );
    }
}
