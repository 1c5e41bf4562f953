//! Execution engine bits shared by the backends.

use crate::api::Match;

/// A trait for finding the next match in an input.
/// Implemented by both the NFA simulator and the bytecode VM front ends.
pub trait MatchProducer {
    /// Attempt to find a match at or after \p pos.
    /// \return the Match and store the position to resume the search at in
    /// \p next_start, or None on exhaustion.
    fn next_match(&mut self, pos: usize, next_start: &mut Option<usize>) -> Option<Match>;
}

/// An iterator over non-overlapping matches, left to right.
/// After a match the search resumes at `max(end, start + 1)`, so zero-width
/// matches cannot stall it.
#[derive(Debug)]
pub struct Matches<Producer: MatchProducer> {
    producer: Producer,
    offset: Option<usize>,
}

impl<Producer: MatchProducer> Matches<Producer> {
    pub fn new(producer: Producer, start: usize) -> Self {
        Matches {
            producer,
            offset: Some(start),
        }
    }
}

impl<Producer: MatchProducer> Iterator for Matches<Producer> {
    type Item = Match;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.offset?;
        self.producer.next_match(start, &mut self.offset)
    }
}
