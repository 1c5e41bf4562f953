#![cfg(feature = "streaming")]

use rescan::Regex;

/// Feed \p chunks to \p pattern and return the recorded match ranges.
fn stream_ranges(pattern: &str, chunks: &[&[u8]]) -> Vec<(usize, usize)> {
    let re = Regex::new(pattern).unwrap();
    let mut matcher = re.streaming().unwrap();
    for chunk in chunks {
        matcher.feed(chunk);
    }
    matcher.finalize();
    matcher
        .matches()
        .iter()
        .map(|m| (m.range.start, m.range.end))
        .collect()
}

/// Batch `find_all` ranges for comparison.
fn batch_ranges(pattern: &str, input: &str) -> Vec<(usize, usize)> {
    let re = Regex::new(pattern).unwrap();
    re.find_all(input)
        .into_iter()
        .map(|m| (m.range.start, m.range.end))
        .collect()
}

#[test]
fn cross_chunk_match() {
    let re = Regex::new("hello").unwrap();
    let mut matcher = re.streaming().unwrap();
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

    let chunks: &[&[u8]] = &[b"hel", b"lo wor", b"ld"];
    assert_eq!(matcher.slice_of(&matches[0], chunks), b"hello");
}

#[test]
fn within_chunk_match_is_not_flagged() {
    let re = Regex::new("world").unwrap();
    let mut matcher = re.streaming().unwrap();
    matcher.feed(b"hello ");
    matcher.feed(b"world!");
    matcher.finalize();

    let matches = matcher.matches();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].range, 6..11);
    assert_eq!(matches[0].start_chunk, 1);
    assert_eq!(matches[0].end_chunk, 1);
    assert!(!matches[0].crosses_boundary);
}

#[test]
fn equivalence_with_batch_over_chunkings() {
    // For any chunking of the input, the streaming matcher must report the
    // same matches with the same cumulative offsets as batch find_all.
    let cases = [
        ("a+b", "aabxabaaab"),
        ("ll", "hello all y'all"),
        ("^ab", "abcab"),
        ("ab$", "abcab"),
        ("a*", "baab"),
        (r"\bcat\b", "cat catalog a cat"),
        (r"\d{2}", "a12b345c"),
    ];
    for (pattern, input) in cases {
        let expected = batch_ranges(pattern, input);
        let bytes = input.as_bytes();
        for split in 0..=bytes.len() {
            let (left, right) = bytes.split_at(split);
            assert_eq!(
                stream_ranges(pattern, &[left, right]),
                expected,
                "pattern {} split at {}",
                pattern,
                split
            );
        }
        // A three-way chunking as well.
        let third = bytes.len() / 3;
        let chunks: &[&[u8]] = &[
            &bytes[..third],
            &bytes[third..2 * third],
            &bytes[2 * third..],
        ];
        assert_eq!(
            stream_ranges(pattern, chunks),
            expected,
            "pattern {} three-way",
            pattern
        );
    }
}

#[test]
fn anchors_across_feeds() {
    // AssertStart fires only at absolute position 0.
    assert_eq!(stream_ranges("^ab", &[b"a", b"b", b"ab"]), vec![(0, 2)]);
    // AssertEnd is evaluated only inside finalize, never at chunk ends.
    assert_eq!(stream_ranges("ab$", &[b"ab", b"ab"]), vec![(2, 4)]);
    assert_eq!(
        stream_ranges("^ab$", &[b"a", b"b"]),
        vec![(0, 2)]
    );
    assert_eq!(
        stream_ranges("^ab$", &[b"ab", b"x"]),
        Vec::<(usize, usize)>::new()
    );
}

#[test]
fn utf8_sequence_split_across_chunks() {
    let re = Regex::new(r"\p{L}+").unwrap();
    let bytes = "Hello世界".as_bytes();
    // Split inside the three-byte 世.
    let mut matcher = re.streaming().unwrap();
    matcher.feed(&bytes[..6]);
    matcher.feed(&bytes[6..]);
    matcher.finalize();
    let matches = matcher.matches();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].range, 0..bytes.len());
}

#[test]
fn captures_in_streaming_matches() {
    let re = Regex::new("(a+)(b+)").unwrap();
    let mut matcher = re.streaming().unwrap();
    matcher.feed(b"xa");
    matcher.feed(b"ab");
    matcher.feed(b"by");
    matcher.finalize();
    let matches = matcher.matches();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].range, 1..5);
    assert_eq!(matches[0].captures[0], Some(1..3));
    assert_eq!(matches[0].captures[1], Some(3..5));
}

#[test]
fn reset_returns_to_initial_state() {
    let re = Regex::new("^start").unwrap();
    let mut matcher = re.streaming().unwrap();
    matcher.feed(b"not the start");
    matcher.finalize();
    assert!(matcher.matches().is_empty());

    matcher.reset();
    matcher.feed(b"start again");
    matcher.finalize();
    assert_eq!(matcher.matches().len(), 1);
    assert_eq!(matcher.matches()[0].range, 0..5);
}

#[test]
fn many_chunks_many_matches() {
    let re = Regex::new(r"\d+").unwrap();
    let mut matcher = re.streaming().unwrap();
    // "id 123 and 4567 end", one byte at a time.
    for b in b"id 123 and 4567 end" {
        matcher.feed(core::slice::from_ref(b));
    }
    matcher.finalize();
    let ranges: Vec<_> = matcher
        .matches()
        .iter()
        .map(|m| (m.range.start, m.range.end))
        .collect();
    assert_eq!(ranges, vec![(3, 6), (11, 15)]);
    let crossing: Vec<bool> = matcher.matches().iter().map(|m| m.crosses_boundary).collect();
    assert_eq!(crossing, vec![true, true]);
}

#[test]
fn empty_feed_chunks_are_harmless() {
    let re = Regex::new("ab").unwrap();
    let mut matcher = re.streaming().unwrap();
    matcher.feed(b"");
    matcher.feed(b"a");
    matcher.feed(b"");
    matcher.feed(b"b");
    matcher.finalize();
    assert_eq!(matcher.matches().len(), 1);
    assert_eq!(matcher.matches()[0].range, 0..2);
}

#[test]
fn slice_of_reassembles_across_many_chunks() {
    let re = Regex::new("abcdef").unwrap();
    let chunks: &[&[u8]] = &[b"xxab", b"cd", b"efyy"];
    let mut matcher = re.streaming().unwrap();
    for chunk in chunks {
        matcher.feed(chunk);
    }
    matcher.finalize();
    let matches = matcher.matches();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].range, 2..8);
    assert_eq!(matches[0].start_chunk, 0);
    assert_eq!(matches[0].end_chunk, 2);
    assert_eq!(matcher.slice_of(&matches[0], chunks), b"abcdef");
}
