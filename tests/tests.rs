// Work around dead code warnings: rust-lang issue #46379
pub mod common;

use common::*;

fn test_literal_find_tc(tc: TestConfig) {
    let cr = tc.compile("hello");
    let m = cr.find("hello world").expect("Should have matched");
    assert_eq!(m.range(), 0..5);
    assert_eq!(m.slice("hello world"), "hello");
    cr.test_fails("help");
}

#[test]
fn test_literal_find() {
    test_with_configs(test_literal_find_tc)
}

fn test_digit_runs_tc(tc: TestConfig) {
    let cr = tc.compile(r"\d{3}-\d{2}-\d{4}");
    let m = cr.find("SSN: 123-45-6789").expect("Should have matched");
    assert_eq!(m.range(), 5..16);
    cr.test_fails("SSN: 123-456789");
}

#[test]
fn test_digit_runs() {
    test_with_configs(test_digit_runs_tc)
}

fn test_find_all_tc(tc: TestConfig) {
    let cr = tc.compile("ll");
    let starts: Vec<usize> = cr
        .match_all_ranges("hello all y'all")
        .into_iter()
        .map(|r| r.start)
        .collect();
    assert_eq!(starts, vec![2, 7, 13]);
}

#[test]
fn test_find_all() {
    test_with_configs(test_find_all_tc)
}

fn test_empty_input_tc(tc: TestConfig) {
    let cr = tc.compile("a*");
    cr.test_succeeds("");
    let m = cr.find("").expect("Should have matched");
    assert_eq!(m.range(), 0..0);
}

#[test]
fn test_empty_input() {
    test_with_configs(test_empty_input_tc)
}

fn test_anchors_tc(tc: TestConfig) {
    let cr = tc.compile("^hello$");
    cr.test_succeeds("hello");
    cr.test_fails("hello world");
    cr.test_fails("say hello");

    tc.test_match_succeeds("^hel", "hello");
    tc.test_match_fails("^ello", "hello");
    tc.test_match_succeeds("llo$", "hello");
    tc.test_match_fails("hell$", "hello");

    // ^X matches only at offset 0; X$ only where the match ends at the
    // input end.
    let cr = tc.compile("^a+");
    assert_eq!(cr.find("aaab").map(|m| m.range()), Some(0..3));
    let cr = tc.compile("a+$");
    assert_eq!(cr.find("baaa").map(|m| m.range()), Some(1..4));
}

#[test]
fn test_anchors() {
    test_with_configs(test_anchors_tc)
}

fn test_capture_groups_tc(tc: TestConfig) {
    let cr = tc.compile("(hello) (world)");
    let m = cr.find("say hello world!").expect("Should have matched");
    assert_eq!(m.range(), 4..15);
    assert_eq!(m.group(0), Some(4..15));
    assert_eq!(m.group(1), Some(4..9));
    assert_eq!(m.group(2), Some(10..15));

    cr.match1f("say hello world!").test_eq("hello world,hello,world");
}

#[test]
fn test_capture_groups() {
    test_with_configs(test_capture_groups_tc)
}

fn non_matching_captures_tc(tc: TestConfig) {
    let m = tc
        .compile("aa(b)?aa")
        .find("aaaa")
        .expect("Should have matched");
    assert_eq!(m.captures.len(), 1, "Capture list should have size 1");
    assert_eq!(m.captures[0], None, "Captured value should be missing");

    let m = tc
        .compile("(ab)|(cd)")
        .find("xxcd")
        .expect("Should have matched");
    assert_eq!(m.captures[0], None);
    assert_eq!(m.captures[1], Some(2..4));
}

#[test]
fn non_matching_captures() {
    test_with_configs(non_matching_captures_tc)
}

fn test_unicode_letters_tc(tc: TestConfig) {
    let input = "Hello世界";
    let cr = tc.compile(r"\p{L}+");
    let m = cr.find(input).expect("Should have matched");
    assert_eq!(m.slice(input), "Hello世界");

    // \P negates.
    let cr = tc.compile(r"\P{L}+");
    assert_eq!(cr.find("ab-+cd").map(|m| m.range()), Some(2..4));
}

#[test]
fn test_unicode_letters() {
    test_with_configs(test_unicode_letters_tc)
}

fn test_unicode_scripts_tc(tc: TestConfig) {
    tc.test_match_succeeds(r"\p{Script=Hiragana}", "ひらがな");
    tc.test_match_fails(r"\p{Script=Hiragana}", "katakana カ");
    tc.test_match_succeeds(r"\p{Script=Greek}+", "αβγ");
    tc.test_match_succeeds(r"\p{Han}+", "世界");
    tc.test_match_succeeds(r"\p{ASCII_Hex_Digit}+", "deadbeef");
    tc.test_match_fails(r"\p{ASCII_Hex_Digit}", "xyz");
}

#[test]
fn test_unicode_scripts() {
    test_with_configs(test_unicode_scripts_tc)
}

fn test_dot_and_newline_tc(tc: TestConfig) {
    let cr = tc.compile("a.c");
    cr.test_succeeds("abc");
    cr.test_succeeds("a.c");
    cr.test_fails("a\nc");
    // The dot consumes whole code points.
    cr.test_succeeds("aéc");
}

#[test]
fn test_dot_and_newline() {
    test_with_configs(test_dot_and_newline_tc)
}

fn test_character_classes_tc(tc: TestConfig) {
    let cr = tc.compile("[a-c]+");
    cr.match1f("xxabcax").test_eq("abca");
    tc.test_match_fails("[a-c]", "xyz");

    let cr = tc.compile("[^a-c]+");
    cr.match1f("abxyca").test_eq("xy");

    // A negated class still refuses what it excludes, and accepts
    // non-ASCII.
    tc.test_match_succeeds("[^a-c]", "é");

    tc.test_match_succeeds(r"[\d]+", "42");
    tc.test_match_succeeds("[-a]", "-");
    tc.test_match_succeeds("[a-]", "-");

    let cr = tc.compile(r"[\w]+");
    cr.match1f("some_word!").test_eq("some_word");
}

#[test]
fn test_character_classes() {
    test_with_configs(test_character_classes_tc)
}

fn test_predefined_classes_tc(tc: TestConfig) {
    tc.compile(r"\d+").match1f("abc123def").test_eq("123");
    tc.compile(r"\D+").match1f("123abc456").test_eq("abc");
    tc.compile(r"\w+").match1f("  word_1  ").test_eq("word_1");
    tc.compile(r"\W+").match1f("ab - cd").test_eq(" - ");
    tc.compile(r"\s+").match1f("a \t\r\nb").test_eq(" \t\r\n");
    tc.compile(r"\S+").match1f("  stuff  ").test_eq("stuff");
}

#[test]
fn test_predefined_classes() {
    test_with_configs(test_predefined_classes_tc)
}

fn test_quantifiers_tc(tc: TestConfig) {
    tc.compile("a+").match_all("a bb aa").test_eq(vec!["a", "aa"]);
    tc.compile("a+").match1f("baaa").test_eq("aaa");
    tc.compile("ba*").match1f("bbaa").test_eq("b");
    tc.compile("ab?").match1f("abx").test_eq("ab");
    tc.compile("a{3}").match1f("aaaa").test_eq("aaa");
    tc.compile("a{2,}").match1f("aaaa").test_eq("aaaa");
    tc.compile("a{1,2}").match1f("aaa").test_eq("aa");
    tc.test_match_fails("a{3}", "aa");

    // Non-greedy quantifiers carry through the parse; under
    // leftmost-longest simulation they report the same extents.
    tc.compile("a+?").match1f("aaa").test_eq("aaa");

    // Quantified groups.
    tc.compile("(?:ab)+").match1f("xababy").test_eq("abab");
    tc.compile("(ab){2}").match1f("abab").test_eq("abab,ab");
}

#[test]
fn test_quantifiers() {
    test_with_configs(test_quantifiers_tc)
}

fn test_alternation_tc(tc: TestConfig) {
    let cr = tc.compile("cat|dog");
    cr.match1f("hotdog").test_eq("dog");
    cr.match1f("catfish").test_eq("cat");
    cr.test_fails("cow");

    // Leftmost-longest: the longer branch wins at the same start.
    tc.compile("a|ab").match1f("ab").test_eq("ab");
    tc.compile("ab|a").match1f("ab").test_eq("ab");

    // Alternation binds loosest.
    tc.compile("^ab|cd$").test_succeeds("abx");
    tc.compile("^ab|cd$").test_succeeds("xcd");
}

#[test]
fn test_alternation() {
    test_with_configs(test_alternation_tc)
}

fn test_word_boundaries_tc(tc: TestConfig) {
    let cr = tc.compile(r"\bword\b");
    cr.test_succeeds("a word here");
    cr.test_succeeds("word");
    cr.test_fails("wordy");
    cr.test_fails("sword");

    tc.compile(r"\Bord\b").match1f("sword").test_eq("ord");
    tc.test_match_fails(r"\Bword", "a word");
}

#[test]
fn test_word_boundaries() {
    test_with_configs(test_word_boundaries_tc)
}

fn test_escapes_tc(tc: TestConfig) {
    tc.compile(r"\n").match1f("a\nb").test_eq("\n");
    tc.compile(r"\t").match1f("a\tb").test_eq("\t");
    tc.compile(r"\.").match1f("a.b").test_eq(".");
    tc.compile(r"\(\)").match1f("()").test_eq("()");
    tc.compile(r"\\").match1f(r"a\b").test_eq(r"\");
    tc.compile(r"a\+").match1f("a+").test_eq("a+");
}

#[test]
fn test_escapes() {
    test_with_configs(test_escapes_tc)
}

fn test_zero_length_matches_tc(tc: TestConfig) {
    let cr = tc.compile("a*");
    let ranges = cr.match_all_ranges("ab");
    assert_eq!(ranges, vec![0..1, 1..1, 2..2]);

    // Forward progress past zero-width matches.
    let cr = tc.compile("b*");
    assert_eq!(cr.match_all("aa").len(), 3);
}

#[test]
fn test_zero_length_matches() {
    test_with_configs(test_zero_length_matches_tc)
}

fn test_find_all_invariants_tc(tc: TestConfig) {
    for (pattern, input) in [
        ("a+", "aabaaabba"),
        ("a*", "abab"),
        (r"\d+", "12x34 5"),
        ("x?", "axa"),
    ] {
        let ranges = tc.compile(pattern).match_all_ranges(input);
        for pair in ranges.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            assert!(next.start >= prev.end, "{} on {:?} overlaps", pattern, input);
            assert!(next.start > prev.start, "{} on {:?} stalls", pattern, input);
        }
    }
}

#[test]
fn test_find_all_invariants() {
    test_with_configs(test_find_all_invariants_tc)
}

fn test_match_offset_invariants_tc(tc: TestConfig) {
    for (pattern, input) in [
        ("(a+)(b*)", "xaabb"),
        ("a(b(c))", "abc"),
        ("(x)|(y)", "zy"),
    ] {
        if let Some(m) = tc.compile(pattern).find(input) {
            assert!(m.range().start <= m.range().end);
            assert!(m.range().end <= input.len());
            for group in m.captures.iter().flatten() {
                assert!(m.range().start <= group.start);
                assert!(group.end <= m.range().end);
            }
        }
    }
}

#[test]
fn test_match_offset_invariants() {
    test_with_configs(test_match_offset_invariants_tc)
}

fn test_is_match_agrees_with_find_tc(tc: TestConfig) {
    for pattern in ["a+b", "^x", "x$", r"\bcat\b", "(a)(b)?", "z*"] {
        let cr = tc.compile(pattern);
        for input in ["", "ab", "xab", "cat", "a cat naps", "zzz", "aaab"] {
            assert_eq!(
                cr.find(input).is_some(),
                cr.regex().is_match(input),
                "pattern {} input {:?}",
                pattern,
                input
            );
        }
    }
}

#[test]
fn test_is_match_agrees_with_find() {
    test_with_configs(test_is_match_agrees_with_find_tc)
}

fn test_idempotence_tc(tc: TestConfig) {
    let cr = tc.compile("(a+)(b+)");
    let first = cr.find("xxaabbyy");
    let second = cr.find("xxaabbyy");
    assert_eq!(first, second);
}

#[test]
fn test_idempotence() {
    test_with_configs(test_idempotence_tc)
}

fn test_nested_groups_tc(tc: TestConfig) {
    let cr = tc.compile("(a(b)c)d");
    let m = cr.find("zabcd").expect("Should have matched");
    assert_eq!(m.group(1), Some(1..4));
    assert_eq!(m.group(2), Some(2..3));

    // Ids follow left-paren order.
    let cr = tc.compile("((x)(y))");
    let m = cr.find("xy").expect("Should have matched");
    assert_eq!(m.group(1), Some(0..2));
    assert_eq!(m.group(2), Some(0..1));
    assert_eq!(m.group(3), Some(1..2));
}

#[test]
fn test_nested_groups() {
    test_with_configs(test_nested_groups_tc)
}

fn test_groups_in_loops_tc(tc: TestConfig) {
    // Group slots reflect the last pass over the group.
    let cr = tc.compile("(?:(a|b))+");
    let m = cr.find("ab").expect("Should have matched");
    assert_eq!(m.range(), 0..2);
    assert_eq!(m.group(1), Some(1..2));
}

#[test]
fn test_groups_in_loops() {
    test_with_configs(test_groups_in_loops_tc)
}

#[test]
fn test_case_insensitive_flag() {
    use rescan::{compile_with, Features, Flags};
    let flags = Flags {
        case_insensitive: true,
        ..Flags::default()
    };
    let re = compile_with("hello", flags, Features::default()).unwrap();
    assert!(re.is_match("HELLO"));
    assert!(re.is_match("HeLLo"));
    assert!(!re.is_match("help"));

    let re = compile_with("[a-c]+", flags, Features::default()).unwrap();
    assert_eq!(re.find("xBCa").map(|m| m.range()), Some(1..4));

    // Latin-1 uppercase folds too.
    let re = compile_with("à", flags, Features::default()).unwrap();
    assert!(re.is_match("À"));
}

#[test]
fn test_dot_all_flag() {
    use rescan::{compile_with, Features, Flags};
    let flags = Flags {
        dot_all: true,
        ..Flags::default()
    };
    let re = compile_with("a.c", flags, Features::default()).unwrap();
    assert!(re.is_match("a\nc"));
}
