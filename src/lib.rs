/*!

# rescan - streaming-capable regular expressions in Rust

This crate provides a small regular expression engine built around a
Thompson NFA. Patterns are parsed to an AST, lowered to a nondeterministic
finite automaton, and executed either by set-based simulation or by a
compiled bytecode program run on a thread VM. A streaming front end feeds
input in arbitrary chunks and reports matches with offsets in the
cumulative stream, including matches that span chunk boundaries.

# Example: test if a string contains a match

```rust
use rescan::Regex;
let re = Regex::new(r"\d{4}").unwrap();
assert!(re.is_match("in the year 2020"));
```

# Example: iterating over matches

```rust
use rescan::Regex;
let re = Regex::new("ll").unwrap();
let starts: Vec<usize> = re.find_iter("hello all y'all").map(|m| m.start()).collect();
assert_eq!(starts, vec![2, 7, 13]);
```

# Example: using capture groups

```rust
use rescan::Regex;
let re = Regex::new(r"(\d{4})-(\d{2})").unwrap();
let text = "dated 2023-11";
let m = re.find(text).unwrap();
assert_eq!(m.slice(text), "2023-11");
assert_eq!(&text[m.group(1).unwrap()], "2023");
assert_eq!(&text[m.group(2).unwrap()], "11");
```

# Example: streaming

```rust
use rescan::Regex;
let re = Regex::new("hello").unwrap();
let mut matcher = re.streaming().unwrap();
matcher.feed(b"hel");
matcher.feed(b"lo wor");
matcher.feed(b"ld");
matcher.finalize();
let m = &matcher.matches()[0];
assert_eq!(m.range, 0..5);
assert!(m.crosses_boundary);
```

# Supported syntax

Literals, `.`, `^`, `$`, alternation, capturing and `(?:...)` groups,
quantifiers (`*`, `+`, `?`, `{n}`, `{n,}`, `{n,m}`, with `?` for
non-greedy), character classes with ranges and negation, the predefined
classes `\d \D \w \W \s \S`, word boundaries `\b \B`, and a closed set of
Unicode properties via `\p{...}`/`\P{...}` (general categories, a handful
of scripts, and a few binary properties).

Backreferences, lookaround, named groups, and mode-flag syntax like
`(?i)` are not supported and are rejected at parse time.

# Matching semantics

Matching is leftmost-longest: the earliest-starting match wins, and among
matches at that start the longest is reported. Input is decoded as UTF-8
one code point at a time; bytes that do not decode are matched by nothing.
Group extents record the most recent pass over the group subexpression.

# Architecture

rescan has a parser, a Thompson lowering pass producing a flat state
vector, a set-based simulator used as the reference execution path, an
optional bytecode compiler plus thread VM selected for patterns without
boundary assertions, and a streaming driver that tracks per-attempt origin
offsets across chunks.

*/

#![warn(clippy::all)]

pub use crate::api::*;
pub use crate::error::{Diagnostic, Error, ParseErrorKind};

#[cfg(feature = "streaming")]
pub use crate::stream::{StreamMatch, StreamingMatcher};

mod api;
mod ast;
mod bytesearch;
mod classes;
mod codepointset;
mod error;
mod exec;
mod folds;
mod nfa;
mod parse;
mod startpredicate;
mod thompson;
mod types;
mod unicode;
mod unicodetables;
mod util;
mod utf8;

#[cfg(feature = "backend-bytecode")]
mod emit;
#[cfg(feature = "backend-bytecode")]
mod insn;
#[cfg(feature = "backend-bytecode")]
mod vm;

#[cfg(feature = "streaming")]
mod stream;
