use rescan::{compile_with, Features, Flags, Match, Regex};

/// Our backend types.
#[derive(Debug, Copy, Clone)]
pub enum Backend {
    /// The set-based NFA simulator.
    NfaSim,

    /// The bytecode thread VM. Patterns it is not eligible for (anchors,
    /// capture-returning calls) silently run on the simulator, matching
    /// production selection.
    Bytecode,
}

/// Description of how to test a regex.
#[derive(Debug, Copy, Clone)]
pub struct TestConfig {
    backend: Backend,
}

impl TestConfig {
    fn features(&self) -> Features {
        match self.backend {
            Backend::NfaSim => Features {
                force_nfa: true,
                ..Features::default()
            },
            Backend::Bytecode => Features {
                prefer_jit: true,
                ..Features::default()
            },
        }
    }

    /// Compile a pattern to a regex, with default flags.
    #[track_caller]
    pub fn compile(&self, pattern: &str) -> TestCompiledRegex {
        let re = compile_with(pattern, Flags::default(), self.features());
        assert!(
            re.is_ok(),
            "Failed to parse! pattern: {}, error: {}",
            pattern,
            re.unwrap_err()
        );
        TestCompiledRegex { re: re.unwrap() }
    }

    /// Test that \p pattern successfully parses and matches \p input.
    #[track_caller]
    pub fn test_match_succeeds(&self, pattern: &str, input: &str) {
        self.compile(pattern).test_succeeds(input)
    }

    /// Test that \p pattern successfully parses and does not match
    /// \p input.
    #[track_caller]
    pub fn test_match_fails(&self, pattern: &str, input: &str) {
        self.compile(pattern).test_fails(input)
    }
}

/// Format a Match by inserting commas between all capture groups.
fn format_match(r: &Match, input: &str) -> String {
    let mut result = input[r.range()].to_string();
    for cg in r.captures.iter() {
        result.push(',');
        if let Some(cg) = cg {
            result.push_str(&input[cg.clone()])
        }
    }
    result
}

/// A compiled regex under one test config.
#[derive(Debug)]
pub struct TestCompiledRegex {
    re: Regex,
}

impl TestCompiledRegex {
    pub fn regex(&self) -> &Regex {
        &self.re
    }

    /// Search for self in \p input, returning the first Match, or None.
    pub fn find(&self, input: &str) -> Option<Match> {
        self.re.find(input)
    }

    /// Match against a string, returning the first formatted match.
    #[track_caller]
    pub fn match1f(&self, input: &str) -> String {
        match self.find(input) {
            Some(m) => format_match(&m, input),
            None => panic!("Failed to match {}", input),
        }
    }

    /// Return a list of all non-overlapping matched strings.
    pub fn match_all<'b>(&self, input: &'b str) -> Vec<&'b str> {
        self.re
            .find_iter(input)
            .map(|m| &input[m.range()])
            .collect()
    }

    /// Return a list of all non-overlapping total match ranges.
    pub fn match_all_ranges(&self, input: &str) -> Vec<rescan::Range> {
        self.re.find_iter(input).map(|m| m.range()).collect()
    }

    /// Test that matching against \p input succeeds.
    #[track_caller]
    pub fn test_succeeds(&self, input: &str) {
        assert!(
            self.re.is_match(input),
            "Should have matched: {}",
            input
        )
    }

    /// Test that matching against \p input fails.
    #[track_caller]
    pub fn test_fails(&self, input: &str) {
        assert!(!self.re.is_match(input), "Should not have matched: {}", input)
    }
}

pub trait StringTestHelpers {
    /// "Fluent" style helper for testing that a String is equal to a str.
    fn test_eq(&self, s: &str);
}

impl StringTestHelpers for String {
    #[track_caller]
    fn test_eq(&self, rhs: &str) {
        assert_eq!(self.as_str(), rhs)
    }
}

pub trait VecTestHelpers {
    /// "Fluent" style helper for testing that two string vectors are equal.
    fn test_eq(&self, rhs: Vec<&str>);
}

impl VecTestHelpers for Vec<&str> {
    #[track_caller]
    fn test_eq(&self, rhs: Vec<&str>) {
        assert_eq!(*self, rhs)
    }
}

/// Invoke \p func with each test config, in turn.
pub fn test_with_configs<F>(func: F)
where
    F: Fn(TestConfig),
{
    func(TestConfig {
        backend: Backend::NfaSim,
    });
    func(TestConfig {
        backend: Backend::Bytecode,
    });
}
