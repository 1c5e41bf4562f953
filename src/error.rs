//! Errors surfaced at the API boundary.

use core::fmt;

/// The category of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnexpectedCharacter,
    UnbalancedParentheses,
    InvalidQuantifier,
    InvalidCharacterClass,
    InvalidEscape,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            ParseErrorKind::UnexpectedCharacter => "unexpected character",
            ParseErrorKind::UnbalancedParentheses => "unbalanced parentheses",
            ParseErrorKind::InvalidQuantifier => "invalid quantifier",
            ParseErrorKind::InvalidCharacterClass => "invalid character class",
            ParseErrorKind::InvalidEscape => "invalid escape",
        };
        f.write_str(text)
    }
}

/// A parse diagnostic: what went wrong and where.
/// `line` advances on `\n`; `column` counts bytes from the line start.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: ParseErrorKind,
    pub offset: usize,
    pub line: u32,
    pub column: u32,
    pub message: String,
    /// A small window of the pattern around the offset.
    pub context: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} at offset {} (line {}, column {}): {}",
            self.kind, self.offset, self.line, self.column, self.message
        )?;
        if !self.context.is_empty() {
            write!(f, " near \"{}\"", self.context)?;
        }
        Ok(())
    }
}

/// The error kinds visible to callers.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The pattern failed to parse; carries the diagnostic.
    #[error("invalid pattern: {0}")]
    InvalidPattern(Diagnostic),

    /// The pattern parsed but could not be lowered or compiled.
    #[error("compilation failed: {0}")]
    CompilationFailed(String),

    /// Matching could not proceed.
    #[error("matching failed: {0}")]
    MatchingFailed(String),

    /// A configured resource limit was exhausted.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// The input to an operation was unusable.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The operation requires a feature disabled in this configuration.
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),
}

impl Error {
    /// The parse diagnostic, when this is an `InvalidPattern` error.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Error::InvalidPattern(d) => Some(d),
            _ => None,
        }
    }
}
