//! Parser from pattern text to the AST.

use crate::api::Flags;
use crate::ast::{Ast, Node};
use crate::classes::PredefinedClass;
use crate::codepointset::{CodePointSet, Interval};
use crate::error::{Diagnostic, Error, ParseErrorKind};
use crate::folds;
use crate::types::{ClassContents, GroupId, MAX_GROUPS};
use crate::unicode::PropertyClass;
use crate::utf8;

/// How many pattern bytes around the error offset go into the diagnostic.
const CONTEXT_WINDOW: usize = 8;

/// An element parsed inside a bracket expression.
enum ClassAtom {
    CodePoint(u32),
    Predefined { class: PredefinedClass, positive: bool },
}

/// A parsed quantifier prefix, before greediness is applied.
#[derive(Debug, Copy, Clone)]
struct Quant {
    min: u32,
    max: Option<u32>,
    greedy: bool,
}

/// Represents the state used to parse a pattern.
struct Parser<'p> {
    /// The pattern bytes.
    pattern: &'p [u8],

    /// Current byte offset.
    pos: usize,

    /// Current line, advanced on '\n'.
    line: u32,

    /// Current column in bytes, reset on '\n'.
    column: u32,

    /// Number of capturing groups allocated so far.
    group_count: GroupId,

    /// Flags used.
    flags: Flags,
}

impl<'p> Parser<'p> {
    fn peek(&self) -> Option<u8> {
        self.pattern.get(self.pos).copied()
    }

    /// Consume one byte, returning it.
    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    /// If the next byte is \p b, consume it and return true.
    fn try_consume(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Snapshot the cursor so a speculative parse can be undone.
    fn save(&self) -> (usize, u32, u32) {
        (self.pos, self.line, self.column)
    }

    fn restore(&mut self, saved: (usize, u32, u32)) {
        self.pos = saved.0;
        self.line = saved.1;
        self.column = saved.2;
    }

    fn diagnostic(&self, kind: ParseErrorKind, message: impl ToString) -> Diagnostic {
        let lo = self.pos.saturating_sub(CONTEXT_WINDOW);
        let hi = (self.pos + CONTEXT_WINDOW).min(self.pattern.len());
        Diagnostic {
            kind,
            offset: self.pos,
            line: self.line,
            column: self.column,
            message: message.to_string(),
            context: String::from_utf8_lossy(&self.pattern[lo..hi]).into_owned(),
        }
    }

    fn error<T>(&self, kind: ParseErrorKind, message: impl ToString) -> Result<T, Error> {
        Err(Error::InvalidPattern(self.diagnostic(kind, message)))
    }

    fn try_parse(&mut self) -> Result<Ast, Error> {
        let root = self.parse_alternation()?;
        // If anything is left over it can only be an excess closing paren.
        match self.peek() {
            None => Ok(Ast {
                root,
                group_count: self.group_count,
            }),
            Some(b')') => self.error(
                ParseErrorKind::UnbalancedParentheses,
                "unmatched closing parenthesis",
            ),
            Some(b) => self.error(
                ParseErrorKind::UnexpectedCharacter,
                format!("unexpected '{}'", b as char),
            ),
        }
    }

    /// alt := concat ('|' concat)*
    fn parse_alternation(&mut self) -> Result<Node, Error> {
        let mut node = self.parse_concat()?;
        while self.try_consume(b'|') {
            let rhs = self.parse_concat()?;
            node = Node::Alt(Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    /// concat := atom*, left-folded.
    fn parse_concat(&mut self) -> Result<Node, Error> {
        let mut node: Option<Node> = None;
        loop {
            match self.peek() {
                None | Some(b')') | Some(b'|') => break,
                _ => {}
            }
            let atom = self.parse_atom()?;
            node = Some(match node {
                None => atom,
                Some(prev) => Node::Cat(Box::new(prev), Box::new(atom)),
            });
        }
        Ok(node.unwrap_or(Node::Empty))
    }

    /// atom := primary quantifier?
    fn parse_atom(&mut self) -> Result<Node, Error> {
        let primary = self.parse_primary()?;
        if let Some(quant) = self.try_parse_quantifier()? {
            if let Some(max) = quant.max {
                if quant.min > max {
                    return self.error(
                        ParseErrorKind::InvalidQuantifier,
                        format!("quantifier minimum {} exceeds maximum {}", quant.min, max),
                    );
                }
            }
            return Ok(Node::Loop {
                node: Box::new(primary),
                min: quant.min,
                max: quant.max,
                greedy: quant.greedy,
            });
        }
        Ok(primary)
    }

    fn parse_primary(&mut self) -> Result<Node, Error> {
        let b = match self.peek() {
            Some(b) => b,
            None => return Ok(Node::Empty),
        };
        match b {
            b'.' => {
                self.bump();
                if self.flags.dot_all {
                    Ok(Node::Class(ClassContents::anything()))
                } else {
                    Ok(Node::AnyChar)
                }
            }
            b'^' => {
                self.bump();
                Ok(Node::AnchorStart)
            }
            b'$' => {
                self.bump();
                Ok(Node::AnchorEnd)
            }
            b'(' => self.parse_group(),
            b'[' => self.parse_class(),
            b']' => self.error(
                ParseErrorKind::InvalidCharacterClass,
                "unmatched closing bracket",
            ),
            b'\\' => {
                self.bump();
                self.parse_escape()
            }
            b'*' | b'+' | b'?' => {
                self.error(ParseErrorKind::InvalidQuantifier, "nothing to repeat")
            }
            b'{' => {
                // A '{' opening a well-formed quantifier here has nothing to
                // repeat; otherwise it is a literal brace.
                let saved = self.save();
                let is_quantifier = self.try_parse_quantifier()?.is_some();
                self.restore(saved);
                if is_quantifier {
                    self.error(ParseErrorKind::InvalidQuantifier, "nothing to repeat")
                } else {
                    self.bump();
                    Ok(self.literal_node(b'{' as u32))
                }
            }
            _ => {
                let cp = self.consume_codepoint()?;
                Ok(self.literal_node(cp))
            }
        }
    }

    /// Consume one code point of pattern text.
    fn consume_codepoint(&mut self) -> Result<u32, Error> {
        let b = self.peek().expect("should have a byte");
        if b < 0x80 {
            self.bump();
            return Ok(b as u32);
        }
        match utf8::decode(self.pattern, self.pos) {
            Some((cp, width)) => {
                for _ in 0..width {
                    self.bump();
                }
                Ok(cp)
            }
            None => self.error(
                ParseErrorKind::UnexpectedCharacter,
                "pattern is not valid UTF-8",
            ),
        }
    }

    /// Build a node matching the single code point \p cp, widened with its
    /// case variants under the case-insensitive flag.
    fn literal_node(&self, cp: u32) -> Node {
        if self.flags.case_insensitive {
            let mut cps = CodePointSet::new();
            cps.add_one(cp);
            let widened = folds::fold_code_points(cps);
            let single =
                widened.intervals().len() == 1 && widened.intervals()[0].count_codepoints() == 1;
            if !single {
                return Node::Class(ClassContents::new(false, widened));
            }
        }
        if cp <= 0x7F {
            Node::Literal(cp as u8)
        } else {
            // Non-ASCII literals become single code point classes so that
            // matching decodes them as one unit.
            let mut cps = CodePointSet::new();
            cps.add_one(cp);
            Node::Class(ClassContents::new(false, cps))
        }
    }

    /// group := '?:' alt | alt, after the opening paren.
    fn parse_group(&mut self) -> Result<Node, Error> {
        self.bump(); // '('
        let node = if self.try_consume(b'?') {
            if self.try_consume(b':') {
                Node::NonCaptureGroup(Box::new(self.parse_alternation()?))
            } else {
                return match self.peek() {
                    Some(b'=') | Some(b'!') | Some(b'<') => self.error(
                        ParseErrorKind::UnexpectedCharacter,
                        "lookaround assertions are not supported",
                    ),
                    _ => self.error(
                        ParseErrorKind::UnexpectedCharacter,
                        "unrecognized group syntax after '(?'",
                    ),
                };
            }
        } else {
            if self.group_count as usize >= MAX_GROUPS {
                return self.error(
                    ParseErrorKind::UnexpectedCharacter,
                    "capture group limit exceeded",
                );
            }
            // Ids follow left-paren order, so allocate before the contents.
            self.group_count += 1;
            let id = self.group_count;
            let contents = self.parse_alternation()?;
            Node::CaptureGroup(Box::new(contents), id)
        };
        if !self.try_consume(b')') {
            return self.error(
                ParseErrorKind::UnbalancedParentheses,
                "missing closing parenthesis",
            );
        }
        Ok(node)
    }

    /// quantifier := ('*' | '+' | '?' | '{' n (',' m?)? '}') '?'?
    fn try_parse_quantifier(&mut self) -> Result<Option<Quant>, Error> {
        let mut quant = match self.try_parse_quantifier_prefix()? {
            Some(q) => q,
            None => return Ok(None),
        };
        quant.greedy = !self.try_consume(b'?');
        Ok(Some(quant))
    }

    fn try_parse_quantifier_prefix(&mut self) -> Result<Option<Quant>, Error> {
        let quant = |min, max| Quant {
            min,
            max,
            greedy: true,
        };
        match self.peek() {
            Some(b'*') => {
                self.bump();
                Ok(Some(quant(0, None)))
            }
            Some(b'+') => {
                self.bump();
                Ok(Some(quant(1, None)))
            }
            Some(b'?') => {
                self.bump();
                Ok(Some(quant(0, Some(1))))
            }
            Some(b'{') => {
                let saved = self.save();
                self.bump();
                let min = match self.try_consume_decimal() {
                    Some(v) => v,
                    None => {
                        // Not a quantifier after all, e.g. "a{x".
                        self.restore(saved);
                        return Ok(None);
                    }
                };
                let max = if self.try_consume(b',') {
                    self.try_consume_decimal()
                } else {
                    Some(min)
                };
                if !self.try_consume(b'}') {
                    return self.error(
                        ParseErrorKind::InvalidQuantifier,
                        "unterminated counted repetition",
                    );
                }
                Ok(Some(quant(min, max)))
            }
            _ => Ok(None),
        }
    }

    /// Consume a decimal integer, saturating on overflow.
    fn try_consume_decimal(&mut self) -> Option<u32> {
        let mut result: u32 = 0;
        let mut any = false;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                self.bump();
                any = true;
                result = result.saturating_mul(10);
                result = result.saturating_add((b - b'0') as u32);
            } else {
                break;
            }
        }
        any.then_some(result)
    }

    /// esc := 'n'|'t'|'r' | 'd'|'D'|'w'|'W'|'s'|'S' | 'b'|'B'
    ///      | 'p{' name '}' | 'P{' name '}' | any other byte, literally.
    fn parse_escape(&mut self) -> Result<Node, Error> {
        let b = match self.peek() {
            Some(b) => b,
            None => {
                return self.error(ParseErrorKind::InvalidEscape, "incomplete escape");
            }
        };
        match b {
            b'n' => {
                self.bump();
                Ok(Node::Literal(b'\n'))
            }
            b't' => {
                self.bump();
                Ok(Node::Literal(b'\t'))
            }
            b'r' => {
                self.bump();
                Ok(Node::Literal(b'\r'))
            }
            b'd' | b'D' | b'w' | b'W' | b's' | b'S' => {
                self.bump();
                let class = match b.to_ascii_lowercase() {
                    b'd' => PredefinedClass::Digits,
                    b'w' => PredefinedClass::Words,
                    _ => PredefinedClass::Spaces,
                };
                let positive = b.is_ascii_lowercase();
                Ok(Node::Class(ClassContents::new(
                    false,
                    class.codepoints(positive),
                )))
            }
            b'b' | b'B' => {
                self.bump();
                Ok(Node::WordBoundary { invert: b == b'B' })
            }
            b'p' | b'P' => {
                self.bump();
                self.parse_property_escape(b == b'p')
            }
            b'1'..=b'9' => {
                self.error(ParseErrorKind::InvalidEscape, "backreferences are not supported")
            }
            _ => {
                let cp = self.consume_codepoint()?;
                Ok(self.literal_node(cp))
            }
        }
    }

    /// The NAME of `\p{NAME}`, resolved against the closed enumeration.
    fn parse_property_escape(&mut self, positive: bool) -> Result<Node, Error> {
        if !self.flags.unicode {
            return Err(Error::UnsupportedFeature(
                "property escapes require unicode support".to_string(),
            ));
        }
        if !self.try_consume(b'{') {
            return self.error(
                ParseErrorKind::InvalidEscape,
                "expected '{' after property escape",
            );
        }
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'}' {
                break;
            }
            self.bump();
        }
        if self.peek() != Some(b'}') {
            return self.error(ParseErrorKind::InvalidEscape, "unterminated property name");
        }
        let name = String::from_utf8_lossy(&self.pattern[start..self.pos]).into_owned();
        self.bump(); // '}'
        match PropertyClass::from_name(&name) {
            Some(property) => Ok(Node::Class(ClassContents::new(
                false,
                property.codepoints(positive),
            ))),
            None => self.error(
                ParseErrorKind::InvalidEscape,
                format!("unknown property name '{}'", name),
            ),
        }
    }

    /// class := '^'? classItem+, after the opening bracket.
    fn parse_class(&mut self) -> Result<Node, Error> {
        self.bump(); // '['
        let negated = self.try_consume(b'^');
        let mut cps = CodePointSet::new();
        loop {
            match self.peek() {
                None => {
                    return self.error(
                        ParseErrorKind::InvalidCharacterClass,
                        "unterminated character class",
                    );
                }
                Some(b']') => {
                    self.bump();
                    if self.flags.case_insensitive {
                        cps = folds::fold_code_points(cps);
                    }
                    return Ok(Node::Class(ClassContents::new(negated, cps)));
                }
                _ => {}
            }

            let first = match self.parse_class_atom()? {
                Some(atom) => atom,
                None => continue,
            };

            // Check for a dash; we may have a range.
            if !self.try_consume(b'-') {
                add_class_atom(&mut cps, first);
                continue;
            }

            // A dash adjacent to the closing bracket is a literal.
            if self.peek() == Some(b']') {
                add_class_atom(&mut cps, first);
                cps.add_one(b'-' as u32);
                continue;
            }

            let second = match self.parse_class_atom()? {
                Some(atom) => atom,
                None => {
                    add_class_atom(&mut cps, first);
                    cps.add_one(b'-' as u32);
                    continue;
                }
            };

            // Ranges must have code point endpoints, in order.
            match (first, second) {
                (ClassAtom::CodePoint(c1), ClassAtom::CodePoint(c2)) if c1 <= c2 => {
                    cps.add(Interval {
                        first: c1,
                        last: c2,
                    });
                }
                (ClassAtom::CodePoint(..), ClassAtom::CodePoint(..)) => {
                    return self.error(
                        ParseErrorKind::InvalidCharacterClass,
                        "character range is out of order",
                    );
                }
                _ => {
                    return self.error(
                        ParseErrorKind::InvalidCharacterClass,
                        "a predefined class cannot bound a range",
                    );
                }
            }
        }
    }

    fn parse_class_atom(&mut self) -> Result<Option<ClassAtom>, Error> {
        let b = match self.peek() {
            Some(b']') | None => return Ok(None),
            Some(b) => b,
        };
        if b != b'\\' {
            let cp = self.consume_codepoint()?;
            return Ok(Some(ClassAtom::CodePoint(cp)));
        }
        self.bump(); // '\\'
        let e = match self.peek() {
            Some(e) => e,
            None => {
                return self.error(ParseErrorKind::InvalidEscape, "incomplete escape");
            }
        };
        match e {
            b'd' | b'D' | b'w' | b'W' | b's' | b'S' => {
                self.bump();
                let class = match e.to_ascii_lowercase() {
                    b'd' => PredefinedClass::Digits,
                    b'w' => PredefinedClass::Words,
                    _ => PredefinedClass::Spaces,
                };
                Ok(Some(ClassAtom::Predefined {
                    class,
                    positive: e.is_ascii_lowercase(),
                }))
            }
            b'n' => {
                self.bump();
                Ok(Some(ClassAtom::CodePoint(b'\n' as u32)))
            }
            b't' => {
                self.bump();
                Ok(Some(ClassAtom::CodePoint(b'\t' as u32)))
            }
            b'r' => {
                self.bump();
                Ok(Some(ClassAtom::CodePoint(b'\r' as u32)))
            }
            b'p' | b'P' => self.error(
                ParseErrorKind::InvalidEscape,
                "property escapes are not supported inside character classes",
            ),
            _ => {
                let cp = self.consume_codepoint()?;
                Ok(Some(ClassAtom::CodePoint(cp)))
            }
        }
    }
}

fn add_class_atom(cps: &mut CodePointSet, atom: ClassAtom) {
    match atom {
        ClassAtom::CodePoint(cp) => cps.add_one(cp),
        ClassAtom::Predefined { class, positive } => {
            cps.add_set(class.codepoints(positive));
        }
    }
}

/// Try parsing a given pattern.
/// \return the AST, or an error with a diagnostic.
pub fn try_parse(pattern: &str, flags: Flags) -> Result<Ast, Error> {
    let mut parser = Parser {
        pattern: pattern.as_bytes(),
        pos: 0,
        line: 1,
        column: 1,
        group_count: 0,
        flags,
    };
    parser.try_parse()
}
