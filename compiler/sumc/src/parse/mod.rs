//! Reader for union declaration files.
//!
//! ```text
//! union Shape {
//!     Empty
//!     Byte(i8)
//!     Handle(ptr)          # pointer, alignment bits unused
//!     Flag(bool)           # byte, high 7 bits unused
//!     Pair(i8, i32)
//!     Blob(mem 64 align 8) # address-only footprint
//! }
//! ```
//!
//! Cases are separated by whitespace or commas. Scalars are `iN`
//! (`1..=128`), `bool` and `ptr`; `mem SIZE align ALIGN` declares an
//! associated value that only exists in memory. `#` starts a comment that
//! runs to the end of the line.

use sum_layout::{
    CaseDecl, CaseRepr, LayoutConfig, ScalarRepr, UnionDecl, MAX_SCALAR_BITS,
};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: unexpected character `{ch}`")]
    UnexpectedChar { line: u32, ch: char },

    #[error("line {line}: expected {expected}, found `{found}`")]
    Expected {
        line: u32,
        expected: &'static str,
        found: String,
    },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },

    #[error("line {line}: unknown scalar type `{name}`")]
    UnknownScalar { line: u32, name: String },

    #[error("line {line}: integer width {bits} is outside 1..=128")]
    BadWidth { line: u32, bits: u32 },

    #[error("line {line}: {reason}")]
    BadFootprint { line: u32, reason: &'static str },

    #[error("line {line}: case `{name}` carries {bits} bits; wider values must use `mem`")]
    CaseTooWide { line: u32, name: String, bits: u32 },

    #[error("line {line}: duplicate union `{name}`")]
    DuplicateUnion { line: u32, name: String },

    #[error("line {line}: duplicate case `{name}` in union `{union}`")]
    DuplicateCase {
        line: u32,
        union: String,
        name: String,
    },
}

/// Parse every `union` block in `source`.
///
/// `ptr` scalars take their width and alignment from `config`.
pub fn parse_unions(source: &str, config: &LayoutConfig) -> Result<Vec<UnionDecl>, ParseError> {
    let mut parser = Parser {
        tokens: tokenize(source)?,
        pos: 0,
        config,
    };
    let mut unions: Vec<UnionDecl> = Vec::new();
    while !parser.at_end() {
        parser.keyword("union")?;
        let name = parser.ident("union name")?;
        if unions.iter().any(|u| u.name == name.text) {
            return Err(ParseError::DuplicateUnion {
                line: name.line,
                name: name.text.to_owned(),
            });
        }
        let cases = parser.case_list(name.text)?;
        unions.push(UnionDecl::new(name.text, cases));
    }
    Ok(unions)
}

// ── Tokens ──────────────────────────────────────────────────────────

/// A word (`[A-Za-z0-9_]+`) or a single punctuation character.
#[derive(Clone, Copy, Debug)]
struct Token<'a> {
    text: &'a str,
    line: u32,
}

impl Token<'_> {
    fn is_word(self) -> bool {
        self.text.starts_with(is_word_char)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn tokenize(source: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let mut tokens = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = u32::try_from(index + 1).unwrap_or(u32::MAX);
        let text = raw.split('#').next().unwrap_or_default();
        let mut word_start = None;
        for (at, c) in text.char_indices() {
            if is_word_char(c) {
                word_start.get_or_insert(at);
                continue;
            }
            if let Some(start) = word_start.take() {
                tokens.push(Token {
                    text: &text[start..at],
                    line,
                });
            }
            match c {
                '{' | '}' | '(' | ')' | ',' => tokens.push(Token {
                    text: &text[at..at + 1],
                    line,
                }),
                c if c.is_whitespace() => {}
                ch => return Err(ParseError::UnexpectedChar { line, ch }),
            }
        }
        if let Some(start) = word_start {
            tokens.push(Token {
                text: &text[start..],
                line,
            });
        }
    }
    Ok(tokens)
}

// ── Parser ──────────────────────────────────────────────────────────

struct Parser<'a, 'c> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    config: &'c LayoutConfig,
}

impl<'a> Parser<'a, '_> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_is(&self, text: &str) -> bool {
        self.peek().is_some_and(|t| t.text == text)
    }

    fn advance(&mut self, expected: &'static str) -> Result<Token<'a>, ParseError> {
        let token = self.peek().ok_or(ParseError::UnexpectedEof { expected })?;
        self.pos += 1;
        Ok(token)
    }

    /// Consume exactly `text`.
    fn keyword(&mut self, text: &'static str) -> Result<Token<'a>, ParseError> {
        let token = self.advance(text)?;
        if token.text == text {
            Ok(token)
        } else {
            Err(ParseError::Expected {
                line: token.line,
                expected: text,
                found: token.text.to_owned(),
            })
        }
    }

    fn ident(&mut self, expected: &'static str) -> Result<Token<'a>, ParseError> {
        let token = self.advance(expected)?;
        if token.is_word() && !token.text.starts_with(|c: char| c.is_ascii_digit()) {
            Ok(token)
        } else {
            Err(ParseError::Expected {
                line: token.line,
                expected,
                found: token.text.to_owned(),
            })
        }
    }

    fn number(&mut self, expected: &'static str) -> Result<(u32, u32), ParseError> {
        let token = self.advance(expected)?;
        token
            .text
            .parse()
            .map(|n| (n, token.line))
            .map_err(|_| ParseError::Expected {
                line: token.line,
                expected,
                found: token.text.to_owned(),
            })
    }

    /// `{ Case Case(...) ... }`
    fn case_list(&mut self, union: &str) -> Result<Vec<CaseDecl>, ParseError> {
        self.keyword("{")?;
        let mut cases: Vec<CaseDecl> = Vec::new();
        loop {
            if self.peek_is("}") {
                self.pos += 1;
                return Ok(cases);
            }
            if self.peek_is(",") {
                self.pos += 1;
                continue;
            }
            let name = self.ident("case name or `}`")?;
            if cases.iter().any(|c| c.name == name.text) {
                return Err(ParseError::DuplicateCase {
                    line: name.line,
                    union: union.to_owned(),
                    name: name.text.to_owned(),
                });
            }
            let repr = if self.peek_is("(") {
                self.pos += 1;
                self.payload(name)?
            } else {
                CaseRepr::Empty
            };
            cases.push(CaseDecl::new(name.text, repr));
        }
    }

    /// The associated value after `(`, through the closing `)`.
    fn payload(&mut self, case: Token<'a>) -> Result<CaseRepr, ParseError> {
        if self.peek_is("mem") {
            self.pos += 1;
            return self.footprint();
        }
        let mut fields = vec![self.scalar()?];
        while self.peek_is(",") {
            self.pos += 1;
            fields.push(self.scalar()?);
        }
        self.keyword(")")?;
        let bits: u32 = fields.iter().map(|f| f.bits).sum();
        if bits > MAX_SCALAR_BITS {
            return Err(ParseError::CaseTooWide {
                line: case.line,
                name: case.text.to_owned(),
                bits,
            });
        }
        Ok(CaseRepr::scalars(fields))
    }

    /// `SIZE align ALIGN )`
    fn footprint(&mut self) -> Result<CaseRepr, ParseError> {
        let (size, line) = self.number("size in bytes")?;
        self.keyword("align")?;
        let (align, _) = self.number("alignment in bytes")?;
        self.keyword(")")?;
        if size == 0 {
            return Err(ParseError::BadFootprint {
                line,
                reason: "memory footprint must not be empty",
            });
        }
        if !align.is_power_of_two() {
            return Err(ParseError::BadFootprint {
                line,
                reason: "alignment must be a power of two",
            });
        }
        Ok(CaseRepr::AddressOnly { size, align })
    }

    fn scalar(&mut self) -> Result<ScalarRepr, ParseError> {
        let token = self.ident("scalar type")?;
        match token.text {
            "bool" => Ok(ScalarRepr::bool_byte()),
            "ptr" => Ok(self.config.pointer_scalar()),
            text => {
                let bits = text
                    .strip_prefix('i')
                    .and_then(|n| n.parse::<u32>().ok())
                    .ok_or_else(|| ParseError::UnknownScalar {
                        line: token.line,
                        name: text.to_owned(),
                    })?;
                if bits == 0 || bits > MAX_SCALAR_BITS {
                    return Err(ParseError::BadWidth {
                        line: token.line,
                        bits,
                    });
                }
                Ok(ScalarRepr::int(bits))
            }
        }
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
mod tests;
