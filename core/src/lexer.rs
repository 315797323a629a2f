//! Tokenizer for argument lines.
//!
//! The lexer walks a [`CharCursor`] once, left to right, and classifies each
//! whitespace-separated unit into a [`Token`]:
//!
//! - numbers (`1`, `-2.5`), dates (`2024-01-01`), quoted strings (`"a b"`) and
//!   bracketed lists (`[1 2 3]`) become positional tokens;
//! - `--name`, `-n` become flags;
//! - `--name=value`, `-n=value` and bare `name=value` become named tokens.
//!
//! Numbers are parsed once as arbitrary-precision decimals and narrowed to
//! integers when their scale is not positive, so `1` is an integer while `1.0`
//! stays a decimal.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, trace};

use crate::cursor::{CharCursor, OutOfBounds};
use crate::types::{DATE_FORMAT, ScalarValue, Token};

/// What went wrong while lexing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("missing closing quotation mark")]
    UnterminatedString,
    #[error("missing closing bracket")]
    UnterminatedList,
    #[error("invalid escape sequence \\{0}")]
    InvalidEscape(char),
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
    #[error("invalid date {0:?}")]
    InvalidDate(String),
    #[error("required whitespace between arguments")]
    MissingSeparator,
    #[error("not a valid positional value, named argument, or flag")]
    InvalidToken,
    #[error("short flag {0:?} must be a single letter")]
    MalformedFlag(String),
    #[error("unexpected end of input")]
    UnexpectedEnd,
}

/// Lexing failure with the character position where it was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at position {position}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: usize,
}

impl From<OutOfBounds> for LexError {
    fn from(err: OutOfBounds) -> Self {
        Self {
            kind: LexErrorKind::UnexpectedEnd,
            position: err.position,
        }
    }
}

/// Tokenizes one argument line.
///
/// # Examples
///
/// ```
/// use argspec_core::{ScalarValue, Token, lex};
///
/// let tokens = lex(r#"--count=[1 2] "file.txt" -v"#).unwrap();
/// assert_eq!(
///     tokens,
///     vec![
///         Token::named("--count", vec![ScalarValue::integer(1), ScalarValue::integer(2)]),
///         Token::positional(vec![ScalarValue::text("file.txt")]),
///         Token::flag("-v"),
///     ]
/// );
/// ```
pub fn lex(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).lex()
}

pub struct Lexer {
    cursor: CharCursor,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            cursor: CharCursor::new(input),
        }
    }

    pub fn lex(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            if self.cursor.is_at_end() {
                break;
            }

            let token = self.lex_token()?;
            trace!(kind = ?token.kind, name = %token.name, values = token.values.len(), "Lexed token");
            tokens.push(token);

            if !self.cursor.is_at_end() && !self.cursor.check(0, char::is_whitespace) {
                return Err(self.error(LexErrorKind::MissingSeparator));
            }
        }

        debug!(tokens = tokens.len(), "Lexed argument line");
        Ok(tokens)
    }

    fn lex_token(&mut self) -> Result<Token, LexError> {
        if self.starts_value() {
            return Ok(Token::positional(self.lex_value()?));
        }

        let c = &self.cursor;
        let short = c.check(0, |ch| ch == '-') && c.check(1, |ch| ch.is_ascii_alphabetic());
        let long = c.check(0, |ch| ch == '-')
            && c.check(1, |ch| ch == '-')
            && c.check(2, |ch| ch.is_ascii_alphabetic());
        if long {
            return self.lex_long();
        }
        if short {
            return self.lex_short();
        }
        if self.starts_bare_named() {
            return self.lex_bare_named();
        }

        Err(self.error(LexErrorKind::InvalidToken))
    }

    /// digit, `.`, `"`, `[`, or `-` followed by a digit or `.`.
    fn starts_value(&self) -> bool {
        let c = &self.cursor;
        c.check(0, |ch| ch.is_ascii_digit() || matches!(ch, '.' | '"' | '['))
            || (c.check(0, |ch| ch == '-') && c.check(1, |ch| ch.is_ascii_digit() || ch == '.'))
    }

    /// An identifier immediately followed by `=`, scanning no further than
    /// the first character that cannot belong to a name.
    fn starts_bare_named(&self) -> bool {
        if !self
            .cursor
            .check(0, |ch| ch.is_ascii_alphabetic() || ch == '_')
        {
            return false;
        }
        let mut offset = 1;
        while self.cursor.check(offset, is_name_char) {
            offset += 1;
        }
        self.cursor.check(offset, |ch| ch == '=')
    }

    fn lex_long(&mut self) -> Result<Token, LexError> {
        self.cursor.advance(2);
        let name = format!("--{}", self.take_while(is_name_char));
        self.finish_named(name)
    }

    fn lex_short(&mut self) -> Result<Token, LexError> {
        let start = self.cursor.position();
        self.cursor.advance(1);
        let body = self.take_while(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        if body.chars().filter(char::is_ascii_alphabetic).count() > 1 {
            return Err(LexError {
                kind: LexErrorKind::MalformedFlag(format!("-{body}")),
                position: start,
            });
        }
        self.finish_named(format!("-{body}"))
    }

    fn lex_bare_named(&mut self) -> Result<Token, LexError> {
        let name = self.take_while(is_name_char);
        self.finish_named(name)
    }

    /// After a name: `=value` makes a named token, anything else a flag.
    fn finish_named(&mut self, name: String) -> Result<Token, LexError> {
        if !self.cursor.eat('=') {
            return Ok(Token::flag(&name));
        }
        if self.cursor.is_at_end() || self.cursor.check(0, char::is_whitespace) {
            return Err(self.error(LexErrorKind::InvalidToken));
        }
        let values = self.lex_value()?;
        Ok(Token::named(&name, values))
    }

    /// A scalar or a bracketed list of scalars.
    fn lex_value(&mut self) -> Result<Vec<ScalarValue>, LexError> {
        if self.cursor.check(0, |ch| ch == '[') {
            self.lex_list()
        } else {
            Ok(vec![self.lex_scalar()?])
        }
    }

    fn lex_list(&mut self) -> Result<Vec<ScalarValue>, LexError> {
        let start = self.cursor.position();
        self.cursor.advance(1);
        let mut values = Vec::new();

        loop {
            self.skip_whitespace();
            if self.cursor.is_at_end() {
                return Err(LexError {
                    kind: LexErrorKind::UnterminatedList,
                    position: start,
                });
            }
            if self.cursor.eat(']') {
                return Ok(values);
            }

            values.push(self.lex_scalar()?);

            if self.cursor.is_at_end() {
                return Err(LexError {
                    kind: LexErrorKind::UnterminatedList,
                    position: start,
                });
            }
            if !self.cursor.check(0, |ch| ch.is_whitespace() || ch == ']') {
                return Err(self.error(LexErrorKind::MissingSeparator));
            }
        }
    }

    fn lex_scalar(&mut self) -> Result<ScalarValue, LexError> {
        let ch = self.cursor.peek(0)?;
        match ch {
            '"' => self.lex_string(),
            '-' | '.' | '0'..='9' => self.lex_number(),
            _ => Err(self.error(LexErrorKind::InvalidToken)),
        }
    }

    fn lex_string(&mut self) -> Result<ScalarValue, LexError> {
        let start = self.cursor.position();
        let unterminated = LexError {
            kind: LexErrorKind::UnterminatedString,
            position: start,
        };
        self.cursor.advance(1);
        let mut out = String::new();

        loop {
            let Ok(ch) = self.cursor.peek(0) else {
                return Err(unterminated);
            };
            match ch {
                '\\' => {
                    let Ok(next) = self.cursor.peek(1) else {
                        return Err(unterminated);
                    };
                    match next {
                        '\\' | '"' => out.push(next),
                        't' => out.push('\t'),
                        'n' => out.push('\n'),
                        other => return Err(self.error(LexErrorKind::InvalidEscape(other))),
                    }
                    self.cursor.advance(2);
                }
                '"' if self.cursor.check(1, |c| c == '"') => {
                    out.push('"');
                    self.cursor.advance(2);
                }
                '"' => {
                    self.cursor.advance(1);
                    return Ok(ScalarValue::Text(out));
                }
                other => {
                    out.push(other);
                    self.cursor.advance(1);
                }
            }
        }
    }

    fn lex_number(&mut self) -> Result<ScalarValue, LexError> {
        if self.at_date_literal() {
            return self.lex_date();
        }

        let start = self.cursor.position();
        let negative = self.cursor.eat('-');
        let body = self.take_while(|ch| ch.is_ascii_digit() || ch == '.');
        let text = if negative { format!("-{body}") } else { body.clone() };
        let invalid = || LexError {
            kind: LexErrorKind::InvalidNumber(text.clone()),
            position: start,
        };

        let dots = body.chars().filter(|&c| c == '.').count();
        if dots > 1 || !body.chars().any(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        // `.5` and `5.` are accepted; normalize them for the decimal parser.
        let mut normalized = String::with_capacity(body.len() + 2);
        if negative {
            normalized.push('-');
        }
        if body.starts_with('.') {
            normalized.push('0');
        }
        normalized.push_str(body.strip_suffix('.').unwrap_or(&body));

        let decimal = BigDecimal::from_str(&normalized).map_err(|_| invalid())?;
        Ok(narrow(decimal))
    }

    /// `YYYY-MM-DD` not followed by another digit or dot.
    fn at_date_literal(&self) -> bool {
        let digit = |offset| self.cursor.check(offset, |ch: char| ch.is_ascii_digit());
        let dash = |offset| self.cursor.check(offset, |ch: char| ch == '-');
        (0..4).all(digit)
            && dash(4)
            && (5..7).all(digit)
            && dash(7)
            && (8..10).all(digit)
            && !self.cursor.check(10, |ch| ch.is_ascii_digit() || ch == '.')
    }

    fn lex_date(&mut self) -> Result<ScalarValue, LexError> {
        let start = self.cursor.position();
        let mut text = String::with_capacity(10);
        for offset in 0..10 {
            text.push(self.cursor.peek(offset)?);
        }
        self.cursor.advance(10);
        NaiveDate::parse_from_str(&text, DATE_FORMAT)
            .map(ScalarValue::Date)
            .map_err(|_| LexError {
                kind: LexErrorKind::InvalidDate(text),
                position: start,
            })
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Ok(ch) = self.cursor.peek(0) {
            if !pred(ch) {
                break;
            }
            out.push(ch);
            self.cursor.advance(1);
        }
        out
    }

    fn skip_whitespace(&mut self) {
        while self.cursor.check(0, char::is_whitespace) {
            self.cursor.advance(1);
        }
    }

    fn error(&self, kind: LexErrorKind) -> LexError {
        LexError {
            kind,
            position: self.cursor.position(),
        }
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

/// Integral decimals (scale ≤ 0) become integers.
fn narrow(decimal: BigDecimal) -> ScalarValue {
    let (_, scale) = decimal.as_bigint_and_exponent();
    if scale <= 0 {
        let (digits, _) = decimal.with_scale(0).as_bigint_and_exponent();
        ScalarValue::Integer(digits)
    } else {
        ScalarValue::Decimal(decimal)
    }
}
