//! Value and token type definitions.
//!
//! Every value the lexer produces is a [`ScalarValue`], classified once at lex
//! time. Specifications declare the [`ValueKind`] they accept, and the
//! validator compares the two tags directly.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use num_bigint::BigInt;
use serde::{Serialize, Serializer};

use crate::spec::SpecificationError;

/// Date literal format accepted by the lexer and by [`ValueKind::parse_literal`].
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Tag for the kinds of value a specification can accept.
///
/// # Examples
///
/// ```
/// use argspec_core::ValueKind;
///
/// assert_eq!("int".parse::<ValueKind>().unwrap(), ValueKind::Integer);
/// assert_eq!("string".parse::<ValueKind>().unwrap(), ValueKind::Text);
/// assert!("float".parse::<ValueKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Arbitrary-precision integer.
    Integer,
    /// Arbitrary-precision decimal with a non-zero scale.
    Decimal,
    /// Quoted string.
    Text,
    /// Calendar date (`YYYY-MM-DD`).
    Date,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Text => "text",
            Self::Date => "date",
        }
    }

    /// Converts raw configuration text into a value of this kind.
    ///
    /// Unlike the lexer, text is taken verbatim (no quotes or escapes), which
    /// makes this the coercion used for range bounds declared in scenario
    /// files.
    ///
    /// # Examples
    ///
    /// ```
    /// use argspec_core::{ScalarValue, ValueKind};
    ///
    /// let v = ValueKind::Integer.parse_literal("42").unwrap();
    /// assert_eq!(v, ScalarValue::integer(42));
    /// assert!(ValueKind::Date.parse_literal("2024-13-01").is_err());
    /// ```
    pub fn parse_literal(self, text: &str) -> Result<ScalarValue, SpecificationError> {
        let invalid = || SpecificationError::InvalidLiteral {
            kind: self,
            text: text.to_string(),
        };
        let trimmed = text.trim();
        match self {
            Self::Integer => BigInt::from_str(trimmed)
                .map(ScalarValue::Integer)
                .map_err(|_| invalid()),
            Self::Decimal => BigDecimal::from_str(trimmed)
                .map(ScalarValue::Decimal)
                .map_err(|_| invalid()),
            Self::Text => Ok(ScalarValue::Text(text.to_string())),
            Self::Date => NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                .map(ScalarValue::Date)
                .map_err(|_| invalid()),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = SpecificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" => Ok(Self::Integer),
            "decimal" => Ok(Self::Decimal),
            "text" | "string" => Ok(Self::Text),
            "date" => Ok(Self::Date),
            _ => Err(SpecificationError::UnsupportedValueType(s.to_string())),
        }
    }
}

/// A single lexed value.
///
/// `Display` renders the value back in input syntax, so lexing the rendered
/// text yields an equal value.
///
/// # Examples
///
/// ```
/// use argspec_core::{ScalarValue, ValueKind};
///
/// let v = ScalarValue::text("say \"hi\"");
/// assert_eq!(v.kind(), ValueKind::Text);
/// assert_eq!(v.to_string(), r#""say \"hi\"""#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarValue {
    Integer(BigInt),
    Decimal(BigDecimal),
    Text(String),
    Date(NaiveDate),
}

impl ScalarValue {
    pub fn integer(value: i64) -> Self {
        Self::Integer(BigInt::from(value))
    }

    pub fn text(value: &str) -> Self {
        Self::Text(value.to_string())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Integer(_) => ValueKind::Integer,
            Self::Decimal(_) => ValueKind::Decimal,
            Self::Text(_) => ValueKind::Text,
            Self::Date(_) => ValueKind::Date,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Orders two values when they are comparable.
    ///
    /// Integers and decimals compare numerically with each other; any other
    /// mix of kinds is unordered.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Decimal(a), Self::Decimal(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Decimal(b)) => Some(BigDecimal::new(a.clone(), 0).cmp(b)),
            (Self::Decimal(a), Self::Integer(b)) => Some(a.cmp(&BigDecimal::new(b.clone(), 0))),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Decimal(v) => f.write_str(&v.to_plain_string()),
            Self::Date(v) => write!(f, "{}", v.format(DATE_FORMAT)),
            Self::Text(v) => {
                f.write_str("\"")?;
                for ch in v.chars() {
                    match ch {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\t' => f.write_str("\\t")?,
                        '\n' => f.write_str("\\n")?,
                        other => write!(f, "{other}")?,
                    }
                }
                f.write_str("\"")
            }
        }
    }
}

impl Serialize for ScalarValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Integer(v) => match i64::try_from(v) {
                Ok(small) => serializer.serialize_i64(small),
                Err(_) => serializer.serialize_str(&v.to_string()),
            },
            Self::Decimal(v) => serializer.serialize_str(&v.to_plain_string()),
            Self::Text(v) => serializer.serialize_str(v),
            Self::Date(v) => serializer.serialize_str(&v.format(DATE_FORMAT).to_string()),
        }
    }
}

/// Lexical class of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Unnamed value or bracketed list.
    Positional,
    /// `--name=value`, `-n=value` or `name=value`.
    Named,
    /// `--name` or `-n` without a value.
    Flag,
}

/// A classified unit of the input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Name as written, including any dash prefix. Empty for positionals.
    pub name: String,
    pub values: Vec<ScalarValue>,
}

impl Token {
    pub fn positional(values: Vec<ScalarValue>) -> Self {
        Self {
            kind: TokenKind::Positional,
            name: String::new(),
            values,
        }
    }

    pub fn named(name: &str, values: Vec<ScalarValue>) -> Self {
        Self {
            kind: TokenKind::Named,
            name: name.to_string(),
            values,
        }
    }

    pub fn flag(name: &str) -> Self {
        Self {
            kind: TokenKind::Flag,
            name: name.to_string(),
            values: Vec::new(),
        }
    }

    /// Whether the token was written without a dash prefix (`name=value`).
    pub fn is_bare(&self) -> bool {
        self.kind != TokenKind::Positional && !self.name.starts_with('-')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kind_parsing() {
        assert_eq!(ValueKind::from_str("Decimal").unwrap(), ValueKind::Decimal);
        assert_eq!(ValueKind::from_str("date").unwrap(), ValueKind::Date);
        assert_eq!(
            ValueKind::from_str("bool"),
            Err(SpecificationError::UnsupportedValueType("bool".to_string()))
        );
    }

    #[test]
    fn test_compare_mixes_integer_and_decimal() {
        let one = ScalarValue::integer(1);
        let half = ScalarValue::Decimal(BigDecimal::from_str("0.5").unwrap());
        assert_eq!(one.compare(&half), Some(Ordering::Greater));
        assert_eq!(half.compare(&one), Some(Ordering::Less));
        assert_eq!(one.compare(&ScalarValue::text("1")), None);
    }

    #[test]
    fn test_display_escapes_text() {
        let v = ScalarValue::text("a\tb\\c");
        assert_eq!(v.to_string(), "\"a\\tb\\\\c\"");
    }

    #[test]
    fn test_small_decimals_render_without_exponent() {
        let v = ScalarValue::Decimal(BigDecimal::from_str("0.0000001").unwrap());
        assert_eq!(v.to_string(), "0.0000001");
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"0.0000001\"");

        let v = ScalarValue::Decimal(BigDecimal::from_str("-0.00000005").unwrap());
        assert_eq!(v.to_string(), "-0.00000005");
    }

    #[test]
    fn test_parse_literal_keeps_text_verbatim() {
        let v = ValueKind::Text.parse_literal(" spaced ").unwrap();
        assert_eq!(v, ScalarValue::text(" spaced "));
    }

    #[test]
    fn test_parse_literal_rejects_bad_integer() {
        let err = ValueKind::Integer.parse_literal("1.5").unwrap_err();
        assert_eq!(
            err,
            SpecificationError::InvalidLiteral {
                kind: ValueKind::Integer,
                text: "1.5".to_string()
            }
        );
    }

    #[test]
    fn test_bare_token_detection() {
        assert!(Token::named("name", vec![]).is_bare());
        assert!(!Token::named("--name", vec![]).is_bare());
        assert!(!Token::positional(vec![]).is_bare());
    }
}
