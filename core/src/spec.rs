//! Argument specifications and their builder.
//!
//! A [`Specification`] describes one argument the parser expects: its
//! aliases, canonical `ref`, value kind, [`Arity`], required-ness, whether it
//! is positional, and an optional [`Range`]. Specifications can only be
//! created through [`SpecificationBuilder::build`], which rejects malformed
//! declarations before they reach a registry.
//!
//! # Examples
//!
//! ```
//! use argspec_core::{Arity, Specification, ValueKind};
//!
//! let spec = Specification::builder(ValueKind::Integer, "count", ["-c", "--count"])
//!     .nargs("+")
//!     .required(true)
//!     .help("How many times to repeat")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(spec.arity(), Arity::OneOrMore);
//! assert!(spec.matches("-c"));
//! assert_eq!(spec.display_name(), "--count");
//! ```

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::range::Range;
use crate::types::ValueKind;

static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("static regex must compile")
});

/// Errors raised while constructing a [`Specification`].
///
/// These indicate a programming mistake in the argument declarations and are
/// never caused by user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecificationError {
    /// The value type name is not one of the supported kinds.
    #[error("unsupported value type: {0}")]
    UnsupportedValueType(String),
    /// A ref or alias does not match `[A-Za-z_][A-Za-z0-9_-]*`.
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),
    /// Arity text is not `?`, `+`, `*`, or a non-negative integer.
    #[error("invalid arity: {0:?}")]
    InvalidArity(String),
    /// A named specification declares no aliases.
    #[error("named argument '{0}' must declare at least one name")]
    MissingNames(String),
    /// The same alias appears twice in one specification.
    #[error("duplicate alias: {0}")]
    DuplicateAlias(String),
    /// A range bound has a different kind than the specification.
    #[error("range bound of kind {found} does not match argument kind {expected}")]
    RangeTypeMismatch { expected: ValueKind, found: ValueKind },
    /// A range is empty or its bounds are inverted.
    #[error("invalid range: {0}")]
    InvalidRange(String),
    /// Literal text could not be converted to the requested kind.
    #[error("invalid {kind} literal: {text:?}")]
    InvalidLiteral { kind: ValueKind, text: String },
}

/// Accepted number of values for one argument.
///
/// # Examples
///
/// ```
/// use argspec_core::Arity;
///
/// let arity: Arity = "?".parse().unwrap();
/// assert!(arity.accepts(0) && arity.accepts(1) && !arity.accepts(2));
/// assert_eq!("3".parse::<Arity>().unwrap(), Arity::Exactly(3));
/// assert!("-1".parse::<Arity>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Exactly(usize),
    /// `?`
    ZeroOrOne,
    /// `+`
    OneOrMore,
    /// `*`
    ZeroOrMore,
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Self::Exactly(n) => count == n,
            Self::ZeroOrOne => count <= 1,
            Self::OneOrMore => count >= 1,
            Self::ZeroOrMore => true,
        }
    }
}

impl Default for Arity {
    fn default() -> Self {
        Self::Exactly(1)
    }
}

impl FromStr for Arity {
    type Err = SpecificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "?" => Ok(Self::ZeroOrOne),
            "+" => Ok(Self::OneOrMore),
            "*" => Ok(Self::ZeroOrMore),
            digits if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => digits
                .parse()
                .map(Self::Exactly)
                .map_err(|_| SpecificationError::InvalidArity(s.to_string())),
            _ => Err(SpecificationError::InvalidArity(s.to_string())),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(n) => write!(f, "{n}"),
            Self::ZeroOrOne => f.write_str("?"),
            Self::OneOrMore => f.write_str("+"),
            Self::ZeroOrMore => f.write_str("*"),
        }
    }
}

/// A validated declaration of one expected argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specification {
    names: Vec<String>,
    reference: String,
    kind: ValueKind,
    arity: Arity,
    required: bool,
    positional: bool,
    range: Option<Range>,
    help: Option<String>,
    help_name: Option<String>,
}

impl Specification {
    /// Starts a builder for an argument of `kind` stored under `reference`.
    pub fn builder<I, S>(kind: ValueKind, reference: &str, names: I) -> SpecificationBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SpecificationBuilder::new(kind, reference, names)
    }

    /// Aliases this argument answers to, in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Canonical key of the argument in bindings.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_positional(&self) -> bool {
        self.positional
    }

    pub fn range(&self) -> Option<&Range> {
        self.range.as_ref()
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Returns `true` if `alias` is one of this argument's names.
    pub fn matches(&self, alias: &str) -> bool {
        self.names.iter().any(|n| n == alias)
    }

    /// Name shown in usage text: the help name when set, otherwise the
    /// longest alias for named arguments and the ref for positionals.
    pub fn display_name(&self) -> &str {
        if let Some(help_name) = &self.help_name {
            return help_name;
        }
        if self.positional {
            return &self.reference;
        }
        self.names
            .iter()
            .max_by_key(|n| n.len())
            .map(String::as_str)
            .unwrap_or(&self.reference)
    }
}

/// Builder for [`Specification`]. Arity text is validated at
/// [`build`](Self::build) time.
#[derive(Debug, Clone)]
pub struct SpecificationBuilder {
    names: Vec<String>,
    reference: String,
    kind: ValueKind,
    nargs: Option<String>,
    arity: Arity,
    required: bool,
    positional: bool,
    range: Option<Range>,
    help: Option<String>,
    help_name: Option<String>,
}

impl SpecificationBuilder {
    pub fn new<I, S>(kind: ValueKind, reference: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            reference: reference.to_string(),
            kind,
            nargs: None,
            arity: Arity::default(),
            required: false,
            positional: false,
            range: None,
            help: None,
            help_name: None,
        }
    }

    /// Sets the arity from its textual form (`?`, `+`, `*`, or `N`).
    pub fn nargs(mut self, nargs: &str) -> Self {
        self.nargs = Some(nargs.to_string());
        self
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.nargs = None;
        self.arity = arity;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn positional(mut self, positional: bool) -> Self {
        self.positional = positional;
        self
    }

    pub fn range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    pub fn help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    pub fn help_name(mut self, help_name: &str) -> Self {
        self.help_name = Some(help_name.to_string());
        self
    }

    /// Validates the declaration and produces the specification.
    ///
    /// # Errors
    ///
    /// Returns a [`SpecificationError`] when the ref or an alias is not a
    /// valid identifier, the arity text is malformed, a named argument has
    /// no aliases, an alias repeats, or the range does not fit the kind.
    pub fn build(self) -> Result<Specification, SpecificationError> {
        if !IDENTIFIER_RE.is_match(&self.reference) {
            return Err(SpecificationError::InvalidIdentifier(self.reference));
        }

        let mut seen = HashSet::new();
        for name in &self.names {
            validate_alias(name)?;
            if !seen.insert(name.as_str()) {
                return Err(SpecificationError::DuplicateAlias(name.clone()));
            }
        }
        if !self.positional && self.names.is_empty() {
            return Err(SpecificationError::MissingNames(self.reference));
        }

        let arity = match &self.nargs {
            Some(text) => text.parse()?,
            None => self.arity,
        };

        if let Some(range) = &self.range {
            range.check(self.kind)?;
        }

        Ok(Specification {
            names: self.names,
            reference: self.reference,
            kind: self.kind,
            arity,
            required: self.required,
            positional: self.positional,
            range: self.range,
            help: self.help,
            help_name: self.help_name,
        })
    }
}

/// Aliases are `--long`, `-s` (one letter, optional trailing digits or
/// underscores) or a bare identifier, mirroring what the lexer can produce.
fn validate_alias(name: &str) -> Result<(), SpecificationError> {
    let invalid = || SpecificationError::InvalidIdentifier(name.to_string());

    if let Some(long) = name.strip_prefix("--") {
        if !long.starts_with(|c: char| c.is_ascii_alphabetic()) || !IDENTIFIER_RE.is_match(long) {
            return Err(invalid());
        }
    } else if let Some(short) = name.strip_prefix('-') {
        let letters = short.chars().filter(char::is_ascii_alphabetic).count();
        if !short.starts_with(|c: char| c.is_ascii_alphabetic())
            || letters != 1
            || short.contains('-')
            || !IDENTIFIER_RE.is_match(short)
        {
            return Err(invalid());
        }
    } else if !IDENTIFIER_RE.is_match(name) {
        return Err(invalid());
    }
    Ok(())
}
