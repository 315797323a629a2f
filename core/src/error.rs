//! Errors surfaced by parsing and registry operations.

use thiserror::Error;

use crate::lexer::LexError;
use crate::spec::Arity;
use crate::types::ValueKind;

/// Failure of a `parse`, `add_argument` or `get_argument` call.
///
/// The variant identifies the kind of failure; `Display` gives the message
/// shown to the user. No partial result ever accompanies an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgParseError {
    /// The input line could not be tokenized.
    #[error("parse error: {0}")]
    Lex(#[from] LexError),
    /// A named argument or flag matches no declared alias.
    #[error("no such argument {0}")]
    UnknownArgument(String),
    /// A positional value fits no remaining positional argument.
    #[error("unexpected positional value {0}")]
    UnknownPositional(String),
    /// The same argument was supplied twice.
    #[error("duplicate definition for {0}")]
    DuplicateArgument(String),
    /// A value has a different kind than the argument declares.
    #[error("argument '{argument}' expects {expected} values, got {found} value {value}")]
    TypeMismatch {
        argument: String,
        expected: ValueKind,
        found: ValueKind,
        value: String,
    },
    /// The number of values does not satisfy the argument's arity.
    #[error("argument '{argument}' takes {arity} value(s), got {count}")]
    ArityMismatch {
        argument: String,
        arity: Arity,
        count: usize,
    },
    /// A value falls outside the argument's range.
    #[error("value {value} for argument '{argument}' is not in range {range}")]
    OutOfRange {
        argument: String,
        value: String,
        range: String,
    },
    /// A required argument was not supplied.
    #[error("missing required argument '{0}'")]
    MissingRequiredArgument(String),
    /// An alias is already declared by another argument.
    #[error("name {0} is already declared")]
    DuplicateName(String),
    /// A ref is already declared by another argument.
    #[error("argument ref '{0}' is already declared")]
    DuplicateRef(String),
    /// No argument is declared under the requested ref.
    #[error("no argument declared with ref '{0}'")]
    NotFound(String),
}

impl ArgParseError {
    /// Stable machine-readable identifier for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Lex(_) => "lex_error",
            Self::UnknownArgument(_) => "unknown_argument",
            Self::UnknownPositional(_) => "unknown_positional",
            Self::DuplicateArgument(_) => "duplicate_argument",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::ArityMismatch { .. } => "arity_mismatch",
            Self::OutOfRange { .. } => "out_of_range",
            Self::MissingRequiredArgument(_) => "missing_required_argument",
            Self::DuplicateName(_) => "duplicate_name",
            Self::DuplicateRef(_) => "duplicate_ref",
            Self::NotFound(_) => "not_found",
        }
    }
}
