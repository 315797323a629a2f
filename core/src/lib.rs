//! Typed command-line argument parsing.
//!
//! A line such as `--count=3 -v [1 2] "out.txt"` goes through two stages:
//!
//! - [`lex`] turns the text into [`Token`]s, classifying every value once as
//!   an integer, decimal, text or date [`ScalarValue`].
//! - [`validate`] matches the tokens against the [`Specification`]s held in a
//!   [`Registry`], checking kinds, [`Arity`], [`Range`]s and required
//!   arguments, and returns the resulting [`Bindings`].
//!
//! [`ArgumentParser`] wraps both stages behind `add_argument` / `parse` /
//! `describe`.
//!
//! # Example
//!
//! ```
//! use argspec_core::*;
//!
//! let mut parser = ArgumentParser::new("sqrt", "Square root of an integer");
//! parser
//!     .add_argument(
//!         Specification::builder(ValueKind::Integer, "number", Vec::<String>::new())
//!             .positional(true)
//!             .required(true)
//!             .range(Range::continuous(ScalarValue::integer(0), ScalarValue::integer(1_000_000)))
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! assert!(parser.parse("144").is_ok());
//! assert!(matches!(parser.parse("-4"), Err(ArgParseError::OutOfRange { .. })));
//! assert!(parser.describe().starts_with("usage: sqrt [number]"));
//! ```

mod cursor;
mod error;
mod lexer;
mod parser;
mod range;
mod registry;
mod spec;
mod types;
mod validate;

pub use cursor::{CharCursor, OutOfBounds};
pub use error::ArgParseError;
pub use lexer::{LexError, LexErrorKind, Lexer, lex};
pub use parser::ArgumentParser;
pub use range::Range;
pub use registry::Registry;
pub use spec::{Arity, Specification, SpecificationBuilder, SpecificationError};
pub use types::*;
pub use validate::{Bindings, Validator, check_arity, validate};
