//! The parser facade: declare arguments, parse lines, render help.

use std::fmt::Write as _;

use tracing::{debug, warn};

use crate::error::ArgParseError;
use crate::lexer::lex;
use crate::registry::Registry;
use crate::spec::Specification;
use crate::types::ScalarValue;
use crate::validate::{Bindings, Validator};

/// Parser for one program's argument lines.
///
/// # Examples
///
/// ```
/// use argspec_core::*;
///
/// let mut parser = ArgumentParser::new("greet", "Prints a greeting");
/// parser
///     .add_argument(
///         Specification::builder(ValueKind::Text, "name", ["-n", "--name"])
///             .required(true)
///             .build()
///             .unwrap(),
///     )
///     .unwrap();
///
/// let bindings = parser.parse("--name=\"Ada\"").unwrap();
/// assert_eq!(bindings.get("name"), Some(&[ScalarValue::text("Ada")][..]));
/// assert_eq!(parser.value("name"), Some(&[ScalarValue::text("Ada")][..]));
///
/// assert!(parser.parse("").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ArgumentParser {
    program: String,
    description: String,
    registry: Registry,
    last: Option<Bindings>,
}

impl ArgumentParser {
    pub fn new(program: &str, description: &str) -> Self {
        Self {
            program: program.to_string(),
            description: description.to_string(),
            registry: Registry::new(),
            last: None,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Declares an argument.
    ///
    /// # Errors
    ///
    /// [`ArgParseError::DuplicateName`] or [`ArgParseError::DuplicateRef`]
    /// when the new argument collides with one already declared.
    pub fn add_argument(&mut self, spec: Specification) -> Result<(), ArgParseError> {
        debug!(program = %self.program, argument = spec.reference(), "Adding argument");
        self.registry.insert(spec)
    }

    /// Looks up a declared argument by ref.
    pub fn get_argument(&self, reference: &str) -> Result<&Specification, ArgParseError> {
        self.registry
            .get(reference)
            .ok_or_else(|| ArgParseError::NotFound(reference.to_string()))
    }

    pub fn arguments(&self) -> impl Iterator<Item = &Specification> {
        self.registry.iter()
    }

    /// Parses `line` without touching the parser's state.
    pub fn try_parse(&self, line: &str) -> Result<Bindings, ArgParseError> {
        let tokens = lex(line)?;
        let result = Validator::new(&self.registry).validate(&tokens);
        if let Err(err) = &result {
            warn!(program = %self.program, code = err.code(), error = %err, "Parse failed");
        }
        result
    }

    /// Parses `line` and remembers the bindings for [`value`](Self::value).
    ///
    /// A failed parse clears the remembered bindings.
    pub fn parse(&mut self, line: &str) -> Result<&Bindings, ArgParseError> {
        self.last = None;
        let bindings = self.try_parse(line)?;
        Ok(self.last.insert(bindings))
    }

    /// Values bound to `reference` by the last successful [`parse`](Self::parse).
    pub fn value(&self, reference: &str) -> Option<&[ScalarValue]> {
        self.last.as_ref()?.get(reference)
    }

    /// Usage line followed by argument help.
    pub fn describe(&self) -> String {
        let mut usage = format!("usage: {}", self.program);
        let mut has_options = false;
        for spec in self.registry.iter().filter(|s| !s.is_positional()) {
            if spec.is_required() {
                let _ = write!(usage, " <{}>", spec.display_name());
            } else {
                has_options = true;
            }
        }
        if has_options {
            usage.push_str(" <options>");
        }
        for spec in self.registry.iter().filter(|s| s.is_positional()) {
            let _ = write!(usage, " [{}]", spec.display_name());
        }

        let mut out = usage;
        out.push('\n');
        if !self.description.is_empty() {
            out.push('\n');
            out.push_str(&self.description);
            out.push('\n');
        }

        let positionals: Vec<(String, &Specification)> = self
            .registry
            .iter()
            .filter(|s| s.is_positional())
            .map(|s| (s.display_name().to_string(), s))
            .collect();
        let options: Vec<(String, &Specification)> = self
            .registry
            .iter()
            .filter(|s| !s.is_positional())
            .map(|s| (s.names().join(", "), s))
            .collect();
        let width = positionals
            .iter()
            .chain(&options)
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or(0);

        write_section(&mut out, "positional arguments", &positionals, width);
        write_section(&mut out, "options", &options, width);
        out
    }
}

fn write_section(out: &mut String, title: &str, rows: &[(String, &Specification)], width: usize) {
    if rows.is_empty() {
        return;
    }
    let _ = write!(out, "\n{title}:\n");
    for (label, spec) in rows {
        let mut detail = format!("{} ({})", spec.kind(), spec.arity());
        if spec.is_required() {
            detail.push_str(", required");
        }
        if let Some(range) = spec.range() {
            let _ = write!(detail, ", range {range}");
        }
        match spec.help() {
            Some(help) => {
                let _ = writeln!(out, "  {label:<width$}  {help} [{detail}]");
            }
            None => {
                let _ = writeln!(out, "  {label:<width$}  [{detail}]");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::Range;
    use crate::types::ValueKind;

    fn calculator() -> ArgumentParser {
        let mut parser = ArgumentParser::new("sub", "Subtracts two numbers");
        parser
            .add_argument(
                Specification::builder(ValueKind::Decimal, "left", ["-l", "--left"])
                    .help("minuend")
                    .build()
                    .unwrap(),
            )
            .unwrap();
        parser
            .add_argument(
                Specification::builder(ValueKind::Decimal, "right", ["-r", "--right"])
                    .required(true)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        parser
            .add_argument(
                Specification::builder(ValueKind::Integer, "precision", Vec::<String>::new())
                    .positional(true)
                    .nargs("?")
                    .range(Range::continuous(
                        ScalarValue::integer(0),
                        ScalarValue::integer(10),
                    ))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        parser
    }

    #[test]
    fn test_add_argument_rejects_duplicates() {
        let mut parser = calculator();
        let err = parser
            .add_argument(
                Specification::builder(ValueKind::Text, "other", ["-l"])
                    .build()
                    .unwrap(),
            )
            .unwrap_err();
        assert_eq!(err, ArgParseError::DuplicateName("-l".into()));
        assert_eq!(parser.arguments().count(), 3);
    }

    #[test]
    fn test_get_argument() {
        let parser = calculator();
        assert_eq!(parser.get_argument("left").unwrap().reference(), "left");
        assert_eq!(
            parser.get_argument("middle").unwrap_err(),
            ArgParseError::NotFound("middle".into())
        );
    }

    #[test]
    fn test_parse_stores_last_bindings() {
        let mut parser = calculator();
        parser.parse("--right=2.5 3").unwrap();
        assert_eq!(parser.value("precision"), Some(&[ScalarValue::integer(3)][..]));

        assert!(parser.parse("--left=1.0").is_err());
        assert_eq!(parser.value("precision"), None);
    }

    #[test]
    fn test_try_parse_is_pure() {
        let parser = calculator();
        let first = parser.try_parse("-r=1.5").unwrap();
        let second = parser.try_parse("-r=1.5").unwrap();
        assert_eq!(first, second);
        assert_eq!(parser.value("right"), None);
    }

    #[test]
    fn test_lex_errors_propagate() {
        let parser = calculator();
        assert!(matches!(
            parser.try_parse("\"open"),
            Err(ArgParseError::Lex(_))
        ));
    }

    #[test]
    fn test_describe() {
        let text = calculator().describe();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("usage: sub <--right> <options> [precision]"));
        assert!(text.contains("Subtracts two numbers"));
        assert!(text.contains("positional arguments:\n  precision"));
        assert!(text.contains("-l, --left   minuend [decimal (1)]"));
        assert!(text.contains("[decimal (1), required]"));
        assert!(text.contains("range [0, 10]"));
    }
}
