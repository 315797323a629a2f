//! Matching of lexed tokens against a [`Registry`].
//!
//! Validation never mutates the registry. Each call builds a fresh
//! [`MatchState`] and, on success, returns the resulting [`Bindings`], so
//! validating the same tokens twice yields the same outcome.
//!
//! # Examples
//!
//! ```
//! use argspec_core::*;
//!
//! let mut registry = Registry::new();
//! registry
//!     .insert(
//!         Specification::builder(ValueKind::Integer, "count", ["-c", "--count"])
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let tokens = lex("--count=3").unwrap();
//! let bindings = validate(&tokens, &registry).unwrap();
//! assert_eq!(bindings.get("count"), Some(&[ScalarValue::integer(3)][..]));
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Serialize, Serializer};
use tracing::{debug, trace};

use crate::error::ArgParseError;
use crate::registry::Registry;
use crate::spec::{Arity, Specification};
use crate::types::{ScalarValue, Token, TokenKind};

/// Returns `true` when `count` values satisfy `arity`.
pub fn check_arity(count: usize, arity: Arity) -> bool {
    arity.accepts(count)
}

/// Values bound by a successful parse, keyed by specification ref.
///
/// Every declared ref has an entry. Arguments that were not supplied map to
/// an empty list; valueless flags that were supplied also map to an empty
/// list but report [`is_present`](Self::is_present).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: BTreeMap<String, Vec<ScalarValue>>,
    present: BTreeSet<String>,
}

impl Bindings {
    pub fn get(&self, reference: &str) -> Option<&[ScalarValue]> {
        self.values.get(reference).map(Vec::as_slice)
    }

    /// Whether the argument appeared on the input line.
    pub fn is_present(&self, reference: &str) -> bool {
        self.present.contains(reference)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ScalarValue])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Bindings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

/// Per-call scratch state: one slot per specification plus the refs
/// already consumed.
#[derive(Debug)]
struct MatchState<'a> {
    slots: Vec<Option<Vec<ScalarValue>>>,
    consumed: HashSet<&'a str>,
}

impl<'a> MatchState<'a> {
    fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len],
            consumed: HashSet::new(),
        }
    }

    fn is_consumed(&self, reference: &str) -> bool {
        self.consumed.contains(reference)
    }

    fn commit(&mut self, index: usize, spec: &'a Specification, values: Vec<ScalarValue>) {
        self.consumed.insert(spec.reference());
        self.slots[index] = Some(values);
    }
}

/// Matches tokens against the specifications of one registry.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    registry: &'a Registry,
}

impl<'a> Validator<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Binds every token to a specification and checks kinds, arity,
    /// ranges and required arguments.
    ///
    /// # Errors
    ///
    /// Returns the first failure encountered in token order, then
    /// [`ArgParseError::MissingRequiredArgument`] for the first required
    /// specification (in declaration order) that was never matched.
    pub fn validate(&self, tokens: &[Token]) -> Result<Bindings, ArgParseError> {
        let mut state = MatchState::new(self.registry.len());

        for token in tokens {
            match token.kind {
                TokenKind::Positional => self.match_positional(token, &mut state)?,
                TokenKind::Named | TokenKind::Flag => self.match_named(token, &mut state)?,
            }
        }

        if let Some(missing) = self
            .registry
            .iter()
            .find(|s| s.is_required() && !state.is_consumed(s.reference()))
        {
            return Err(ArgParseError::MissingRequiredArgument(
                missing.reference().to_string(),
            ));
        }

        let mut bindings = Bindings::default();
        for (spec, slot) in self.registry.iter().zip(state.slots) {
            if state.consumed.contains(spec.reference()) {
                bindings.present.insert(spec.reference().to_string());
            }
            bindings
                .values
                .insert(spec.reference().to_string(), slot.unwrap_or_default());
        }
        debug!(bound = bindings.present.len(), "Validated tokens");
        Ok(bindings)
    }

    fn match_named(&self, token: &Token, state: &mut MatchState<'a>) -> Result<(), ArgParseError> {
        let (index, spec) = self
            .registry
            .lookup(token)
            .ok_or_else(|| ArgParseError::UnknownArgument(token.name.clone()))?;
        if state.is_consumed(spec.reference()) {
            return Err(ArgParseError::DuplicateArgument(token.name.clone()));
        }

        check_kinds(spec, &token.values)?;
        if !check_arity(token.values.len(), spec.arity()) {
            return Err(arity_error(spec, token.values.len()));
        }
        check_range(spec, &token.values)?;

        trace!(name = %token.name, argument = spec.reference(), values = token.values.len(), "Bound named argument");
        state.commit(index, spec, token.values.clone());
        Ok(())
    }

    fn match_positional(
        &self,
        token: &Token,
        state: &mut MatchState<'a>,
    ) -> Result<(), ArgParseError> {
        let count = token.values.len();
        let candidates: Vec<(usize, &'a Specification)> = self
            .registry
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                s.is_positional()
                    && !state.is_consumed(s.reference())
                    && token.values.iter().all(|v| v.kind() == s.kind())
            })
            .collect();

        let Some(&(_, first)) = candidates.first() else {
            return Err(ArgParseError::UnknownPositional(render_values(
                &token.values,
            )));
        };

        let eligible: Vec<(usize, &'a Specification)> = candidates
            .iter()
            .copied()
            .filter(|(_, s)| check_arity(count, s.arity()))
            .collect();
        let Some(&(index, spec)) = eligible
            .iter()
            .find(|(_, s)| s.is_required())
            .or_else(|| eligible.first())
        else {
            return Err(arity_error(first, count));
        };

        check_range(spec, &token.values)?;

        trace!(argument = spec.reference(), values = count, "Bound positional argument");
        state.commit(index, spec, token.values.clone());
        Ok(())
    }
}

/// Validates `tokens` against `registry`. Shorthand for
/// [`Validator::validate`].
pub fn validate(tokens: &[Token], registry: &Registry) -> Result<Bindings, ArgParseError> {
    Validator::new(registry).validate(tokens)
}

fn check_kinds(spec: &Specification, values: &[ScalarValue]) -> Result<(), ArgParseError> {
    match values.iter().find(|v| v.kind() != spec.kind()) {
        Some(bad) => Err(ArgParseError::TypeMismatch {
            argument: spec.reference().to_string(),
            expected: spec.kind(),
            found: bad.kind(),
            value: bad.to_string(),
        }),
        None => Ok(()),
    }
}

fn check_range(spec: &Specification, values: &[ScalarValue]) -> Result<(), ArgParseError> {
    let Some(range) = spec.range() else {
        return Ok(());
    };
    match values.iter().find(|v| !range.contains(v)) {
        Some(bad) => Err(ArgParseError::OutOfRange {
            argument: spec.reference().to_string(),
            value: bad.to_string(),
            range: range.to_string(),
        }),
        None => Ok(()),
    }
}

fn arity_error(spec: &Specification, count: usize) -> ArgParseError {
    ArgParseError::ArityMismatch {
        argument: spec.reference().to_string(),
        arity: spec.arity(),
        count,
    }
}

fn render_values(values: &[ScalarValue]) -> String {
    match values {
        [single] => single.to_string(),
        _ => {
            let items: Vec<String> = values.iter().map(ToString::to_string).collect();
            format!("[{}]", items.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::range::Range;
    use crate::spec::SpecificationBuilder;
    use crate::types::ValueKind;

    fn registry(specs: Vec<SpecificationBuilder>) -> Registry {
        let mut registry = Registry::new();
        for builder in specs {
            registry.insert(builder.build().unwrap()).unwrap();
        }
        registry
    }

    fn positional(kind: ValueKind, reference: &str, nargs: &str) -> SpecificationBuilder {
        Specification::builder(kind, reference, Vec::<String>::new())
            .positional(true)
            .nargs(nargs)
    }

    fn run(registry: &Registry, line: &str) -> Result<Bindings, ArgParseError> {
        validate(&lex(line).unwrap(), registry)
    }

    #[test]
    fn test_check_arity_boundaries() {
        assert!(check_arity(0, Arity::ZeroOrOne));
        assert!(check_arity(1, Arity::ZeroOrOne));
        assert!(!check_arity(2, Arity::ZeroOrOne));
        assert!(!check_arity(0, Arity::OneOrMore));
        assert!(check_arity(0, Arity::ZeroOrMore));
        assert!(check_arity(3, Arity::Exactly(3)));
        assert!(!check_arity(2, Arity::Exactly(3)));
    }

    #[test]
    fn test_named_binding_and_unsupplied_defaults() {
        let reg = registry(vec![
            Specification::builder(ValueKind::Integer, "count", ["--count"]),
            Specification::builder(ValueKind::Text, "label", ["--label"]).nargs("?"),
        ]);
        let bindings = run(&reg, "--count=7").unwrap();
        assert_eq!(bindings.get("count"), Some(&[ScalarValue::integer(7)][..]));
        assert_eq!(bindings.get("label"), Some(&[][..]));
        assert!(bindings.is_present("count"));
        assert!(!bindings.is_present("label"));
    }

    #[test]
    fn test_unknown_and_duplicate_named() {
        let reg = registry(vec![Specification::builder(
            ValueKind::Integer,
            "count",
            ["-c", "--count"],
        )]);
        assert_eq!(
            run(&reg, "--other=1"),
            Err(ArgParseError::UnknownArgument("--other".into()))
        );
        assert_eq!(
            run(&reg, "-c=1 --count=2"),
            Err(ArgParseError::DuplicateArgument("--count".into()))
        );
    }

    #[test]
    fn test_type_mismatch_is_strict() {
        let reg = registry(vec![Specification::builder(
            ValueKind::Decimal,
            "ratio",
            ["--ratio"],
        )]);
        let err = run(&reg, "--ratio=2").unwrap_err();
        assert!(matches!(
            err,
            ArgParseError::TypeMismatch {
                expected: ValueKind::Decimal,
                found: ValueKind::Integer,
                ..
            }
        ));
    }

    #[test]
    fn test_out_of_range() {
        let reg = registry(vec![
            Specification::builder(ValueKind::Integer, "n", ["-n"]).range(Range::continuous(
                ScalarValue::integer(0),
                ScalarValue::integer(10),
            )),
        ]);
        assert!(run(&reg, "-n=10").is_ok());
        assert!(matches!(
            run(&reg, "-n=11"),
            Err(ArgParseError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_flag_satisfies_required_zero_arity() {
        let reg = registry(vec![
            Specification::builder(ValueKind::Text, "verbose", ["-v"])
                .nargs("*")
                .required(true),
        ]);
        let bindings = run(&reg, "-v").unwrap();
        assert!(bindings.is_present("verbose"));
        assert_eq!(bindings.get("verbose"), Some(&[][..]));
    }

    #[test]
    fn test_missing_required_reports_first_in_declaration_order() {
        let reg = registry(vec![
            Specification::builder(ValueKind::Integer, "a", ["-a"]).required(true),
            Specification::builder(ValueKind::Integer, "b", ["-b"]).required(true),
        ]);
        assert_eq!(
            run(&reg, ""),
            Err(ArgParseError::MissingRequiredArgument("a".into()))
        );
        assert_eq!(
            run(&reg, "-a=1"),
            Err(ArgParseError::MissingRequiredArgument("b".into()))
        );
    }

    #[test]
    fn test_positional_prefers_required_candidate() {
        let reg = registry(vec![
            positional(ValueKind::Integer, "optional", "?"),
            positional(ValueKind::Integer, "needed", "1").required(true),
        ]);
        let bindings = run(&reg, "5").unwrap();
        assert_eq!(bindings.get("needed"), Some(&[ScalarValue::integer(5)][..]));
        assert!(!bindings.is_present("optional"));

        let bindings = run(&reg, "5 6").unwrap();
        assert_eq!(bindings.get("optional"), Some(&[ScalarValue::integer(6)][..]));
    }

    #[test]
    fn test_positional_falls_back_to_first_eligible() {
        let reg = registry(vec![
            positional(ValueKind::Text, "first", "?"),
            positional(ValueKind::Text, "second", "?"),
        ]);
        let bindings = run(&reg, "\"x\" \"y\"").unwrap();
        assert_eq!(bindings.get("first"), Some(&[ScalarValue::text("x")][..]));
        assert_eq!(bindings.get("second"), Some(&[ScalarValue::text("y")][..]));
    }

    #[test]
    fn test_positional_kind_and_arity_failures() {
        let reg = registry(vec![positional(ValueKind::Integer, "pair", "2")]);
        assert_eq!(
            run(&reg, "\"text\""),
            Err(ArgParseError::UnknownPositional("\"text\"".into()))
        );
        assert_eq!(
            run(&reg, "[1 2 3]"),
            Err(ArgParseError::ArityMismatch {
                argument: "pair".into(),
                arity: Arity::Exactly(2),
                count: 3,
            })
        );
        assert!(run(&reg, "[1 2]").is_ok());
    }

    #[test]
    fn test_positional_slots_are_consumed_once() {
        let reg = registry(vec![positional(ValueKind::Integer, "only", "1")]);
        assert_eq!(
            run(&reg, "1 2"),
            Err(ArgParseError::UnknownPositional("2".into()))
        );
    }

    #[test]
    fn test_bare_name_binds_by_ref() {
        let reg = registry(vec![Specification::builder(
            ValueKind::Decimal,
            "left",
            ["--left"],
        )]);
        let bindings = run(&reg, "left=1.5").unwrap();
        assert!(bindings.is_present("left"));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let reg = registry(vec![
            Specification::builder(ValueKind::Integer, "n", ["-n"]).required(true),
        ]);
        let tokens = lex("-n=4").unwrap();
        let first = validate(&tokens, &reg).unwrap();
        let second = validate(&tokens, &reg).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_bindings_serialize_as_map() {
        let reg = registry(vec![
            Specification::builder(ValueKind::Integer, "n", ["-n"]).nargs("+"),
        ]);
        let bindings = run(&reg, "-n=[1 2]").unwrap();
        let json = serde_json::to_string(&bindings).unwrap();
        assert_eq!(json, r#"{"n":[1,2]}"#);
    }
}
