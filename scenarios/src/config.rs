//! YAML scenario files.
//!
//! A scenario maps a command word to the arguments it declares. Each
//! argument entry mirrors [`SpecificationBuilder`]: a value type, a ref,
//! aliases, arity and flags, plus an optional range.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! scenarios:
//!   - command: sub
//!     description: Subtracts two decimals
//!     arguments:
//!       - ref: left
//!         names: ["--left"]
//!         type: decimal
//!       - ref: right
//!         names: ["--right"]
//!         type: decimal
//!         required: true
//!       - ref: mode
//!         names: ["-m", "--mode"]
//!         type: text
//!         nargs: "?"
//!         range: { choices: [fast, exact] }
//! ```
//!
//! Range bounds and choices are written as plain scalars and converted with
//! [`ValueKind::parse_literal`] for the argument's type.

use std::io::{BufReader, BufWriter};
use std::path::Path;

use argspec_core::{ArgumentParser, Range, Specification, SpecificationError, ValueKind};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, ScenarioError};

/// Allowed values for an argument, before conversion to a typed [`Range`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeDef {
    /// Inclusive `[min, max]` interval.
    Continuous {
        #[serde(deserialize_with = "literal")]
        min: String,
        #[serde(deserialize_with = "literal")]
        max: String,
    },
    /// Explicit set of allowed values.
    Discrete {
        #[serde(deserialize_with = "literals")]
        choices: Vec<String>,
    },
}

impl RangeDef {
    /// Converts the literals to values of `kind`.
    ///
    /// # Errors
    ///
    /// [`SpecificationError::InvalidLiteral`] when a literal is not a valid
    /// value of `kind`.
    pub fn to_range(&self, kind: ValueKind) -> std::result::Result<Range, SpecificationError> {
        match self {
            Self::Continuous { min, max } => Ok(Range::continuous(
                kind.parse_literal(min)?,
                kind.parse_literal(max)?,
            )),
            Self::Discrete { choices } => choices
                .iter()
                .map(|c| kind.parse_literal(c))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Range::discrete),
        }
    }
}

/// One argument declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentDef {
    /// Key the bound values are stored under.
    #[serde(rename = "ref")]
    pub reference: String,
    /// Aliases such as `-f` or `--flag`. Empty for positionals.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    /// Value type name (`integer`, `decimal`, `text`, `date`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Arity: `?`, `+`, `*` or a count. Defaults to exactly one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nargs: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub positional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Name shown in usage text instead of the ref or longest alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeDef>,
}

impl ArgumentDef {
    /// Builds the validated [`Specification`] this entry describes.
    pub fn to_specification(&self) -> std::result::Result<Specification, SpecificationError> {
        let kind: ValueKind = self.kind.parse()?;
        let mut builder = Specification::builder(kind, &self.reference, self.names.iter().cloned())
            .required(self.required)
            .positional(self.positional);
        if let Some(nargs) = &self.nargs {
            builder = builder.nargs(nargs);
        }
        if let Some(help) = &self.help {
            builder = builder.help(help);
        }
        if let Some(help_name) = &self.help_name {
            builder = builder.help_name(help_name);
        }
        if let Some(range) = &self.range {
            builder = builder.range(range.to_range(kind)?);
        }
        builder.build()
    }
}

/// A command word and the arguments it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDef {
    pub command: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub arguments: Vec<ArgumentDef>,
}

impl ScenarioDef {
    /// Declares every argument on a fresh [`ArgumentParser`].
    ///
    /// # Errors
    ///
    /// [`ScenarioError::InvalidArgument`] for a malformed declaration, or
    /// [`ScenarioError::Parse`] when two declarations collide.
    pub fn build(&self) -> Result<ArgumentParser> {
        let mut parser = ArgumentParser::new(&self.command, &self.description);
        for argument in &self.arguments {
            let spec = argument
                .to_specification()
                .map_err(|source| ScenarioError::InvalidArgument {
                    command: self.command.clone(),
                    source,
                })?;
            parser.add_argument(spec)?;
        }
        Ok(parser)
    }
}

/// Top-level scenario file.
///
/// # Examples
///
/// ```
/// use argspec_scenarios::ScenarioFile;
///
/// let file = ScenarioFile::from_yaml_str(r#"
/// version: "1.0"
/// scenarios:
///   - command: sqrt
///     arguments:
///       - { ref: number, type: integer, positional: true, required: true, range: { min: 0, max: 1000 } }
/// "#).unwrap();
/// assert_eq!(file.scenarios[0].command, "sqrt");
/// assert!(file.scenarios[0].build().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioFile {
    /// File format version (e.g., `"1.0"`).
    pub version: String,
    #[serde(default)]
    pub scenarios: Vec<ScenarioDef>,
}

impl ScenarioFile {
    /// Loads a scenario file from YAML on disk.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ScenarioError::IoError) if the file cannot be
    /// read, or [`YamlError`](ScenarioError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Saves the scenario file as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ScenarioError::IoError) if the file cannot be
    /// written, or [`YamlError`](ScenarioError::YamlError) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Checks file-level invariants: a non-empty version and unique,
    /// non-empty command words.
    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(ScenarioError::InvalidConfig(
                "version cannot be empty".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for scenario in &self.scenarios {
            let command = scenario.command.as_str();
            if command.trim().is_empty() || command.contains(char::is_whitespace) {
                return Err(ScenarioError::InvalidConfig(format!(
                    "invalid command word '{command}'"
                )));
            }
            if !seen.insert(command) {
                return Err(ScenarioError::InvalidConfig(format!(
                    "duplicate command: {command}"
                )));
            }
        }
        Ok(())
    }
}

/// Accepts any YAML scalar as its textual form, so `min: 0` and
/// `min: "0"` are equivalent.
fn literal<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    scalar_text(serde_yaml::Value::deserialize(deserializer)?)
}

fn literals<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<String>, D::Error> {
    Vec::<serde_yaml::Value>::deserialize(deserializer)?
        .into_iter()
        .map(scalar_text)
        .collect()
}

fn scalar_text<E: serde::de::Error>(value: serde_yaml::Value) -> std::result::Result<String, E> {
    match value {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(E::custom(format!("expected a scalar literal, found {other:?}"))),
    }
}
