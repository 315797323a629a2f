//! Scenario lookup and dispatch of input lines.
//!
//! A [`ScenarioBook`] indexes the scenarios of one file by command word.
//! Every scenario is built once when the book is created so malformed
//! declarations are reported up front; each [`parse`](ScenarioBook::parse)
//! then declares the arguments again on a fresh parser.
//!
//! ```
//! use argspec_scenarios::ScenarioBook;
//!
//! let book = ScenarioBook::builtin().unwrap();
//! let bindings = book.parse("sub --right=2.0").unwrap();
//! assert!(bindings.is_present("right"));
//! assert!(!bindings.is_present("left"));
//!
//! assert!(book.parse("sub --left=1.0").is_err());
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use argspec_core::Bindings;
use tracing::debug;

use crate::config::{ScenarioDef, ScenarioFile};
use crate::error::{Result, ScenarioError};

const BUILTIN_SCENARIOS: &str = include_str!("../data/builtin.yaml");

/// Describes where a [`ScenarioBook`] was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioSource {
    /// The scenario set compiled into the crate.
    Builtin,
    /// A YAML file on disk.
    File(PathBuf),
}

/// Scenarios indexed by command word.
#[derive(Debug)]
pub struct ScenarioBook {
    scenarios: HashMap<String, ScenarioDef>,
    order: Vec<String>,
    source: ScenarioSource,
}

impl ScenarioBook {
    /// The scenario set shipped with the crate.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded YAML is malformed.
    pub fn builtin() -> Result<Self> {
        let file = ScenarioFile::from_yaml_str(BUILTIN_SCENARIOS)?;
        Self::new(file, ScenarioSource::Builtin)
    }

    /// Loads and checks a scenario file from disk.
    ///
    /// # Errors
    ///
    /// I/O and YAML errors from [`ScenarioFile::load`], plus any error from
    /// building one of its scenarios.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = ScenarioFile::load(path)?;
        Self::new(file, ScenarioSource::File(path.to_path_buf()))
    }

    /// Indexes `file` after validating it and building every scenario.
    pub fn new(file: ScenarioFile, source: ScenarioSource) -> Result<Self> {
        file.validate()?;
        for scenario in &file.scenarios {
            scenario.build()?;
        }

        let order: Vec<String> = file.scenarios.iter().map(|s| s.command.clone()).collect();
        let scenarios = file
            .scenarios
            .into_iter()
            .map(|s| (s.command.clone(), s))
            .collect();
        debug!(scenarios = order.len(), source = ?source, "Loaded scenario book");

        Ok(Self {
            scenarios,
            order,
            source,
        })
    }

    pub fn get(&self, command: &str) -> Option<&ScenarioDef> {
        self.scenarios.get(command)
    }

    /// Parses `line`, whose first word selects the scenario.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::UnknownCommand`] when no scenario has that command
    /// word, otherwise whatever parsing the rest of the line reports.
    pub fn parse(&self, line: &str) -> Result<Bindings> {
        let (command, arguments) = split_command(line);
        let scenario = self
            .get(command)
            .ok_or_else(|| ScenarioError::UnknownCommand(command.to_string()))?;

        debug!(command, arguments, "Dispatching line");
        let mut parser = scenario.build()?;
        Ok(parser.parse(arguments)?.clone())
    }

    /// Usage and argument help for one scenario.
    pub fn describe(&self, command: &str) -> Result<String> {
        let scenario = self
            .get(command)
            .ok_or_else(|| ScenarioError::UnknownCommand(command.to_string()))?;
        Ok(scenario.build()?.describe())
    }

    /// Command words in file order.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn source(&self) -> &ScenarioSource {
        &self.source
    }
}

/// Splits a line into its command word and the remaining argument text.
pub fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest),
        None => (line, ""),
    }
}
