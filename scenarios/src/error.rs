//! Error types for scenario loading and dispatch.

use argspec_core::{ArgParseError, SpecificationError};
use thiserror::Error;

/// Errors that can occur while loading a scenario file or running a line
/// through it.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// An argument declaration is malformed.
    #[error("invalid argument in scenario '{command}': {source}")]
    InvalidArgument {
        command: String,
        #[source]
        source: SpecificationError,
    },

    /// Declaring or parsing against a scenario failed.
    #[error(transparent)]
    Parse(#[from] ArgParseError),

    /// The first word of the line names no scenario.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// File-level validation failure (e.g., duplicate commands).
    #[error("invalid scenario file: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for results with [`ScenarioError`].
pub type Result<T> = std::result::Result<T, ScenarioError>;
