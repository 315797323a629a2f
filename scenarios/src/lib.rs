//! Scenario files for the argument parser.
//!
//! A scenario binds a command word to a set of argument declarations. Lines
//! such as `sub --right=2.0` are dispatched on their first word and the rest
//! is parsed against that scenario's arguments.
//!
//! # Quick start
//!
//! ```no_run
//! use argspec_scenarios::{ScenarioBook, ScenarioFile};
//!
//! // The scenarios shipped with the crate
//! let book = ScenarioBook::builtin().unwrap();
//! let bindings = book.parse("add 1 2").unwrap();
//!
//! // Or a scenario file of your own
//! let book = ScenarioBook::from_file("scenarios.yml").unwrap();
//! for command in book.commands() {
//!     println!("{}", book.describe(command).unwrap());
//! }
//!
//! // Files can be edited and written back
//! let mut file = ScenarioFile::load("scenarios.yml").unwrap();
//! file.scenarios.retain(|s| s.command != "legacy");
//! file.save("scenarios.yml").unwrap();
//! ```

mod config;
mod error;
mod loader;

pub use config::{ArgumentDef, RangeDef, ScenarioDef, ScenarioFile};
pub use error::{Result, ScenarioError};
pub use loader::{ScenarioBook, ScenarioSource, split_command};
