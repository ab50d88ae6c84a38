//! cmock CLI library
//!
//! Command-line front end for running concolic mock campaigns over the
//! mock lambda fixture.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
mod output;
pub mod runner;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, ReportFormat, RunArgs, TargetsArgs};
pub use config::{CliConfig, ColorChoice, Verbosity, DEFAULT_CONFIG_FILE};
pub use error::{CliError, CliResult};
pub use output::{render_targets, render_targets_json, render_text, Reporter};
