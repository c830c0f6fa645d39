//! mda-pilot CLI Library
//!
//! Command-line front end for the model-driven apps page object.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod logging;
pub mod runner;

pub use commands::{
    Cli, Commands, IndexArgs, LogFormat, MenuArgs, RowArgs, VerifyArgs, WaitArgs,
};
pub use config::{BrowserOptions, CliConfig, GridSource, Verbosity};
pub use error::{CliError, CliResult};
pub use runner::{apply_overrides, run_command, Report};
