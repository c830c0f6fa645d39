//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// mda-pilot: drive the solutions grid of a model-driven app
#[derive(Parser, Debug)]
#[command(name = "mda-pilot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Page configuration file (YAML)
    #[arg(long, global = true, env = "MDA_PILOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Drive an in-memory grid described by this fixture file (YAML)
    #[arg(long, global = true)]
    pub fixture: Option<PathBuf>,

    /// Drive a live page at this URL (requires the `browser` feature)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Think time before each step, in milliseconds
    #[arg(long, global = true)]
    pub think_time: Option<u64>,

    /// Show the browser window (with --url)
    #[arg(long, global = true)]
    pub headed: bool,

    /// Launch the browser without its sandbox (with --url, for containers)
    #[arg(long, global = true)]
    pub no_sandbox: bool,

    /// Chromium binary to launch (with --url; auto-detected when absent)
    #[arg(long, global = true, value_name = "PATH")]
    pub chromium_path: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log output format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Log line format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Select a grid record by name
    Select(RowArgs),

    /// Select a grid record by position
    SelectIndex(IndexArgs),

    /// Open a row's more-commands menu and click a command
    MoreCommands(MenuArgs),

    /// Print a row's current status
    Status(RowArgs),

    /// Wait for a row's running job to finish
    Wait(WaitArgs),

    /// Check whether a sub-command is clickable
    Verify(VerifyArgs),

    /// Download the last results of a row
    Download(RowArgs),
}

/// A single grid row
#[derive(Args, Debug)]
pub struct RowArgs {
    /// Row display name
    pub row: String,
}

/// Arguments for the select-index command
#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Zero-based row position
    pub index: usize,
}

/// Arguments for the more-commands command
#[derive(Args, Debug)]
pub struct MenuArgs {
    /// Row display name
    pub row: String,

    /// Command label (substring, case-insensitive)
    pub command: String,

    /// Sub-command label (substring, case-insensitive)
    #[arg(long, default_value = "")]
    pub sub: String,
}

/// Arguments for the wait command
#[derive(Args, Debug)]
pub struct WaitArgs {
    /// Row display name
    pub row: String,

    /// Wait for a change away from this status instead of a running job
    #[arg(long)]
    pub baseline: Option<String>,

    /// Maximum wait in seconds (defaults to the configured processing timeout)
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Row display name
    pub row: String,

    /// Command label (substring, case-insensitive)
    pub command: String,

    /// Sub-command label (whole label, case-insensitive)
    pub sub: String,

    /// Fail when the sub-command is enabled
    #[arg(long)]
    pub fail_if_enabled: bool,
}
