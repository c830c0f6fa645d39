//! Subcommand dispatch against a page object

use mda_pilot::{CommandResult, ElementLocator, ModelDrivenAppsPage, PilotConfig};
use serde::Serialize;

use crate::commands::Commands;
use crate::error::CliResult;

/// What a subcommand produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Report {
    /// A page step ran
    Step(CommandResult<bool>),
    /// A status was read
    Status {
        /// Row display name
        row: String,
        /// Status text
        status: String,
    },
    /// A status-change wait finished
    Changed {
        /// Row display name
        row: String,
        /// Status the wait moved away from
        baseline: String,
        /// Whether a ready status was seen in time
        changed: bool,
    },
}

impl Report {
    /// One-line human-readable form
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Step(result) => format!(
                "{}: {} ({} ms)",
                result.name,
                result.value,
                result.elapsed.as_millis()
            ),
            Self::Status { status, .. } => status.clone(),
            Self::Changed { changed, .. } => changed.to_string(),
        }
    }

    /// Render as text or JSON
    pub fn render(&self, json: bool) -> CliResult<String> {
        if json {
            Ok(serde_json::to_string(self)?)
        } else {
            Ok(self.to_text())
        }
    }
}

/// Fold subcommand options that live in the page configuration
#[must_use]
pub fn apply_overrides(config: PilotConfig, command: &Commands) -> PilotConfig {
    match command {
        Commands::Wait(args) => match args.timeout {
            Some(secs) => config.with_processing_timeout(secs),
            None => config,
        },
        _ => config,
    }
}

/// Run `command` against `page`
pub fn run_command<L: ElementLocator>(
    page: &ModelDrivenAppsPage<L>,
    command: &Commands,
) -> CliResult<Report> {
    let report = match command {
        Commands::Select(args) => Report::Step(page.select_row(&args.row)?),
        Commands::SelectIndex(args) => Report::Step(page.select_row_at(args.index)?),
        Commands::MoreCommands(args) => {
            Report::Step(page.open_more_commands(&args.row, &args.command, &args.sub)?)
        }
        Commands::Status(args) => Report::Status {
            row: args.row.clone(),
            status: page.current_status(&args.row)?,
        },
        Commands::Wait(args) => match &args.baseline {
            Some(baseline) => Report::Changed {
                row: args.row.clone(),
                baseline: baseline.clone(),
                changed: page.wait_for_status_change(
                    &args.row,
                    baseline,
                    page.config().processing_timeout_secs,
                ),
            },
            None => Report::Step(page.wait_for_processing_to_complete(&args.row)?),
        },
        Commands::Verify(args) => Report::Step(page.verify_button_is_clickable(
            &args.row,
            &args.command,
            &args.sub,
            args.fail_if_enabled,
        )?),
        Commands::Download(args) => Report::Step(page.download_results(&args.row)?),
    };
    Ok(report)
}
