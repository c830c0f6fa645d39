//! mda-pilot CLI: drive a model-driven app grid from the shell
//!
//! ## Usage
//!
//! ```bash
//! mda-pilot --fixture grid.yaml status MySolution
//! mda-pilot --fixture grid.yaml more-commands MySolution "Solution checker" --sub Run
//! mda-pilot --url https://org.crm.dynamics.com/main.aspx wait MySolution
//! mda-pilot --url https://org.crm.dynamics.com/main.aspx --headed --no-sandbox status MySolution
//! ```

use clap::Parser;
use mda_pilot::{FakeGrid, GridFixture, ModelDrivenAppsPage, PilotConfig};
use mda_pilot_cli::logging::init_logging;
use mda_pilot_cli::{
    apply_overrides, run_command, BrowserOptions, Cli, CliConfig, CliResult, Commands,
    GridSource, Report,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = CliConfig::from_cli(&cli);
    init_logging(config.verbosity, cli.log_format);

    let page_config = apply_overrides(config.page_config()?, &cli.command);
    let source = config.require_source()?;
    tracing::debug!(event = "mda.cli.started", source = ?source, command = ?cli.command);
    let report = match source {
        GridSource::Fixture(path) => run_fixture(path, page_config, &cli.command)?,
        GridSource::Url(url) => run_live(url, &config.browser, page_config, &cli.command)?,
    };

    println!("{}", report.render(config.json)?);
    Ok(())
}

fn run_fixture(
    path: &std::path::Path,
    config: PilotConfig,
    command: &Commands,
) -> CliResult<Report> {
    let fixture = GridFixture::from_path(path)?;
    let grid = FakeGrid::new(fixture, config.references.clone());
    run_command(&ModelDrivenAppsPage::new(grid, config), command)
}

#[cfg(feature = "browser")]
fn run_live(
    url: &str,
    browser: &BrowserOptions,
    config: PilotConfig,
    command: &Commands,
) -> CliResult<Report> {
    use mda_pilot::ChromiumSession;

    let session = ChromiumSession::launch(&browser.settings(), url)?;
    let report = run_command(&ModelDrivenAppsPage::new(session.locator(), config), command);
    session.close()?;
    report
}

#[cfg(not(feature = "browser"))]
fn run_live(
    _url: &str,
    _browser: &BrowserOptions,
    _config: PilotConfig,
    _command: &Commands,
) -> CliResult<Report> {
    Err(mda_pilot_cli::CliError::invalid_argument(
        "--url requires a build with the `browser` feature",
    ))
}
