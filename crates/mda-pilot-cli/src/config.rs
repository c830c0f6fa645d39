//! CLI configuration

use mda_pilot::PilotConfig;
use std::path::PathBuf;

use crate::commands::Cli;
use crate::error::{CliError, CliResult};

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Quiet - warnings and errors
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - step internals
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// Resolve from `-q` and the `-v` count; quiet wins
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Debug,
        }
    }
}

/// Where the grid comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridSource {
    /// In-memory grid loaded from a fixture file
    Fixture(PathBuf),
    /// Live page
    Url(String),
}

/// How a live browser is launched for `--url`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserOptions {
    /// Show the window
    pub headed: bool,
    /// Run without the sandbox
    pub no_sandbox: bool,
    /// Chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
}

#[cfg(feature = "browser")]
impl BrowserOptions {
    /// Launch settings for the live browser
    #[must_use]
    pub fn settings(&self) -> mda_pilot::ChromiumSettings {
        let mut settings = mda_pilot::ChromiumSettings::default().with_headless(!self.headed);
        if self.no_sandbox {
            settings = settings.with_no_sandbox();
        }
        if let Some(ref path) = self.chromium_path {
            settings = settings.with_chromium_path(path.clone());
        }
        settings
    }
}

/// CLI configuration
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Print results as JSON
    pub json: bool,
    /// Page configuration file
    pub config_path: Option<PathBuf>,
    /// Think time override
    pub think_time_ms: Option<u64>,
    /// Grid source, when one was given
    pub source: Option<GridSource>,
    /// Browser launch options
    pub browser: BrowserOptions,
}

impl CliConfig {
    /// Build configuration from parsed arguments
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        let source = match (&cli.fixture, &cli.url) {
            (Some(path), _) => Some(GridSource::Fixture(path.clone())),
            (None, Some(url)) => Some(GridSource::Url(url.clone())),
            (None, None) => None,
        };
        Self {
            verbosity: Verbosity::from_flags(cli.quiet, cli.verbose),
            json: cli.json,
            config_path: cli.config.clone(),
            think_time_ms: cli.think_time,
            source,
            browser: BrowserOptions {
                headed: cli.headed,
                no_sandbox: cli.no_sandbox,
                chromium_path: cli.chromium_path.clone(),
            },
        }
    }

    /// Page configuration: file (or defaults) with CLI overrides applied
    pub fn page_config(&self) -> CliResult<PilotConfig> {
        let mut config = match &self.config_path {
            Some(path) => PilotConfig::from_path(path)?,
            None => PilotConfig::default(),
        };
        if let Some(ms) = self.think_time_ms {
            config = config.with_think_time(ms);
        }
        config.validate()?;
        Ok(config)
    }

    /// The grid source, or an error naming the missing flags
    pub fn require_source(&self) -> CliResult<&GridSource> {
        self.source
            .as_ref()
            .ok_or_else(|| CliError::config("either --fixture or --url is required"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["mda-pilot"];
        argv.extend_from_slice(args);
        CliConfig::from_cli(&Cli::try_parse_from(argv).unwrap())
    }

    mod verbosity_tests {
        use super::*;

        #[test]
        fn test_from_flags() {
            assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
            assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
            assert_eq!(Verbosity::from_flags(false, 3), Verbosity::Debug);
            assert_eq!(Verbosity::from_flags(true, 2), Verbosity::Quiet);
        }
    }

    mod source_tests {
        use super::*;

        #[test]
        fn test_fixture_wins_over_url() {
            let config = parse(&["--fixture", "g.yaml", "--url", "https://x", "status", "s"]);
            assert_eq!(
                config.source,
                Some(GridSource::Fixture(PathBuf::from("g.yaml")))
            );
        }

        #[test]
        fn test_browser_options() {
            let config = parse(&[
                "--url",
                "https://x",
                "--headed",
                "--no-sandbox",
                "--chromium-path",
                "/opt/chromium",
                "status",
                "s",
            ]);
            assert_eq!(
                config.browser,
                BrowserOptions {
                    headed: true,
                    no_sandbox: true,
                    chromium_path: Some("/opt/chromium".into()),
                }
            );
            assert_eq!(parse(&["status", "s"]).browser, BrowserOptions::default());
        }

        #[test]
        fn test_missing_source() {
            let config = parse(&["status", "s"]);
            let err = config.require_source().unwrap_err();
            assert!(err.to_string().contains("--fixture"));
        }
    }

    #[cfg(feature = "browser")]
    mod browser_settings_tests {
        use super::*;

        #[test]
        fn test_settings_follow_flags() {
            let settings = parse(&[
                "--url",
                "https://x",
                "--headed",
                "--no-sandbox",
                "--chromium-path",
                "/opt/chromium",
                "status",
                "s",
            ])
            .browser
            .settings();
            assert!(!settings.headless);
            assert!(!settings.sandbox);
            assert_eq!(settings.chromium_path.as_deref(), Some("/opt/chromium"));

            let settings = BrowserOptions::default().settings();
            assert!(settings.headless);
            assert!(settings.sandbox);
            assert_eq!(settings.chromium_path, None);
        }
    }

    mod page_config_tests {
        use super::*;

        #[test]
        fn test_defaults_without_file() {
            let config = parse(&["status", "s"]).page_config().unwrap();
            assert_eq!(config, PilotConfig::default());
        }

        #[test]
        fn test_think_time_override() {
            let mut file = NamedTempFile::new().unwrap();
            writeln!(file, "think_time_ms: 5000\npoll_interval_ms: 10").unwrap();
            let path = file.path().to_str().unwrap().to_string();
            let config = parse(&["--config", &path, "--think-time", "0", "status", "s"])
                .page_config()
                .unwrap();
            assert_eq!(config.think_time_ms, 0);
            assert_eq!(config.poll_interval_ms, 10);
        }

        #[test]
        fn test_invalid_file_is_rejected() {
            let mut file = NamedTempFile::new().unwrap();
            writeln!(file, "poll_interval_ms: 0").unwrap();
            let path = file.path().to_str().unwrap().to_string();
            assert!(parse(&["--config", &path, "status", "s"])
                .page_config()
                .is_err());
        }
    }
}
