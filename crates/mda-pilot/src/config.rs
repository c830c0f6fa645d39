//! Page configuration: timings, status markers and element references.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::locator::Selector;
use crate::result::{PilotError, PilotResult};

/// Default think-time before each step (2 seconds)
pub const DEFAULT_THINK_TIME_MS: u64 = 2_000;

/// Default pause after opening a command's sub-menu
pub const DEFAULT_MENU_SETTLE_MS: u64 = 1_500;

/// Default status poll cadence
pub const DEFAULT_STATUS_POLL_MS: u64 = 500;

/// Hard cap on any status wait (500 seconds)
pub const DEFAULT_STATUS_WAIT_CAP_SECS: u64 = 500;

/// Requested wait for background processing (1 hour, subject to the cap)
pub const DEFAULT_PROCESSING_TIMEOUT_SECS: u64 = 3_600;

/// Selectors for the grid and its menus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementReferences {
    /// Clickable name cells, one per grid row
    pub cells_container: Selector,
    /// More-commands button, relative to a row cell
    pub more_commands_button: Selector,
    /// Opened more-commands menu
    pub more_commands_container: Selector,
    /// Sub-menu flyouts; the last match is the most recently opened
    pub sub_button_container: Selector,
    /// Buttons inside menus
    pub menu_button: Selector,
    /// Name column cells used for status lookup
    pub name_column: Selector,
    /// Status column cells, index-aligned with `name_column`
    pub status_column: Selector,
    /// Attribute flagging a disabled control
    pub disabled_attribute: String,
}

impl Default for ElementReferences {
    fn default() -> Self {
        Self {
            cells_container: Selector::xpath(
                "//div[@data-automationid='DetailsRowCell' and @data-automation-key='displayName']",
            ),
            more_commands_button: Selector::css("button[data-automationid='moreCommands']"),
            more_commands_container: Selector::xpath(
                "//ul[contains(@class,'ms-ContextualMenu-list')]",
            ),
            sub_button_container: Selector::xpath(
                "//div[contains(@class,'ms-ContextualMenu-container')]",
            ),
            menu_button: Selector::tag("button"),
            name_column: Selector::xpath(
                "//div[@role='gridcell' and @data-automation-key='name']",
            ),
            status_column: Selector::xpath(
                "//div[@role='gridcell' and @data-automation-key='status']",
            ),
            disabled_attribute: "aria-disabled".to_string(),
        }
    }
}

/// Status substrings that drive the processing and download steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusMarkers {
    /// Marks a job still in progress
    pub running: String,
    /// Marks a job whose results are ready
    pub ready: String,
}

impl Default for StatusMarkers {
    fn default() -> Self {
        Self {
            running: "running".to_string(),
            ready: "Results".to_string(),
        }
    }
}

/// Menu path used by the download step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Command in the more-commands menu
    pub command: String,
    /// Sub-command that downloads the results
    pub sub_command: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            command: "Solution Checker".to_string(),
            sub_command: "Download last results".to_string(),
        }
    }
}

/// Configuration for [`ModelDrivenAppsPage`](crate::ModelDrivenAppsPage)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotConfig {
    /// Delay before each step
    pub think_time_ms: u64,
    /// Delay after clicking a menu command
    pub menu_settle_ms: u64,
    /// Status poll cadence
    pub poll_interval_ms: u64,
    /// Upper bound on any status wait
    pub status_wait_cap_secs: u64,
    /// Requested wait in the processing step
    pub processing_timeout_secs: u64,
    /// Status markers
    pub markers: StatusMarkers,
    /// Download menu path
    pub download: DownloadSettings,
    /// Element selectors
    pub references: ElementReferences,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            think_time_ms: DEFAULT_THINK_TIME_MS,
            menu_settle_ms: DEFAULT_MENU_SETTLE_MS,
            poll_interval_ms: DEFAULT_STATUS_POLL_MS,
            status_wait_cap_secs: DEFAULT_STATUS_WAIT_CAP_SECS,
            processing_timeout_secs: DEFAULT_PROCESSING_TIMEOUT_SECS,
            markers: StatusMarkers::default(),
            download: DownloadSettings::default(),
            references: ElementReferences::default(),
        }
    }
}

impl PilotConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> PilotResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_path(path: impl AsRef<Path>) -> PilotResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Reject settings the page cannot run with
    pub fn validate(&self) -> PilotResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(PilotError::config("poll_interval_ms must be positive"));
        }
        if self.markers.running.is_empty() || self.markers.ready.is_empty() {
            return Err(PilotError::config("status markers must not be empty"));
        }
        if self.download.command.is_empty() {
            return Err(PilotError::config("download.command must not be empty"));
        }
        Ok(())
    }

    /// Set think-time
    #[must_use]
    pub const fn with_think_time(mut self, ms: u64) -> Self {
        self.think_time_ms = ms;
        self
    }

    /// Set menu settle delay
    #[must_use]
    pub const fn with_menu_settle(mut self, ms: u64) -> Self {
        self.menu_settle_ms = ms;
        self
    }

    /// Set status poll cadence
    #[must_use]
    pub const fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set the status wait cap
    #[must_use]
    pub const fn with_status_wait_cap(mut self, secs: u64) -> Self {
        self.status_wait_cap_secs = secs;
        self
    }

    /// Set the processing step's requested wait
    #[must_use]
    pub const fn with_processing_timeout(mut self, secs: u64) -> Self {
        self.processing_timeout_secs = secs;
        self
    }

    /// Replace element references
    #[must_use]
    pub fn with_references(mut self, references: ElementReferences) -> Self {
        self.references = references;
        self
    }

    /// Think-time as Duration
    #[must_use]
    pub const fn think_time(&self) -> Duration {
        Duration::from_millis(self.think_time_ms)
    }

    /// Menu settle delay as Duration
    #[must_use]
    pub const fn menu_settle(&self) -> Duration {
        Duration::from_millis(self.menu_settle_ms)
    }
}
