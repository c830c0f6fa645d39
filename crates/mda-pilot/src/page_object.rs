//! Page Object Model support for the model-driven apps solution grid.
//!
//! ## Toyota Way Application:
//! - **Poka-Yoke**: Selectors live in [`ElementReferences`], never in steps
//! - **Muda**: One page object owns the grid traversal for every step
//! - **Jidoka**: Lookup failures stop the step with a typed error

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::commands::{ClickOutcome, RowCommandInvoker};
use crate::config::{ElementReferences, PilotConfig};
use crate::execute::{execute, CommandOptions, CommandResult};
use crate::locator::{contains_ignore_case, ElementLocator};
use crate::observer::{DiagnosticObserver, TracingObserver};
use crate::result::{PilotError, PilotResult};
use crate::status::{GridStatusReader, RowStatusReader, StatusPoller};

/// Step name of [`ModelDrivenAppsPage::select_row`]
pub const SELECT_ROW_STEP: &str = "Select Grid Record";
/// Step name of [`ModelDrivenAppsPage::open_more_commands`]
pub const MORE_COMMANDS_STEP: &str = "Click More Commands Button";
/// Step name of [`ModelDrivenAppsPage::wait_for_processing_to_complete`]
pub const WAIT_FOR_PROCESSING_STEP: &str = "Wait For Processing To Complete";
/// Step name of [`ModelDrivenAppsPage::verify_button_is_clickable`]
pub const VERIFY_BUTTON_STEP: &str = "Verify Button is Clickable";
/// Step name of [`ModelDrivenAppsPage::download_results`]
pub const DOWNLOAD_RESULTS_STEP: &str = "Download Results";

/// Trait for page objects representing a page or component in the UI.
pub trait PageObject {
    /// URL pattern that matches this page (e.g., "/main.aspx")
    fn url_pattern(&self) -> &str;

    /// Check if the page is fully loaded and ready for interaction
    fn is_loaded(&self) -> bool {
        true
    }

    /// Optional wait time for page load (in milliseconds)
    fn load_timeout_ms(&self) -> u64 {
        30_000
    }

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// The solutions grid of a model-driven app.
///
/// Every step pauses for the configured think time, runs as a named
/// command and returns a [`CommandResult`].
#[derive(Debug)]
pub struct ModelDrivenAppsPage<L> {
    locator: L,
    config: PilotConfig,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn DiagnosticObserver>,
}

impl<L: ElementLocator> ModelDrivenAppsPage<L> {
    /// Create a page over `locator` using the system clock
    pub fn new(locator: L, config: PilotConfig) -> Self {
        Self {
            locator,
            config,
            clock: Arc::new(SystemClock::new()),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Use `clock` for think time, settling and polling
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Report diagnostics to `observer`
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn DiagnosticObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Override the think time before each step
    #[must_use]
    pub const fn with_think_time(mut self, ms: u64) -> Self {
        self.config.think_time_ms = ms;
        self
    }

    /// Active configuration
    pub const fn config(&self) -> &PilotConfig {
        &self.config
    }

    /// Underlying locator
    pub const fn locator(&self) -> &L {
        &self.locator
    }

    const fn references(&self) -> &ElementReferences {
        &self.config.references
    }

    fn options(&self, name: &str) -> CommandOptions {
        CommandOptions::new(name).with_think_time(self.config.think_time())
    }

    fn invoker(&self) -> RowCommandInvoker<'_, L> {
        RowCommandInvoker::new(
            &self.locator,
            self.references(),
            self.clock.as_ref(),
            self.observer.as_ref(),
        )
        .with_menu_settle(self.config.menu_settle())
    }

    fn reader(&self) -> GridStatusReader<'_, L> {
        GridStatusReader::new(&self.locator, self.references(), self.observer.as_ref())
    }

    fn poller(&self) -> StatusPoller<GridStatusReader<'_, L>> {
        StatusPoller::new(self.reader(), self.clock.clone())
            .with_observer(self.observer.clone())
            .with_poll_interval(self.config.poll_interval_ms)
            .with_wait_cap(self.config.status_wait_cap_secs)
            .with_ready_marker(self.config.markers.ready.clone())
    }

    // =========================================================================
    // STEPS
    // =========================================================================

    /// Click the grid record named `name` (whole name, ignoring case)
    pub fn select_row(&self, name: &str) -> PilotResult<CommandResult<bool>> {
        execute(self.clock.as_ref(), &self.options(SELECT_ROW_STEP), || {
            self.invoker().select_row(name)?;
            Ok(true)
        })
    }

    /// Click the grid record at `index`
    pub fn select_row_at(&self, index: usize) -> PilotResult<CommandResult<bool>> {
        execute(self.clock.as_ref(), &self.options(SELECT_ROW_STEP), || {
            self.invoker().select_row_at(index)?;
            Ok(true)
        })
    }

    /// Open `row`'s more-commands menu and click `command`, then
    /// `sub_command` when it is non-empty and enabled
    pub fn open_more_commands(
        &self,
        row: &str,
        command: &str,
        sub_command: &str,
    ) -> PilotResult<CommandResult<bool>> {
        execute(self.clock.as_ref(), &self.options(MORE_COMMANDS_STEP), || {
            self.invoker().click_more_commands(row, command, sub_command)?;
            Ok(true)
        })
    }

    /// Wait for a running job on `row` to finish.
    ///
    /// When the current status carries the running marker, the status is
    /// polled until it changes to a ready value; the value is the poll
    /// outcome. A row that is not running yields `true` at once.
    pub fn wait_for_processing_to_complete(&self, row: &str) -> PilotResult<CommandResult<bool>> {
        execute(
            self.clock.as_ref(),
            &self.options(WAIT_FOR_PROCESSING_STEP),
            || {
                let status = self.reader().get_status(row)?;
                if !contains_ignore_case(&status, &self.config.markers.running) {
                    tracing::debug!(event = "mda.processing.not_running", row = row, status = %status);
                    return Ok(true);
                }
                Ok(self.poller().wait_for_status_change(
                    row,
                    &status,
                    self.config.processing_timeout_secs,
                ))
            },
        )
    }

    /// Check whether `sub_command` under `command` is clickable for `row`.
    ///
    /// The value is `true` when the sub-command is enabled. With
    /// `fail_if_enabled`, an enabled sub-command is an error instead.
    pub fn verify_button_is_clickable(
        &self,
        row: &str,
        command: &str,
        sub_command: &str,
        fail_if_enabled: bool,
    ) -> PilotResult<CommandResult<bool>> {
        execute(self.clock.as_ref(), &self.options(VERIFY_BUTTON_STEP), || {
            let disabled = self
                .invoker()
                .is_sub_command_disabled(row, command, sub_command)?;
            if fail_if_enabled && !disabled {
                return Err(PilotError::SubCommandEnabled {
                    name: sub_command.to_string(),
                });
            }
            Ok(!disabled)
        })
    }

    /// Download the last results for `row` once its status is ready.
    ///
    /// The value reports whether the download was clicked.
    pub fn download_results(&self, row: &str) -> PilotResult<CommandResult<bool>> {
        execute(self.clock.as_ref(), &self.options(DOWNLOAD_RESULTS_STEP), || {
            let status = self.reader().get_status(row)?;
            if !contains_ignore_case(&status, &self.config.markers.ready) {
                tracing::info!(event = "mda.download.not_ready", row = row, status = %status);
                return Ok(false);
            }
            let download = &self.config.download;
            let outcome =
                self.invoker()
                    .click_more_commands(row, &download.command, &download.sub_command)?;
            Ok(outcome != ClickOutcome::SubCommandDisabled)
        })
    }

    // =========================================================================
    // STATUS
    // =========================================================================

    /// Current status text of `row`
    pub fn current_status(&self, row: &str) -> PilotResult<String> {
        self.reader().get_status(row)
    }

    /// Poll `row` until its status leaves `baseline` for a ready value
    pub fn wait_for_status_change(&self, row: &str, baseline: &str, max_wait_seconds: u64) -> bool {
        self.poller()
            .wait_for_status_change(row, baseline, max_wait_seconds)
    }
}

impl<L: ElementLocator> PageObject for ModelDrivenAppsPage<L> {
    fn url_pattern(&self) -> &str {
        "/main.aspx"
    }

    fn is_loaded(&self) -> bool {
        self.locator.find(&self.references().cells_container).is_ok()
    }

    fn load_timeout_ms(&self) -> u64 {
        self.config.status_wait_cap_secs.saturating_mul(1_000)
    }

    fn page_name(&self) -> &str {
        "Model-driven apps"
    }
}
