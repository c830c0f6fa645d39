//! Row selection and more-commands menu traversal.

use std::time::Duration;

use crate::clock::Clock;
use crate::config::ElementReferences;
use crate::locator::{find_by_text, is_flag_set, ElementLocator, NameMatch, UiElement};
use crate::observer::{DiagnosticEvent, DiagnosticObserver};
use crate::result::{PilotError, PilotResult};

/// What a more-commands click ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Only the command was requested, and it was clicked
    CommandClicked,
    /// The sub-command was clicked
    SubCommandClicked,
    /// The sub-command is disabled and was left alone
    SubCommandDisabled,
}

/// Clicks rows and their more-commands menus
#[derive(Debug)]
pub struct RowCommandInvoker<'a, L> {
    locator: &'a L,
    references: &'a ElementReferences,
    clock: &'a dyn Clock,
    observer: &'a dyn DiagnosticObserver,
    menu_settle: Duration,
}

impl<'a, L: ElementLocator> RowCommandInvoker<'a, L> {
    /// Create an invoker over `locator`
    pub fn new(
        locator: &'a L,
        references: &'a ElementReferences,
        clock: &'a dyn Clock,
        observer: &'a dyn DiagnosticObserver,
    ) -> Self {
        Self {
            locator,
            references,
            clock,
            observer,
            menu_settle: Duration::ZERO,
        }
    }

    /// Pause after each command click so sub-menus can render
    #[must_use]
    pub const fn with_menu_settle(mut self, settle: Duration) -> Self {
        self.menu_settle = settle;
        self
    }

    fn find_row(&self, name: &str) -> PilotResult<L::Element> {
        let cells = self.locator.find_all(&self.references.cells_container)?;
        find_by_text(cells, name, NameMatch::Equals).ok_or_else(|| PilotError::row_not_found(name))
    }

    /// Click the grid cell whose text equals `name`, ignoring case
    pub fn select_row(&self, name: &str) -> PilotResult<()> {
        self.find_row(name)?.click()?;
        tracing::debug!(event = "mda.grid.row_selected", row = name);
        Ok(())
    }

    /// Click the `index`-th grid cell
    pub fn select_row_at(&self, index: usize) -> PilotResult<()> {
        let cells = self.locator.find_all(&self.references.cells_container)?;
        let count = cells.len();
        let cell = cells
            .into_iter()
            .nth(index)
            .ok_or(PilotError::RowIndexOutOfRange { index, count })?;
        cell.click()?;
        tracing::debug!(event = "mda.grid.row_selected", index = index);
        Ok(())
    }

    fn open_command(&self, row: &str, command: &str) -> PilotResult<()> {
        let cell = self.find_row(row)?;
        cell.find(&self.references.more_commands_button)?.click()?;

        let menu = self
            .locator
            .find(&self.references.more_commands_container)?;
        let buttons = menu.find_all(&self.references.menu_button)?;
        let button = find_by_text(buttons, command, NameMatch::Contains).ok_or_else(|| {
            PilotError::CommandNotFound {
                name: command.to_string(),
            }
        })?;
        button.click()?;
        tracing::debug!(event = "mda.menu.command_clicked", row = row, command = command);

        self.clock.sleep(self.menu_settle);
        Ok(())
    }

    /// Buttons of the most recently opened sub-menu, `None` if no sub-menu
    /// container is rendered
    fn sub_menu_buttons(&self) -> PilotResult<Option<Vec<L::Element>>> {
        let containers = self.locator.find_all(&self.references.sub_button_container)?;
        match containers.last() {
            Some(container) => Ok(Some(container.find_all(&self.references.menu_button)?)),
            None => Ok(None),
        }
    }

    /// Open `row`'s more-commands menu, click `command`, then optionally
    /// `sub_command` in the sub-menu.
    ///
    /// Command and sub-command labels match by substring, ignoring case. A
    /// disabled sub-command is not clicked and is not an error.
    pub fn click_more_commands(
        &self,
        row: &str,
        command: &str,
        sub_command: &str,
    ) -> PilotResult<ClickOutcome> {
        self.open_command(row, command)?;
        if sub_command.is_empty() {
            return Ok(ClickOutcome::CommandClicked);
        }

        let not_found = || PilotError::SubCommandNotFound {
            name: sub_command.to_string(),
        };
        let buttons = self.sub_menu_buttons()?.ok_or_else(not_found)?;
        let button = find_by_text(buttons, sub_command, NameMatch::Contains).ok_or_else(not_found)?;

        if is_flag_set(&button, &self.references.disabled_attribute)? {
            self.observer.on_event(&DiagnosticEvent::SubCommandSkipped {
                sub_command: sub_command.to_string(),
            });
            return Ok(ClickOutcome::SubCommandDisabled);
        }

        button.click()?;
        tracing::debug!(
            event = "mda.menu.sub_command_clicked",
            row = row,
            command = command,
            sub_command = sub_command,
        );
        Ok(ClickOutcome::SubCommandClicked)
    }

    /// Whether `sub_command` under `command` is disabled for `row`.
    ///
    /// The menu is opened for the check and dismissed afterwards, also when
    /// the check fails. A lookup failure wins over a failed dismissal.
    pub fn is_sub_command_disabled(
        &self,
        row: &str,
        command: &str,
        sub_command: &str,
    ) -> PilotResult<bool> {
        let outcome = self
            .open_command(row, command)
            .and_then(|()| self.read_disabled_flag(row, command, sub_command));
        let dismissed = self.dismiss_menu(row);
        let disabled = outcome?;
        dismissed?;
        Ok(disabled)
    }

    fn read_disabled_flag(&self, row: &str, command: &str, sub_command: &str) -> PilotResult<bool> {
        let not_found = || PilotError::SubCommandNotFound {
            name: sub_command.to_string(),
        };
        let Some(buttons) = self.sub_menu_buttons()? else {
            self.observer.on_event(&DiagnosticEvent::SubMenuEmpty {
                row: row.to_string(),
                command: command.to_string(),
            });
            return Err(not_found());
        };
        let button = find_by_text(buttons, sub_command, NameMatch::Equals).ok_or_else(not_found)?;
        is_flag_set(&button, &self.references.disabled_attribute)
    }

    /// Close the more-commands menu by toggling `row`'s button; no-op when no
    /// menu is rendered
    fn dismiss_menu(&self, row: &str) -> PilotResult<()> {
        if self
            .locator
            .find_all(&self.references.more_commands_container)?
            .is_empty()
        {
            return Ok(());
        }
        self.find_row(row)?
            .find(&self.references.more_commands_button)?
            .click()?;
        tracing::debug!(event = "mda.menu.dismissed", row = row);
        Ok(())
    }
}
