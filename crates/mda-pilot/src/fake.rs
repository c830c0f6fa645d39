//! In-memory model-driven grid.
//!
//! [`FakeGrid`] implements [`ElementLocator`] over a [`GridFixture`]: rows
//! with scripted status sequences, plus a more-commands menu whose commands
//! may open sub-menus. It answers the selectors of an
//! [`ElementReferences`] set and records every click, so page steps can be
//! exercised without a browser.
//!
//! Each query of the name column is one "render": every row advances one
//! step through its status script (the last step repeats). A `None` step
//! hides the row for that render.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::ElementReferences;
use crate::locator::{ElementLocator, Selector, UiElement};
use crate::result::{PilotError, PilotResult};

// =============================================================================
// FIXTURE
// =============================================================================

/// Grid content for a [`FakeGrid`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridFixture {
    /// Grid rows in display order
    pub rows: Vec<RowFixture>,
    /// Commands shown in every row's more-commands menu
    pub commands: Vec<CommandFixture>,
}

impl GridFixture {
    /// Create an empty fixture
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row
    #[must_use]
    pub fn with_row(mut self, row: RowFixture) -> Self {
        self.rows.push(row);
        self
    }

    /// Add a command
    #[must_use]
    pub fn with_command(mut self, command: CommandFixture) -> Self {
        self.commands.push(command);
        self
    }

    /// Parse a YAML fixture
    pub fn from_yaml_str(yaml: &str) -> PilotResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load a YAML fixture file
    pub fn from_path(path: impl AsRef<Path>) -> PilotResult<Self> {
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }
}

/// One grid row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFixture {
    /// Display name
    pub name: String,
    /// Status per render; `null` hides the row for that render
    #[serde(default)]
    pub statuses: Vec<Option<String>>,
}

impl RowFixture {
    /// Create a row with an empty status
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            statuses: Vec::new(),
        }
    }

    /// Status sequence where the row is always present
    #[must_use]
    pub fn with_statuses<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.statuses = statuses.into_iter().map(|s| Some(s.into())).collect();
        self
    }

    /// Status sequence with gaps
    #[must_use]
    pub fn with_script<I, S>(mut self, script: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.statuses = script.into_iter().map(|s| s.map(Into::into)).collect();
        self
    }
}

/// A more-commands menu entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFixture {
    /// Button label
    pub label: String,
    /// Rendered with `aria-disabled="true"`
    #[serde(default)]
    pub disabled: bool,
    /// Entries of the sub-menu this command opens
    #[serde(default)]
    pub sub_commands: Vec<SubCommandFixture>,
}

impl CommandFixture {
    /// Create an enabled command without a sub-menu
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            disabled: false,
            sub_commands: Vec::new(),
        }
    }

    /// Add a sub-command
    #[must_use]
    pub fn with_sub_command(mut self, label: impl Into<String>, disabled: bool) -> Self {
        self.sub_commands.push(SubCommandFixture {
            label: label.into(),
            disabled,
        });
        self
    }
}

/// A sub-menu entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCommandFixture {
    /// Button label
    pub label: String,
    /// Rendered with `aria-disabled="true"`
    #[serde(default)]
    pub disabled: bool,
}

// =============================================================================
// GRID STATE
// =============================================================================

#[derive(Debug)]
struct RowState {
    name: String,
    script: Vec<Option<String>>,
    renders: usize,
    current: Option<String>,
}

impl RowState {
    fn new(fixture: RowFixture) -> Self {
        let current = fixture
            .statuses
            .first()
            .cloned()
            .unwrap_or_else(|| Some(String::new()));
        Self {
            name: fixture.name,
            script: fixture.statuses,
            renders: 0,
            current,
        }
    }

    fn render(&mut self) {
        if let Some(last) = self.script.len().checked_sub(1) {
            self.current = self.script[self.renders.min(last)].clone();
        }
        self.renders += 1;
    }

    const fn visible(&self) -> bool {
        self.current.is_some()
    }
}

#[derive(Debug)]
struct GridState {
    references: ElementReferences,
    rows: Vec<RowState>,
    commands: Vec<CommandFixture>,
    selected: Option<String>,
    menu_row: Option<usize>,
    sub_menu: Option<usize>,
    clicks: Vec<String>,
    renders: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    RowCell(usize),
    NameCell(usize),
    StatusCell(usize),
    MoreCommandsButton(usize),
    Menu,
    CommandButton(usize),
    SubMenu(usize),
    SubButton(usize, usize),
}

impl GridState {
    fn visible_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.visible())
            .map(|(index, _)| index)
    }

    fn row(&self, index: usize) -> PilotResult<&RowState> {
        self.rows
            .get(index)
            .filter(|row| row.visible())
            .ok_or_else(|| PilotError::StaleElement {
                message: format!("grid row {index} is no longer rendered"),
            })
    }

    fn command(&self, index: usize) -> PilotResult<&CommandFixture> {
        if self.menu_row.is_none() {
            return Err(PilotError::StaleElement {
                message: "more-commands menu is closed".to_string(),
            });
        }
        self.commands
            .get(index)
            .ok_or_else(|| PilotError::StaleElement {
                message: format!("command {index} is no longer rendered"),
            })
    }

    fn sub_command(&self, command: usize, index: usize) -> PilotResult<&SubCommandFixture> {
        if self.sub_menu != Some(command) {
            return Err(PilotError::StaleElement {
                message: "sub-menu is closed".to_string(),
            });
        }
        self.command(command)?
            .sub_commands
            .get(index)
            .ok_or_else(|| PilotError::StaleElement {
                message: format!("sub-command {index} is no longer rendered"),
            })
    }

    fn query(&mut self, selector: &Selector) -> Vec<Node> {
        let refs = &self.references;
        if *selector == refs.cells_container {
            self.visible_rows().map(Node::RowCell).collect()
        } else if *selector == refs.name_column {
            self.renders += 1;
            for row in &mut self.rows {
                row.render();
            }
            self.visible_rows().map(Node::NameCell).collect()
        } else if *selector == refs.status_column {
            self.visible_rows().map(Node::StatusCell).collect()
        } else if *selector == refs.more_commands_container {
            self.menu_row.map(|_| Node::Menu).into_iter().collect()
        } else if *selector == refs.sub_button_container {
            match (self.menu_row, self.sub_menu) {
                (Some(_), Some(command)) => vec![Node::Menu, Node::SubMenu(command)],
                (Some(_), None) => vec![Node::Menu],
                _ => Vec::new(),
            }
        } else {
            Vec::new()
        }
    }

    fn query_within(&self, node: Node, selector: &Selector) -> PilotResult<Vec<Node>> {
        let refs = &self.references;
        match node {
            Node::RowCell(row) if *selector == refs.more_commands_button => {
                self.row(row)?;
                Ok(vec![Node::MoreCommandsButton(row)])
            }
            Node::Menu if *selector == refs.menu_button => {
                if self.menu_row.is_none() {
                    return Err(PilotError::StaleElement {
                        message: "more-commands menu is closed".to_string(),
                    });
                }
                Ok((0..self.commands.len()).map(Node::CommandButton).collect())
            }
            Node::SubMenu(command) if *selector == refs.menu_button => {
                let count = self.command(command)?.sub_commands.len();
                Ok((0..count).map(|i| Node::SubButton(command, i)).collect())
            }
            _ => Ok(Vec::new()),
        }
    }

    fn text(&self, node: Node) -> PilotResult<String> {
        match node {
            Node::RowCell(row) | Node::NameCell(row) => Ok(self.row(row)?.name.clone()),
            Node::StatusCell(row) => Ok(self.row(row)?.current.clone().unwrap_or_default()),
            Node::MoreCommandsButton(row) => {
                self.row(row)?;
                Ok(String::new())
            }
            Node::Menu | Node::SubMenu(_) => Ok(String::new()),
            Node::CommandButton(command) => Ok(self.command(command)?.label.clone()),
            Node::SubButton(command, index) => Ok(self.sub_command(command, index)?.label.clone()),
        }
    }

    fn disabled(&self, node: Node) -> PilotResult<Option<bool>> {
        match node {
            Node::CommandButton(command) => Ok(Some(self.command(command)?.disabled)),
            Node::SubButton(command, index) => Ok(Some(self.sub_command(command, index)?.disabled)),
            _ => Ok(None),
        }
    }

    fn click(&mut self, node: Node) -> PilotResult<()> {
        match node {
            Node::RowCell(row) | Node::NameCell(row) => {
                let name = self.row(row)?.name.clone();
                self.clicks.push(format!("select:{name}"));
                self.selected = Some(name);
            }
            Node::StatusCell(row) => {
                self.row(row)?;
            }
            Node::MoreCommandsButton(row) => {
                let name = self.row(row)?.name.clone();
                self.clicks.push(format!("more:{name}"));
                self.menu_row = if self.menu_row == Some(row) {
                    None
                } else {
                    Some(row)
                };
                self.sub_menu = None;
            }
            Node::Menu | Node::SubMenu(_) => {}
            Node::CommandButton(command) => {
                let fixture = self.command(command)?;
                let label = fixture.label.clone();
                let opens_sub_menu = !fixture.sub_commands.is_empty();
                self.clicks.push(format!("command:{label}"));
                if opens_sub_menu && self.sub_menu != Some(command) {
                    self.sub_menu = Some(command);
                } else {
                    self.menu_row = None;
                    self.sub_menu = None;
                }
            }
            Node::SubButton(command, index) => {
                let fixture = self.sub_command(command, index)?;
                let label = fixture.label.clone();
                let disabled = fixture.disabled;
                self.clicks.push(format!("sub:{label}"));
                if !disabled {
                    self.menu_row = None;
                    self.sub_menu = None;
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// LOCATOR
// =============================================================================

/// In-memory grid page
#[derive(Debug, Clone)]
pub struct FakeGrid {
    state: Arc<Mutex<GridState>>,
}

impl FakeGrid {
    /// Build a grid answering the selectors in `references`
    #[must_use]
    pub fn new(fixture: GridFixture, references: ElementReferences) -> Self {
        let state = GridState {
            references,
            rows: fixture.rows.into_iter().map(RowState::new).collect(),
            commands: fixture.commands,
            selected: None,
            menu_row: None,
            sub_menu: None,
            clicks: Vec::new(),
            renders: 0,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> PilotResult<MutexGuard<'_, GridState>> {
        lock(&self.state)
    }

    /// Every click so far, as `select:<row>`, `more:<row>`,
    /// `command:<label>` or `sub:<label>`
    #[must_use]
    pub fn clicks(&self) -> Vec<String> {
        self.lock().map(|s| s.clicks.clone()).unwrap_or_default()
    }

    /// Name of the last selected row
    #[must_use]
    pub fn selected_row(&self) -> Option<String> {
        self.lock().ok().and_then(|s| s.selected.clone())
    }

    /// Whether a more-commands menu is open
    #[must_use]
    pub fn menu_open(&self) -> bool {
        self.lock().map(|s| s.menu_row.is_some()).unwrap_or(false)
    }

    /// Number of name-column renders so far
    #[must_use]
    pub fn renders(&self) -> usize {
        self.lock().map(|s| s.renders).unwrap_or(0)
    }
}

fn lock(state: &Mutex<GridState>) -> PilotResult<MutexGuard<'_, GridState>> {
    state
        .lock()
        .map_err(|_| PilotError::driver("fake grid state poisoned"))
}

impl ElementLocator for FakeGrid {
    type Element = FakeElement;

    fn find_all(&self, selector: &Selector) -> PilotResult<Vec<FakeElement>> {
        let nodes = self.lock()?.query(selector);
        Ok(nodes
            .into_iter()
            .map(|node| FakeElement {
                state: Arc::clone(&self.state),
                node,
            })
            .collect())
    }
}

/// Element handle into a [`FakeGrid`]
#[derive(Debug, Clone)]
pub struct FakeElement {
    state: Arc<Mutex<GridState>>,
    node: Node,
}

impl UiElement for FakeElement {
    fn text(&self) -> PilotResult<String> {
        lock(&self.state)?.text(self.node)
    }

    fn attribute(&self, name: &str) -> PilotResult<Option<String>> {
        let state = lock(&self.state)?;
        if name != state.references.disabled_attribute {
            return Ok(None);
        }
        Ok(state.disabled(self.node)?.map(|d| d.to_string()))
    }

    fn click(&self) -> PilotResult<()> {
        lock(&self.state)?.click(self.node)
    }

    fn find_all(&self, selector: &Selector) -> PilotResult<Vec<Self>> {
        let nodes = lock(&self.state)?.query_within(self.node, selector)?;
        Ok(nodes
            .into_iter()
            .map(|node| Self {
                state: Arc::clone(&self.state),
                node,
            })
            .collect())
    }
}
