//! Result and error types for mda-pilot.

use thiserror::Error;

/// Result type for mda-pilot operations
pub type PilotResult<T> = Result<T, PilotError>;

/// Errors that can occur while driving a model-driven app page
#[derive(Debug, Error)]
pub enum PilotError {
    /// No grid row matches the requested display name
    #[error("No record with the name '{name}' exists in the grid.")]
    RowNotFound {
        /// Requested row name
        name: String,
    },

    /// Row index past the end of the grid
    #[error("Row index {index} is out of range (grid has {count} rows)")]
    RowIndexOutOfRange {
        /// Requested index
        index: usize,
        /// Rows currently rendered
        count: usize,
    },

    /// Command missing from the more-commands menu
    #[error("No command with the name '{name}' exists inside of Commandbar.")]
    CommandNotFound {
        /// Requested command
        name: String,
    },

    /// Sub-command missing from the opened sub-menu
    #[error("No subButton with the name '{name}' exists inside of the More Commands menu.")]
    SubCommandNotFound {
        /// Requested sub-command
        name: String,
    },

    /// Sub-command was expected to be disabled but is enabled
    #[error("SubButton '{name}' should not be visible.")]
    SubCommandEnabled {
        /// Sub-command label
        name: String,
    },

    /// Selector matched nothing
    #[error("Element not found: {selector}")]
    ElementNotFound {
        /// Selector that missed
        selector: String,
    },

    /// Element handle no longer attached to the page
    #[error("Stale element: {message}")]
    StaleElement {
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Selector kind not supported by the active driver
    #[error("Unsupported selector for this driver: {selector}")]
    UnsupportedSelector {
        /// Selector description
        selector: String,
    },

    /// Driver-level failure (connection, protocol)
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PilotError {
    /// Create a row-not-found error
    #[must_use]
    pub fn row_not_found(name: impl Into<String>) -> Self {
        Self::RowNotFound { name: name.into() }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the failure may clear up on a later read.
    ///
    /// Grids re-render while background jobs run, so rows and cells can
    /// briefly vanish or detach.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RowNotFound { .. }
                | Self::ElementNotFound { .. }
                | Self::StaleElement { .. }
                | Self::Timeout { .. }
        )
    }
}
