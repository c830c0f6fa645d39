//! mda-pilot: page-object automation for model-driven app grids
//!
//! Drives the solutions grid of a model-driven business app: selecting
//! records, walking the per-row "more commands" menu, and waiting for a
//! background job to report its results through the row's status column.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  ModelDrivenAppsPage (steps)                  │
//! ├──────────────────────────────────────────────────────────────┤
//! │  RowCommandInvoker     StatusPoller ──► RowStatusReader       │
//! │        │                    │                 │              │
//! │        ▼                    ▼                 ▼              │
//! │   ElementLocator       Waiter + Clock    ElementLocator      │
//! ├──────────────────────────────────────────────────────────────┤
//! │     FakeGrid (in-memory)   │   ChromiumLocator (browser)      │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Deterministic and system time sources
pub mod clock;

/// Row selection and more-commands menu traversal
pub mod commands;

/// Page configuration and element references
pub mod config;

/// Named step execution with think time
pub mod execute;

/// In-memory grid for tests and offline runs
pub mod fake;

/// Element location capability
pub mod locator;

/// Structured diagnostics
pub mod observer;

/// The model-driven apps page object
pub mod page_object;

/// Error types
pub mod result;

/// Row status reading and polling
pub mod status;

/// Bounded polling primitive
pub mod wait;

/// Live browser locator (CDP)
#[cfg(feature = "browser")]
pub mod chromium;

pub use clock::{Clock, FakeClock, SystemClock};
pub use commands::{ClickOutcome, RowCommandInvoker};
pub use config::{DownloadSettings, ElementReferences, PilotConfig, StatusMarkers};
pub use execute::{execute, CommandOptions, CommandResult};
pub use fake::{CommandFixture, FakeElement, FakeGrid, GridFixture, RowFixture, SubCommandFixture};
pub use locator::{ElementLocator, NameMatch, Selector, UiElement};
pub use observer::{DiagnosticEvent, DiagnosticObserver, RecordingObserver, TracingObserver};
pub use page_object::{ModelDrivenAppsPage, PageObject};
pub use result::{PilotError, PilotResult};
pub use status::{GridStatusReader, RowStatusReader, StatusPoller};
pub use wait::{WaitOptions, WaitResult, Waiter, MIN_POLL_INTERVAL_MS};

#[cfg(feature = "browser")]
pub use chromium::{ChromiumElement, ChromiumLocator, ChromiumSession, ChromiumSettings};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        ElementLocator, ModelDrivenAppsPage, PageObject, PilotConfig, PilotError, PilotResult,
        RowStatusReader, Selector, UiElement,
    };
}
