//! Structured diagnostics.
//!
//! Lookups that miss, and failures the poller swallows, are reported as
//! [`DiagnosticEvent`]s to an injected [`DiagnosticObserver`] instead of being
//! printed.

use serde::Serialize;
use std::sync::Mutex;

/// Something worth knowing that did not fail the calling step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticEvent {
    /// No status row matched the requested name
    RowNotFound {
        /// Requested row
        row: String,
    },
    /// Sub-menu lookup returned no container
    SubMenuEmpty {
        /// Row whose menu was opened
        row: String,
        /// Command that should have opened the sub-menu
        command: String,
    },
    /// A status read failed in a way that may clear up
    TransientReadFailure {
        /// Row being polled
        row: String,
        /// Error text
        error: String,
    },
    /// A status read produced a value
    StatusObserved {
        /// Row being polled
        row: String,
        /// Status text read
        status: String,
    },
    /// Polling ran out of time
    PollTimedOut {
        /// Row being polled
        row: String,
        /// Effective timeout
        timeout_ms: u64,
    },
    /// Polling stopped on a non-transient failure
    PollAborted {
        /// Row being polled
        row: String,
        /// Error text
        error: String,
    },
    /// A sub-command was left alone because it is disabled
    SubCommandSkipped {
        /// Sub-command label
        sub_command: String,
    },
}

/// Receiver of diagnostic events
pub trait DiagnosticObserver: Send + Sync + std::fmt::Debug {
    /// Handle one event
    fn on_event(&self, event: &DiagnosticEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DiagnosticObserver for TracingObserver {
    fn on_event(&self, event: &DiagnosticEvent) {
        match event {
            DiagnosticEvent::RowNotFound { row } => {
                tracing::warn!(event = "mda.status.row_not_found", row = %row);
            }
            DiagnosticEvent::SubMenuEmpty { row, command } => {
                tracing::warn!(event = "mda.menu.sub_menu_empty", row = %row, command = %command);
            }
            DiagnosticEvent::TransientReadFailure { row, error } => {
                tracing::debug!(event = "mda.poll.transient_failure", row = %row, error = %error);
            }
            DiagnosticEvent::StatusObserved { row, status } => {
                tracing::debug!(event = "mda.poll.status_observed", row = %row, status = %status);
            }
            DiagnosticEvent::PollTimedOut { row, timeout_ms } => {
                tracing::info!(event = "mda.poll.timed_out", row = %row, timeout_ms = timeout_ms);
            }
            DiagnosticEvent::PollAborted { row, error } => {
                tracing::warn!(event = "mda.poll.aborted", row = %row, error = %error);
            }
            DiagnosticEvent::SubCommandSkipped { sub_command } => {
                tracing::info!(event = "mda.menu.sub_command_disabled", sub_command = %sub_command);
            }
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl RecordingObserver {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events
    #[must_use]
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Count events matching a predicate
    #[must_use]
    pub fn count(&self, predicate: impl Fn(&DiagnosticEvent) -> bool) -> usize {
        self.events().iter().filter(|e| predicate(e)).count()
    }
}

impl DiagnosticObserver for RecordingObserver {
    fn on_event(&self, event: &DiagnosticEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_keeps_order() {
        let observer = RecordingObserver::new();
        observer.on_event(&DiagnosticEvent::RowNotFound { row: "a".into() });
        observer.on_event(&DiagnosticEvent::PollTimedOut {
            row: "a".into(),
            timeout_ms: 10,
        });

        let events = observer.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], DiagnosticEvent::RowNotFound { .. }));
        assert_eq!(
            observer.count(|e| matches!(e, DiagnosticEvent::PollTimedOut { .. })),
            1
        );
    }

    #[test]
    fn test_event_serializes_with_kind_tag() {
        let json = serde_json::to_value(DiagnosticEvent::SubCommandSkipped {
            sub_command: "Run".into(),
        })
        .unwrap();
        assert_eq!(json["kind"], "sub_command_skipped");
        assert_eq!(json["sub_command"], "Run");
    }

    #[test]
    fn test_tracing_observer_accepts_every_event() {
        let observer = TracingObserver;
        observer.on_event(&DiagnosticEvent::SubMenuEmpty {
            row: "r".into(),
            command: "c".into(),
        });
        observer.on_event(&DiagnosticEvent::StatusObserved {
            row: "r".into(),
            status: "Running".into(),
        });
    }
}
