//! Row status reading and status-change polling.
//!
//! A background job (for example a solution check) only reports progress
//! through the status column of its grid row. [`StatusPoller`] re-reads that
//! column until the status moves away from a baseline to a value carrying
//! the ready marker.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::{ElementReferences, DEFAULT_STATUS_POLL_MS, DEFAULT_STATUS_WAIT_CAP_SECS};
use crate::locator::{contains_ignore_case, ElementLocator, NameMatch, UiElement};
use crate::observer::{DiagnosticEvent, DiagnosticObserver, TracingObserver};
use crate::result::{PilotError, PilotResult};
use crate::wait::{WaitOptions, Waiter};

/// Source of the current status text for a named row
pub trait RowStatusReader {
    /// Current status of `row_name`, or [`PilotError::RowNotFound`]
    fn get_status(&self, row_name: &str) -> PilotResult<String>;
}

impl<T: RowStatusReader + ?Sized> RowStatusReader for &T {
    fn get_status(&self, row_name: &str) -> PilotResult<String> {
        (**self).get_status(row_name)
    }
}

/// Reads status from the grid's name and status columns.
///
/// The two columns are queried separately and paired by index; the first
/// name cell containing the row name (ignoring case) wins.
#[derive(Debug)]
pub struct GridStatusReader<'a, L> {
    locator: &'a L,
    references: &'a ElementReferences,
    observer: &'a dyn DiagnosticObserver,
}

impl<'a, L: ElementLocator> GridStatusReader<'a, L> {
    /// Create a reader over `locator`
    pub fn new(
        locator: &'a L,
        references: &'a ElementReferences,
        observer: &'a dyn DiagnosticObserver,
    ) -> Self {
        Self {
            locator,
            references,
            observer,
        }
    }
}

impl<L: ElementLocator> RowStatusReader for GridStatusReader<'_, L> {
    fn get_status(&self, row_name: &str) -> PilotResult<String> {
        let names = self.locator.find_all(&self.references.name_column)?;
        let statuses = self.locator.find_all(&self.references.status_column)?;

        let mut row_index = None;
        for (index, cell) in names.iter().enumerate() {
            if NameMatch::Contains.matches(&cell.text()?, row_name) {
                row_index = Some(index);
                break;
            }
        }

        match row_index.and_then(|index| statuses.get(index)) {
            Some(cell) => cell.text(),
            None => {
                self.observer.on_event(&DiagnosticEvent::RowNotFound {
                    row: row_name.to_string(),
                });
                Err(PilotError::row_not_found(row_name))
            }
        }
    }
}

/// Blocks until a row's status changes to a ready value
#[derive(Debug)]
pub struct StatusPoller<R> {
    reader: R,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn DiagnosticObserver>,
    poll_interval_ms: u64,
    wait_cap_secs: u64,
    ready_marker: String,
}

impl<R: RowStatusReader> StatusPoller<R> {
    /// Create a poller with the default cadence, cap and "Results" marker
    pub fn new(reader: R, clock: Arc<dyn Clock>) -> Self {
        Self {
            reader,
            clock,
            observer: Arc::new(TracingObserver),
            poll_interval_ms: DEFAULT_STATUS_POLL_MS,
            wait_cap_secs: DEFAULT_STATUS_WAIT_CAP_SECS,
            ready_marker: "Results".to_string(),
        }
    }

    /// Report diagnostics to `observer`
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn DiagnosticObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Set the read cadence
    #[must_use]
    pub const fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set the hard cap applied to every requested wait
    #[must_use]
    pub const fn with_wait_cap(mut self, secs: u64) -> Self {
        self.wait_cap_secs = secs;
        self
    }

    /// Set the substring that marks a ready status
    #[must_use]
    pub fn with_ready_marker(mut self, marker: impl Into<String>) -> Self {
        self.ready_marker = marker.into();
        self
    }

    /// Poll until the status of `row_name` differs from `baseline_status`
    /// and contains the ready marker.
    ///
    /// Returns `false` when the wait (bounded by the cap) runs out, or when a
    /// read fails in a way that will not clear up. Transient read failures
    /// only delay the outcome.
    pub fn wait_for_status_change(
        &self,
        row_name: &str,
        baseline_status: &str,
        max_wait_seconds: u64,
    ) -> bool {
        let options = WaitOptions::new()
            .with_timeout(max_wait_seconds.saturating_mul(1_000))
            .with_poll_interval(self.poll_interval_ms)
            .capped(self.wait_cap_secs.saturating_mul(1_000));
        let timeout_ms = options.timeout_ms;
        let waiter = Waiter::new(self.clock.clone(), options);

        tracing::debug!(
            event = "mda.poll.started",
            row = row_name,
            baseline = baseline_status,
            timeout_ms = timeout_ms,
        );

        let outcome = waiter.until(
            &format!("status change of '{row_name}'"),
            || {
                let status = self.reader.get_status(row_name)?;
                self.observer.on_event(&DiagnosticEvent::StatusObserved {
                    row: row_name.to_string(),
                    status: status.clone(),
                });
                let changed = status != baseline_status
                    && contains_ignore_case(&status, &self.ready_marker);
                Ok(changed.then_some(status))
            },
            |err| {
                self.observer.on_event(&DiagnosticEvent::TransientReadFailure {
                    row: row_name.to_string(),
                    error: err.to_string(),
                });
            },
        );

        match outcome {
            Ok(result) => {
                tracing::info!(
                    event = "mda.poll.completed",
                    row = row_name,
                    status = %result.value,
                    attempts = result.attempts,
                    elapsed_ms = result.elapsed.as_millis() as u64,
                );
                true
            }
            Err(PilotError::Timeout { ms }) => {
                self.observer.on_event(&DiagnosticEvent::PollTimedOut {
                    row: row_name.to_string(),
                    timeout_ms: ms,
                });
                false
            }
            Err(err) => {
                self.observer.on_event(&DiagnosticEvent::PollAborted {
                    row: row_name.to_string(),
                    error: err.to_string(),
                });
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::fake::{FakeGrid, GridFixture, RowFixture};
    use crate::observer::RecordingObserver;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::time::Duration;

    #[derive(Debug, Clone)]
    enum Step {
        Status(&'static str),
        Missing,
        Broken,
    }

    /// Replays a fixed sequence of reads; the last step repeats
    #[derive(Debug)]
    struct ScriptedReader {
        steps: RefCell<VecDeque<Step>>,
        reads: RefCell<usize>,
    }

    impl ScriptedReader {
        fn new(steps: &[Step]) -> Self {
            Self {
                steps: RefCell::new(steps.iter().cloned().collect()),
                reads: RefCell::new(0),
            }
        }

        fn reads(&self) -> usize {
            *self.reads.borrow()
        }
    }

    impl RowStatusReader for ScriptedReader {
        fn get_status(&self, row_name: &str) -> PilotResult<String> {
            *self.reads.borrow_mut() += 1;
            let mut steps = self.steps.borrow_mut();
            let step = if steps.len() > 1 {
                steps.pop_front().unwrap()
            } else {
                steps.front().cloned().unwrap()
            };
            match step {
                Step::Status(s) => Ok(s.to_string()),
                Step::Missing => Err(PilotError::row_not_found(row_name)),
                Step::Broken => Err(PilotError::driver("connection reset")),
            }
        }
    }

    fn poller<'a>(
        reader: &'a ScriptedReader,
        clock: &Arc<FakeClock>,
        observer: &Arc<RecordingObserver>,
    ) -> StatusPoller<&'a ScriptedReader> {
        StatusPoller::new(reader, clock.clone()).with_observer(observer.clone())
    }

    mod poller_tests {
        use super::*;

        #[test]
        fn test_returns_true_after_third_read() {
            let reader = ScriptedReader::new(&[
                Step::Status("Running"),
                Step::Status("Running"),
                Step::Status("Results Ready"),
            ]);
            let clock = Arc::new(FakeClock::new());
            let observer = Arc::new(RecordingObserver::new());

            assert!(poller(&reader, &clock, &observer).wait_for_status_change("MySolution", "Running", 60));
            assert_eq!(reader.reads(), 3);
            assert_eq!(clock.now(), Duration::from_millis(1_000));
        }

        #[test]
        fn test_times_out_without_marker() {
            let reader = ScriptedReader::new(&[Step::Status("Running")]);
            let clock = Arc::new(FakeClock::new());
            let observer = Arc::new(RecordingObserver::new());

            assert!(!poller(&reader, &clock, &observer).wait_for_status_change("MySolution", "Running", 10));
            assert!(clock.now() >= Duration::from_secs(10));
            assert!(clock.now() <= Duration::from_millis(10_500));
            assert_eq!(
                observer.count(|e| matches!(e, DiagnosticEvent::PollTimedOut { timeout_ms: 10_000, .. })),
                1
            );
        }

        #[test]
        fn test_changed_status_without_marker_keeps_polling() {
            let reader = ScriptedReader::new(&[Step::Status("Running"), Step::Status("Queued")]);
            let clock = Arc::new(FakeClock::new());
            let observer = Arc::new(RecordingObserver::new());

            assert!(!poller(&reader, &clock, &observer).wait_for_status_change("s", "Running", 2));
        }

        #[test]
        fn test_transient_failures_are_swallowed() {
            let reader = ScriptedReader::new(&[Step::Missing]);
            let clock = Arc::new(FakeClock::new());
            let observer = Arc::new(RecordingObserver::new());

            assert!(!poller(&reader, &clock, &observer).wait_for_status_change("gone", "Running", 3));
            assert!(clock.now() <= Duration::from_millis(3_500));
            assert_eq!(
                observer.count(|e| matches!(e, DiagnosticEvent::TransientReadFailure { .. })),
                reader.reads()
            );
        }

        #[test]
        fn test_transient_gap_then_ready() {
            let reader = ScriptedReader::new(&[
                Step::Status("Running"),
                Step::Missing,
                Step::Status("Results available"),
            ]);
            let clock = Arc::new(FakeClock::new());
            let observer = Arc::new(RecordingObserver::new());

            assert!(poller(&reader, &clock, &observer).wait_for_status_change("s", "Running", 30));
            assert_eq!(reader.reads(), 3);
        }

        #[test]
        fn test_marker_equal_to_baseline_is_not_a_change() {
            let reader = ScriptedReader::new(&[Step::Status("Results Ready")]);
            let clock = Arc::new(FakeClock::new());
            let observer = Arc::new(RecordingObserver::new());

            assert!(!poller(&reader, &clock, &observer).wait_for_status_change("s", "Results Ready", 2));
        }

        #[test]
        fn test_marker_match_ignores_case() {
            let reader = ScriptedReader::new(&[Step::Status("RESULTS pending download")]);
            let clock = Arc::new(FakeClock::new());
            let observer = Arc::new(RecordingObserver::new());

            assert!(poller(&reader, &clock, &observer).wait_for_status_change("s", "Running", 2));
        }

        #[test]
        fn test_wait_is_capped() {
            let reader = ScriptedReader::new(&[Step::Status("Running")]);
            let clock = Arc::new(FakeClock::new());
            let observer = Arc::new(RecordingObserver::new());

            let capped = poller(&reader, &clock, &observer).with_wait_cap(5);
            assert!(!capped.wait_for_status_change("s", "Running", 3_600));
            assert!(clock.now() <= Duration::from_millis(5_500));
        }

        #[test]
        fn test_permanent_failure_returns_false() {
            let reader = ScriptedReader::new(&[Step::Broken]);
            let clock = Arc::new(FakeClock::new());
            let observer = Arc::new(RecordingObserver::new());

            assert!(!poller(&reader, &clock, &observer).wait_for_status_change("s", "Running", 60));
            assert_eq!(reader.reads(), 1);
            assert_eq!(
                observer.count(|e| matches!(e, DiagnosticEvent::PollAborted { .. })),
                1
            );
        }

        #[test]
        fn test_custom_marker_and_interval() {
            let reader = ScriptedReader::new(&[Step::Status("Running"), Step::Status("Done")]);
            let clock = Arc::new(FakeClock::new());
            let observer = Arc::new(RecordingObserver::new());

            let custom = poller(&reader, &clock, &observer)
                .with_ready_marker("done")
                .with_poll_interval(100);
            assert!(custom.wait_for_status_change("s", "Running", 5));
            assert_eq!(clock.now(), Duration::from_millis(100));
        }
    }

    mod grid_reader_tests {
        use super::*;

        fn grid() -> FakeGrid {
            FakeGrid::new(
                GridFixture::new()
                    .with_row(RowFixture::new("Contoso Core").with_statuses(["Running"]))
                    .with_row(RowFixture::new("MySolution").with_statuses(["Results Ready"])),
                ElementReferences::default(),
            )
        }

        #[test]
        fn test_reads_status_by_contains_ignoring_case() {
            let grid = grid();
            let references = ElementReferences::default();
            let observer = RecordingObserver::new();
            let reader = GridStatusReader::new(&grid, &references, &observer);

            assert_eq!(reader.get_status("mysolution").unwrap(), "Results Ready");
            assert_eq!(reader.get_status("contoso").unwrap(), "Running");
        }

        #[test]
        fn test_missing_row_is_row_not_found() {
            let grid = grid();
            let references = ElementReferences::default();
            let observer = RecordingObserver::new();
            let reader = GridStatusReader::new(&grid, &references, &observer);

            let err = reader.get_status("Fabrikam").unwrap_err();
            assert!(matches!(err, PilotError::RowNotFound { ref name } if name == "Fabrikam"));
            assert_eq!(
                observer.events(),
                vec![DiagnosticEvent::RowNotFound {
                    row: "Fabrikam".into()
                }]
            );
        }

        #[test]
        fn test_polls_a_fake_grid_end_to_end() {
            let grid = FakeGrid::new(
                GridFixture::new().with_row(RowFixture::new("MySolution").with_script([
                    Some("Running"),
                    None,
                    Some("Running"),
                    Some("Results Ready"),
                ])),
                ElementReferences::default(),
            );
            let references = ElementReferences::default();
            let recorder = Arc::new(RecordingObserver::new());
            let reader = GridStatusReader::new(&grid, &references, recorder.as_ref());
            let clock = Arc::new(FakeClock::new());

            let poller = StatusPoller::new(reader, clock.clone()).with_observer(recorder.clone());
            assert!(poller.wait_for_status_change("MySolution", "Running", 60));
            assert_eq!(clock.now(), Duration::from_millis(1_500));
        }
    }
}
