//! Wait Mechanisms
//!
//! Condition-poll-timeout loop shared by every wait in the crate.
//!
//! ## Toyota Way Application
//!
//! - **Jidoka**: Permanent failures stop the loop at once
//! - **Poka-Yoke**: Transient failures are an enumerated set, not a catch-all
//! - **Muda**: One poll cadence, one timeout, no nested waits

use crate::clock::Clock;
use crate::result::{PilotError, PilotResult};
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (500ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Shortest polling interval a [`Waiter`] will use
pub const MIN_POLL_INTERVAL_MS: u64 = 1;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Clamp the timeout to at most `cap_ms`
    #[must_use]
    pub fn capped(mut self, cap_ms: u64) -> Self {
        self.timeout_ms = self.timeout_ms.min(cap_ms);
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult<T> {
    /// Value produced by the satisfied condition
    pub value: T,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of times the condition was evaluated
    pub attempts: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

// =============================================================================
// WAITER IMPLEMENTATION
// =============================================================================

/// Polls a condition on a fixed cadence until it yields a value or times out
#[derive(Debug, Clone)]
pub struct Waiter {
    clock: Arc<dyn Clock>,
    options: WaitOptions,
}

impl Waiter {
    /// Create a waiter on the given clock.
    ///
    /// A zero poll interval is raised to [`MIN_POLL_INTERVAL_MS`] so every
    /// retry moves the clock forward.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, mut options: WaitOptions) -> Self {
        options.poll_interval_ms = options.poll_interval_ms.max(MIN_POLL_INTERVAL_MS);
        Self { clock, options }
    }

    /// Options in effect
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Poll `action` until it returns `Ok(Some(_))`.
    ///
    /// `Ok(None)` means "not yet". Errors for which
    /// [`PilotError::is_transient`] holds are handed to `on_transient` and
    /// polling continues; any other error ends the wait and is returned.
    /// The first evaluation happens immediately. Expiry yields
    /// [`PilotError::Timeout`].
    pub fn until<T, F, R>(
        &self,
        waited_for: &str,
        mut action: F,
        mut on_transient: R,
    ) -> PilotResult<WaitResult<T>>
    where
        F: FnMut() -> PilotResult<Option<T>>,
        R: FnMut(&PilotError),
    {
        let start = self.clock.now();
        let timeout = self.options.timeout();
        let mut attempts = 0u32;

        loop {
            attempts = attempts.saturating_add(1);
            match action() {
                Ok(Some(value)) => {
                    return Ok(WaitResult {
                        value,
                        elapsed: self.clock.now().saturating_sub(start),
                        attempts,
                        waited_for: waited_for.to_string(),
                    });
                }
                Ok(None) => {}
                Err(err) if err.is_transient() => on_transient(&err),
                Err(err) => return Err(err),
            }

            if self.clock.now().saturating_sub(start) >= timeout {
                return Err(PilotError::Timeout {
                    ms: self.options.timeout_ms,
                });
            }
            self.clock.sleep(self.options.poll_interval());
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;

    fn waiter(clock: &Arc<FakeClock>, timeout_ms: u64, interval_ms: u64) -> Waiter {
        let options = WaitOptions::new()
            .with_timeout(timeout_ms)
            .with_poll_interval(interval_ms);
        Waiter::new(clock.clone(), options)
    }

    mod wait_options_tests {
        use super::*;

        #[test]
        fn test_wait_options_default() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_wait_options_chained() {
            let opts = WaitOptions::new()
                .with_timeout(10_000)
                .with_poll_interval(200);
            assert_eq!(opts.timeout(), Duration::from_secs(10));
            assert_eq!(opts.poll_interval(), Duration::from_millis(200));
        }

        #[test]
        fn test_capped() {
            let opts = WaitOptions::new().with_timeout(3_600_000).capped(500_000);
            assert_eq!(opts.timeout_ms, 500_000);

            let opts = WaitOptions::new().with_timeout(1_000).capped(500_000);
            assert_eq!(opts.timeout_ms, 1_000);
        }
    }

    mod waiter_tests {
        use super::*;

        #[test]
        fn test_immediate_success_does_not_sleep() {
            let clock = Arc::new(FakeClock::new());
            let result = waiter(&clock, 1_000, 100)
                .until("ready", || Ok(Some(7)), |_| {})
                .unwrap();
            assert_eq!(result.value, 7);
            assert_eq!(result.attempts, 1);
            assert_eq!(clock.sleep_count(), 0);
            assert_eq!(result.waited_for, "ready");
        }

        #[test]
        fn test_succeeds_on_third_attempt() {
            let clock = Arc::new(FakeClock::new());
            let mut calls = 0;
            let result = waiter(&clock, 5_000, 500)
                .until(
                    "third",
                    || {
                        calls += 1;
                        Ok((calls == 3).then_some(calls))
                    },
                    |_| {},
                )
                .unwrap();
            assert_eq!(result.value, 3);
            assert_eq!(result.attempts, 3);
            assert_eq!(result.elapsed, Duration::from_millis(1_000));
        }

        #[test]
        fn test_times_out_within_one_interval() {
            let clock = Arc::new(FakeClock::new());
            let err = waiter(&clock, 2_000, 300)
                .until::<(), _, _>("never", || Ok(None), |_| {})
                .unwrap_err();
            assert!(matches!(err, PilotError::Timeout { ms: 2_000 }));
            assert!(clock.now() >= Duration::from_millis(2_000));
            assert!(clock.now() <= Duration::from_millis(2_300));
        }

        #[test]
        fn test_transient_errors_are_reported_and_retried() {
            let clock = Arc::new(FakeClock::new());
            let mut seen = Vec::new();
            let mut calls = 0;
            let result = waiter(&clock, 5_000, 100)
                .until(
                    "flaky",
                    || {
                        calls += 1;
                        if calls < 3 {
                            Err(PilotError::row_not_found("r"))
                        } else {
                            Ok(Some("done"))
                        }
                    },
                    |e| seen.push(e.to_string()),
                )
                .unwrap();
            assert_eq!(result.value, "done");
            assert_eq!(seen.len(), 2);
        }

        #[test]
        fn test_permanent_error_stops_immediately() {
            let clock = Arc::new(FakeClock::new());
            let err = waiter(&clock, 5_000, 100)
                .until::<(), _, _>("broken", || Err(PilotError::driver("gone")), |_| {
                    panic!("permanent errors are not transient")
                })
                .unwrap_err();
            assert!(matches!(err, PilotError::Driver { .. }));
            assert_eq!(clock.sleep_count(), 0);
        }

        #[test]
        fn test_zero_timeout_evaluates_once() {
            let clock = Arc::new(FakeClock::new());
            let mut calls = 0;
            let err = waiter(&clock, 0, 100)
                .until::<(), _, _>(
                    "once",
                    || {
                        calls += 1;
                        Ok(None)
                    },
                    |_| {},
                )
                .unwrap_err();
            assert!(matches!(err, PilotError::Timeout { ms: 0 }));
            assert_eq!(calls, 1);
        }

        #[test]
        fn test_zero_interval_still_reaches_timeout() {
            let clock = Arc::new(FakeClock::new());
            let w = waiter(&clock, 50, 0);
            assert_eq!(w.options().poll_interval_ms, MIN_POLL_INTERVAL_MS);
            let err = w
                .until::<(), _, _>("never", || Ok(None), |_| {})
                .unwrap_err();
            assert!(matches!(err, PilotError::Timeout { ms: 50 }));
            assert_eq!(clock.now_ms(), 50);
            assert_eq!(clock.sleep_count(), 50);
        }
    }
}
