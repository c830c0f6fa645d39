//! Named step execution.
//!
//! Every public page step runs through [`execute`]: a think-time pause, a
//! tracing span carrying the step name, then the step body, timed.

use serde::Serialize;
use std::time::Duration;

use crate::clock::Clock;
use crate::result::PilotResult;

/// How a single step is run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOptions {
    /// Step name shown in logs and results
    pub name: String,
    /// Pause before the step body
    pub think_time: Duration,
}

impl CommandOptions {
    /// Options for a step with no think time
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            think_time: Duration::ZERO,
        }
    }

    /// Pause before the step body
    #[must_use]
    pub const fn with_think_time(mut self, think_time: Duration) -> Self {
        self.think_time = think_time;
        self
    }
}

/// Outcome of a named step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult<T> {
    /// Step name
    pub name: String,
    /// Value produced by the step
    pub value: T,
    /// Time spent in the step body, think time excluded
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

fn as_millis<S: serde::Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}

/// Run `body` as the step described by `options`
pub fn execute<T, F>(clock: &dyn Clock, options: &CommandOptions, body: F) -> PilotResult<CommandResult<T>>
where
    F: FnOnce() -> PilotResult<T>,
{
    let span = tracing::info_span!("command", name = %options.name);
    let _guard = span.enter();

    clock.sleep(options.think_time);

    let started = clock.now();
    let outcome = body();
    let elapsed = clock.now().saturating_sub(started);

    match outcome {
        Ok(value) => {
            tracing::info!(
                event = "mda.command.completed",
                elapsed_ms = elapsed.as_millis() as u64,
            );
            Ok(CommandResult {
                name: options.name.clone(),
                value,
                elapsed,
            })
        }
        Err(err) => {
            tracing::warn!(event = "mda.command.failed", error = %err);
            Err(err)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::result::PilotError;

    mod execute_tests {
        use super::*;

        #[test]
        fn test_think_time_precedes_body() {
            let clock = FakeClock::new();
            let options = CommandOptions::new("Select Grid Record")
                .with_think_time(Duration::from_millis(2_000));
            let result = execute(&clock, &options, || Ok(clock.now_ms())).unwrap();
            assert_eq!(result.value, 2_000);
            assert_eq!(result.name, "Select Grid Record");
        }

        #[test]
        fn test_elapsed_excludes_think_time() {
            let clock = FakeClock::new();
            let options =
                CommandOptions::new("Wait").with_think_time(Duration::from_millis(2_000));
            let result = execute(&clock, &options, || {
                clock.advance(Duration::from_millis(750));
                Ok(())
            })
            .unwrap();
            assert_eq!(result.elapsed, Duration::from_millis(750));
        }

        #[test]
        fn test_error_passes_through() {
            let clock = FakeClock::new();
            let err = execute::<(), _>(&clock, &CommandOptions::new("Download Results"), || {
                Err(PilotError::row_not_found("x"))
            })
            .unwrap_err();
            assert!(matches!(err, PilotError::RowNotFound { .. }));
        }

        #[test]
        fn test_result_json() {
            let result = CommandResult {
                name: "Download Results".to_string(),
                value: true,
                elapsed: Duration::from_millis(42),
            };
            let json = serde_json::to_value(&result).unwrap();
            assert_eq!(
                json,
                serde_json::json!({"name": "Download Results", "value": true, "elapsed_ms": 42})
            );
        }
    }
}
