//! Log subscriber setup.
//!
//! Logs go to stderr so stdout carries only step results.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::commands::LogFormat;
use crate::config::Verbosity;

/// Default filter directive for a verbosity level
#[must_use]
pub const fn directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "mda_pilot=warn",
        Verbosity::Normal => "mda_pilot=info",
        Verbosity::Verbose => "mda_pilot=debug",
        Verbosity::Debug => "mda_pilot=trace",
    }
}

fn filter(verbosity: Verbosity) -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    directive(verbosity)
        .split(',')
        .filter_map(|d| d.parse().ok())
        .fold(filter, EnvFilter::add_directive)
}

/// Install the global subscriber; `RUST_LOG` adds to the defaults
pub fn init_logging(verbosity: Verbosity, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(filter(verbosity));
    let result = match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init(),
    };
    // Keep a subscriber already installed by an embedding process
    let _ = result;
}
