//! Tracing subscriber set-up
//!
//! Log events go to stderr so stdout stays reserved for the CSV report.
//! The filter is read from `RUST_LOG` and defaults to `warn`, which shows
//! rejected operations and skipped rows but not per-operation debug events.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber
///
/// Returns an error if a global subscriber is already set.
pub fn init(json: bool) -> Result<(), String> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| format!("Failed to initialize logging: {}", e))
}
