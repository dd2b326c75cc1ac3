//! Diagnostics on stderr via `tracing-subscriber`.
//!
//! stdout is reserved for command output (text or JSON).

use crate::config::{DEFAULT_LOG_FILTER, LogFormat};
use tracing_subscriber::EnvFilter;

pub fn init(filter: &str, format: LogFormat) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|e| {
        eprintln!("warning: invalid log filter `{filter}` ({e}); using `{DEFAULT_LOG_FILTER}`");
        EnvFilter::new(DEFAULT_LOG_FILTER)
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    // A subscriber may already be installed (tests); keep the existing one.
    let _ = match format {
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
        LogFormat::Pretty => builder.compact().with_ansi(false).try_init(),
    };
}
