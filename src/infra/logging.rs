use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Variable holding an `EnvFilter` directive, e.g. `TLOG_LOG=tlog=debug`.
pub const LOG_ENV: &str = "TLOG_LOG";

/// Default directive when `TLOG_LOG` is unset or invalid.
pub fn default_directive(quiet: bool) -> &'static str {
    if quiet { "error" } else { "warn" }
}

/// Install the global subscriber: compact lines on stderr, stdout stays for
/// command output. Safe to call more than once; later calls are no-ops.
pub fn init(quiet: bool, no_color: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(quiet)));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .with_ansi(!no_color),
        )
        .with(filter)
        .try_init();
}
