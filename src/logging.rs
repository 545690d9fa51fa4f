//! Logging configuration for cqlpipe.
//!
//! Logs always go to stderr so that stdout carries nothing but results.

use tracing_subscriber::EnvFilter;

/// Initializes logging to stderr.
///
/// `RUST_LOG` takes precedence; otherwise the level follows the number of
/// `-v` flags.
pub fn init_stderr_logging(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level(verbosity))),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Returns the log level for a `-v` count.
pub fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}
