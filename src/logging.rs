//! Logging setup built on `tracing-subscriber`.
//!
//! Logs always go to stderr so that stdout stays clean for reports and JSON.

use std::io;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber.
///
/// `RUST_LOG` takes precedence when set. Otherwise the level comes from the
/// verbosity flags: `-q` = error, default = warn, `-v` = debug, `-vv` = trace.
/// An explicit `filter` overrides both.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed or the
/// filter directive cannot be parsed.
pub fn init_logging(
    verbose: u8,
    quiet: bool,
    filter: Option<&str>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = match filter {
        Some(directive) => EnvFilter::try_new(directive)?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_directive(verbose, quiet)))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(verbose > 1)
        .try_init()
}

fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "tailbench=debug,info",
        _ => "tailbench=trace,debug",
    }
}

/// Initialize logging for tests. Safe to call repeatedly.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tailbench=debug")),
        )
        .with_test_writer()
        .try_init();
}
