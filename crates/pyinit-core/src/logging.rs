//! Diagnostic logging
//!
//! User-facing progress goes through [`crate::Reporter`]. This module sets up `tracing`
//! for the diagnostics underneath it (spawned commands, env overrides, swallowed
//! failures). Everything is written to stderr.

use std::io;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Environment variable holding a tracing filter directive, e.g. `PYINIT_LOG=debug`
pub const LOG_ENV: &str = "PYINIT_LOG";

/// Initialize the tracing subscriber. Subsequent calls are no-ops.
///
/// Filter precedence: `PYINIT_LOG`, then `RUST_LOG`, then `debug` when `verbose`
/// is set and `warn` otherwise.
pub fn init(verbose: bool) {
    INIT.call_once(|| {
        let filter = create_env_filter(verbose);
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(io::stderr)
            .try_init();
        tracing::debug!("Logging initialized (verbose: {})", verbose);
    });
}

fn create_env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(true), "debug");
        assert_eq!(default_directive(false), "warn");
    }

    #[test]
    fn test_init_is_idempotent() {
        init(false);
        init(true);
    }
}
