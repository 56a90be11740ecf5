//! Tracing initialization

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding a tracing filter directive
pub const LOG_ENV: &str = "PRINTGUARD_LOG";

/// Initialize logging to stderr.
///
/// `PRINTGUARD_LOG` takes precedence, e.g. `PRINTGUARD_LOG=printguard=trace`.
/// Otherwise the level is `info`, or `debug` with `verbose`. Safe to call
/// more than once.
pub fn init_logging(verbose: bool) {
    INIT.call_once(|| {
        let default = if verbose { "printguard=debug" } else { "printguard=info" };
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(verbose),
            )
            .with(filter)
            .init();
    });
}
