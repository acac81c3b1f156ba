//! Tracing setup for the `energy` binary.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "ENERGY_LOG";

const DEFAULT_FILTER: &str = "energy_series=warn";

static INIT: Once = Once::new();

/// Install the global subscriber.
///
/// Reads `ENERGY_LOG` (e.g. `ENERGY_LOG=energy_series::clean=debug`), falling back
/// to warnings only. Logs go to stderr so reports and exports on stdout stay
/// clean. Safe to call more than once.
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(filter)
            .init();
    });
}
