use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "DESK_LOG";

/// Installs the stderr subscriber. `DESK_LOG` wins over `verbose`.
pub fn init(verbose: bool) {
    let default_directive = if verbose { "deskbot=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(verbose)
        .try_init();
}
