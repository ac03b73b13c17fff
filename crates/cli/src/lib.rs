//! ma-lines CLI
//!
//! Stands in for the host compiler: loads lowered translation units and runs
//! the memory access pass from `ma-lines-core` over them.

pub mod commands;

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` is honoured unless `verbose` forces debug output; the default
/// level is `warn`, enough to see dropped records.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed (tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
