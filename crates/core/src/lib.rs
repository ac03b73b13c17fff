//! ma-lines-core
//!
//! Finds the source locations where memory accesses may happen in compiled
//! functions and appends them to a shared list (`file:line[:read|:write]`)
//! consumed by run-time race detection and fault injection tools.
//!
//! The crate holds the IR model handed over by the host compiler, the
//! alias/escape oracle, the access classifiers, the statement walker, the
//! crash-safe location recorder and the pass driver. Frontends stay thin.

pub mod analysis;
pub mod config;
pub mod driver;
pub mod model;
pub mod recorder;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
