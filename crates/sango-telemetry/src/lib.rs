//! Tracing setup for sango.
//!
//! One call, near the top of `main` (or a test), wires up a fmt
//! subscriber with env-filter control:
//!
//! ```bash
//! RUST_LOG=sango_vfs=debug cargo test -p sango-vfs
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global fmt subscriber, filtered by `RUST_LOG`.
///
/// Defaults to `info` when `RUST_LOG` is unset. Safe to call more than
/// once — later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}
