//! Tracing subscriber setup.

use tracing_subscriber::{fmt, EnvFilter};

/// Install a `fmt` subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let _ = fmt().with_env_filter(EnvFilter::from_default_env()).try_init();
}
