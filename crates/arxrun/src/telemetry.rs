//! Process-wide log rendering registration.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static RENDERING: Once = Once::new();

/// Registers the log rendering hook once per process.
///
/// Boundary threads are named after their hosted application, so rendering
/// thread names correlates records across boundaries. Safe to call from
/// every runtime; the effect happens once.
pub fn register_boundary_rendering() {
    RENDERING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_thread_names(true)
            .try_init()
            .ok();
    });
}
