//! Tracing subscriber setup shared by the server and client binaries.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence when set; otherwise the given binary name is
/// enabled at `default_level`.
pub fn setup_logger(app_name: &str, default_level: &str) {
    // Crate names use hyphens, tracing targets use underscores.
    let directive = format!("{}={}", app_name.replace('-', "_"), default_level);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
