//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence when set; otherwise this crate and the named
/// binary are filtered at `default_level` and everything else at `info`.
/// Call once per process.
pub fn setup_logger(name: &str, default_level: &str) {
    let default_directives = format!(
        "info,{}={},{}={}",
        env!("CARGO_PKG_NAME").replace('-', "_"),
        default_level,
        name.replace('-', "_"),
        default_level
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    fmt().with_env_filter(filter).with_target(true).init();
}
