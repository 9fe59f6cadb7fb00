use tracing_subscriber::EnvFilter;

/// Default filter used when `RUST_LOG` is not set.
const DEFAULT_DIRECTIVE: &str = "info";

/// Install a `tracing` fmt subscriber writing to stderr.
///
/// Safe to call more than once: later calls are no-ops when a global
/// subscriber is already set (tests, embedding applications).
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
