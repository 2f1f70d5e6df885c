use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a JSON stdout subscriber filtered by `RUST_LOG`.
///
/// Later calls are no-ops, so tests and embedding applications may both call it.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().json())
        .try_init();
}

/// Same as [`init_tracing`] but human-readable, for local terminals and tests.
pub fn init_pretty_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().compact())
        .try_init();
}
