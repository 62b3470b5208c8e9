use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "credit_ledger=info,warn";

/// Installs the global tracing subscriber. Call once, at startup.
///
/// Logs go to stderr: stdout carries the response stream. `RUST_LOG`
/// overrides the default filter.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
