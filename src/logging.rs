//! Purpose: Opt-in tracing subscriber for hosts that want bridge diagnostics.
//! Exports: `init_tracing`.
//! Role: Hosts call this once (directly or via the exported ABI hook).
//! Invariants: Diagnostics go to stderr; stdout and returned JSON are untouched.
//! Invariants: Safe to call repeatedly; only the first successful call installs.
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
