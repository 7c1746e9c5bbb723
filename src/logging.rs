// src/logging.rs
// =============================================================================
// Logging setup.
//
// Logs go to stderr so that results on stdout stay clean enough to pipe
// (especially with --json). RUST_LOG overrides the default level.
// =============================================================================

use tracing_subscriber::EnvFilter;

// Installs the global tracing subscriber
//
// Parameters:
//   verbose: start from "debug" instead of "info" when RUST_LOG is unset
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
