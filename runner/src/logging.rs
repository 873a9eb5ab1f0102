//! Diagnostic tracing for the maze runner.
//!
//! Output goes to stderr so stdout stays reserved for command results
//! (rendered boards, paths, submission responses).

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "maze_runner=info";

/// Install the global subscriber.
///
/// Reads `RUST_LOG`; defaults to `maze_runner=info` when unset or invalid.
///
/// ```bash
/// RUST_LOG=maze_runner=debug maze-runner run
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
