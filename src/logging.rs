//! Log output for the command-line tool

use tracing_subscriber::{fmt, EnvFilter};

/// Install the stderr logger
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks debug over info.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init();
}
