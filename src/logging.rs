//! Tracing setup for the relay binary

use tracing_subscriber::EnvFilter;

/// Install the global subscriber, writing to stderr
///
/// `RUST_LOG` takes precedence; otherwise `debug` selects the default level
/// (`newsrelay=debug` instead of `info`).
///
/// ```bash
/// RUST_LOG=newsrelay::server=debug newsrelay --config config.json
/// ```
pub fn init_tracing(debug: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(debug)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn default_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("info,newsrelay=debug")
    } else {
        EnvFilter::new("info")
    }
}
