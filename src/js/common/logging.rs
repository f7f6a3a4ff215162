//! Tracing subscriber setup for the command line binary.
//!
//! The library only emits `tracing` events. A subscriber is installed here when `RUST_LOG` is set,
//! e.g. `RUST_LOG=brimstone_parser=trace bsp file.js`.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global tracing subscriber. Does nothing when `RUST_LOG` is not set.
///
/// Output goes to stderr so it never mixes with a printed AST on stdout.
pub fn init_tracing() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }

    let result = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();

    // A subscriber may already be installed, e.g. when called twice from tests
    if let Err(err) = result {
        eprintln!("Failed to initialize tracing: {}", err);
    }
}
