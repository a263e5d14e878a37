//! Tracing subscriber setup for the binary.
//!
//! Debug mode (`--debug` or `DEBUG=true`) turns on this crate's `debug!`
//! diagnostics. Otherwise `RUST_LOG` applies, falling back to `warn`.

use tracing_subscriber::EnvFilter;

pub fn filter(debug: bool) -> EnvFilter {
    if debug {
        return EnvFilter::new("warn,axe_comment=debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber; a second call is a no-op.
pub fn init(debug: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(debug))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
