//! Tracing subscriber setup for binaries and demos.

use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber.
///
/// `level` is the fallback filter (e.g. `"info"` or `"warn,psyche_npc=debug"`);
/// `RUST_LOG` takes precedence when set. With `json` each event is written as
/// one JSON object per line.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(level: &str, json: bool) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.is_ok()
}
