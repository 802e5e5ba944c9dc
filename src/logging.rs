//! Log output setup.

use tracing_subscriber::EnvFilter;

use crate::config::LeaderboardConfig;

/// Install a formatted `tracing` subscriber for this process.
///
/// `RUST_LOG` takes precedence. Otherwise this crate logs at `debug` when
/// `config.debug` is set and at `info` when it is not. Calling this again, or
/// after another subscriber was installed, leaves the existing one in place.
pub fn init(config: &LeaderboardConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn default_directive(config: &LeaderboardConfig) -> &'static str {
    if config.debug {
        "highscore=debug"
    } else {
        "highscore=info"
    }
}
