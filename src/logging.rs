//! Tracing setup for hosts and the `rift-keys` binary
//!
//! The filter comes from `RIFT_LOG`, then `RUST_LOG`, then
//! [`LogConfig::default_filter`]. A bare level in `RIFT_LOG` such as `debug`
//! applies to this crate only and keeps everything else at `warn`.
//!
//! Events go to stderr so they never mix with the binary's report on stdout.

use crate::constants::env::LOG;
use std::env;
use tracing_subscriber::{fmt, EnvFilter};

/// How [`init`] should build the subscriber
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter used when neither environment variable is set
    pub default_filter: String,
    /// Colour output
    pub ansi: bool,
    /// Print the module path of each event
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_filter: "warn".to_string(),
            ansi: false,
            with_target: true,
        }
    }
}

/// Install the global subscriber. Returns `false` when one was already
/// installed, which is harmless.
pub fn init(config: LogConfig) -> bool {
    let filter = create_filter(&config);
    fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .with_target(config.with_target)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

fn create_filter(config: &LogConfig) -> EnvFilter {
    if let Ok(value) = env::var(LOG) {
        return EnvFilter::new(expand_level(&value));
    }
    if let Ok(value) = env::var("RUST_LOG") {
        return EnvFilter::new(value);
    }
    EnvFilter::new(&config.default_filter)
}

/// `debug` becomes `warn,rift_engine=debug`; directive lists pass through
fn expand_level(value: &str) -> String {
    if value.contains('=') || value.contains(',') || value.contains(':') {
        value.to_string()
    } else {
        format!("warn,rift_engine={value}")
    }
}
