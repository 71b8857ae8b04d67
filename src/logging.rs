//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Diagnostics go to stderr so they never mix with the generated program's
//! stdout. The console is interactive, so the default level is `warn`.
//!
//! - `warn`: restore failures, templates missing markers
//! - `info`: round outcomes, template creation
//! - `debug`: transaction steps, toolchain invocations, exit codes

use std::io;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level for this crate.
    pub level: Level,
    /// Whether to use ANSI colors in output.
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            with_ansi: true,
        }
    }
}

impl LogConfig {
    /// `--verbose` raises the crate to debug.
    #[must_use]
    pub fn from_verbose(verbose: bool) -> Self {
        let level = if verbose { Level::DEBUG } else { Level::WARN };
        Self {
            level,
            ..Default::default()
        }
    }
}

/// Initialize the global tracing subscriber. Call once at start-up.
pub fn init_logging(config: &LogConfig) {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(false)
        .without_time();

    tracing_subscriber::registry()
        .with(build_env_filter(config.level))
        .with(layer)
        .init();
}

/// Build an `EnvFilter` from the given level, respecting `RUST_LOG`.
fn build_env_filter(level: Level) -> EnvFilter {
    let level_str = level.as_str().to_lowercase();

    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,cppconsole={}", level_str)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_level() {
        assert_eq!(LogConfig::from_verbose(false).level, Level::WARN);
        assert_eq!(LogConfig::from_verbose(true).level, Level::DEBUG);
    }
}
