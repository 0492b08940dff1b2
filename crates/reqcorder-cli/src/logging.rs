use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, registry};

use crate::config::ConfigError;

const DEFAULT_LOG_LEVEL: &str = "debug";

/// JSON logs to `log_file` (truncated), plus human-readable logs on stderr
/// when `verbose`.
pub fn init(level: LevelFilter, log_file: &Path, verbose: bool) -> anyhow::Result<()> {
    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = File::create(log_file)
        .with_context(|| format!("open log file {}", log_file.display()))?;

    let file_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_writer(Mutex::new(file));
    let stderr_layer = verbose.then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    registry()
        .with(level)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|err| anyhow!("initialize logging subscriber: {err}"))
}

pub fn resolve_log_level(raw: Option<&str>) -> Result<LevelFilter, ConfigError> {
    let raw = raw.unwrap_or(DEFAULT_LOG_LEVEL);
    raw.trim()
        .to_ascii_lowercase()
        .parse::<LevelFilter>()
        .map_err(|_| ConfigError::InvalidLogLevel(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_defaults_to_debug() {
        assert_eq!(resolve_log_level(None).unwrap(), LevelFilter::DEBUG);
    }

    #[test]
    fn level_is_case_and_space_insensitive() {
        assert_eq!(resolve_log_level(Some(" WARN ")).unwrap(), LevelFilter::WARN);
        assert_eq!(resolve_log_level(Some("off")).unwrap(), LevelFilter::OFF);
    }

    #[test]
    fn unknown_level_is_rejected() {
        let err = resolve_log_level(Some("loud")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid log level `loud`; expected one of trace, debug, info, warn, error, off"
        );
    }
}
