//! Structured logging setup for the `imagen-studio` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to applications. Logs go to stderr so stdout stays free for the rendered
//! form.

use std::io::IsTerminal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::error::{Result, StudioError};

/// Environment variable holding a full `EnvFilter` directive string.
pub const LOG_ENV: &str = "IMAGEN_STUDIO_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(StudioError::Config(format!(
                "invalid log format '{}', expected 'text' or 'json'",
                other
            ))),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    pub level: String,
    pub format: LogFormat,
    /// Colored output (text format only)
    pub color: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
            color: ansi_enabled(false, std::io::stderr().is_terminal()),
        }
    }
}

/// Whether log lines should carry ANSI colors. Off when asked for, or when
/// stderr is not a terminal.
pub fn ansi_enabled(no_color: bool, stderr_is_terminal: bool) -> bool {
    !no_color && stderr_is_terminal
}

/// Install the global subscriber.
///
/// `IMAGEN_STUDIO_LOG` wins over the configured level when set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_env_filter(std::env::var(LOG_ENV).ok().as_deref(), &config.level)?;
    let registry = Registry::default().with(filter);

    let installed = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(config.color)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    installed.map_err(|e| StudioError::Config(format!("failed to install logger: {}", e)))
}

/// Build the filter from an env directive string, falling back to `level`.
fn build_env_filter(env_directives: Option<&str>, level: &str) -> Result<EnvFilter> {
    if let Some(directives) = env_directives.filter(|d| !d.trim().is_empty()) {
        return EnvFilter::try_new(directives)
            .map_err(|e| StudioError::Config(format!("invalid {} value: {}", LOG_ENV, e)));
    }

    match level.trim().to_ascii_lowercase().as_str() {
        "off" => Ok(EnvFilter::new("off")),
        lvl @ ("trace" | "debug" | "info" | "warn" | "error") => Ok(EnvFilter::new(lvl)),
        other => Err(StudioError::Config(format!("invalid log level '{}'", other))),
    }
}
