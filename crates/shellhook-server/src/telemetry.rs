//! Tracing subscriber setup.
//!
//! The level comes from the command line unless `RUST_LOG` is set. Output is
//! JSON when stdout is not a terminal (log shippers) and human-readable
//! otherwise.

use std::io::IsTerminal;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Errors from logging initialization.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log level '{0}'")]
    InvalidLevel(String),

    #[error("failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Parses a level name. Accepts `warning` as an alias of `warn`.
pub fn parse_level(level: &str) -> Result<LevelFilter, TelemetryError> {
    let normalized = match level.trim().to_ascii_lowercase().as_str() {
        "warning" => "warn".to_string(),
        other => other.to_string(),
    };
    normalized
        .parse::<LevelFilter>()
        .map_err(|_| TelemetryError::InvalidLevel(level.to_string()))
}

/// Installs the global subscriber.
pub fn init_tracing(level: &str) -> Result<(), TelemetryError> {
    let level = parse_level(level)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    let result = if std::io::stdout().is_terminal() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    };
    result.map_err(|e| TelemetryError::Init(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_levels() {
        assert_eq!(parse_level("info").unwrap(), LevelFilter::INFO);
        assert_eq!(parse_level("DEBUG").unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_level("warning").unwrap(), LevelFilter::WARN);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::OFF);
    }

    #[test]
    fn rejects_unknown_level() {
        assert!(matches!(
            parse_level("chatty"),
            Err(TelemetryError::InvalidLevel(_))
        ));
    }
}
