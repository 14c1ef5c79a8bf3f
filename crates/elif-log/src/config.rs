//! # Logging configuration
//!
//! Installs the global `tracing` subscriber that marker warnings and the
//! `*_marked!` macros report through. JSON output is meant for production,
//! pretty output for development.

use std::env;
use std::io;
use std::str::FromStr;

use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::ConfigError;

/// Environment variable overriding the log level
pub const LEVEL_ENV: &str = "ELIF_LOG_LEVEL";

/// Environment variable selecting the output format
pub const FORMAT_ENV: &str = "ELIF_LOG_FORMAT";

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Text,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "text" | "plain" => Ok(LogFormat::Text),
            _ => Err(ConfigError::invalid_value(
                "format",
                s,
                "json, pretty or text",
            )),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "warn")
    pub level: String,
    /// Enable JSON structured logging (vs plain text)
    pub json_format: bool,
    /// Enable pretty printing for development
    pub pretty_print: bool,
    /// Include file and line number information
    pub include_location: bool,
    /// Include the event target
    pub include_target: bool,
    /// Environment filter (supports complex filters like "elif=debug,tower=info")
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            pretty_print: true,
            include_location: false,
            include_target: true,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    /// Create production logging configuration
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            json_format: true,
            pretty_print: false,
            include_location: false,
            include_target: true,
            env_filter: Some("info,elif_log=warn".to_string()),
        }
    }

    /// Create development logging configuration
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            pretty_print: true,
            include_location: true,
            include_target: true,
            env_filter: Some("debug,elif_log=debug".to_string()),
        }
    }

    /// Create test logging configuration (minimal output)
    pub fn test() -> Self {
        Self {
            level: "error".to_string(),
            json_format: false,
            pretty_print: false,
            include_location: false,
            include_target: false,
            env_filter: None,
        }
    }

    /// Start from the defaults and apply `ELIF_LOG_LEVEL` / `ELIF_LOG_FORMAT`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(level) = env::var(LEVEL_ENV) {
            config.level = level.to_lowercase();
        }

        if let Ok(format) = env::var(FORMAT_ENV) {
            config = config.with_format(format.parse()?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configured level
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "level",
                &self.level,
                "trace, debug, info, warn or error",
            ));
        }
        Ok(())
    }

    /// Current output format
    pub fn format(&self) -> LogFormat {
        if self.json_format {
            LogFormat::Json
        } else if self.pretty_print {
            LogFormat::Pretty
        } else {
            LogFormat::Text
        }
    }

    /// Select the output format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.json_format = format == LogFormat::Json;
        self.pretty_print = format == LogFormat::Pretty;
        self
    }

    /// Set the log level
    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }

    /// Set environment filter
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Include file and line number in every event
    pub fn with_location(mut self) -> Self {
        self.include_location = true;
        self
    }

    /// Filter directive used when `RUST_LOG` is not set
    pub fn filter_directive(&self) -> &str {
        self.env_filter.as_deref().unwrap_or(&self.level)
    }

    fn build_filter(&self) -> Result<EnvFilter, ConfigError> {
        let directive = self.filter_directive();
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(directive))
            .map_err(|err| ConfigError::filter(directive, err.to_string()))
    }
}

/// Initialize the global subscriber
pub fn init_logging(config: LoggingConfig) -> Result<(), ConfigError> {
    config.validate()?;
    let filter = config.build_filter()?;

    let layer = Layer::new()
        .with_writer(io::stdout)
        .with_target(config.include_target)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    let installed = match config.format() {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(layer.pretty())
            .try_init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init(),
    };

    installed.map_err(|err| ConfigError::AlreadyInitialized {
        message: err.to_string(),
    })?;

    tracing::debug!(
        "Structured logging initialized (level: {}, format: {:?})",
        config.level,
        config.format()
    );

    Ok(())
}

/// Emit an event carrying a marker's fields.
///
/// The marker is recorded as a single `fields` value holding its text
/// rendering (`name value, ` per field). A `tracing` JSON formatter therefore
/// sees one string, not one key per field. To splice the fields into a JSON
/// record as top-level keys, use [`write_record`](crate::write_record) or
/// [`StructuredFieldMarker::write_to`](crate::StructuredFieldMarker::write_to).
#[macro_export]
macro_rules! log_marked {
    ($level:expr, $marker:expr, $($arg:tt)+) => {
        $crate::__tracing::event!(
            $level,
            marker = $crate::StructuredFieldMarker::NAME,
            fields = %$marker,
            $($arg)+
        )
    };
}

/// Emit an INFO event carrying a marker's fields
#[macro_export]
macro_rules! info_marked {
    ($marker:expr, $($arg:tt)+) => {
        $crate::log_marked!($crate::__tracing::Level::INFO, $marker, $($arg)+)
    };
}

/// Emit a WARN event carrying a marker's fields
#[macro_export]
macro_rules! warn_marked {
    ($marker:expr, $($arg:tt)+) => {
        $crate::log_marked!($crate::__tracing::Level::WARN, $marker, $($arg)+)
    };
}

/// Emit an ERROR event carrying a marker's fields
#[macro_export]
macro_rules! error_marked {
    ($marker:expr, $($arg:tt)+) => {
        $crate::log_marked!($crate::__tracing::Level::ERROR, $marker, $($arg)+)
    };
}

/// Emit a DEBUG event carrying a marker's fields
#[macro_export]
macro_rules! debug_marked {
    ($marker:expr, $($arg:tt)+) => {
        $crate::log_marked!($crate::__tracing::Level::DEBUG, $marker, $($arg)+)
    };
}
