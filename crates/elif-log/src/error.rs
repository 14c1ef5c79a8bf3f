use thiserror::Error;

/// Errors surfaced while writing a marker into a JSON sink.
///
/// Value encoding failures never show up here: they are handled field by
/// field and replaced with the value's print-form.
#[derive(Debug, Error)]
pub enum MarkerError {
    #[error("Sink rejected write for field '{field}': {source}")]
    Sink {
        field: String,
        #[source]
        source: std::io::Error,
    },
}

impl MarkerError {
    /// Create a sink error for the field being written
    pub fn sink(field: impl Into<String>, source: std::io::Error) -> Self {
        Self::Sink {
            field: field.into(),
            source,
        }
    }

    /// Name of the field whose write failed
    pub fn field(&self) -> &str {
        match self {
            Self::Sink { field, .. } => field,
        }
    }
}

/// Logging configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Invalid log filter '{filter}': {message}")]
    Filter { filter: String, message: String },

    #[error("Global logging subscriber already initialized: {message}")]
    AlreadyInitialized { message: String },
}

impl ConfigError {
    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create a filter parsing error
    pub fn filter(filter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Filter {
            filter: filter.into(),
            message: message.into(),
        }
    }
}
