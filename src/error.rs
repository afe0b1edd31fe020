use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the agenda engine
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(clinagenda::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(clinagenda::config))]
    Config(String),

    #[error("Calendar API error: {0}")]
    #[diagnostic(code(clinagenda::calendar_api))]
    CalendarApi(String),

    #[error("Unknown timezone: {0}")]
    #[diagnostic(code(clinagenda::timezone))]
    InvalidTimezone(String),

    #[error("Malformed event: {0}")]
    #[diagnostic(code(clinagenda::event))]
    Event(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(clinagenda::component))]
    Component(String),

    #[error(transparent)]
    #[diagnostic(code(clinagenda::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(clinagenda::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(clinagenda::other))]
    Other(String),
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AgendaResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create calendar API errors
pub fn calendar_api_error(message: &str) -> Error {
    Error::CalendarApi(message.to_string())
}

/// Helper to create timezone errors
pub fn invalid_timezone_error(name: &str) -> Error {
    Error::InvalidTimezone(name.to_string())
}

/// Helper to create malformed event errors
pub fn event_error(message: &str) -> Error {
    Error::Event(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
