//! Error types for the Orderly connector.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing required parameter: {field}")]
    MissingParameter { field: &'static str },

    #[error("Invalid value '{value}' for {field}; expected one of: {}", allowed.join(", "))]
    InvalidEnumValue {
        field: &'static str,
        value: String,
        allowed: Vec<&'static str>,
    },

    #[error("Invalid parameter {field}: {message}")]
    InvalidParameter { field: String, message: String },

    #[error("Signing error: {message}")]
    Signing { message: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Authentication error: {message}")]
    Auth { message: String },
}

impl Error {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
