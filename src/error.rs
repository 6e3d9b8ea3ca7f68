//! Error handling for the TerraMartz admin client

use std::fmt;
use terramartz_auth::AuthError;
use thiserror::Error;

/// Unified error type for every service call
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The backend answered with a non-2xx status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Session problems detected before or during a call
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A paged response broke the envelope contract
    #[error("Invalid paged response: {0}")]
    InvalidEnvelope(String),

    /// Bad or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    pub fn api<T: fmt::Display>(status: u16, msg: T) -> Self {
        Error::Api {
            status,
            message: msg.to_string(),
        }
    }

    pub fn invalid_envelope<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidEnvelope(msg.to_string())
    }

    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// HTTP status of a backend-reported failure
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Auth(AuthError::Api { status, .. }) => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether logging in again could fix this
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Error::Auth(AuthError::MissingSession | AuthError::ExpiredSession)
        ) || self.status() == Some(401)
    }
}
