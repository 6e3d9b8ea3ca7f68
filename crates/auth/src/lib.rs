//! TerraMartz admin authentication for Rust
//!
//! This crate owns the session token lifecycle of the admin client: logging
//! in, persisting the issued token through a [`TokenStore`], and handing out
//! a token only while it still looks fresh.
//!
//! Token checks here never verify signatures. They exist so the client does
//! not keep sending a token it can already tell is dead; the backend remains
//! the only authority on whether a request is authorized.

pub mod claims;
pub mod session;
pub mod store;

use log::{info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use claims::{decode, is_valid, is_valid_at, Claims};
pub use session::Session;
pub use store::{
    FileKeyValue, FileTokenStore, KeyValueSurface, KeyValueTokenStore, LegacyTokenStore,
    MemoryKeyValue, MemoryTokenStore, TokenStore, LEGACY_TOKEN_KEY, TOKEN_COOKIE, TOKEN_KEY,
};

/// Errors raised by authentication calls
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not logged in")]
    MissingSession,

    #[error("Session expired, log in again")]
    ExpiredSession,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Login credentials
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}

/// Body returned by the login endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(alias = "accessToken")]
    pub token: String,

    #[serde(default)]
    pub message: Option<String>,

    /// Profile of the logged-in admin, as sent by the backend
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Client for the admin login endpoint
#[derive(Debug, Clone)]
pub struct AuthClient {
    url: String,
    http_client: Client,
    session: Session,
}

impl AuthClient {
    pub fn new(url: &str, http_client: Client, session: Session) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            http_client,
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Log in with email and password and persist the issued token
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let url = format!("{}/api/admin/login", self.url);

        let response = self
            .http_client
            .post(&url)
            .json(&Credentials::new(email, password))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Login rejected with status {}", status);
            return Err(AuthError::Api {
                status: status.as_u16(),
                message: error_message(&error_text),
            });
        }

        let login: LoginResponse = response.json().await?;

        if claims::decode(&login.token).is_none() {
            return Err(AuthError::InvalidToken(
                "login returned a token that is not a JWT".to_string(),
            ));
        }

        self.session.set_token(&login.token);
        info!("Logged in as {}", email);

        Ok(login)
    }

    /// Forget the current token
    pub fn logout(&self) {
        self.session.clear();
    }
}

/// The backend's `message` field when the body is JSON, else the raw body
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
