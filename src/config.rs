//! Configuration options for the TerraMartz client

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

/// Environment variable holding the API base URL
pub const API_URL_ENV: &str = "TERRAMARTZ_API_URL";

/// Environment variable naming a file to persist the session token in
pub const TOKEN_FILE_ENV: &str = "TERRAMARTZ_TOKEN_FILE";

/// Environment variable overriding the request timeout, in seconds
pub const REQUEST_TIMEOUT_ENV: &str = "TERRAMARTZ_REQUEST_TIMEOUT_SECS";

/// Where the session token lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStorage {
    /// In process only
    Memory,

    /// A single key in a JSON file
    File(PathBuf),

    /// The dashboard's two-key layout plus the `token` cookie; keys are
    /// kept in the file when one is given, in memory otherwise
    Legacy(Option<PathBuf>),
}

/// Configuration options for the TerraMartz client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Token persistence
    pub token_storage: TokenStorage,

    /// Default page size for list calls
    pub default_limit: u32,

    /// Value of the `X-Client-Info` header
    pub client_info: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            token_storage: TokenStorage::Memory,
            default_limit: crate::query::DEFAULT_LIMIT,
            client_info: format!("terramartz-admin-rs/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientOptions {
    /// Options from `TERRAMARTZ_TOKEN_FILE` and
    /// `TERRAMARTZ_REQUEST_TIMEOUT_SECS`, defaults otherwise
    pub fn from_env() -> Result<Self, Error> {
        let mut options = Self::default();

        if let Ok(path) = env::var(TOKEN_FILE_ENV) {
            if !path.is_empty() {
                options.token_storage = TokenStorage::File(PathBuf::from(path));
            }
        }

        if let Ok(secs) = env::var(REQUEST_TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::config(format!("{} must be a whole number of seconds", REQUEST_TIMEOUT_ENV))
            })?;
            options.request_timeout = Some(Duration::from_secs(secs));
        }

        Ok(options)
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set where the session token is kept
    pub fn with_token_storage(mut self, value: TokenStorage) -> Self {
        self.token_storage = value;
        self
    }

    /// Set the default page size
    pub fn with_default_limit(mut self, value: u32) -> Self {
        self.default_limit = value.max(1);
        self
    }

    /// Set the `X-Client-Info` header value
    pub fn with_client_info(mut self, value: &str) -> Self {
        self.client_info = value.to_string();
        self
    }
}

/// Read the API base URL from `TERRAMARTZ_API_URL`
pub fn api_url_from_env() -> Result<String, Error> {
    match env::var(API_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => Ok(url.trim().to_string()),
        _ => Err(Error::config(format!("{} must be set", API_URL_ENV))),
    }
}
