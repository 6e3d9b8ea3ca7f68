//! TerraMartz Admin Rust Client Library
//!
//! A Rust client for the TerraMartz marketplace admin API: session handling,
//! paged resource listings with filters, product approval and the other
//! administrative mutations.

pub mod approval;
pub mod config;
pub mod envelope;
pub mod error;
pub mod fetch;
pub mod list;
pub mod query;
pub mod services;

use reqwest::cookie::Jar;
use reqwest::Client;
use std::sync::Arc;
use url::Url;

pub use terramartz_auth as auth;

use crate::approval::ApprovalQueue;
use crate::config::{ClientOptions, TokenStorage};
use crate::error::Error;
use crate::services::{
    FaqsService, ProductsService, SellerOrdersService, ServiceContext, TransactionsService,
    UsersService,
};
use terramartz_auth::{
    AuthClient, FileKeyValue, FileTokenStore, LegacyTokenStore, MemoryKeyValue, Session,
};

/// The main entry point for the TerraMartz admin client
#[derive(Debug, Clone)]
pub struct TerraMartz {
    /// The base URL of the API
    pub url: Url,
    /// HTTP client used for requests
    pub http_client: Client,
    /// The session whose token authenticates every call
    pub session: Session,
    /// Client options
    pub options: ClientOptions,
}

impl TerraMartz {
    /// Create a new client with default options
    ///
    /// # Example
    ///
    /// ```
    /// use terramartz_admin::TerraMartz;
    ///
    /// let client = TerraMartz::new("https://api.terramartz.com").unwrap();
    /// ```
    pub fn new(api_url: &str) -> Result<Self, Error> {
        Self::new_with_options(api_url, ClientOptions::default())
    }

    /// Create a new client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use terramartz_admin::{TerraMartz, config::{ClientOptions, TokenStorage}};
    ///
    /// let options = ClientOptions::default()
    ///     .with_request_timeout(Some(Duration::from_secs(10)))
    ///     .with_token_storage(TokenStorage::Legacy(None));
    /// let client = TerraMartz::new_with_options("https://api.terramartz.com", options).unwrap();
    /// ```
    pub fn new_with_options(api_url: &str, options: ClientOptions) -> Result<Self, Error> {
        let url = Url::parse(api_url)?;
        let jar = Arc::new(Jar::default());

        let session = match &options.token_storage {
            TokenStorage::Memory => Session::in_memory(),
            TokenStorage::File(path) => Session::new(FileTokenStore::at_path(path)),
            TokenStorage::Legacy(Some(path)) => Session::new(LegacyTokenStore::new(
                FileKeyValue::new(path),
                jar.clone(),
                url.clone(),
            )),
            TokenStorage::Legacy(None) => Session::new(LegacyTokenStore::new(
                MemoryKeyValue::new(),
                jar.clone(),
                url.clone(),
            )),
        };

        let mut builder = Client::builder().cookie_provider(jar);
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(Self::with_session(url, http_client, session, options))
    }

    /// Create a client around an existing HTTP client and session
    pub fn with_session(url: Url, http_client: Client, session: Session, options: ClientOptions) -> Self {
        Self {
            url,
            http_client,
            session,
            options,
        }
    }

    /// Create a client from `TERRAMARTZ_API_URL` and the other
    /// `TERRAMARTZ_*` variables
    pub fn from_env() -> Result<Self, Error> {
        let api_url = config::api_url_from_env()?;
        Self::new_with_options(&api_url, ClientOptions::from_env()?)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn context(&self) -> ServiceContext {
        ServiceContext::new(
            self.url.clone(),
            self.http_client.clone(),
            self.session.clone(),
            &self.options.client_info,
        )
    }

    /// Login and logout
    pub fn auth(&self) -> AuthClient {
        AuthClient::new(self.url.as_str(), self.http_client.clone(), self.session.clone())
    }

    pub fn products(&self) -> ProductsService {
        ProductsService::new(self.context())
    }

    pub fn faqs(&self) -> FaqsService {
        FaqsService::new(self.context())
    }

    pub fn seller_orders(&self) -> SellerOrdersService {
        SellerOrdersService::new(self.context())
    }

    pub fn users(&self) -> UsersService {
        UsersService::new(self.context())
    }

    pub fn transactions(&self) -> TransactionsService {
        TransactionsService::new(self.context())
    }

    /// Review queue over the products awaiting approval
    pub fn approval_queue(&self) -> ApprovalQueue {
        ApprovalQueue::with_limit(self.products(), self.options.default_limit)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::approval::ApprovalQueue;
    pub use crate::config::{ClientOptions, TokenStorage};
    pub use crate::envelope::Paged;
    pub use crate::error::Error;
    pub use crate::list::{FetchOutcome, ListController, ListSource};
    pub use crate::query::Pagination;
    pub use crate::TerraMartz;
    pub use terramartz_auth::Session;
}
