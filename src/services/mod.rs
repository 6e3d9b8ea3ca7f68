//! Per-resource API services
//!
//! Every service shares a [`ServiceContext`]: the base URL, the HTTP client
//! and the [`Session`] whose token is attached to each request. Reads return
//! a validated [`Paged`](crate::envelope::Paged) envelope; mutations return
//! the backend body untouched. Nothing is retried.

mod faqs;
mod products;
mod seller_orders;
mod transactions;
mod users;

use reqwest::Client;
use terramartz_auth::Session;
use url::Url;

use crate::fetch::{endpoint, Fetch, FetchBuilder};
use crate::error::Error;

pub use faqs::*;
pub use products::*;
pub use seller_orders::*;
pub use transactions::*;
pub use users::*;

/// Shared state of the resource services
#[derive(Debug, Clone)]
pub struct ServiceContext {
    base_url: Url,
    client: Client,
    session: Session,
    client_info: String,
}

impl ServiceContext {
    pub fn new(base_url: Url, client: Client, session: Session, client_info: &str) -> Self {
        Self {
            base_url,
            client,
            session,
            client_info: client_info.to_string(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        endpoint(&self.base_url, segments)
    }

    fn prepare<'a>(&self, fetch: FetchBuilder<'a>) -> FetchBuilder<'a> {
        fetch
            .header("X-Client-Info", &self.client_info)
            .session(&self.session)
    }

    pub(crate) fn get(&self, url: Url) -> FetchBuilder<'_> {
        self.prepare(Fetch::get(&self.client, url))
    }

    pub(crate) fn post(&self, url: Url) -> FetchBuilder<'_> {
        self.prepare(Fetch::post(&self.client, url))
    }

    pub(crate) fn patch(&self, url: Url) -> FetchBuilder<'_> {
        self.prepare(Fetch::patch(&self.client, url))
    }

    pub(crate) fn delete(&self, url: Url) -> FetchBuilder<'_> {
        self.prepare(Fetch::delete(&self.client, url))
    }
}
