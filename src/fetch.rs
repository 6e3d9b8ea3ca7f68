//! HTTP request helper shared by the resource services

use bytes::Bytes;
use log::{debug, warn};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client, Method, RequestBuilder, Response,
};
use serde::{de::DeserializeOwned, Serialize};
use terramartz_auth::{error_message, Session};
use url::Url;

use crate::error::Error;
use crate::query::QueryBuilder;

/// Helper for building and executing HTTP requests
pub struct FetchBuilder<'a> {
    client: &'a Client,
    url: Url,
    method: Method,
    headers: HeaderMap,
    query: Option<QueryBuilder>,
    body: Option<Vec<u8>>,
}

impl<'a> FetchBuilder<'a> {
    /// Create a new FetchBuilder
    pub fn new(client: &'a Client, url: Url, method: Method) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        Self {
            client,
            url,
            method,
            headers,
            query: None,
            body: None,
        }
    }

    /// Add a header to the request
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add bearer token authentication to the request
    pub fn bearer_auth(self, token: &str) -> Self {
        self.header("Authorization", &format!("Bearer {}", token))
    }

    /// Attach the session's token when it holds a valid one
    pub fn session(self, session: &Session) -> Self {
        match session.get_valid_token() {
            Some(token) => self.bearer_auth(&token),
            None => self,
        }
    }

    /// Add query parameters to the request
    pub fn query(mut self, query: QueryBuilder) -> Self {
        self.query = Some(query);
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, Error> {
        let json = serde_json::to_vec(body)?;
        self.headers
            .insert("Content-Type", HeaderValue::from_static("application/json"));
        self.body = Some(json);
        Ok(self)
    }

    /// The final request URL
    pub fn url(&self) -> Url {
        let mut url = self.url.clone();
        if let Some(query) = &self.query {
            query.apply_to(&mut url);
        }
        url
    }

    fn build(&self) -> RequestBuilder {
        let url = self.url();
        debug!("{} {}", self.method, url);

        let mut req = self.client.request(self.method.clone(), url);
        req = req.headers(self.headers.clone());

        if let Some(body) = &self.body {
            req = req.body(body.clone());
        }

        req
    }

    async fn send(&self) -> Result<Response, Error> {
        let response = self.build().send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("{} {} failed with status {}", self.method, self.url, status);
            return Err(Error::api(status.as_u16(), error_message(&text)));
        }

        Ok(response)
    }

    /// Execute the request and parse the response as JSON
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let response = self.send().await?;
        let bytes = response.bytes().await?;
        let result = serde_json::from_slice::<T>(&bytes)?;
        Ok(result)
    }

    /// Execute the request and return the body as JSON, `null` when empty
    pub async fn execute_value(&self) -> Result<serde_json::Value, Error> {
        let response = self.send().await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Execute the request and return the raw body
    pub async fn execute_bytes(&self) -> Result<Bytes, Error> {
        let response = self.send().await?;
        Ok(response.bytes().await?)
    }
}

/// Helper for creating HTTP requests
pub struct Fetch;

impl Fetch {
    /// Create a GET request
    pub fn get(client: &Client, url: Url) -> FetchBuilder<'_> {
        FetchBuilder::new(client, url, Method::GET)
    }

    /// Create a POST request
    pub fn post(client: &Client, url: Url) -> FetchBuilder<'_> {
        FetchBuilder::new(client, url, Method::POST)
    }

    /// Create a PATCH request
    pub fn patch(client: &Client, url: Url) -> FetchBuilder<'_> {
        FetchBuilder::new(client, url, Method::PATCH)
    }

    /// Create a DELETE request
    pub fn delete(client: &Client, url: Url) -> FetchBuilder<'_> {
        FetchBuilder::new(client, url, Method::DELETE)
    }
}

/// Base URL joined with path segments, each segment percent-encoded
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, Error> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::config(format!("{} cannot be used as a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_segments() {
        let base = Url::parse("https://api.terramartz.com/").unwrap();
        let url = endpoint(&base, &["api", "admin", "products", "a b/c"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.terramartz.com/api/admin/products/a%20b%2Fc"
        );

        let prefixed = Url::parse("https://host/v2").unwrap();
        assert_eq!(
            endpoint(&prefixed, &["api", "faqs"]).unwrap().as_str(),
            "https://host/v2/api/faqs"
        );
    }

    #[test]
    fn test_url_includes_query() {
        let client = Client::new();
        let mut query = QueryBuilder::new();
        query.push("status", "pending");

        let fetch = Fetch::get(&client, Url::parse("http://localhost/api/x").unwrap()).query(query);
        assert_eq!(fetch.url().as_str(), "http://localhost/api/x?status=pending");
    }
}
