//! Query string building for list endpoints
//!
//! Filters render into an ordered [`QueryBuilder`]. Unset options and empty
//! strings never reach the wire, and rendering the same filter twice always
//! yields the same string.

use chrono::NaiveDate;
use url::form_urlencoded;
use url::Url;

/// First page number
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when none is given
pub const DEFAULT_LIMIT: u32 = 10;

/// Page number and size, both 1-based and never zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn page(page: u32) -> Self {
        Self::new(page, DEFAULT_LIMIT)
    }

    pub fn next(self) -> Self {
        Self::new(self.page.saturating_add(1), self.limit)
    }

    pub fn previous(self) -> Self {
        Self::new(self.page.saturating_sub(1), self.limit)
    }

    /// Rows skipped before this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

/// A scalar that can appear as a query value
pub trait QueryValue {
    fn query_value(&self) -> String;
}

impl QueryValue for str {
    fn query_value(&self) -> String {
        self.to_string()
    }
}

impl QueryValue for String {
    fn query_value(&self) -> String {
        self.clone()
    }
}

impl QueryValue for NaiveDate {
    fn query_value(&self) -> String {
        self.format("%Y-%m-%d").to_string()
    }
}

macro_rules! display_query_value {
    ($($ty:ty),*) => {
        $(impl QueryValue for $ty {
            fn query_value(&self) -> String {
                self.to_string()
            }
        })*
    };
}

display_query_value!(bool, u32, u64, i32, i64, f64);

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl QueryValue for SortOrder {
    fn query_value(&self) -> String {
        self.as_str().to_string()
    }
}

/// Ordered list of query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    params: Vec<(String, String)>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Append a parameter unless its rendered value is empty
    pub fn push<T: QueryValue + ?Sized>(&mut self, key: &str, value: &T) -> &mut Self {
        let value = value.query_value();
        if !value.is_empty() {
            self.params.push((key.to_string(), value));
        }
        self
    }

    /// Append a parameter if it is set
    pub fn push_opt<T: QueryValue + ?Sized>(&mut self, key: &str, value: Option<&T>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Append `page` and `limit`
    pub fn paginate(&mut self, pagination: Pagination) -> &mut Self {
        self.push("page", &pagination.page);
        self.push("limit", &pagination.limit);
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Form-encoded query string without the leading `?`
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish()
    }

    /// Append the parameters to a URL's query
    pub fn apply_to(&self, url: &mut Url) {
        if self.params.is_empty() {
            return;
        }
        url.query_pairs_mut().extend_pairs(self.params.iter());
    }
}

/// A filter that renders itself plus pagination into a query
pub trait PagedQuery {
    fn to_query(&self, pagination: Pagination) -> QueryBuilder;
}
