//! Response envelopes shared by the admin endpoints

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One page of a list endpoint
///
/// `results` is the number of rows on this page and `total` the number
/// across all pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paged<T> {
    #[serde(default)]
    pub status: String,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub results: usize,
    pub data: Vec<T>,
}

impl<T> Paged<T> {
    /// Check `data.len() == results <= limit`
    pub fn validate(self) -> Result<Self, Error> {
        if self.data.len() != self.results {
            return Err(Error::invalid_envelope(format!(
                "results is {} but {} rows were sent",
                self.results,
                self.data.len()
            )));
        }
        if self.results > self.limit as usize {
            return Err(Error::invalid_envelope(format!(
                "{} rows exceed the page limit of {}",
                self.results, self.limit
            )));
        }
        Ok(self)
    }

    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.limit))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paged<U> {
        Paged {
            status: self.status,
            page: self.page,
            limit: self.limit,
            total: self.total,
            results: self.results,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}

/// `{status, data}` wrapper around single records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub message: Option<String>,

    pub data: T,
}

/// Identifier of a backend record, sent as `_id`, `id` or both
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordKey {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl RecordKey {
    pub fn new(id: &str) -> Self {
        Self {
            object_id: Some(id.to_string()),
            id: None,
        }
    }

    pub fn as_str(&self) -> &str {
        self.object_id
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or_default()
    }
}
