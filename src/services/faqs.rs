//! FAQ administration

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ServiceContext;
use crate::envelope::{Paged, RecordKey};
use crate::error::Error;
use crate::list::ListSource;
use crate::query::{PagedQuery, Pagination, QueryBuilder};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    #[serde(flatten)]
    pub key: RecordKey,

    pub question: String,

    pub answer: String,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub is_active: Option<bool>,

    /// Display position
    #[serde(default)]
    pub order: Option<i64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Faq {
    pub fn id(&self) -> &str {
        self.key.as_str()
    }
}

/// Body of FAQ create and update calls; unset fields are left out
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaqFilter {
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

impl PagedQuery for FaqFilter {
    fn to_query(&self, pagination: Pagination) -> QueryBuilder {
        let mut query = QueryBuilder::new();
        query
            .paginate(pagination)
            .push_opt("search", self.search.as_deref())
            .push_opt("isActive", self.is_active.as_ref());
        query
    }
}

/// Client for `/api/faqs`
#[derive(Debug, Clone)]
pub struct FaqsService {
    ctx: ServiceContext,
}

impl FaqsService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// All FAQs, active or not
    pub async fn list(&self, filter: &FaqFilter, pagination: Pagination) -> Result<Paged<Faq>, Error> {
        let url = self.ctx.url(&["api", "faqs", "admin", "all"])?;
        let page = self
            .ctx
            .get(url)
            .query(filter.to_query(pagination))
            .execute::<Paged<Faq>>()
            .await?;
        page.validate()
    }

    pub async fn create(&self, payload: &FaqPayload) -> Result<Value, Error> {
        let url = self.ctx.url(&["api", "faqs"])?;
        self.ctx.post(url).json(payload)?.execute_value().await
    }

    pub async fn update(&self, id: &str, payload: &FaqPayload) -> Result<Value, Error> {
        let url = self.ctx.url(&["api", "faqs", id])?;
        self.ctx.patch(url).json(payload)?.execute_value().await
    }

    pub async fn delete(&self, id: &str) -> Result<Value, Error> {
        let url = self.ctx.url(&["api", "faqs", id])?;
        self.ctx.delete(url).execute_value().await
    }
}

#[async_trait]
impl ListSource for FaqsService {
    type Item = Faq;
    type Filter = FaqFilter;

    async fn fetch(&self, filter: &FaqFilter, pagination: Pagination) -> Result<Paged<Faq>, Error> {
        self.list(filter, pagination).await
    }

    async fn delete(&self, id: &str) -> Result<Value, Error> {
        FaqsService::delete(self, id).await
    }

    async fn update(&self, id: &str, payload: Value) -> Result<Value, Error> {
        let url = self.ctx.url(&["api", "faqs", id])?;
        self.ctx.patch(url).json(&payload)?.execute_value().await
    }
}
