//! Payment transactions

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ServiceContext;
use crate::envelope::{Paged, RecordKey};
use crate::error::Error;
use crate::list::ListSource;
use crate::query::{PagedQuery, Pagination, QueryBuilder};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(flatten)]
    pub key: RecordKey,

    #[serde(default)]
    pub amount: Option<f64>,

    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transaction {
    pub fn id(&self) -> &str {
        self.key.as_str()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub search: Option<String>,
    pub status: Option<String>,
    pub kind: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl PagedQuery for TransactionFilter {
    fn to_query(&self, pagination: Pagination) -> QueryBuilder {
        let mut query = QueryBuilder::new();
        query
            .push_opt("search", self.search.as_deref())
            .push_opt("status", self.status.as_deref())
            .push_opt("type", self.kind.as_deref())
            .push_opt("startDate", self.start_date.as_ref())
            .push_opt("endDate", self.end_date.as_ref())
            .paginate(pagination);
        query
    }
}

/// Client for `/api/admin/transactions`
#[derive(Debug, Clone)]
pub struct TransactionsService {
    ctx: ServiceContext,
}

impl TransactionsService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn list(
        &self,
        filter: &TransactionFilter,
        pagination: Pagination,
    ) -> Result<Paged<Transaction>, Error> {
        let url = self.ctx.url(&["api", "admin", "transactions"])?;
        let page = self
            .ctx
            .get(url)
            .query(filter.to_query(pagination))
            .execute::<Paged<Transaction>>()
            .await?;
        page.validate()
    }
}

#[async_trait]
impl ListSource for TransactionsService {
    type Item = Transaction;
    type Filter = TransactionFilter;

    async fn fetch(
        &self,
        filter: &TransactionFilter,
        pagination: Pagination,
    ) -> Result<Paged<Transaction>, Error> {
        self.list(filter, pagination).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_deserializes_type() {
        let tx: Transaction = serde_json::from_value(serde_json::json!({
            "_id": "t1",
            "amount": 19.99,
            "type": "payout",
            "status": "completed"
        }))
        .unwrap();

        assert_eq!(tx.kind.as_deref(), Some("payout"));
        assert_eq!(tx.id(), "t1");
    }

    #[test]
    fn test_transaction_query() {
        let filter = TransactionFilter {
            kind: Some("refund".to_string()),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 30),
            ..Default::default()
        };

        assert_eq!(
            filter.to_query(Pagination::default()).to_query_string(),
            "type=refund&endDate=2024-06-30&page=1&limit=10"
        );
    }
}
