//! Seller order statistics and per-seller order lists

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ServiceContext;
use crate::envelope::{Paged, RecordKey};
use crate::error::Error;
use crate::list::ListSource;
use crate::query::{PagedQuery, Pagination, QueryBuilder};

/// A seller with aggregated order figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerSummary {
    #[serde(flatten)]
    pub key: RecordKey,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub shop_name: Option<String>,

    #[serde(default)]
    pub total_orders: Option<u64>,

    #[serde(default)]
    pub total_revenue: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SellerSummary {
    pub fn id(&self) -> &str {
        self.key.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerOrder {
    #[serde(flatten)]
    pub key: RecordKey,

    #[serde(default)]
    pub order_number: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub payment_status: Option<String>,

    #[serde(default)]
    pub total_amount: Option<f64>,

    #[serde(default)]
    pub buyer: Option<Value>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SellerOrder {
    pub fn id(&self) -> &str {
        self.key.as_str()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SellerFilter {
    pub search: Option<String>,
}

impl PagedQuery for SellerFilter {
    fn to_query(&self, pagination: Pagination) -> QueryBuilder {
        let mut query = QueryBuilder::new();
        query
            .paginate(pagination)
            .push_opt("search", self.search.as_deref());
        query
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SellerOrderFilter {
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub search: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl PagedQuery for SellerOrderFilter {
    fn to_query(&self, pagination: Pagination) -> QueryBuilder {
        let mut query = QueryBuilder::new();
        query
            .push_opt("status", self.status.as_deref())
            .push_opt("paymentStatus", self.payment_status.as_deref())
            .push_opt("search", self.search.as_deref())
            .push_opt("startDate", self.start_date.as_ref())
            .push_opt("endDate", self.end_date.as_ref())
            .paginate(pagination);
        query
    }
}

/// Client for `/api/admin/seller-orders`
#[derive(Debug, Clone)]
pub struct SellerOrdersService {
    ctx: ServiceContext,
}

impl SellerOrdersService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Sellers with their order statistics
    pub async fn sellers(
        &self,
        filter: &SellerFilter,
        pagination: Pagination,
    ) -> Result<Paged<SellerSummary>, Error> {
        let url = self.ctx.url(&["api", "admin", "seller-orders", "sellers"])?;
        let page = self
            .ctx
            .get(url)
            .query(filter.to_query(pagination))
            .execute::<Paged<SellerSummary>>()
            .await?;
        page.validate()
    }

    /// Orders received by one seller
    pub async fn orders(
        &self,
        seller_id: &str,
        filter: &SellerOrderFilter,
        pagination: Pagination,
    ) -> Result<Paged<SellerOrder>, Error> {
        let url = self
            .ctx
            .url(&["api", "admin", "seller-orders", seller_id, "orders"])?;
        let page = self
            .ctx
            .get(url)
            .query(filter.to_query(pagination))
            .execute::<Paged<SellerOrder>>()
            .await?;
        page.validate()
    }

    /// The orders of one seller as a [`ListSource`]
    pub fn orders_of(&self, seller_id: &str) -> SellerOrders {
        SellerOrders {
            service: self.clone(),
            seller_id: seller_id.to_string(),
        }
    }
}

#[async_trait]
impl ListSource for SellerOrdersService {
    type Item = SellerSummary;
    type Filter = SellerFilter;

    async fn fetch(
        &self,
        filter: &SellerFilter,
        pagination: Pagination,
    ) -> Result<Paged<SellerSummary>, Error> {
        self.sellers(filter, pagination).await
    }
}

/// Orders of a single seller
#[derive(Debug, Clone)]
pub struct SellerOrders {
    service: SellerOrdersService,
    seller_id: String,
}

impl SellerOrders {
    pub fn seller_id(&self) -> &str {
        &self.seller_id
    }
}

#[async_trait]
impl ListSource for SellerOrders {
    type Item = SellerOrder;
    type Filter = SellerOrderFilter;

    async fn fetch(
        &self,
        filter: &SellerOrderFilter,
        pagination: Pagination,
    ) -> Result<Paged<SellerOrder>, Error> {
        self.service.orders(&self.seller_id, filter, pagination).await
    }
}
