//! Product catalogue administration and the approval endpoints

use async_trait::async_trait;
use bytes::Bytes;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::ServiceContext;
use crate::envelope::{ApiResponse, Paged, RecordKey};
use crate::error::Error;
use crate::list::ListSource;
use crate::query::{PagedQuery, Pagination, QueryBuilder, SortOrder};

/// Where a product stands in the admin review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalState {
    Pending,
    Approved,
    Rejected,
}

impl From<Option<bool>> for ApprovalState {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            None => ApprovalState::Pending,
            Some(true) => ApprovalState::Approved,
            Some(false) => ApprovalState::Rejected,
        }
    }
}

/// A product as listed to admins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(flatten)]
    pub key: RecordKey,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub price: Option<f64>,

    /// Category name or populated category document
    #[serde(default)]
    pub category: Option<Value>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub admin_approved: Option<bool>,

    #[serde(default)]
    pub seller: Option<Value>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    pub fn id(&self) -> &str {
        self.key.as_str()
    }

    pub fn approval_state(&self) -> ApprovalState {
        self.admin_approved.into()
    }
}

/// Filters of the admin product list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub admin_approved: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_organic: Option<bool>,
    pub seller_id: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl ProductFilter {
    /// Filter parameters without pagination, as the CSV export takes them
    pub fn filter_query(&self) -> QueryBuilder {
        let mut query = QueryBuilder::new();
        query
            .push_opt("search", self.search.as_deref())
            .push_opt("status", self.status.as_deref())
            .push_opt("category", self.category.as_deref())
            .push_opt("minPrice", self.min_price.as_ref())
            .push_opt("maxPrice", self.max_price.as_ref())
            .push_opt("adminApproved", self.admin_approved.as_ref())
            .push_opt("isFeatured", self.is_featured.as_ref())
            .push_opt("isOrganic", self.is_organic.as_ref())
            .push_opt("sellerId", self.seller_id.as_deref())
            .push_opt("sortBy", self.sort_by.as_deref())
            .push_opt("sortOrder", self.sort_order.as_ref());
        query
    }
}

impl PagedQuery for ProductFilter {
    fn to_query(&self, pagination: Pagination) -> QueryBuilder {
        let mut query = self.filter_query();
        query.paginate(pagination);
        query
    }
}

/// Filters of the pending-approval list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestedFilter {
    pub search: Option<String>,
    pub category: Option<String>,
}

impl PagedQuery for RequestedFilter {
    fn to_query(&self, pagination: Pagination) -> QueryBuilder {
        let mut query = QueryBuilder::new();
        query
            .push_opt("search", self.search.as_deref())
            .push_opt("category", self.category.as_deref())
            .paginate(pagination);
        query
    }
}

/// Client for `/api/admin/products`
#[derive(Debug, Clone)]
pub struct ProductsService {
    ctx: ServiceContext,
}

impl ProductsService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    fn products_url(&self, tail: &[&str]) -> Result<url::Url, Error> {
        let mut segments = vec!["api", "admin", "products"];
        segments.extend_from_slice(tail);
        self.ctx.url(&segments)
    }

    /// One page of products
    pub async fn list(
        &self,
        filter: &ProductFilter,
        pagination: Pagination,
    ) -> Result<Paged<Product>, Error> {
        let url = self.products_url(&[])?;
        let page = self
            .ctx
            .get(url)
            .query(filter.to_query(pagination))
            .execute::<Paged<Product>>()
            .await?;
        page.validate()
    }

    /// A single product
    pub async fn get(&self, id: &str) -> Result<Product, Error> {
        let url = self.products_url(&[id])?;
        let response = self
            .ctx
            .get(url)
            .execute::<ApiResponse<Product>>()
            .await?;
        Ok(response.data)
    }

    /// Products waiting for admin approval
    pub async fn requested(
        &self,
        filter: &RequestedFilter,
        pagination: Pagination,
    ) -> Result<Paged<Product>, Error> {
        let url = self.products_url(&["requested"])?;
        let page = self
            .ctx
            .get(url)
            .query(filter.to_query(pagination))
            .execute::<Paged<Product>>()
            .await?;
        page.validate()
    }

    /// Set the approval flag of a product
    pub async fn set_approval(&self, id: &str, approved: bool) -> Result<Value, Error> {
        let url = self.products_url(&[id, "approval"])?;
        let body = self
            .ctx
            .patch(url)
            .json(&json!({ "approved": approved }))?
            .execute_value()
            .await?;
        info!(
            "Product {} {}",
            id,
            if approved { "approved" } else { "rejected" }
        );
        Ok(body)
    }

    pub async fn approve(&self, id: &str) -> Result<Value, Error> {
        self.set_approval(id, true).await
    }

    pub async fn reject(&self, id: &str) -> Result<Value, Error> {
        self.set_approval(id, false).await
    }

    /// Change the listing status of a product
    pub async fn update_status(&self, id: &str, status: &str) -> Result<Value, Error> {
        let url = self.products_url(&[id, "status"])?;
        self.ctx
            .patch(url)
            .json(&json!({ "status": status }))?
            .execute_value()
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<Value, Error> {
        let url = self.products_url(&[id])?;
        self.ctx.delete(url).execute_value().await
    }

    /// CSV export of every product matching the filter
    pub async fn export_csv(&self, filter: &ProductFilter) -> Result<Bytes, Error> {
        let url = self.products_url(&["export", "csv"])?;
        self.ctx
            .get(url)
            .header("Accept", "text/csv")
            .query(filter.filter_query())
            .execute_bytes()
            .await
    }
}

#[async_trait]
impl ListSource for ProductsService {
    type Item = Product;
    type Filter = ProductFilter;

    async fn fetch(&self, filter: &ProductFilter, pagination: Pagination) -> Result<Paged<Product>, Error> {
        self.list(filter, pagination).await
    }

    async fn delete(&self, id: &str) -> Result<Value, Error> {
        ProductsService::delete(self, id).await
    }

    /// Accepts `{"status": ...}`
    async fn update(&self, id: &str, payload: Value) -> Result<Value, Error> {
        match payload.get("status").and_then(Value::as_str) {
            Some(status) => self.update_status(id, status).await,
            None => Err(Error::general("product updates take a status")),
        }
    }
}

/// The pending-approval list as a [`ListSource`]
#[derive(Debug, Clone)]
pub struct RequestedProducts {
    products: ProductsService,
}

impl RequestedProducts {
    pub fn new(products: ProductsService) -> Self {
        Self { products }
    }

    pub fn products(&self) -> &ProductsService {
        &self.products
    }
}

#[async_trait]
impl ListSource for RequestedProducts {
    type Item = Product;
    type Filter = RequestedFilter;

    async fn fetch(&self, filter: &RequestedFilter, pagination: Pagination) -> Result<Paged<Product>, Error> {
        self.products.requested(filter, pagination).await
    }

    async fn delete(&self, id: &str) -> Result<Value, Error> {
        self.products.delete(id).await
    }

    /// Accepts `{"approved": bool}`
    async fn update(&self, id: &str, payload: Value) -> Result<Value, Error> {
        match payload.get("approved").and_then(Value::as_bool) {
            Some(approved) => self.products.set_approval(id, approved).await,
            None => Err(Error::general("approval updates take an approved flag")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_pagination_order() {
        let filter = ProductFilter {
            status: Some("pending".to_string()),
            ..Default::default()
        };

        assert_eq!(
            filter.to_query(Pagination::new(2, 10)).to_query_string(),
            "status=pending&page=2&limit=10"
        );
    }

    #[test]
    fn test_full_filter_order() {
        let filter = ProductFilter {
            search: Some("kale".to_string()),
            status: Some("active".to_string()),
            category: Some("greens".to_string()),
            min_price: Some(1.5),
            max_price: Some(20.0),
            admin_approved: Some(true),
            is_featured: Some(false),
            is_organic: Some(true),
            seller_id: Some("s9".to_string()),
            sort_by: Some("price".to_string()),
            sort_order: Some(SortOrder::Asc),
        };

        assert_eq!(
            filter.to_query(Pagination::default()).to_query_string(),
            "search=kale&status=active&category=greens&minPrice=1.5&maxPrice=20\
             &adminApproved=true&isFeatured=false&isOrganic=true&sellerId=s9\
             &sortBy=price&sortOrder=asc&page=1&limit=10"
        );
    }

    #[test]
    fn test_empty_strings_are_omitted() {
        let filter = ProductFilter {
            search: Some(String::new()),
            category: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(
            filter.to_query(Pagination::new(1, 5)).to_query_string(),
            "page=1&limit=5"
        );
        assert!(filter.filter_query().is_empty());
    }

    #[test]
    fn test_approval_state() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "_id": "p1",
            "name": "Heirloom tomatoes",
            "price": 4.5,
            "adminApproved": false,
            "stock": 12
        }))
        .unwrap();

        assert_eq!(product.id(), "p1");
        assert_eq!(product.approval_state(), ApprovalState::Rejected);
        assert_eq!(product.extra.get("stock"), Some(&serde_json::json!(12)));
        assert_eq!(ApprovalState::from(None), ApprovalState::Pending);
    }
}
