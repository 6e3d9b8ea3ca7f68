//! Review queue for products awaiting admin approval

use log::info;

use crate::error::Error;
use crate::list::{ActionOutcome, FetchOutcome, ListController};
use crate::services::{Product, ProductsService, RequestedFilter, RequestedProducts};

/// The pending-approval product list with approve and reject actions
///
/// Approving or rejecting goes to the backend first and then refetches the
/// pending list, so a decided product drops out of the queue only once the
/// backend agrees.
#[derive(Debug)]
pub struct ApprovalQueue {
    list: ListController<RequestedProducts>,
}

impl ApprovalQueue {
    pub fn new(products: ProductsService) -> Self {
        Self {
            list: ListController::new(RequestedProducts::new(products)),
        }
    }

    pub fn with_limit(products: ProductsService, limit: u32) -> Self {
        Self {
            list: ListController::with_limit(RequestedProducts::new(products), limit),
        }
    }

    /// The underlying list, for paging and filtering
    pub fn list(&self) -> &ListController<RequestedProducts> {
        &self.list
    }

    /// Products on the current page of the queue
    pub fn pending(&self) -> Vec<Product> {
        self.list.rows()
    }

    pub async fn refresh(&self) -> Result<FetchOutcome, Error> {
        self.list.refresh().await
    }

    pub async fn set_filter(&self, filter: RequestedFilter) -> Result<FetchOutcome, Error> {
        self.list.set_filter(filter).await
    }

    pub async fn approve(&self, id: &str) -> Result<ActionOutcome, Error> {
        self.decide(id, true).await
    }

    pub async fn reject(&self, id: &str) -> Result<ActionOutcome, Error> {
        self.decide(id, false).await
    }

    async fn decide(&self, id: &str, approved: bool) -> Result<ActionOutcome, Error> {
        let response = self
            .list
            .source()
            .products()
            .set_approval(id, approved)
            .await?;

        let outcome = self.list.finish_write(id, response).await;
        info!(
            "Approval queue now holds {} of {} products",
            self.list.rows().len(),
            self.list.total()
        );

        Ok(outcome)
    }
}
