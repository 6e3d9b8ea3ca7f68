//! Paginated list state with refetch-after-write
//!
//! A [`ListController`] holds what an admin table shows: the active filter,
//! the current page and size, and the rows of the last page fetched. Every
//! change of filter or page fetches again and replaces the rows outright;
//! earlier pages are never kept.
//!
//! Each fetch takes a ticket from a generation counter. When a response
//! arrives after a newer fetch has started, it is discarded, so a slow reply
//! for page 1 can never overwrite the rows of page 2.
//!
//! Mutations go through a [`PendingAction`] that does nothing until it is
//! confirmed, and are followed by a refetch of the current page rather than a
//! local patch of the rows.

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::envelope::Paged;
use crate::error::Error;
use crate::query::{Pagination, DEFAULT_LIMIT};

/// A paged resource a [`ListController`] can drive
#[async_trait]
pub trait ListSource: Send + Sync {
    type Item: Clone + Send + Sync;
    type Filter: Clone + Default + Send + Sync;

    async fn fetch(
        &self,
        filter: &Self::Filter,
        pagination: Pagination,
    ) -> Result<Paged<Self::Item>, Error>;

    async fn delete(&self, id: &str) -> Result<Value, Error> {
        Err(Error::general(format!("cannot delete {}: not supported", id)))
    }

    async fn update(&self, id: &str, _payload: Value) -> Result<Value, Error> {
        Err(Error::general(format!("cannot update {}: not supported", id)))
    }
}

/// What became of a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the rows
    Applied,
    /// A newer fetch started first; the response was dropped
    Superseded,
}

/// Snapshot of a list
#[derive(Debug, Clone)]
pub struct ListState<F, T> {
    pub filter: F,
    pub pagination: Pagination,
    pub rows: Vec<T>,
    pub total: u64,
    /// Whether any fetch has been applied yet
    pub loaded: bool,
}

impl<F, T> ListState<F, T> {
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.pagination.limit))
    }
}

/// Paginated, filterable view over a [`ListSource`]
pub struct ListController<S: ListSource> {
    source: S,
    state: Mutex<ListState<S::Filter, S::Item>>,
    generation: AtomicU64,
}

impl<S: ListSource> ListController<S> {
    pub fn new(source: S) -> Self {
        Self::with_limit(source, DEFAULT_LIMIT)
    }

    pub fn with_limit(source: S, limit: u32) -> Self {
        Self {
            source,
            state: Mutex::new(ListState {
                filter: S::Filter::default(),
                pagination: Pagination::new(1, limit),
                rows: Vec::new(),
                total: 0,
                loaded: false,
            }),
            generation: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn lock(&self) -> MutexGuard<'_, ListState<S::Filter, S::Item>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> ListState<S::Filter, S::Item> {
        self.lock().clone()
    }

    pub fn rows(&self) -> Vec<S::Item> {
        self.lock().rows.clone()
    }

    pub fn filter(&self) -> S::Filter {
        self.lock().filter.clone()
    }

    pub fn pagination(&self) -> Pagination {
        self.lock().pagination
    }

    pub fn total(&self) -> u64 {
        self.lock().total
    }

    pub fn total_pages(&self) -> u64 {
        self.lock().total_pages()
    }

    /// Fetch the current page again
    pub async fn refresh(&self) -> Result<FetchOutcome, Error> {
        let (ticket, filter, pagination) = {
            let state = self.lock();
            let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            (ticket, state.filter.clone(), state.pagination)
        };

        debug!("List fetch #{} for page {}", ticket, pagination.page);
        let result = self.source.fetch(&filter, pagination).await;

        let mut state = self.lock();
        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!("Dropping response of superseded fetch #{}", ticket);
            return Ok(FetchOutcome::Superseded);
        }

        let page = result?;
        state.total = page.total;
        state.rows = page.data;
        state.loaded = true;
        Ok(FetchOutcome::Applied)
    }

    /// Move to a page and fetch it
    pub async fn set_page(&self, page: u32) -> Result<FetchOutcome, Error> {
        {
            let mut state = self.lock();
            state.pagination = Pagination::new(page, state.pagination.limit);
        }
        self.refresh().await
    }

    pub async fn next_page(&self) -> Result<FetchOutcome, Error> {
        let page = self.lock().pagination.page.saturating_add(1);
        self.set_page(page).await
    }

    pub async fn previous_page(&self) -> Result<FetchOutcome, Error> {
        let page = self.lock().pagination.page.saturating_sub(1);
        self.set_page(page).await
    }

    /// Change the page size and go back to the first page
    pub async fn set_limit(&self, limit: u32) -> Result<FetchOutcome, Error> {
        {
            let mut state = self.lock();
            state.pagination = Pagination::new(1, limit);
        }
        self.refresh().await
    }

    /// Replace the filter and go back to the first page
    pub async fn set_filter(&self, filter: S::Filter) -> Result<FetchOutcome, Error> {
        {
            let mut state = self.lock();
            state.filter = filter;
            state.pagination = Pagination::new(1, state.pagination.limit);
        }
        self.refresh().await
    }

    /// Ask to delete a row; nothing happens until the action is confirmed
    pub fn request_delete(&self, id: &str) -> PendingAction<'_, S> {
        PendingAction {
            controller: self,
            id: id.to_string(),
            kind: ActionKind::Delete,
        }
    }

    /// Ask to update a row; nothing happens until the action is confirmed
    pub fn request_update(&self, id: &str, payload: Value) -> PendingAction<'_, S> {
        PendingAction {
            controller: self,
            id: id.to_string(),
            kind: ActionKind::Update(payload),
        }
    }

    /// Refetch after a mutation, stepping back when the page went empty
    async fn refresh_after_write(&self) -> Result<FetchOutcome, Error> {
        let outcome = self.refresh().await?;
        let step_back = {
            let state = self.lock();
            outcome == FetchOutcome::Applied
                && state.rows.is_empty()
                && state.pagination.page > 1
        };

        if step_back {
            self.previous_page().await
        } else {
            Ok(outcome)
        }
    }

    /// Refetch after a successful write to `id` and pair it with the response
    pub(crate) async fn finish_write(&self, id: &str, response: Value) -> ActionOutcome {
        let refreshed = self.refresh_after_write().await;
        if let Err(e) = &refreshed {
            warn!("Refetch after writing {} failed: {}", id, e);
        }

        ActionOutcome {
            response,
            refreshed,
        }
    }
}

impl<S: ListSource + fmt::Debug> fmt::Debug for ListController<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("ListController")
            .field("source", &self.source)
            .field("pagination", &state.pagination)
            .field("rows", &state.rows.len())
            .field("total", &state.total)
            .finish()
    }
}

#[derive(Debug, Clone)]
enum ActionKind {
    Delete,
    Update(Value),
}

/// Result of a confirmed action
#[derive(Debug)]
pub struct ActionOutcome {
    /// The backend's response body
    pub response: Value,
    /// The refetch that followed
    pub refreshed: Result<FetchOutcome, Error>,
}

/// A mutation awaiting confirmation
#[must_use = "a pending action does nothing until it is confirmed"]
pub struct PendingAction<'a, S: ListSource> {
    controller: &'a ListController<S>,
    id: String,
    kind: ActionKind,
}

impl<'a, S: ListSource> PendingAction<'a, S> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_delete(&self) -> bool {
        matches!(self.kind, ActionKind::Delete)
    }

    /// Run the mutation, then refetch the current page
    ///
    /// A failed mutation is returned as the error. A failed refetch is
    /// reported in [`ActionOutcome::refreshed`] since the write itself went
    /// through.
    pub async fn confirm(self) -> Result<ActionOutcome, Error> {
        let source = &self.controller.source;
        let response = match self.kind {
            ActionKind::Delete => source.delete(&self.id).await?,
            ActionKind::Update(payload) => source.update(&self.id, payload).await?,
        };

        Ok(self.controller.finish_write(&self.id, response).await)
    }

    /// Drop the action without touching the backend
    pub fn cancel(self) {
        debug!("Cancelled pending action on {}", self.id);
    }
}
