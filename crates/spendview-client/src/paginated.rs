//! # Paginated Transactions
//!
//! Accumulates the pages of `paginatedTransactions` into one growing
//! collection.
//!
//! ## State Machine
//! ```text
//!                 fetch_first_page (ok)
//!   ┌──────────┐ ─────────────────────────► ┌──────────────────────┐
//!   │  Absent  │                            │ Loaded { data, next }│ ◄─┐
//!   └──────────┘ ◄───────────────────────── └──────────┬───────────┘   │
//!        ▲   fetch_first_page (err) / invalidate       │ load_next_page │
//!        │                                             └────────────────┘
//!        │                                               data ++ page
//!        │                                               next = page.next
//!        └── (page 0 failure settles here too)
//! ```
//!
//! `next == None` is the exhaustion sentinel: no further page is requested.
//!
//! ## Overlap
//! - A second `load_next_page` while one is in flight returns `None`.
//! - A page that lands after `invalidate` is dropped. Every `invalidate` bumps
//!   the epoch; a fetch only applies its page if the epoch it started under is
//!   still current.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use spendview_core::{
    PaginatedCollection, PaginatedRequestParams, PaginatedResponse, Transaction, FIRST_PAGE,
};

use crate::cache::ApiClient;
use crate::transport::Endpoint;

type Page = PaginatedResponse<Vec<Transaction>>;

#[derive(Debug, Default)]
struct PageState {
    collection: Option<PaginatedCollection>,
    epoch: u64,
}

/// Clears the "next page in flight" flag when dropped.
struct LoadingMoreGuard<'a>(&'a AtomicBool);

impl Drop for LoadingMoreGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The paginated "all employees" collection.
pub struct PaginatedTransactions {
    client: ApiClient,
    state: RwLock<PageState>,
    loading_more: AtomicBool,
}

impl PaginatedTransactions {
    pub fn new(client: ApiClient) -> Self {
        PaginatedTransactions {
            client,
            state: RwLock::new(PageState::default()),
            loading_more: AtomicBool::new(false),
        }
    }

    /// Loads page 0 unless a collection is already present.
    ///
    /// Returns the existing collection without a network call when loaded.
    /// A failed first page leaves the collection absent.
    pub async fn fetch_first_page(&self) -> Option<PaginatedCollection> {
        let epoch = {
            let state = self.state.read().await;
            if let Some(existing) = &state.collection {
                debug!(loaded = existing.data.len(), "First page already loaded");
                return Some(existing.clone());
            }
            state.epoch
        };

        debug!("Fetching first page");
        let page: Option<Page> = self
            .client
            .fetch_with_cache(
                Endpoint::PaginatedTransactions,
                &PaginatedRequestParams { page: FIRST_PAGE },
            )
            .await;

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            debug!("Discarding first page fetched before invalidation");
            return None;
        }
        if let Some(existing) = &state.collection {
            // Another caller stored page 0 while this one was in flight
            return Some(existing.clone());
        }

        match page {
            Some(page) => {
                let collection = PaginatedCollection::from_page(page);
                info!(
                    loaded = collection.data.len(),
                    next_page = ?collection.next_page,
                    "First page loaded"
                );
                state.collection = Some(collection.clone());
                Some(collection)
            }
            None => {
                warn!("First page failed, collection is absent");
                state.collection = None;
                None
            }
        }
    }

    /// Fetches the page at the current token and appends it.
    ///
    /// Returns `None` without touching the network when nothing is loaded,
    /// the collection is exhausted, or another next-page load is in flight.
    pub async fn load_next_page(&self) -> Option<PaginatedCollection> {
        if self.loading_more.swap(true, Ordering::SeqCst) {
            debug!("Next page already in flight");
            return None;
        }
        let _guard = LoadingMoreGuard(&self.loading_more);

        let (next_page, epoch) = {
            let state = self.state.read().await;
            match state.collection.as_ref().and_then(|c| c.next_page) {
                Some(next_page) => (next_page, state.epoch),
                None => {
                    debug!("No more transactions to load");
                    return None;
                }
            }
        };

        debug!(page = next_page, "Loading next page");
        let Some(page) = self
            .client
            .fetch_with_cache::<Page, _>(
                Endpoint::PaginatedTransactions,
                &PaginatedRequestParams { page: next_page },
            )
            .await
        else {
            warn!(page = next_page, "Failed to load next page");
            return None;
        };

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            debug!(page = next_page, "Discarding page fetched before invalidation");
            return None;
        }
        let current = state.collection.as_ref()?;
        if current.next_page != Some(next_page) {
            debug!(page = next_page, "Discarding page that no longer follows the collection");
            return None;
        }

        let collection = current.append_page(page);
        info!(
            loaded = collection.data.len(),
            next_page = ?collection.next_page,
            "Next page loaded"
        );
        state.collection = Some(collection.clone());
        Some(collection)
    }

    /// Discards the collection and its cached pages.
    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        state.collection = None;
        state.epoch += 1;
        self.client.invalidate_endpoint(Endpoint::PaginatedTransactions);
        debug!(epoch = state.epoch, "Paginated collection invalidated");
    }

    /// Rewrites `approved` of one loaded transaction. A miss is a no-op.
    pub async fn update_one(&self, transaction_id: &str, approved: bool) {
        let mut state = self.state.write().await;
        if let Some(collection) = state.collection.as_mut() {
            if collection.set_approval(transaction_id, approved) {
                debug!(transaction_id, approved, "Patched paginated transaction");
            }
        }
    }

    pub async fn collection(&self) -> Option<PaginatedCollection> {
        self.state.read().await.collection.clone()
    }

    pub async fn has_more_pages(&self) -> bool {
        self.state
            .read()
            .await
            .collection
            .as_ref()
            .is_some_and(PaginatedCollection::has_more_pages)
    }

    pub fn is_loading(&self) -> bool {
        self.client.is_loading()
    }
}
