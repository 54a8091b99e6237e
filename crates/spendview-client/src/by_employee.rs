//! # Transactions By Employee
//!
//! Holds every transaction of the most recently requested employee.
//!
//! ```text
//! fetch_for(E2) ──ticket 1──►  ........ slow ........  ──► ticket 1 != latest, dropped
//! fetch_for(E1) ──ticket 2──►  .. fast ..  ──► stored (latest)
//! ```
//!
//! Each fetch replaces the stored collection wholesale. Only the result of
//! the latest fetch is ever stored.
//!
//! Approvals made locally are remembered and re-applied to every stored
//! collection, so a cached or late response can never revert them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use spendview_core::{EmployeeTransactions, RequestByEmployeeParams, Transaction};

use crate::cache::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::transport::Endpoint;

pub struct TransactionsByEmployee {
    client: ApiClient,
    collection: RwLock<Option<EmployeeTransactions>>,
    latest_ticket: AtomicU64,
    /// transaction id -> locally applied approval, kept until `forget_approvals`
    approvals: RwLock<HashMap<String, bool>>,
}

impl TransactionsByEmployee {
    pub fn new(client: ApiClient) -> Self {
        TransactionsByEmployee {
            client,
            collection: RwLock::new(None),
            latest_ticket: AtomicU64::new(0),
            approvals: RwLock::new(HashMap::new()),
        }
    }

    /// Fetches (through the cache) and stores `employee_id`'s transactions.
    ///
    /// A failed fetch clears the stored collection. A fetch overtaken by a
    /// newer one returns `None` and stores nothing.
    pub async fn fetch_for(&self, employee_id: &str) -> Option<Vec<Transaction>> {
        match self.request_for(employee_id).await {
            Ok(collection) => Some(collection.transactions),
            Err(ClientError::StaleResponse { employee_id }) => {
                debug!(%employee_id, "Dropped overtaken employee fetch");
                None
            }
            Err(e) => {
                warn!(%employee_id, error = %e, "Employee transactions unavailable");
                None
            }
        }
    }

    /// Like [`Self::fetch_for`], reporting why nothing was stored.
    pub async fn request_for(&self, employee_id: &str) -> ClientResult<EmployeeTransactions> {
        let ticket = self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(%employee_id, ticket, "Fetching employee transactions");

        let result = self
            .client
            .request_with_cache::<Vec<Transaction>, _>(
                Endpoint::TransactionsByEmployee,
                &RequestByEmployeeParams {
                    employee_id: employee_id.to_string(),
                },
            )
            .await;

        let mut collection = self.collection.write().await;
        if self.latest_ticket.load(Ordering::SeqCst) != ticket {
            return Err(ClientError::StaleResponse {
                employee_id: employee_id.to_string(),
            });
        }

        match result {
            Ok(transactions) => {
                info!(%employee_id, count = transactions.len(), "Employee transactions loaded");
                let mut fetched = EmployeeTransactions::new(employee_id, transactions);
                for (transaction_id, approved) in self.approvals.read().await.iter() {
                    fetched.set_approval(transaction_id, *approved);
                }
                *collection = Some(fetched.clone());
                Ok(fetched)
            }
            Err(e) => {
                *collection = None;
                Err(e)
            }
        }
    }

    /// Rewrites `approved` of one stored transaction. A miss is a no-op.
    pub async fn update_one(&self, transaction_id: &str, approved: bool) {
        let mut collection = self.collection.write().await;
        if let Some(collection) = collection.as_mut() {
            if collection.set_approval(transaction_id, approved) {
                debug!(
                    employee_id = %collection.employee_id,
                    transaction_id,
                    approved,
                    "Patched employee transaction"
                );
            }
        }
    }

    /// Records a local approval so later fetches of any employee carry it,
    /// and patches the stored collection.
    pub async fn remember_approval(&self, transaction_id: &str, approved: bool) {
        self.approvals
            .write()
            .await
            .insert(transaction_id.to_string(), approved);
        self.update_one(transaction_id, approved).await;
    }

    pub async fn forget_approval(&self, transaction_id: &str) {
        self.approvals.write().await.remove(transaction_id);
    }

    /// Drops remembered approvals; later fetches show the server's values.
    pub async fn forget_approvals(&self) {
        self.approvals.write().await.clear();
    }

    pub async fn collection(&self) -> Option<EmployeeTransactions> {
        self.collection.read().await.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.client.is_loading()
    }
}
