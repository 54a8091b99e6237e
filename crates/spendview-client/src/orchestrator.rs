//! # View Orchestrator
//!
//! Owns the current [`ViewSelection`] and coordinates the employee list, the
//! paginated collection and the by-employee collection behind it.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          ViewOrchestrator                               │
//! │                                                                         │
//! │  activate() ──► select_all() ──► EmployeeDirectory.ensure_loaded        │
//! │                       │          PaginatedTransactions.fetch_first_page │
//! │                       │                                                 │
//! │  select_employee(X) ──┼────────► TransactionsByEmployee.fetch_for(X)    │
//! │                       │                                                 │
//! │  set_transaction_approval(T, v)                                         │
//! │     1. patch paginated collection                                       │
//! │     2. remember approval for every employee collection                  │
//! │     3. drop cached employee responses                                   │
//! │     4. setTransactionApproval (uncached)                                │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │  snapshot() = derive_displayed(selection, paginated, by_employee)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Staleness
//! Every selection change bumps a generation counter. An operation compares
//! the generation it started under with the current one before reporting its
//! result as the live view; the displayed collection itself is always derived
//! from the current selection, so an overtaken fetch can never surface.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use spendview_core::{
    derive_displayed, employee_options, has_more_pages, EmployeeOption,
    SetTransactionApprovalParams, Transaction, ViewSelection,
};

use crate::by_employee::TransactionsByEmployee;
use crate::cache::{ApiClient, InFlightGuard};
use crate::config::ClientConfig;
use crate::employees::EmployeeDirectory;
use crate::error::ClientResult;
use crate::paginated::PaginatedTransactions;
use crate::transport::{ApiTransport, Endpoint};

// =============================================================================
// Snapshot
// =============================================================================

/// Everything a view needs to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub selection: ViewSelection,
    pub transactions: Vec<Transaction>,
    /// Only true under "all employees" while the server reports more pages.
    pub has_more_pages: bool,
    pub is_loading: bool,
}

#[derive(Debug, Default)]
struct SelectionState {
    selection: ViewSelection,
    generation: u64,
}

// =============================================================================
// Orchestrator
// =============================================================================

pub struct ViewOrchestrator {
    client: ApiClient,
    employees: EmployeeDirectory,
    paginated: PaginatedTransactions,
    by_employee: TransactionsByEmployee,
    selection: RwLock<SelectionState>,
    activating: AtomicBool,
    operations: Arc<AtomicUsize>,
    rollback_failed_approvals: bool,
}

impl ViewOrchestrator {
    /// Creates an orchestrator in its initial state: "all employees" selected,
    /// nothing loaded. Every component shares one response cache.
    pub fn new(transport: Arc<dyn ApiTransport>, config: &ClientConfig) -> Self {
        let client = ApiClient::new(transport, config);

        ViewOrchestrator {
            employees: EmployeeDirectory::new(client.handle()),
            paginated: PaginatedTransactions::new(client.handle()),
            by_employee: TransactionsByEmployee::new(client.handle()),
            client,
            selection: RwLock::new(SelectionState::default()),
            activating: AtomicBool::new(false),
            operations: Arc::new(AtomicUsize::new(0)),
            rollback_failed_approvals: config.rollback_failed_approvals(),
        }
    }

    /// Performs the initial "select all employees".
    ///
    /// Skipped while the employee list is loaded or loading, and while
    /// another activation runs. A failed activation (employee list still
    /// absent) can be repeated.
    pub async fn activate(&self) -> ViewSnapshot {
        if self.employees.is_loaded().await || self.employees.is_loading() {
            debug!("Already active");
            return self.snapshot().await;
        }
        if self.activating.swap(true, Ordering::SeqCst) {
            debug!("Activation already running");
            return self.snapshot().await;
        }

        info!("Activating transaction view");
        let snapshot = self.select_all().await;
        self.activating.store(false, Ordering::SeqCst);
        snapshot
    }

    /// Dispatches a picker choice.
    pub async fn select(&self, selection: ViewSelection) -> ViewSnapshot {
        match selection {
            ViewSelection::AllEmployees => self.select_all().await,
            ViewSelection::Employee(employee_id) => self.select_employee(&employee_id).await,
        }
    }

    /// Shows the paginated collection of every employee.
    pub async fn select_all(&self) -> ViewSnapshot {
        {
            let _op = InFlightGuard::enter(&self.operations);
            let generation = self.set_selection(ViewSelection::AllEmployees).await;

            self.employees.ensure_loaded().await;
            if self.paginated.fetch_first_page().await.is_none() {
                warn!("No transactions to show for all employees");
            }

            self.log_if_overtaken(generation).await;
        }
        self.snapshot().await
    }

    /// Shows every transaction of `employee_id`.
    ///
    /// The empty id is the "All Employees" picker entry.
    pub async fn select_employee(&self, employee_id: &str) -> ViewSnapshot {
        let selection = ViewSelection::from_employee_id(employee_id);
        if selection.is_all_employees() {
            return self.select_all().await;
        }

        {
            let _op = InFlightGuard::enter(&self.operations);
            let generation = self.set_selection(selection).await;

            if self.by_employee.fetch_for(employee_id).await.is_none() {
                debug!(%employee_id, "No transactions stored for employee");
            }

            self.log_if_overtaken(generation).await;
        }
        self.snapshot().await
    }

    /// Optimistically patches the loaded collections, then persists the
    /// change.
    ///
    /// Without rollback a failed call is logged and the patch stands. With
    /// rollback the previous value is restored and the error returned.
    pub async fn set_transaction_approval(
        &self,
        transaction_id: &str,
        approved: bool,
    ) -> ClientResult<ViewSnapshot> {
        {
            let _op = InFlightGuard::enter(&self.operations);
            self.apply_approval(transaction_id, approved).await?;
        }
        Ok(self.snapshot().await)
    }

    /// Appends the next page. A no-op unless "all employees" is selected.
    pub async fn load_next_page(&self) -> ViewSnapshot {
        if !self.selection.read().await.selection.is_all_employees() {
            debug!("Next page only applies to all employees");
            return self.snapshot().await;
        }

        {
            let _op = InFlightGuard::enter(&self.operations);
            self.paginated.load_next_page().await;
        }
        self.snapshot().await
    }

    /// Drops every cached response and loaded page, then refetches the
    /// current selection from the network.
    pub async fn reload(&self) -> ViewSnapshot {
        info!("Reloading transaction view");
        self.client.clear_cache();
        self.paginated.invalidate().await;
        self.by_employee.forget_approvals().await;

        let selection = self.selection.read().await.selection.clone();
        self.select(selection).await
    }

    // =========================================================================
    // Read Side
    // =========================================================================

    pub async fn snapshot(&self) -> ViewSnapshot {
        let selection = self.selection.read().await.selection.clone();
        let paginated = self.paginated.collection().await;
        let scoped = self.by_employee.collection().await;

        ViewSnapshot {
            transactions: derive_displayed(&selection, paginated.as_ref(), scoped.as_ref()),
            has_more_pages: has_more_pages(&selection, paginated.as_ref()),
            is_loading: self.is_loading(),
            selection,
        }
    }

    pub async fn selection(&self) -> ViewSelection {
        self.selection.read().await.selection.clone()
    }

    /// Picker entries; empty until the employee list has loaded.
    pub async fn employee_options(&self) -> Vec<EmployeeOption> {
        let employees = self.employees.employees().await;
        employee_options(employees.as_deref())
    }

    /// True while any operation or any component call is outstanding.
    pub fn is_loading(&self) -> bool {
        self.operations.load(Ordering::SeqCst) > 0
            || self.client.is_loading()
            || self.employees.is_loading()
            || self.paginated.is_loading()
            || self.by_employee.is_loading()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn apply_approval(&self, transaction_id: &str, approved: bool) -> ClientResult<()> {
        let previous = self.current_approval(transaction_id).await;

        self.patch(transaction_id, approved).await;
        self.client.invalidate_endpoint(Endpoint::TransactionsByEmployee);

        let params = SetTransactionApprovalParams {
            transaction_id: transaction_id.to_string(),
            value: approved,
        };
        match self
            .client
            .request_without_cache::<(), _>(Endpoint::SetTransactionApproval, &params)
            .await
        {
            Ok(()) => {
                info!(transaction_id, approved, "Transaction approval saved");
            }
            Err(e) if self.rollback_failed_approvals => {
                warn!(transaction_id, error = %e, "Approval failed, rolling back");
                match previous {
                    Some(previous) => self.patch(transaction_id, previous).await,
                    None => self.by_employee.forget_approval(transaction_id).await,
                }
                return Err(e);
            }
            Err(e) => {
                warn!(transaction_id, approved, error = %e, "Approval failed, keeping local change");
            }
        }

        Ok(())
    }

    async fn set_selection(&self, selection: ViewSelection) -> u64 {
        let mut state = self.selection.write().await;
        state.generation += 1;
        debug!(%selection, generation = state.generation, "Selection changed");
        state.selection = selection;
        state.generation
    }

    async fn log_if_overtaken(&self, generation: u64) {
        let state = self.selection.read().await;
        if state.generation != generation {
            debug!(
                started = generation,
                current = state.generation,
                selection = %state.selection,
                "Selection changed while loading, result not shown"
            );
        }
    }

    /// Remembered approvals reach employee collections that are not loaded
    /// yet, including ones served from the cache or still in flight.
    async fn patch(&self, transaction_id: &str, approved: bool) {
        self.paginated.update_one(transaction_id, approved).await;
        self.by_employee.remember_approval(transaction_id, approved).await;
    }

    async fn current_approval(&self, transaction_id: &str) -> Option<bool> {
        let find = |transactions: &[Transaction]| {
            transactions
                .iter()
                .find(|t| t.id == transaction_id)
                .map(|t| t.approved)
        };

        if let Some(collection) = self.paginated.collection().await {
            if let Some(approved) = find(&collection.data) {
                return Some(approved);
            }
        }
        self.by_employee
            .collection()
            .await
            .and_then(|c| find(&c.transactions))
    }
}
