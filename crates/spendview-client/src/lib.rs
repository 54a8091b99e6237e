//! # spendview-client: Data-Access Layer for Spendview
//!
//! Fetches, caches, paginates and optimistically mutates the transaction
//! dataset behind the API, and keeps the "all employees" and "one employee"
//! views consistent with each other.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Client Layer Architecture                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                ViewOrchestrator (selection owner)                │  │
//! │  │                                                                  │  │
//! │  │  select_all / select_employee / set_transaction_approval        │  │
//! │  │  load_next_page / reload / snapshot                             │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ Employee       │  │ Paginated      │  │ TransactionsBy         │    │
//! │  │ Directory      │  │ Transactions   │  │ Employee               │    │
//! │  │                │  │                │  │                        │    │
//! │  │ Loaded once    │  │ Appends pages  │  │ Replaced per fetch,    │    │
//! │  │                │  │ until null     │  │ latest ticket wins     │    │
//! │  └───────┬────────┘  └───────┬────────┘  └───────────┬────────────┘    │
//! │          └───────────────────┼───────────────────────┘                  │
//! │                              ▼                                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │ ApiClient: one response cache, one loading counter per handle   │   │
//! │  └───────────────────────────┬─────────────────────────────────────┘   │
//! │                              ▼                                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │ dyn ApiTransport (InMemoryApi or a remote implementation)       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`cache`] - `ApiClient` response cache and loading flag
//! - [`paginated`] - Page accumulator for all employees
//! - [`by_employee`] - Per-employee fetcher
//! - [`employees`] - Employee list for the picker
//! - [`orchestrator`] - `ViewOrchestrator`, the single owner of the selection
//! - [`transport`] - Endpoint names and the `ApiTransport` trait
//! - [`in_memory`] - In-process API over a `Dataset`
//! - [`config`] - Client configuration
//! - [`error`] - Client error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spendview_client::{ClientConfig, InMemoryApi, ViewOrchestrator};
//! use std::sync::Arc;
//!
//! let config = ClientConfig::load_or_default(None);
//! let api = Arc::new(InMemoryApi::with_config(dataset, &config));
//! let view = ViewOrchestrator::new(api, &config);
//!
//! let snapshot = view.activate().await;
//! println!("{} transactions", snapshot.transactions.len());
//!
//! view.select_employee("e1").await;
//! view.set_transaction_approval("t1", true).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod by_employee;
pub mod cache;
pub mod config;
pub mod employees;
pub mod error;
pub mod in_memory;
pub mod orchestrator;
pub mod paginated;
pub mod transport;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use by_employee::TransactionsByEmployee;
pub use cache::{ApiClient, CacheKey};
pub use config::{ApiSettings, ClientConfig, ClientSettings, LoggingSettings};
pub use employees::EmployeeDirectory;
pub use error::{ClientError, ClientResult};
pub use in_memory::InMemoryApi;
pub use orchestrator::{ViewOrchestrator, ViewSnapshot};
pub use paginated::PaginatedTransactions;
pub use transport::{ApiTransport, Endpoint};
