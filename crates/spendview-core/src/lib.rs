//! # spendview-core: Pure Domain Logic for Spendview
//!
//! This crate holds the data model shared by every other member of the
//! workspace. It contains no I/O: everything here is a plain type or a pure
//! function over those types.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Spendview Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    spendview-cli (shell)                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            spendview-client (cache, pagers, orchestrator)       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ spendview-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌─────────────┐  ┌───────────┐  ┌──────────┐  │   │
//! │  │   │   types   │  │   dataset   │  │   view    │  │  error   │  │   │
//! │  │   │ Employee  │  │ pages, by-  │  │ selection │  │ CoreError│  │   │
//! │  │   │Transaction│  │ employee    │  │ derivation│  │          │  │   │
//! │  │   └───────────┘  └─────────────┘  └───────────┘  └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Wire and collection types (Employee, Transaction, pages)
//! - [`dataset`] - The server-side view of the data, used by in-process APIs
//! - [`view`] - View selection and displayed-collection derivation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use spendview_core::{PaginatedCollection, PaginatedResponse, Transaction};
//! use chrono::NaiveDate;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
//! let t1 = Transaction::new("t1", "e1", 12.5, "Cafe", date);
//! let t2 = Transaction::new("t2", "e1", 40.0, "Books", date);
//!
//! let first = PaginatedCollection::from_page(PaginatedResponse::new(vec![t1], Some(1)));
//! let both = first.append_page(PaginatedResponse::new(vec![t2], None));
//!
//! assert_eq!(both.data.len(), 2);
//! assert!(!both.has_more_pages());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dataset;
pub mod error;
pub mod types;
pub mod view;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use dataset::Dataset;
pub use error::{CoreError, CoreResult};
pub use types::*;
pub use view::{
    derive_displayed, employee_options, empty_employee, has_more_pages, EmployeeOption,
    ViewSelection,
};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Index of the first page of `paginatedTransactions`.
pub const FIRST_PAGE: u32 = 0;

/// Id of the "All Employees" picker entry.
///
/// Selecting it means "no employee selected".
pub const EMPTY_EMPLOYEE_ID: &str = "";

/// Default number of transactions per page served by a [`Dataset`].
pub const DEFAULT_PAGE_SIZE: usize = 5;
