//! # Error Types
//!
//! Domain errors for spendview-core.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CoreError (this file)      - a request the dataset cannot satisfy     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  ClientError (client crate) - InvalidRequest, seen by the cache layer  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  Presentation               - "No transactions found"                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result alias for dataset operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the pure dataset operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// No transaction with this id.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// A by-employee request without an employee id.
    #[error("Employee id is required")]
    MissingEmployeeId,

    /// Requested page lies past the last page.
    #[error("Invalid page {page}: only {page_count} page(s) available")]
    PageOutOfRange { page: u32, page_count: u32 },

    /// Page size of zero.
    #[error("Page size must be greater than 0")]
    InvalidPageSize,
}
