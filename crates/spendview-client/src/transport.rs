//! # Transport
//!
//! The seam between the client layer and whatever actually carries requests
//! to the API.
//!
//! ## Endpoints
//! ```text
//! ┌──────────────────────────┬──────────────────────────┬─────────────────────────────┐
//! │ Endpoint                 │ Params                   │ Response                    │
//! ├──────────────────────────┼──────────────────────────┼─────────────────────────────┤
//! │ employees                │ {}                       │ Employee[]                  │
//! │ paginatedTransactions    │ { page }                 │ { data, nextPage | null }   │
//! │ transactionsByEmployee   │ { employeeId }           │ Transaction[]               │
//! │ setTransactionApproval   │ { transactionId, value } │ none          (MUTATING)    │
//! └──────────────────────────┴──────────────────────────┴─────────────────────────────┘
//! ```
//!
//! Reads are idempotent and cache-eligible. The single mutating endpoint
//! never touches the cache.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Endpoint
// =============================================================================

/// Logical API endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Endpoint {
    Employees,
    PaginatedTransactions,
    TransactionsByEmployee,
    SetTransactionApproval,
}

impl Endpoint {
    /// Wire name of the endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Employees => "employees",
            Endpoint::PaginatedTransactions => "paginatedTransactions",
            Endpoint::TransactionsByEmployee => "transactionsByEmployee",
            Endpoint::SetTransactionApproval => "setTransactionApproval",
        }
    }

    /// Returns true for endpoints with side effects.
    pub fn is_mutating(&self) -> bool {
        matches!(self, Endpoint::SetTransactionApproval)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Endpoint {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employees" => Ok(Endpoint::Employees),
            "paginatedTransactions" => Ok(Endpoint::PaginatedTransactions),
            "transactionsByEmployee" => Ok(Endpoint::TransactionsByEmployee),
            "setTransactionApproval" => Ok(Endpoint::SetTransactionApproval),
            other => Err(ClientError::InvalidRequest(format!(
                "Unknown endpoint: {}",
                other
            ))),
        }
    }
}

// =============================================================================
// Transport Trait
// =============================================================================

/// Carries one request to the API.
///
/// Implementations return `Ok(None)` when the call resolves without a payload
/// and `Err` when it rejects. They never cache.
///
/// ## Usage
/// ```rust,ignore
/// let api: Arc<dyn ApiTransport> = Arc::new(InMemoryApi::new(dataset));
/// let page = api
///     .request(Endpoint::PaginatedTransactions, &json!({ "page": 0 }))
///     .await?;
/// ```
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn request(&self, endpoint: Endpoint, params: &Value) -> ClientResult<Option<Value>>;
}
