//! # Client Error Types
//!
//! Error types for the data-access layer.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Payload             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  NetworkFailure │  │  EmptyResult            │ │
//! │  │  ConfigLoad...  │  │  Timeout        │  │  Serialization          │ │
//! │  │  ConfigSave...  │  │  InvalidRequest │  │  Deserialization        │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Ordering: StaleResponse (not a failure, suppressed + logged)   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Propagation
//! Read-path errors stop at the accumulator/fetcher boundary: they are logged
//! and turned into an absent collection. Nothing is cached on failure, so the
//! next read goes back to the network.

use thiserror::Error;

use crate::transport::Endpoint;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Every failure the client layer can observe.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The underlying call rejected.
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// The call did not settle within the request timeout.
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// The API refused the request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // =========================================================================
    // Payload Errors
    // =========================================================================
    /// A read resolved without a payload.
    #[error("Empty result from {endpoint}")]
    EmptyResult { endpoint: Endpoint },

    /// Request params could not be encoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Response payload did not have the expected shape.
    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    // =========================================================================
    // Ordering
    // =========================================================================
    /// A by-employee result arrived after the selection moved on.
    #[error("Discarded stale response for employee {employee_id}")]
    StaleResponse { employee_id: String },
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Deserialization(err.to_string())
    }
}

impl From<spendview_core::CoreError> for ClientError {
    fn from(err: spendview_core::CoreError) -> Self {
        ClientError::InvalidRequest(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Returns true if repeating the same request may succeed.
    ///
    /// Nothing is retried automatically; this only tells callers whether a
    /// later attempt is worth making.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::NetworkFailure(_)
                | ClientError::Timeout(_)
                | ClientError::EmptyResult { .. }
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ClientError::NetworkFailure("reset".into()).is_retryable());
        assert!(ClientError::Timeout(500).is_retryable());
        assert!(ClientError::EmptyResult {
            endpoint: Endpoint::Employees
        }
        .is_retryable());

        assert!(!ClientError::InvalidRequest("bad page".into()).is_retryable());
        assert!(!ClientError::StaleResponse {
            employee_id: "e1".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_config_errors() {
        assert!(ClientError::InvalidConfig("x".into()).is_config_error());
        assert!(!ClientError::Timeout(1).is_config_error());
    }

    #[test]
    fn test_error_display() {
        let err = ClientError::EmptyResult {
            endpoint: Endpoint::PaginatedTransactions,
        };
        assert_eq!(err.to_string(), "Empty result from paginatedTransactions");
    }

    #[test]
    fn test_core_error_becomes_invalid_request() {
        let err: ClientError = spendview_core::CoreError::MissingEmployeeId.into();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }
}
