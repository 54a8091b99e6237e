//! # In-Process API
//!
//! An [`ApiTransport`] that serves the four endpoints from a [`Dataset`] held
//! in memory. Used by the CLI and as the backing store of test doubles.
//!
//! ```text
//! request(endpoint, params)
//!     │
//!     ├── employees               ──► dataset.employees()
//!     ├── paginatedTransactions   ──► dataset.page(page)            { data, nextPage }
//!     ├── transactionsByEmployee  ──► dataset.transactions_for(id)
//!     └── setTransactionApproval  ──► dataset.set_approval(id, v)   (no payload)
//! ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use spendview_core::{
    Dataset, PaginatedRequestParams, RequestByEmployeeParams, SetTransactionApprovalParams,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::transport::{ApiTransport, Endpoint};

pub struct InMemoryApi {
    dataset: RwLock<Dataset>,
    latency: Duration,
}

impl InMemoryApi {
    pub fn new(dataset: Dataset) -> Self {
        InMemoryApi {
            dataset: RwLock::new(dataset),
            latency: Duration::ZERO,
        }
    }

    /// Applies the `[api]` settings. The dataset's own page size is kept.
    pub fn with_config(dataset: Dataset, config: &ClientConfig) -> Self {
        InMemoryApi::new(dataset).with_latency(config.api_latency())
    }

    /// Delays every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Copy of the current server-side data.
    pub async fn snapshot(&self) -> Dataset {
        self.dataset.read().await.clone()
    }
}

#[async_trait]
impl ApiTransport for InMemoryApi {
    async fn request(&self, endpoint: Endpoint, params: &Value) -> ClientResult<Option<Value>> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        debug!(%endpoint, %params, "Serving request");

        match endpoint {
            Endpoint::Employees => {
                let dataset = self.dataset.read().await;
                encode(dataset.employees()).map(Some)
            }
            Endpoint::PaginatedTransactions => {
                let PaginatedRequestParams { page } = decode_params(endpoint, params)?;
                let dataset = self.dataset.read().await;
                encode(&dataset.page(page)?).map(Some)
            }
            Endpoint::TransactionsByEmployee => {
                let RequestByEmployeeParams { employee_id } = decode_params(endpoint, params)?;
                let dataset = self.dataset.read().await;
                encode(&dataset.transactions_for(&employee_id)?).map(Some)
            }
            Endpoint::SetTransactionApproval => {
                let SetTransactionApprovalParams {
                    transaction_id,
                    value,
                } = decode_params(endpoint, params)?;
                self.dataset.write().await.set_approval(&transaction_id, value)?;
                Ok(None)
            }
        }
    }
}

fn decode_params<P: DeserializeOwned>(endpoint: Endpoint, params: &Value) -> ClientResult<P> {
    serde_json::from_value(params.clone())
        .map_err(|e| ClientError::InvalidRequest(format!("{} params: {}", endpoint, e)))
}

fn encode<T: Serialize + ?Sized>(value: &T) -> ClientResult<Value> {
    serde_json::to_value(value).map_err(|e| ClientError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_dataset;
    use serde_json::json;

    #[tokio::test]
    async fn test_pages_follow_next_page() {
        let api = InMemoryApi::new(fixture_dataset(5, 2));

        let first = api
            .request(Endpoint::PaginatedTransactions, &json!({ "page": 0 }))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first["nextPage"], json!(1));
        assert_eq!(first["data"].as_array().unwrap().len(), 2);

        let last = api
            .request(Endpoint::PaginatedTransactions, &json!({ "page": 2 }))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(last["nextPage"], Value::Null);
        assert_eq!(last["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_page_out_of_range_is_rejected() {
        let api = InMemoryApi::new(fixture_dataset(5, 2));
        let err = api
            .request(Endpoint::PaginatedTransactions, &json!({ "page": 3 }))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_transactions_by_employee() {
        let api = InMemoryApi::new(fixture_dataset(6, 2));
        let value = api
            .request(Endpoint::TransactionsByEmployee, &json!({ "employeeId": "e1" }))
            .await
            .unwrap()
            .unwrap();

        let ids: Vec<_> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["employeeId"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["e1", "e1"]);

        let err = api
            .request(Endpoint::TransactionsByEmployee, &json!({ "employeeId": "" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_set_approval_persists() {
        let api = InMemoryApi::new(fixture_dataset(3, 2));
        let response = api
            .request(
                Endpoint::SetTransactionApproval,
                &json!({ "transactionId": "t2", "value": true }),
            )
            .await
            .unwrap();
        assert!(response.is_none());

        let dataset = api.snapshot().await;
        let approved: Vec<_> = dataset
            .transactions()
            .iter()
            .filter(|t| t.approved)
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(approved, vec!["t2"]);

        let err = api
            .request(
                Endpoint::SetTransactionApproval,
                &json!({ "transactionId": "missing", "value": true }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_malformed_params() {
        let api = InMemoryApi::new(fixture_dataset(3, 2));
        let err = api
            .request(Endpoint::PaginatedTransactions, &json!({ "page": "first" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_delays_response() {
        let api = InMemoryApi::new(fixture_dataset(3, 2)).with_latency(Duration::from_millis(300));
        let started = tokio::time::Instant::now();

        api.request(Endpoint::Employees, &json!({})).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(300));
    }
}
