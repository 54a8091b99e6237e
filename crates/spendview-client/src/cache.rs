//! # Response Cache
//!
//! `ApiClient` issues every API call and memoizes read responses.
//!
//! ## Read Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     fetch_with_cache(endpoint, params)                  │
//! │                                                                         │
//! │   params ──► canonical JSON (keys sorted) ──► CacheKey(endpoint, json)  │
//! │                                                     │                   │
//! │                                   ┌─────────────────┴──────────┐        │
//! │                                   ▼ hit                        ▼ miss   │
//! │                          return cached value        transport.request   │
//! │                          (no network)                     │             │
//! │                                                ┌──────────┴─────────┐   │
//! │                                                ▼ ok                 ▼ err│
//! │                                         store + return     None, store  │
//! │                                                             nothing     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Loading Flag
//! Every call holds an [`InFlightGuard`] for its whole duration. The flag is
//! "counter > 0", so overlapping calls keep it raised until the last one
//! settles, and a dropped (cancelled) call still lowers it.
//!
//! ## Sharing
//! [`ApiClient::handle`] returns a client that reads and writes the same
//! entries but counts its own calls. Each component owns one handle so it
//! can report its own loading state.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::transport::{ApiTransport, Endpoint};

// =============================================================================
// Cache Key
// =============================================================================

/// Identity of a read request: the endpoint plus its canonical params.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    endpoint: Endpoint,
    params: String,
}

impl CacheKey {
    pub fn new(endpoint: Endpoint, params: &Value) -> Self {
        CacheKey {
            endpoint,
            params: canonicalize(params).to_string(),
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.endpoint, self.params)
    }
}

/// Rebuilds `value` with every object's keys in sorted order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));

            let mut sorted = Map::with_capacity(entries.len());
            for (key, inner) in entries {
                sorted.insert(key.clone(), canonicalize(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

// =============================================================================
// In-Flight Counter
// =============================================================================

/// Raises an outstanding-call counter until dropped.
pub(crate) struct InFlightGuard {
    counter: Arc<AtomicUsize>,
}

impl InFlightGuard {
    pub(crate) fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            counter: counter.clone(),
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

// =============================================================================
// API Client
// =============================================================================

type Entries = Arc<RwLock<HashMap<CacheKey, Value>>>;

/// Issues API calls and memoizes read responses.
///
/// ## Usage
/// ```rust,ignore
/// let client = ApiClient::new(transport, &config);
///
/// // One network call; the second read is served from the cache
/// let a: Option<Vec<Employee>> = client.fetch_with_cache(Endpoint::Employees, &NoParams {}).await;
/// let b: Option<Vec<Employee>> = client.fetch_with_cache(Endpoint::Employees, &NoParams {}).await;
///
/// // Mutations always reach the network
/// client.fetch_without_cache::<(), _>(Endpoint::SetTransactionApproval, &params).await;
/// ```
pub struct ApiClient {
    transport: Arc<dyn ApiTransport>,
    entries: Entries,
    in_flight: Arc<AtomicUsize>,
    request_timeout: Duration,
}

impl ApiClient {
    /// Creates a client with an empty cache.
    pub fn new(transport: Arc<dyn ApiTransport>, config: &ClientConfig) -> Self {
        ApiClient {
            transport,
            entries: Arc::new(RwLock::new(HashMap::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            request_timeout: config.request_timeout(),
        }
    }

    /// Returns a client sharing this one's transport and cache entries, with
    /// its own loading flag.
    pub fn handle(&self) -> ApiClient {
        ApiClient {
            transport: self.transport.clone(),
            entries: self.entries.clone(),
            in_flight: Arc::new(AtomicUsize::new(0)),
            request_timeout: self.request_timeout,
        }
    }

    /// True while any call issued through this client is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight() > 0
    }

    /// Number of outstanding calls issued through this client.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Normalized Fetches
    // =========================================================================

    /// Cached read. Failures are logged and returned as `None`.
    pub async fn fetch_with_cache<R, P>(&self, endpoint: Endpoint, params: &P) -> Option<R>
    where
        R: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        match self.request_with_cache(endpoint, params).await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(%endpoint, error = %e, "Cached fetch failed");
                None
            }
        }
    }

    /// Uncached call. Failures are logged and returned as `None`.
    pub async fn fetch_without_cache<R, P>(&self, endpoint: Endpoint, params: &P) -> Option<R>
    where
        R: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        match self.request_without_cache(endpoint, params).await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(%endpoint, error = %e, "Uncached fetch failed");
                None
            }
        }
    }

    // =========================================================================
    // Typed Requests
    // =========================================================================

    /// Cached read that reports why it failed.
    ///
    /// Mutating endpoints are routed to [`Self::request_without_cache`].
    pub async fn request_with_cache<R, P>(&self, endpoint: Endpoint, params: &P) -> ClientResult<R>
    where
        R: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        if endpoint.is_mutating() {
            warn!(%endpoint, "Mutating endpoint requested through the cache, bypassing it");
            return self.request_without_cache(endpoint, params).await;
        }

        let params = encode_params(params)?;
        let key = CacheKey::new(endpoint, &params);

        if let Some(cached) = self.lookup(&key) {
            debug!(%key, "Cache hit");
            return Ok(serde_json::from_value(cached)?);
        }

        debug!(%key, "Cache miss");
        let value = self
            .call(endpoint, &params)
            .await?
            .ok_or(ClientError::EmptyResult { endpoint })?;

        // Decode before storing so a malformed payload is never cached
        let result = serde_json::from_value(value.clone())?;
        self.store(key, value);

        Ok(result)
    }

    /// Uncached call that reports why it failed. Never touches the cache.
    pub async fn request_without_cache<R, P>(&self, endpoint: Endpoint, params: &P) -> ClientResult<R>
    where
        R: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let params = encode_params(params)?;

        let value = match self.call(endpoint, &params).await? {
            Some(value) => value,
            None if endpoint.is_mutating() => Value::Null,
            None => return Err(ClientError::EmptyResult { endpoint }),
        };

        Ok(serde_json::from_value(value)?)
    }

    // =========================================================================
    // Invalidation
    // =========================================================================

    /// Drops every cached entry.
    pub fn clear_cache(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let dropped = entries.len();
        entries.clear();
        debug!(dropped, "Cache cleared");
    }

    /// Drops the cached entries of one endpoint.
    pub fn invalidate_endpoint(&self, endpoint: Endpoint) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|key, _| key.endpoint() != endpoint);
        debug!(%endpoint, dropped = before - entries.len(), "Endpoint invalidated");
    }

    /// Number of cached responses.
    pub fn cached_entries(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn call(&self, endpoint: Endpoint, params: &Value) -> ClientResult<Option<Value>> {
        let _guard = InFlightGuard::enter(&self.in_flight);

        match timeout(self.request_timeout, self.transport.request(endpoint, params)).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(self.request_timeout.as_millis() as u64)),
        }
    }

    fn lookup(&self, key: &CacheKey) -> Option<Value> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn store(&self, key: CacheKey, value: Value) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value);
    }
}

fn encode_params<P: Serialize + ?Sized>(params: &P) -> ClientResult<Value> {
    serde_json::to_value(params).map_err(|e| ClientError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture_dataset, wait_for_calls, ScriptedApi};
    use serde_json::json;
    use spendview_core::{
        Employee, NoParams, PaginatedRequestParams, PaginatedResponse, SetTransactionApprovalParams,
        Transaction,
    };

    fn client(api: &Arc<ScriptedApi>) -> ApiClient {
        ApiClient::new(api.clone(), &ClientConfig::default())
    }

    #[test]
    fn test_cache_key_ignores_param_order() {
        let a = CacheKey::new(
            Endpoint::TransactionsByEmployee,
            &json!({ "employeeId": "e1", "filter": { "b": 1, "a": [ { "y": 2, "x": 1 } ] } }),
        );
        let b = CacheKey::new(
            Endpoint::TransactionsByEmployee,
            &json!({ "filter": { "a": [ { "x": 1, "y": 2 } ], "b": 1 }, "employeeId": "e1" }),
        );
        assert_eq!(a, b);

        let other = CacheKey::new(Endpoint::Employees, &json!({ "employeeId": "e1" }));
        assert_ne!(a, other);
    }

    #[tokio::test]
    async fn test_identical_reads_hit_network_once() {
        let api = ScriptedApi::new(fixture_dataset(6, 3));
        let client = client(&api);

        let first: Option<Vec<Employee>> = client.fetch_with_cache(Endpoint::Employees, &NoParams {}).await;
        let second: Option<Vec<Employee>> = client.fetch_with_cache(Endpoint::Employees, &NoParams {}).await;

        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(api.calls(Endpoint::Employees), 1);
        assert_eq!(client.cached_entries(), 1);
    }

    #[tokio::test]
    async fn test_different_params_are_different_entries() {
        let api = ScriptedApi::new(fixture_dataset(6, 3));
        let client = client(&api);

        let _: Option<PaginatedResponse<Vec<Transaction>>> = client
            .fetch_with_cache(Endpoint::PaginatedTransactions, &PaginatedRequestParams { page: 0 })
            .await;
        let _: Option<PaginatedResponse<Vec<Transaction>>> = client
            .fetch_with_cache(Endpoint::PaginatedTransactions, &PaginatedRequestParams { page: 1 })
            .await;

        assert_eq!(api.calls(Endpoint::PaginatedTransactions), 2);
        assert_eq!(client.cached_entries(), 2);
    }

    #[tokio::test]
    async fn test_uncached_call_always_hits_network() {
        let api = ScriptedApi::new(fixture_dataset(6, 3));
        let client = client(&api);

        let cached: Option<Vec<Employee>> = client.fetch_with_cache(Endpoint::Employees, &NoParams {}).await;
        let fresh: Option<Vec<Employee>> = client.fetch_without_cache(Endpoint::Employees, &NoParams {}).await;
        let again: Option<Vec<Employee>> = client.fetch_without_cache(Endpoint::Employees, &NoParams {}).await;

        assert_eq!(cached, fresh);
        assert_eq!(fresh, again);
        assert_eq!(api.calls(Endpoint::Employees), 3);
        assert_eq!(client.cached_entries(), 1);
    }

    #[tokio::test]
    async fn test_failed_read_is_not_cached() {
        let api = ScriptedApi::new(fixture_dataset(6, 3));
        api.fail_next(Endpoint::Employees, 1);
        let client = client(&api);

        let failed: Option<Vec<Employee>> = client.fetch_with_cache(Endpoint::Employees, &NoParams {}).await;
        assert!(failed.is_none());
        assert_eq!(client.cached_entries(), 0);

        let retried: Option<Vec<Employee>> = client.fetch_with_cache(Endpoint::Employees, &NoParams {}).await;
        assert_eq!(retried.map(|e| e.len()), Some(3));
        assert_eq!(api.calls(Endpoint::Employees), 2);
    }

    #[tokio::test]
    async fn test_empty_read_payload_is_an_error() {
        let api = ScriptedApi::new(fixture_dataset(6, 3));
        api.respond_empty(Endpoint::Employees);
        let client = client(&api);

        let err = client
            .request_with_cache::<Vec<Employee>, _>(Endpoint::Employees, &NoParams {})
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::EmptyResult {
                endpoint: Endpoint::Employees
            }
        ));
        assert_eq!(client.cached_entries(), 0);
    }

    #[tokio::test]
    async fn test_mutation_never_cached() {
        let api = ScriptedApi::new(fixture_dataset(6, 3));
        let client = client(&api);
        let params = SetTransactionApprovalParams {
            transaction_id: "t1".into(),
            value: true,
        };

        let first: Option<()> = client
            .fetch_with_cache(Endpoint::SetTransactionApproval, &params)
            .await;
        let second: Option<()> = client
            .fetch_with_cache(Endpoint::SetTransactionApproval, &params)
            .await;

        assert_eq!(first, Some(()));
        assert_eq!(second, Some(()));
        assert_eq!(api.calls(Endpoint::SetTransactionApproval), 2);
        assert_eq!(client.cached_entries(), 0);
    }

    #[tokio::test]
    async fn test_clear_and_invalidate() {
        let api = ScriptedApi::new(fixture_dataset(6, 3));
        let client = client(&api);

        let _: Option<Vec<Employee>> = client.fetch_with_cache(Endpoint::Employees, &NoParams {}).await;
        let _: Option<PaginatedResponse<Vec<Transaction>>> = client
            .fetch_with_cache(Endpoint::PaginatedTransactions, &PaginatedRequestParams { page: 0 })
            .await;
        assert_eq!(client.cached_entries(), 2);

        client.invalidate_endpoint(Endpoint::PaginatedTransactions);
        assert_eq!(client.cached_entries(), 1);

        client.clear_cache();
        assert_eq!(client.cached_entries(), 0);

        let _: Option<Vec<Employee>> = client.fetch_with_cache(Endpoint::Employees, &NoParams {}).await;
        assert_eq!(api.calls(Endpoint::Employees), 2);
    }

    #[tokio::test]
    async fn test_handle_shares_entries_not_loading_flag() {
        let api = ScriptedApi::new(fixture_dataset(6, 3));
        let client = client(&api);
        let other = client.handle();

        let _: Option<Vec<Employee>> = client.fetch_with_cache(Endpoint::Employees, &NoParams {}).await;
        let _: Option<Vec<Employee>> = other.fetch_with_cache(Endpoint::Employees, &NoParams {}).await;
        assert_eq!(api.calls(Endpoint::Employees), 1);

        let gate = api.hold(Endpoint::Employees, json!({}));
        let pending = {
            let other = other.handle();
            tokio::spawn(async move {
                other
                    .fetch_without_cache::<Vec<Employee>, _>(Endpoint::Employees, &NoParams {})
                    .await
            })
        };
        wait_for_calls(&api, Endpoint::Employees, 2).await;

        assert!(!client.is_loading());
        assert!(!other.is_loading());
        gate.release();
        assert!(pending.await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_loading_flag_tracks_overlapping_calls() {
        let api = ScriptedApi::new(fixture_dataset(6, 3));
        let client = Arc::new(client(&api));
        let slow = api.hold(Endpoint::PaginatedTransactions, json!({ "page": 1 }));
        let fast = api.hold(Endpoint::PaginatedTransactions, json!({ "page": 0 }));

        let spawn_page = |page: u32| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .fetch_with_cache::<PaginatedResponse<Vec<Transaction>>, _>(
                        Endpoint::PaginatedTransactions,
                        &PaginatedRequestParams { page },
                    )
                    .await
            })
        };

        assert!(!client.is_loading());
        let first = spawn_page(0);
        let second = spawn_page(1);
        wait_for_calls(&api, Endpoint::PaginatedTransactions, 2).await;
        assert_eq!(client.in_flight(), 2);

        fast.release();
        assert!(first.await.unwrap().is_some());
        // One call is still outstanding
        assert!(client.is_loading());

        slow.release();
        assert!(second.await.unwrap().is_some());
        assert!(!client.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_timeout() {
        let api = ScriptedApi::new(fixture_dataset(6, 3));
        let mut config = ClientConfig::default();
        config.client.request_timeout_ms = 50;
        let client = ApiClient::new(api.clone(), &config);
        let _gate = api.hold(Endpoint::Employees, json!({}));

        let err = client
            .request_with_cache::<Vec<Employee>, _>(Endpoint::Employees, &NoParams {})
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Timeout(50)));
        assert!(!client.is_loading());
        assert_eq!(client.cached_entries(), 0);
    }
}
