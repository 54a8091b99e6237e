//! Test doubles shared by the client's unit tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use spendview_core::{Dataset, Employee, Transaction};

use crate::error::{ClientError, ClientResult};
use crate::in_memory::InMemoryApi;
use crate::transport::{ApiTransport, Endpoint};

/// Three employees and `count` transactions `t1..tN`, owned round-robin
/// (`t1` by `e1`, `t2` by `e2`, `t3` by `e3`, `t4` by `e1`, ...).
pub(crate) fn fixture_dataset(count: usize, page_size: usize) -> Dataset {
    let employees = vec![
        Employee::new("e1", "Ada", "Lovelace"),
        Employee::new("e2", "Alan", "Turing"),
        Employee::new("e3", "Grace", "Hopper"),
    ];
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let transactions = (1..=count)
        .map(|i| {
            Transaction::new(
                format!("t{}", i),
                format!("e{}", (i - 1) % 3 + 1),
                10.0 * i as f64,
                format!("Merchant {}", i),
                date,
            )
        })
        .collect();

    Dataset::new(employees, transactions, page_size).unwrap()
}

/// Keeps matching requests pending until released.
pub(crate) struct Gate {
    semaphore: Arc<Semaphore>,
}

impl Gate {
    /// Lets every held (and future) matching request through.
    pub(crate) fn release(&self) {
        self.semaphore.add_permits(1);
    }
}

/// An [`InMemoryApi`] with call recording and scripted misbehaviour.
pub(crate) struct ScriptedApi {
    inner: InMemoryApi,
    calls: Mutex<Vec<(Endpoint, Value)>>,
    failures: Mutex<HashMap<Endpoint, usize>>,
    empty: Mutex<HashSet<Endpoint>>,
    gates: Mutex<Vec<(Endpoint, Value, Arc<Semaphore>)>>,
}

impl ScriptedApi {
    pub(crate) fn new(dataset: Dataset) -> Arc<Self> {
        Arc::new(ScriptedApi {
            inner: InMemoryApi::new(dataset),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            empty: Mutex::new(HashSet::new()),
            gates: Mutex::new(Vec::new()),
        })
    }

    /// The next `times` calls to `endpoint` reject.
    pub(crate) fn fail_next(&self, endpoint: Endpoint, times: usize) {
        *self.failures.lock().unwrap().entry(endpoint).or_default() += times;
    }

    /// Calls to `endpoint` resolve without a payload.
    pub(crate) fn respond_empty(&self, endpoint: Endpoint) {
        self.empty.lock().unwrap().insert(endpoint);
    }

    /// Holds calls to `endpoint` with exactly `params` until the gate opens.
    pub(crate) fn hold(&self, endpoint: Endpoint, params: Value) -> Gate {
        let semaphore = Arc::new(Semaphore::new(0));
        self.gates
            .lock()
            .unwrap()
            .push((endpoint, params, semaphore.clone()));
        Gate { semaphore }
    }

    pub(crate) fn calls(&self, endpoint: Endpoint) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| *e == endpoint)
            .count()
    }

    pub(crate) fn calls_with(&self, endpoint: Endpoint, params: &Value) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, p)| *e == endpoint && p == params)
            .count()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) async fn snapshot(&self) -> Dataset {
        self.inner.snapshot().await
    }

    fn gate_for(&self, endpoint: Endpoint, params: &Value) -> Option<Arc<Semaphore>> {
        self.gates
            .lock()
            .unwrap()
            .iter()
            .find(|(e, p, _)| *e == endpoint && p == params)
            .map(|(_, _, s)| s.clone())
    }

    fn take_failure(&self, endpoint: Endpoint) -> bool {
        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(&endpoint) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl ApiTransport for ScriptedApi {
    async fn request(&self, endpoint: Endpoint, params: &Value) -> ClientResult<Option<Value>> {
        self.calls.lock().unwrap().push((endpoint, params.clone()));

        if let Some(gate) = self.gate_for(endpoint, params) {
            let _permit = gate.acquire().await.unwrap();
        }

        if self.take_failure(endpoint) {
            return Err(ClientError::NetworkFailure(format!("scripted failure on {}", endpoint)));
        }

        if self.empty.lock().unwrap().contains(&endpoint) {
            return Ok(None);
        }

        self.inner.request(endpoint, params).await
    }
}

/// Yields until `api` has recorded at least `count` calls to `endpoint`.
pub(crate) async fn wait_for_calls(api: &ScriptedApi, endpoint: Endpoint, count: usize) {
    for _ in 0..1_000 {
        if api.calls(endpoint) >= count {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!(
        "expected {} calls to {}, saw {}",
        count,
        endpoint,
        api.calls(endpoint)
    );
}
