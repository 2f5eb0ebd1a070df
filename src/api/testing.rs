//! Test backend wrapping [`InMemoryBackend`] with call counting, failure
//! injection and held calls.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::backend::Backend;
use super::errors::ApiError;
use super::memory::InMemoryBackend;
use super::types::{Employee, Transaction};

pub struct CountingBackend {
    inner: InMemoryBackend,
    calls: Mutex<HashMap<String, usize>>,
    failures: Mutex<HashMap<String, usize>>,
    holds: Mutex<Vec<(String, Value, Arc<Notify>)>>,
}

impl CountingBackend {
    pub fn new(inner: InMemoryBackend) -> Self {
        Self {
            inner,
            calls: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            holds: Mutex::new(Vec::new()),
        }
    }

    pub fn seeded() -> Self {
        Self::new(InMemoryBackend::seeded())
    }

    pub fn inner(&self) -> &InMemoryBackend {
        &self.inner
    }

    /// Number of calls made so far for `operation`
    pub fn calls(&self, operation: &str) -> usize {
        self.calls.lock().unwrap().get(operation).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    /// Make the next `times` calls of `operation` fail with a network error
    pub fn fail_next(&self, operation: &str, times: usize) {
        self.failures.lock().unwrap().insert(operation.to_string(), times);
    }

    /// Hold the next call matching `operation` and `params` until the returned
    /// notify is signalled
    pub fn hold(&self, operation: &str, params: Value) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.holds
            .lock()
            .unwrap()
            .push((operation.to_string(), params, Arc::clone(&notify)));
        notify
    }

    fn take_hold(&self, operation: &str, params: &Value) -> Option<Arc<Notify>> {
        let mut holds = self.holds.lock().unwrap();
        let index = holds
            .iter()
            .position(|(op, p, _)| op == operation && p == params)?;
        Some(holds.remove(index).2)
    }

    fn take_failure(&self, operation: &str) -> bool {
        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(operation) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl Backend for CountingBackend {
    async fn call(&self, operation: &str, params: Value) -> Result<Value, ApiError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(operation.to_string())
            .or_insert(0) += 1;

        if let Some(notify) = self.take_hold(operation, &params) {
            notify.notified().await;
        }

        if self.take_failure(operation) {
            return Err(ApiError::Network("connection reset".to_string()));
        }

        self.inner.call(operation, params).await
    }
}

pub fn employee(id: &str, first_name: &str, last_name: &str) -> Employee {
    Employee {
        id: id.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
    }
}

pub fn transaction(id: &str, employee: &Employee) -> Transaction {
    Transaction {
        id: id.to_string(),
        amount: 10.0,
        employee: employee.clone(),
        merchant: "Acme".to_string(),
        date: "2022-01-01".to_string(),
        approved: false,
    }
}

/// Directory [A, B]; A owns t1..t3 (paged two at a time), B owns t4 and t5
/// and they come last in the full listing.
pub fn two_employee_backend() -> CountingBackend {
    let a = employee("a", "Alice", "Anders");
    let b = employee("b", "Bob", "Berg");
    let transactions = vec![
        transaction("t1", &a),
        transaction("t2", &a),
        transaction("t3", &a),
        transaction("t4", &b),
        transaction("t5", &b),
    ];
    CountingBackend::new(InMemoryBackend::new(vec![a, b], transactions).with_page_size(2))
}

/// Directory [A, B]; the full listing is t1, t2 (first page) then t3 (last
/// page), all owned by A.
pub fn three_transaction_backend() -> CountingBackend {
    let a = employee("a", "Alice", "Anders");
    let b = employee("b", "Bob", "Berg");
    let transactions = vec![transaction("t1", &a), transaction("t2", &a), transaction("t3", &a)];
    CountingBackend::new(InMemoryBackend::new(vec![a, b], transactions).with_page_size(2))
}
