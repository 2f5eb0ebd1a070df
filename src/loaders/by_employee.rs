//! Employee-transactions loader
//!
//! Loads the complete, unpaginated transaction set for one employee.

use tokio::sync::RwLock;
use tracing::debug;

use crate::api::backend::OP_TRANSACTIONS_BY_EMPLOYEE;
use crate::api::{ApiError, RequestByEmployeeParams, Transaction};
use crate::cache::RequestCache;

#[derive(Default)]
struct LoaderState {
    /// Employee the retained data belongs to
    employee_id: Option<String>,
    data: Option<Vec<Transaction>>,
    /// Bumped on every invalidation
    epoch: u64,
}

/// Per-employee transaction loader
pub struct EmployeeTransactions {
    /// Request cache namespace for per-employee calls
    cache: RequestCache,
    state: RwLock<LoaderState>,
}

impl EmployeeTransactions {
    pub fn new(cache: RequestCache) -> Self {
        Self {
            cache,
            state: RwLock::new(LoaderState::default()),
        }
    }

    /// Fetch every transaction of `employee_id`
    ///
    /// Repeated calls for the same employee are served from the cache until
    /// the loader is invalidated.
    pub async fn fetch_by_id(&self, employee_id: &str) -> Result<Vec<Transaction>, ApiError> {
        if employee_id.is_empty() {
            return Err(ApiError::InvalidParams("Employee id cannot be empty".to_string()));
        }

        let epoch = self.state.read().await.epoch;
        let params = RequestByEmployeeParams {
            employee_id: employee_id.to_string(),
        };
        let transactions: Vec<Transaction> = self
            .cache
            .fetch_cached(OP_TRANSACTIONS_BY_EMPLOYEE, &params)
            .await?;

        let mut state = self.state.write().await;
        if state.epoch == epoch {
            state.employee_id = Some(params.employee_id);
            state.data = Some(transactions.clone());
        } else {
            debug!(employee_id = employee_id, "Loader invalidated during fetch, not retaining result");
        }

        Ok(transactions)
    }

    /// Drop retained data and every cached employee set
    pub async fn invalidate_data(&self) {
        {
            let mut state = self.state.write().await;
            state.employee_id = None;
            state.data = None;
            state.epoch += 1;
        }
        self.cache.invalidate_all();
    }

    /// Employee whose transactions are currently retained
    pub async fn current_employee(&self) -> Option<String> {
        self.state.read().await.employee_id.clone()
    }

    /// Retained transactions of the current employee
    pub async fn data(&self) -> Option<Vec<Transaction>> {
        self.state.read().await.data.clone()
    }

    /// Whether a per-employee call is outstanding
    pub fn is_loading(&self) -> bool {
        self.cache.is_loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{two_employee_backend, CountingBackend};
    use std::sync::Arc;

    fn loader(backend: &Arc<CountingBackend>) -> EmployeeTransactions {
        EmployeeTransactions::new(RequestCache::new("by-employee", backend.clone()))
    }

    #[tokio::test]
    async fn test_cached_per_employee() {
        let backend = Arc::new(two_employee_backend());
        let loader = loader(&backend);

        let b = loader.fetch_by_id("b").await.unwrap();
        let ids: Vec<&str> = b.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["t4", "t5"]);
        assert_eq!(loader.current_employee().await.as_deref(), Some("b"));

        loader.fetch_by_id("b").await.unwrap();
        assert_eq!(backend.calls(OP_TRANSACTIONS_BY_EMPLOYEE), 1);

        let a = loader.fetch_by_id("a").await.unwrap();
        assert_eq!(a.len(), 3);
        assert_eq!(loader.data().await, Some(a));
        assert_eq!(backend.calls(OP_TRANSACTIONS_BY_EMPLOYEE), 2);
    }

    #[tokio::test]
    async fn test_invalidate_clears_data_and_cache() {
        let backend = Arc::new(two_employee_backend());
        let loader = loader(&backend);
        loader.fetch_by_id("b").await.unwrap();

        loader.invalidate_data().await;
        assert!(loader.data().await.is_none());
        assert!(loader.current_employee().await.is_none());

        loader.fetch_by_id("b").await.unwrap();
        assert_eq!(backend.calls(OP_TRANSACTIONS_BY_EMPLOYEE), 2);
    }

    #[tokio::test]
    async fn test_empty_id_rejected_without_call() {
        let backend = Arc::new(two_employee_backend());
        let loader = loader(&backend);

        let err = loader.fetch_by_id("").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidParams(_)));
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_data() {
        let backend = Arc::new(two_employee_backend());
        let loader = loader(&backend);
        let b = loader.fetch_by_id("b").await.unwrap();

        backend.fail_next(OP_TRANSACTIONS_BY_EMPLOYEE, 1);
        assert!(loader.fetch_by_id("a").await.is_err());
        assert_eq!(loader.data().await, Some(b));
        assert!(!loader.is_loading());
    }
}
