//! Employee directory loader
//!
//! Loads the full employee list once per session.

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::backend::OP_EMPLOYEES;
use crate::api::{ApiError, Employee};
use crate::cache::RequestCache;

/// Session-long employee directory
pub struct EmployeeDirectory {
    /// Request cache namespace for directory calls
    cache: RequestCache,
    /// Loaded directory; `None` until the first successful fetch
    data: RwLock<Option<Vec<Employee>>>,
}

impl EmployeeDirectory {
    pub fn new(cache: RequestCache) -> Self {
        Self {
            cache,
            data: RwLock::new(None),
        }
    }

    /// Fetch the directory, or return it unchanged if already loaded
    ///
    /// On failure the directory stays unloaded so a later call retries.
    pub async fn fetch_all(&self) -> Result<Vec<Employee>, ApiError> {
        if let Some(existing) = self.data.read().await.as_ref() {
            debug!(count = existing.len(), "Employee directory already loaded");
            return Ok(existing.clone());
        }

        let fetched: Vec<Employee> = self.cache.fetch_cached(OP_EMPLOYEES, &()).await?;
        let total = fetched.len();
        let employees: Vec<Employee> = fetched.into_iter().filter(|e| !e.id.is_empty()).collect();
        if employees.len() != total {
            warn!(
                dropped = total - employees.len(),
                "Ignoring directory entries without an id"
            );
        }

        info!(count = employees.len(), "Loaded employee directory");
        *self.data.write().await = Some(employees.clone());
        Ok(employees)
    }

    /// The loaded directory, if any
    pub async fn employees(&self) -> Option<Vec<Employee>> {
        self.data.read().await.clone()
    }

    /// Whether a directory call is outstanding
    pub fn is_loading(&self) -> bool {
        self.cache.is_loading()
    }
}
