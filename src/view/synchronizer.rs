//! View Synchronizer
//!
//! Decides which loader backs the displayed results, merges what the loaders
//! return into one result list and routes approval changes.
//!
//! Switching mode or restarting pagination starts a new generation. A
//! completion is applied only while its generation is still the latest, so a
//! slow fetch that was superseded by a newer user action is dropped instead of
//! overwriting the newer result. Pages fetched within one generation are
//! appended one at a time, in cursor order.

use std::sync::Arc;
use std::time::Duration;

use serde::de::IgnoredAny;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::errors::SyncError;
use super::state::{EmployeeFilter, FilterOption, Mode, ViewState};
use crate::api::backend::OP_SET_TRANSACTION_APPROVAL;
use crate::api::{ApiError, Backend, Employee, SetTransactionApprovalParams, Transaction};
use crate::cache::{LoadingCounter, RequestCache};
use crate::loaders::{EmployeeDirectory, EmployeeTransactions, TransactionPager};

struct Inner {
    results: Vec<Transaction>,
    mode: Mode,
    can_load_more: bool,
    /// Bumped on every mode switch or pagination restart
    generation: u64,
}

/// Orchestrates the loaders behind the transaction list
pub struct ViewSynchronizer {
    directory: EmployeeDirectory,
    pager: TransactionPager,
    by_employee: EmployeeTransactions,
    /// Uncached namespace for mutations
    approvals: RequestCache,
    state: RwLock<Inner>,
    /// Held from reading the cursor until the page is applied
    paging: Mutex<()>,
    loading: LoadingCounter,
    loading_employees: LoadingCounter,
}

impl ViewSynchronizer {
    /// Create a synchronizer whose loaders all talk to `backend`
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_cache_ttl(backend, None)
    }

    /// Like [`ViewSynchronizer::new`], bounding cache entry lifetime by `ttl`
    pub fn with_cache_ttl(backend: Arc<dyn Backend>, ttl: Option<Duration>) -> Self {
        Self::from_parts(
            EmployeeDirectory::new(RequestCache::with_ttl("employees", Arc::clone(&backend), ttl)),
            TransactionPager::new(RequestCache::with_ttl("paginated_transactions", Arc::clone(&backend), ttl)),
            EmployeeTransactions::new(RequestCache::with_ttl(
                "transactions_by_employee",
                Arc::clone(&backend),
                ttl,
            )),
            RequestCache::new("transaction_approvals", backend),
        )
    }

    /// Assemble a synchronizer from already built loaders
    pub fn from_parts(
        directory: EmployeeDirectory,
        pager: TransactionPager,
        by_employee: EmployeeTransactions,
        approvals: RequestCache,
    ) -> Self {
        Self {
            directory,
            pager,
            by_employee,
            approvals,
            state: RwLock::new(Inner {
                results: Vec::new(),
                mode: Mode::AllPaged,
                can_load_more: true,
                generation: 0,
            }),
            paging: Mutex::new(()),
            loading: LoadingCounter::new(),
            loading_employees: LoadingCounter::new(),
        }
    }

    /// Enter (or continue) browsing all transactions
    ///
    /// Loads the employee directory if needed and appends the next page. When
    /// coming from an employee view the previous results are dropped first.
    pub async fn load_all_transactions(&self) -> Result<(), SyncError> {
        let _loading = self.loading.start();
        self.enter_all_paged(false).await
    }

    /// Show exactly the transactions of one employee
    pub async fn load_transactions_by_employee(&self, employee_id: &str) -> Result<(), SyncError> {
        let _loading = self.loading.start();
        self.enter_by_employee(employee_id, false).await
    }

    /// Apply an employee picker selection
    ///
    /// Results are cleared right away. Choosing [`EmployeeFilter::Unfiltered`]
    /// restarts pagination from the first page.
    pub async fn change_filter(&self, filter: EmployeeFilter) -> Result<(), SyncError> {
        let _loading = self.loading.start();
        info!(filter = ?filter, "Employee filter changed");
        match filter {
            EmployeeFilter::Unfiltered => self.enter_all_paged(true).await,
            EmployeeFilter::Employee(employee_id) => self.enter_by_employee(&employee_id, true).await,
        }
    }

    /// Append the next page, if the current view has one
    ///
    /// Does nothing outside [`Mode::AllPaged`], after the last page or while a
    /// page is still loading.
    pub async fn view_more(&self) -> Result<(), SyncError> {
        {
            let state = self.state.read().await;
            if state.mode != Mode::AllPaged || !state.can_load_more {
                debug!(mode = ?state.mode, can_load_more = state.can_load_more, "Nothing more to load");
                return Ok(());
            }
        }
        if self.is_loading_page() {
            debug!("Page already loading");
            return Ok(());
        }
        self.load_all_transactions().await
    }

    /// Set a transaction's approval flag on the backend
    ///
    /// The call always reaches the backend. After it succeeds, matching
    /// entries in the results are updated in place and cached employee sets
    /// are dropped so a later fetch cannot bring back the old flag. On failure
    /// nothing local changes.
    pub async fn set_transaction_approval(
        &self,
        transaction_id: &str,
        new_value: bool,
    ) -> Result<(), SyncError> {
        let params = SetTransactionApprovalParams {
            transaction_id: transaction_id.to_string(),
            value: new_value,
        };
        let _: IgnoredAny = self
            .approvals
            .fetch_uncached(OP_SET_TRANSACTION_APPROVAL, &params)
            .await
            .map_err(|source| {
                warn!(transaction_id = transaction_id, error = %source, "Approval change failed");
                SyncError::Approval {
                    transaction_id: transaction_id.to_string(),
                    source,
                }
            })?;

        let patched = {
            let mut state = self.state.write().await;
            let mut patched = 0;
            for transaction in state.results.iter_mut().filter(|t| t.id == transaction_id) {
                transaction.approved = new_value;
                patched += 1;
            }
            patched
        };
        self.by_employee.invalidate_data().await;

        info!(
            transaction_id = transaction_id,
            approved = new_value,
            patched = patched,
            "Transaction approval updated"
        );
        Ok(())
    }

    async fn enter_all_paged(&self, restart: bool) -> Result<(), SyncError> {
        if restart {
            self.pager.invalidate_data().await;
        }

        let generation = {
            let mut state = self.state.write().await;
            if restart || state.mode == Mode::ByEmployee {
                state.generation += 1;
                state.results.clear();
                state.can_load_more = true;
            }
            state.mode = Mode::AllPaged;
            state.generation
        };
        debug!(generation = generation, "Loading all transactions");

        self.by_employee.invalidate_data().await;

        let (directory, page) = tokio::join!(self.load_directory(), self.append_next_page(generation));

        if let Err(e) = &directory {
            warn!(error = %e, "Failed to load employee directory");
        }
        page?;
        directory.map(|_| ()).map_err(SyncError::Directory)
    }

    async fn append_next_page(&self, generation: u64) -> Result<(), SyncError> {
        let _paging = self.paging.lock().await;
        let page = self.pager.fetch_all().await.map_err(|e| {
            warn!(error = %e, "Failed to load transactions page");
            SyncError::Page(e)
        })?;

        let mut state = self.state.write().await;
        if state.generation != generation {
            debug!(generation = generation, current = state.generation, "Discarding stale page");
            return Ok(());
        }
        match page {
            Some(page) => {
                let count = page.data.len();
                state.results.extend(page.data);
                state.can_load_more = page.next_page.is_some();
                info!(
                    count = count,
                    total = state.results.len(),
                    more = state.can_load_more,
                    "Appended transactions page"
                );
            }
            None => state.can_load_more = false,
        }
        Ok(())
    }

    async fn enter_by_employee(&self, employee_id: &str, clear_results: bool) -> Result<(), SyncError> {
        let generation = {
            let mut state = self.state.write().await;
            state.generation += 1;
            if clear_results {
                state.results.clear();
            }
            state.mode = Mode::ByEmployee;
            state.can_load_more = false;
            state.generation
        };
        debug!(generation = generation, employee_id = employee_id, "Loading transactions by employee");

        self.pager.invalidate_data().await;
        if self.by_employee.current_employee().await.as_deref() != Some(employee_id) {
            self.by_employee.invalidate_data().await;
        }

        let transactions = self
            .by_employee
            .fetch_by_id(employee_id)
            .await
            .map_err(|source| {
                warn!(employee_id = employee_id, error = %source, "Failed to load employee transactions");
                SyncError::EmployeeTransactions {
                    employee_id: employee_id.to_string(),
                    source,
                }
            })?;

        let mut state = self.state.write().await;
        if state.generation != generation {
            debug!(generation = generation, current = state.generation, "Discarding stale employee transactions");
            return Ok(());
        }
        info!(employee_id = employee_id, count = transactions.len(), "Showing employee transactions");
        state.results = transactions;
        state.can_load_more = false;
        Ok(())
    }

    async fn load_directory(&self) -> Result<Vec<Employee>, ApiError> {
        let _loading = self.loading_employees.start();
        self.directory.fetch_all().await
    }

    /// Displayed transactions
    pub async fn results(&self) -> Vec<Transaction> {
        self.state.read().await.results.clone()
    }

    pub async fn mode(&self) -> Mode {
        self.state.read().await.mode
    }

    pub async fn can_load_more(&self) -> bool {
        self.state.read().await.can_load_more
    }

    /// Whether a transition is in flight
    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// Whether a transactions page is being fetched
    pub fn is_loading_page(&self) -> bool {
        self.pager.is_loading()
    }

    /// Whether the employee directory is being fetched
    pub fn is_loading_employees(&self) -> bool {
        self.loading_employees.is_loading()
    }

    /// Whether an approval change is in flight
    pub fn is_approving(&self) -> bool {
        self.approvals.is_loading()
    }

    /// The employee directory, once loaded
    pub async fn employees(&self) -> Option<Vec<Employee>> {
        self.directory.employees().await
    }

    /// Items for the employee picker: "All Employees" followed by the
    /// directory, or nothing while the directory is not loaded
    pub async fn filter_options(&self) -> Vec<FilterOption> {
        match self.directory.employees().await {
            Some(employees) => std::iter::once(FilterOption::all_employees())
                .chain(employees.iter().map(FilterOption::from))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Copy of the current view state
    pub async fn snapshot(&self) -> ViewState {
        let state = self.state.read().await;
        ViewState {
            results: state.results.clone(),
            mode: state.mode,
            can_load_more: state.can_load_more,
            is_loading: self.is_loading(),
            is_loading_page: self.is_loading_page(),
            is_loading_employees: self.is_loading_employees(),
        }
    }
}
