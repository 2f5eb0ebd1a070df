//! View synchronizer error types
//!
//! One variant per failing step, so callers can tell which part of a
//! transition went wrong.

use crate::api::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Failed to load employee directory: {0}")]
    Directory(#[source] ApiError),

    #[error("Failed to load transactions page: {0}")]
    Page(#[source] ApiError),

    #[error("Failed to load transactions for employee {employee_id}: {source}")]
    EmployeeTransactions {
        employee_id: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to set approval for transaction {transaction_id}: {source}")]
    Approval {
        transaction_id: String,
        #[source]
        source: ApiError,
    },
}

impl SyncError {
    /// The backend error behind this failure
    pub fn api_error(&self) -> &ApiError {
        match self {
            SyncError::Directory(e) | SyncError::Page(e) => e,
            SyncError::EmployeeTransactions { source, .. } | SyncError::Approval { source, .. } => source,
        }
    }

    /// Whether retrying the same action could succeed
    pub fn is_retryable(&self) -> bool {
        self.api_error().is_retryable()
    }
}
