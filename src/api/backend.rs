//! Backend operation interface
//!
//! Every remote call goes through [`Backend::call`] with an operation name and
//! a JSON parameter object.

use async_trait::async_trait;
use serde_json::Value;

use super::errors::ApiError;

/// Fetch the employee directory
pub const OP_EMPLOYEES: &str = "employees";
/// Fetch one page of all transactions
pub const OP_PAGINATED_TRANSACTIONS: &str = "paginatedTransactions";
/// Fetch every transaction for one employee
pub const OP_TRANSACTIONS_BY_EMPLOYEE: &str = "transactionsByEmployee";
/// Set a transaction's approval flag
pub const OP_SET_TRANSACTION_APPROVAL: &str = "setTransactionApproval";

/// A remote service reachable by operation name
#[async_trait]
pub trait Backend: Send + Sync {
    /// Perform one call and return its parsed result
    ///
    /// Operations without a result return `Value::Null`.
    async fn call(&self, operation: &str, params: Value) -> Result<Value, ApiError>;
}
