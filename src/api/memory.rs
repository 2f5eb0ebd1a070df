//! In-memory backend
//!
//! Serves the four operations from a fixed dataset. Used by the demo mode of
//! the CLI and by tests.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use super::backend::{
    Backend, OP_EMPLOYEES, OP_PAGINATED_TRANSACTIONS, OP_SET_TRANSACTION_APPROVAL,
    OP_TRANSACTIONS_BY_EMPLOYEE,
};
use super::errors::ApiError;
use super::types::{
    Employee, Page, PageCursor, PaginatedRequestParams, RequestByEmployeeParams,
    SetTransactionApprovalParams, Transaction,
};

/// Default number of transactions per page
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Backend holding the whole dataset in memory
pub struct InMemoryBackend {
    employees: Vec<Employee>,
    transactions: RwLock<Vec<Transaction>>,
    page_size: usize,
}

impl InMemoryBackend {
    /// Create a backend over the given dataset
    pub fn new(employees: Vec<Employee>, transactions: Vec<Transaction>) -> Self {
        Self {
            employees,
            transactions: RwLock::new(transactions),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Change the page size (values below 1 are treated as 1)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Backend preloaded with a small demo dataset
    pub fn seeded() -> Self {
        let employees = vec![
            employee("emp-1", "James", "Smith"),
            employee("emp-2", "Mary", "Johnson"),
            employee("emp-3", "Robert", "Williams"),
            employee("emp-4", "Patricia", "Brown"),
        ];

        let merchants = ["Social Media Ads Inc", "Air Travel Co", "Office Supplies Ltd", "Cloud Hosting"];
        let transactions = (0..16)
            .map(|i| Transaction {
                id: format!("txn-{:02}", i + 1),
                amount: 25.0 + (i as f64) * 17.35,
                employee: employees[i % employees.len()].clone(),
                merchant: merchants[i % merchants.len()].to_string(),
                date: format!("2022-01-{:02}", i + 1),
                approved: i % 3 == 0,
            })
            .collect();

        Self::new(employees, transactions)
    }

    /// Current state of one transaction
    pub async fn transaction(&self, transaction_id: &str) -> Option<Transaction> {
        self.transactions
            .read()
            .await
            .iter()
            .find(|t| t.id == transaction_id)
            .cloned()
    }

    async fn paginated_transactions(&self, params: PaginatedRequestParams) -> Result<Value, ApiError> {
        let page = match params.page {
            None => 0,
            Some(cursor) => parse_page_index(&cursor)?,
        };

        let transactions = self.transactions.read().await;
        let start = page.saturating_mul(self.page_size);
        let end = start.saturating_add(self.page_size).min(transactions.len());
        let data = transactions
            .get(start..end)
            .map(|slice| slice.to_vec())
            .unwrap_or_default();
        let next_page = (end < transactions.len()).then(|| PageCursor::from(page as u64 + 1));

        debug!(page = page, count = data.len(), "Serving transactions page");
        Ok(serde_json::to_value(Page { data, next_page })?)
    }

    async fn transactions_by_employee(&self, params: RequestByEmployeeParams) -> Result<Value, ApiError> {
        if params.employee_id.is_empty() {
            return Err(ApiError::InvalidParams("Employee id cannot be empty".to_string()));
        }

        let transactions = self.transactions.read().await;
        let matching: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| t.employee.id == params.employee_id)
            .collect();
        Ok(serde_json::to_value(matching)?)
    }

    async fn set_transaction_approval(&self, params: SetTransactionApprovalParams) -> Result<Value, ApiError> {
        let mut transactions = self.transactions.write().await;
        let transaction = transactions
            .iter_mut()
            .find(|t| t.id == params.transaction_id)
            .ok_or_else(|| ApiError::InvalidParams("Invalid transaction to approve".to_string()))?;
        transaction.approved = params.value;
        Ok(Value::Null)
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn call(&self, operation: &str, params: Value) -> Result<Value, ApiError> {
        match operation {
            OP_EMPLOYEES => Ok(serde_json::to_value(&self.employees)?),
            OP_PAGINATED_TRANSACTIONS => self.paginated_transactions(decode_params(params)?).await,
            OP_TRANSACTIONS_BY_EMPLOYEE => self.transactions_by_employee(decode_params(params)?).await,
            OP_SET_TRANSACTION_APPROVAL => self.set_transaction_approval(decode_params(params)?).await,
            _ => Err(ApiError::NotFound(format!("Unknown operation: {}", operation))),
        }
    }
}

fn employee(id: &str, first_name: &str, last_name: &str) -> Employee {
    Employee {
        id: id.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
    }
}

fn decode_params<P: DeserializeOwned>(params: Value) -> Result<P, ApiError> {
    serde_json::from_value(params).map_err(|e| ApiError::InvalidParams(e.to_string()))
}

fn parse_page_index(cursor: &PageCursor) -> Result<usize, ApiError> {
    let index = match &cursor.0 {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse::<u64>().ok(),
        _ => None,
    };
    index
        .map(|i| i as usize)
        .ok_or_else(|| ApiError::InvalidParams(format!("Invalid page cursor: {}", cursor)))
}
