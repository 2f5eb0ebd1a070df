//! Data loaders
//!
//! Each loader owns one request cache namespace and invalidates only that
//! namespace.

pub mod by_employee;
pub mod employees;
pub mod paginated;

pub use by_employee::EmployeeTransactions;
pub use employees::EmployeeDirectory;
pub use paginated::{CursorState, TransactionPager};
