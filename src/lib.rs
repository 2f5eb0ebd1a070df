//! txnview - client-side synchronization for a transaction list
//!
//! Fetches transactions from a remote service either page by page or per
//! employee, caches responses and keeps one coherent result list.

pub mod api;
pub mod cache;
pub mod config;
pub mod loaders;
pub mod view;

pub use api::{ApiError, Backend, Employee, HttpBackend, InMemoryBackend, Page, Transaction};
pub use config::Config;
pub use view::{EmployeeFilter, Mode, SyncError, ViewState, ViewSynchronizer};
