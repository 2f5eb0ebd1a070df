//! Transaction list synchronization
//!
//! Combines the paged all-transactions view and the per-employee view into
//! one result list.

pub mod errors;
pub mod state;
pub mod synchronizer;

pub use errors::SyncError;
pub use state::{EmployeeFilter, FilterOption, Mode, ViewState};
pub use synchronizer::ViewSynchronizer;
