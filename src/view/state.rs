//! View state types

use crate::api::{Employee, Transaction};

/// Label of the picker entry that removes the employee filter
pub const ALL_EMPLOYEES_LABEL: &str = "All Employees";

/// Which data source backs the displayed results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Pages of all transactions, appended as they arrive
    AllPaged,
    /// The complete transaction set of one employee
    ByEmployee,
}

/// Employee picker selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeFilter {
    /// No filter: browse all transactions
    Unfiltered,
    /// Only this employee's transactions
    Employee(String),
}

impl EmployeeFilter {
    /// Filter for an employee id; an empty id means no filter
    pub fn from_id(employee_id: &str) -> Self {
        if employee_id.is_empty() {
            EmployeeFilter::Unfiltered
        } else {
            EmployeeFilter::Employee(employee_id.to_string())
        }
    }

    /// Filter for a picker item, mapping the empty placeholder employee to
    /// [`EmployeeFilter::Unfiltered`]
    pub fn from_employee(employee: &Employee) -> Self {
        Self::from_id(&employee.id)
    }
}

/// One entry of the employee picker
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOption {
    pub filter: EmployeeFilter,
    pub label: String,
}

impl FilterOption {
    pub fn all_employees() -> Self {
        Self {
            filter: EmployeeFilter::Unfiltered,
            label: ALL_EMPLOYEES_LABEL.to_string(),
        }
    }
}

impl From<&Employee> for FilterOption {
    fn from(employee: &Employee) -> Self {
        Self {
            filter: EmployeeFilter::from_employee(employee),
            label: employee.full_name(),
        }
    }
}

/// Copy of everything the UI renders from
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Displayed transactions in arrival order
    pub results: Vec<Transaction>,
    pub mode: Mode,
    /// Whether a "view more" control should be offered
    pub can_load_more: bool,
    pub is_loading: bool,
    /// A transactions page is being fetched; "view more" is ignored meanwhile
    pub is_loading_page: bool,
    pub is_loading_employees: bool,
}
