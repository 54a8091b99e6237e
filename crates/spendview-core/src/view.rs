//! # View Selection
//!
//! Which of the two collections is "live", and the pure derivation of the
//! displayed transactions from that choice.
//!
//! ```text
//! ┌──────────────────────┐          ┌──────────────────────────────┐
//! │ ViewSelection        │          │ displayed transactions       │
//! │  AllEmployees ───────┼─────────►│ PaginatedCollection.data     │
//! │  Employee(id) ───────┼─────────►│ EmployeeTransactions (id)    │
//! └──────────────────────┘          └──────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{Employee, EmployeeTransactions, PaginatedCollection, Transaction};
use crate::EMPTY_EMPLOYEE_ID;

/// The single source of truth for which collection is displayed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "employeeId", rename_all = "camelCase")]
pub enum ViewSelection {
    /// No employee selected: show the paginated collection.
    #[default]
    AllEmployees,
    /// Show every transaction of this employee.
    Employee(String),
}

impl ViewSelection {
    /// Maps a picker value to a selection. The empty id means "all".
    pub fn from_employee_id(employee_id: &str) -> Self {
        if employee_id == EMPTY_EMPLOYEE_ID {
            ViewSelection::AllEmployees
        } else {
            ViewSelection::Employee(employee_id.to_string())
        }
    }

    pub fn employee_id(&self) -> Option<&str> {
        match self {
            ViewSelection::AllEmployees => None,
            ViewSelection::Employee(id) => Some(id),
        }
    }

    pub fn is_all_employees(&self) -> bool {
        matches!(self, ViewSelection::AllEmployees)
    }
}

impl std::fmt::Display for ViewSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewSelection::AllEmployees => write!(f, "all employees"),
            ViewSelection::Employee(id) => write!(f, "employee {}", id),
        }
    }
}

/// Derives the displayed transactions.
///
/// A missing collection (not loaded yet, or its fetch failed) displays as
/// empty. An employee-scoped collection that belongs to a different employee
/// than the selection is never shown.
pub fn derive_displayed(
    selection: &ViewSelection,
    paginated: Option<&PaginatedCollection>,
    scoped: Option<&EmployeeTransactions>,
) -> Vec<Transaction> {
    match selection {
        ViewSelection::AllEmployees => paginated.map(|c| c.data.clone()).unwrap_or_default(),
        ViewSelection::Employee(id) => scoped
            .filter(|s| &s.employee_id == id)
            .map(|s| s.transactions.clone())
            .unwrap_or_default(),
    }
}

/// "View more" is only offered on the paginated view while pages remain.
pub fn has_more_pages(selection: &ViewSelection, paginated: Option<&PaginatedCollection>) -> bool {
    selection.is_all_employees() && paginated.is_some_and(PaginatedCollection::has_more_pages)
}

// =============================================================================
// Employee Picker
// =============================================================================

/// The "All Employees" entry shown first in the picker.
pub fn empty_employee() -> Employee {
    Employee::new(EMPTY_EMPLOYEE_ID, "All", "Employees")
}

/// One entry of the employee picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeOption {
    pub value: String,
    pub label: String,
}

impl From<&Employee> for EmployeeOption {
    fn from(employee: &Employee) -> Self {
        EmployeeOption {
            value: employee.id.clone(),
            label: employee.full_name(),
        }
    }
}

/// Picker entries: the "All Employees" entry followed by every employee.
///
/// Empty until the employee list has loaded.
pub fn employee_options(employees: Option<&[Employee]>) -> Vec<EmployeeOption> {
    let Some(employees) = employees else {
        return Vec::new();
    };

    std::iter::once(EmployeeOption::from(&empty_employee()))
        .chain(employees.iter().map(EmployeeOption::from))
        .collect()
}
