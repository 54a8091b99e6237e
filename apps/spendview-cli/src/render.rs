//! Plain-text rendering of the view.

use std::collections::HashMap;
use std::fmt::Write;

use spendview_client::ViewSnapshot;
use spendview_core::EmployeeOption;

/// Renders the transaction list the way the view shows it.
pub fn snapshot(snapshot: &ViewSnapshot, options: &[EmployeeOption]) -> String {
    let names: HashMap<&str, &str> = options
        .iter()
        .map(|o| (o.value.as_str(), o.label.as_str()))
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "── {} ──", snapshot.selection);

    if snapshot.transactions.is_empty() {
        if snapshot.is_loading {
            let _ = writeln!(out, "Loading...");
        } else {
            let _ = writeln!(out, "No transactions found");
        }
        return out;
    }

    for transaction in &snapshot.transactions {
        let owner = names
            .get(transaction.employee_id.as_str())
            .copied()
            .unwrap_or(transaction.employee_id.as_str());
        let _ = writeln!(
            out,
            "[{}] {:<6} {:<18} {:<20} {:>9.2}  {}",
            if transaction.approved { "x" } else { " " },
            transaction.id,
            owner,
            transaction.merchant,
            transaction.amount,
            transaction.date,
        );
    }

    if snapshot.has_more_pages {
        let _ = writeln!(out, "(more available: type 'more')");
    }
    out
}

/// Renders the employee picker.
pub fn employee_options(options: &[EmployeeOption]) -> String {
    if options.is_empty() {
        return "Employees not loaded\n".to_string();
    }

    let mut out = String::new();
    for option in options {
        let value = if option.value.is_empty() { "(all)" } else { option.value.as_str() };
        let _ = writeln!(out, "{:<6} {}", value, option.label);
    }
    out
}
