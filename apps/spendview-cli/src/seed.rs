//! # Seed Data
//!
//! Builds the dataset served by the in-memory API.
//!
//! Generation is deterministic: the same sizes always produce the same
//! employees and transactions.
//! - Employee ids: `e1..eN`, transaction ids: `t1..tM`
//! - Transactions are owned round-robin by the employees
//! - Amounts vary between $1.00 and $499.99
//! - Dates spread over the 90 days from 2024-01-01

use anyhow::{bail, Result};
use chrono::{Days, NaiveDate};
use spendview_core::{Dataset, Employee, Transaction};

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Grace", "Linus", "Barbara", "Dennis", "Margaret", "Ken", "Frances", "John",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Turing", "Hopper", "Torvalds", "Liskov", "Ritchie", "Hamilton", "Thompson",
    "Allen", "Backus",
];

const MERCHANTS: &[&str] = &[
    "Blue Bottle Coffee",
    "Delta Air Lines",
    "Office Depot",
    "Uber",
    "AWS",
    "Hilton",
    "Staples",
    "Lyft",
    "Sweetgreen",
    "GitHub",
    "Marriott",
    "FedEx",
];

/// Generates `employees` employees and `transactions` transactions.
pub fn generate(employees: usize, transactions: usize, page_size: usize) -> Result<Dataset> {
    if employees == 0 && transactions > 0 {
        bail!("cannot seed {} transactions without employees", transactions);
    }

    let staff: Vec<Employee> = (0..employees).map(employee).collect();
    let ledger: Vec<Transaction> = (0..transactions)
        .map(|index| transaction(index, &staff[index % employees]))
        .collect();

    Ok(Dataset::new(staff, ledger, page_size)?)
}

fn employee(index: usize) -> Employee {
    Employee::new(
        format!("e{}", index + 1),
        FIRST_NAMES[index % FIRST_NAMES.len()],
        LAST_NAMES[(index * 7 + index / LAST_NAMES.len()) % LAST_NAMES.len()],
    )
}

fn transaction(index: usize, owner: &Employee) -> Transaction {
    let dollars = (index * 37 % 499 + 1) as f64;
    let cents = (index * 13 % 100) as f64 / 100.0;

    Transaction::new(
        format!("t{}", index + 1),
        owner.id.clone(),
        dollars + cents,
        MERCHANTS[index % MERCHANTS.len()],
        seed_date(index),
    )
}

fn seed_date(index: usize) -> NaiveDate {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    start
        .checked_add_days(Days::new((index % 90) as u64))
        .unwrap_or(start)
}
