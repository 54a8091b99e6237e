//! # Domain Types
//!
//! Wire types exchanged with the remote API and the collections the client
//! layer builds from them.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────────┐  │
//! │  │    Employee     │   │  Transaction    │   │ PaginatedResponse<T> │  │
//! │  │  ─────────────  │   │  ─────────────  │   │  ──────────────────  │  │
//! │  │  id             │◄──│  employee_id    │   │  data: T             │  │
//! │  │  first_name     │   │  amount         │   │  next_page: u32|null │  │
//! │  │  last_name      │   │  merchant, date │   └──────────┬───────────┘  │
//! │  └─────────────────┘   │  approved (mut) │              │ append       │
//! │                        └─────────────────┘              ▼              │
//! │  ┌──────────────────────────┐   ┌───────────────────────────────────┐  │
//! │  │  EmployeeTransactions    │   │  PaginatedCollection              │  │
//! │  │  one employee, replaced  │   │  every page so far + latest token │  │
//! │  │  wholesale per switch    │   │                                   │  │
//! │  └──────────────────────────┘   └───────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Mutability
//! Everything fetched from the API is read-only to the client except
//! [`Transaction::approved`], which only changes through [`set_approval`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// Employee
// =============================================================================

/// An employee who owns transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Unique identifier.
    pub id: String,

    /// Given name.
    pub first_name: String,

    /// Family name.
    pub last_name: String,
}

impl Employee {
    /// Creates an employee.
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Employee {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Label used by the employee picker.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A single card transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique identifier across the whole dataset.
    pub id: String,

    /// Owner of the transaction.
    pub employee_id: String,

    /// Amount in the account currency.
    pub amount: f64,

    /// Merchant name as reported by the card network.
    pub merchant: String,

    /// Posting date.
    pub date: NaiveDate,

    /// Whether a reviewer approved the transaction.
    pub approved: bool,
}

impl Transaction {
    /// Creates an unapproved transaction.
    pub fn new(
        id: impl Into<String>,
        employee_id: impl Into<String>,
        amount: f64,
        merchant: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Transaction {
            id: id.into(),
            employee_id: employee_id.into(),
            amount,
            merchant: merchant.into(),
            date,
            approved: false,
        }
    }
}

/// Rewrites the `approved` flag of the transaction with `transaction_id`.
///
/// Returns `false` when no transaction matched, in which case the slice is
/// left untouched.
pub fn set_approval(transactions: &mut [Transaction], transaction_id: &str, approved: bool) -> bool {
    match transactions.iter_mut().find(|t| t.id == transaction_id) {
        Some(transaction) => {
            transaction.approved = approved;
            true
        }
        None => false,
    }
}

// =============================================================================
// Pages
// =============================================================================

/// One page of `paginatedTransactions`.
///
/// `next_page` is `None` once the server has no more pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: T,
    pub next_page: Option<u32>,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: T, next_page: Option<u32>) -> Self {
        PaginatedResponse { data, next_page }
    }
}

/// Every page fetched so far, concatenated in fetch order, plus the token of
/// the page to fetch next.
///
/// ## Invariants
/// - `data` and `next_page` are only ever replaced together
/// - `next_page == None` means the collection is exhausted
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedCollection {
    pub data: Vec<Transaction>,
    pub next_page: Option<u32>,
}

impl PaginatedCollection {
    /// Starts a collection from its first page.
    pub fn from_page(page: PaginatedResponse<Vec<Transaction>>) -> Self {
        PaginatedCollection {
            data: page.data,
            next_page: page.next_page,
        }
    }

    /// Returns a new collection with `page` appended.
    ///
    /// Existing transactions keep their order and the new page's
    /// transactions follow in server order. The token is taken from `page`.
    pub fn append_page(&self, page: PaginatedResponse<Vec<Transaction>>) -> Self {
        let mut data = Vec::with_capacity(self.data.len() + page.data.len());
        data.extend(self.data.iter().cloned());
        data.extend(page.data);

        PaginatedCollection {
            data,
            next_page: page.next_page,
        }
    }

    /// True while the server reported another page.
    pub fn has_more_pages(&self) -> bool {
        self.next_page.is_some()
    }

    /// Applies an approval change in place. See [`set_approval`].
    pub fn set_approval(&mut self, transaction_id: &str, approved: bool) -> bool {
        set_approval(&mut self.data, transaction_id, approved)
    }
}

/// Every transaction of one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeTransactions {
    pub employee_id: String,
    pub transactions: Vec<Transaction>,
}

impl EmployeeTransactions {
    pub fn new(employee_id: impl Into<String>, transactions: Vec<Transaction>) -> Self {
        EmployeeTransactions {
            employee_id: employee_id.into(),
            transactions,
        }
    }

    /// Applies an approval change in place. See [`set_approval`].
    pub fn set_approval(&mut self, transaction_id: &str, approved: bool) -> bool {
        set_approval(&mut self.transactions, transaction_id, approved)
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Params of endpoints that take none. Serializes as `{}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoParams {}

/// Params of `paginatedTransactions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedRequestParams {
    pub page: u32,
}

/// Params of `transactionsByEmployee`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestByEmployeeParams {
    pub employee_id: String,
}

/// Params of `setTransactionApproval`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTransactionApprovalParams {
    pub transaction_id: String,
    pub value: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tx(id: &str) -> Transaction {
        Transaction::new(
            id,
            "e1",
            10.0,
            "Merchant",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        )
    }

    #[test]
    fn test_employee_full_name() {
        let employee = Employee::new("e1", "Ada", "Lovelace");
        assert_eq!(employee.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_transaction_wire_format() {
        let value = serde_json::to_value(tx("t1")).unwrap();
        assert_eq!(value["employeeId"], "e1");
        assert_eq!(value["date"], "2024-03-01");
        assert_eq!(value["approved"], false);
    }

    #[test]
    fn test_paginated_response_null_next_page() {
        let page: PaginatedResponse<Vec<Transaction>> =
            serde_json::from_value(json!({ "data": [], "nextPage": null })).unwrap();
        assert!(page.next_page.is_none());
    }

    #[test]
    fn test_append_page_preserves_order_and_takes_new_token() {
        let first = PaginatedCollection::from_page(PaginatedResponse::new(
            vec![tx("t1"), tx("t2")],
            Some(1),
        ));
        let next = first.append_page(PaginatedResponse::new(vec![tx("t3")], None));

        let ids: Vec<_> = next.data.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["t1", "t2", "t3"]);
        assert_eq!(next.next_page, None);
        // The source collection is untouched
        assert_eq!(first.data.len(), 2);
        assert_eq!(first.next_page, Some(1));
    }

    #[test]
    fn test_set_approval_touches_only_the_match() {
        let mut collection = PaginatedCollection::from_page(PaginatedResponse::new(
            vec![tx("t1"), tx("t2")],
            Some(1),
        ));
        let before = collection.clone();

        assert!(collection.set_approval("t2", true));

        assert_eq!(collection.data[0], before.data[0]);
        assert!(collection.data[1].approved);
        assert_eq!(collection.data[1].amount, before.data[1].amount);
        assert_eq!(collection.data[1].merchant, before.data[1].merchant);
        assert_eq!(collection.next_page, Some(1));
    }

    #[test]
    fn test_set_approval_miss_is_noop() {
        let mut scoped = EmployeeTransactions::new("e1", vec![tx("t1")]);
        let before = scoped.clone();

        assert!(!scoped.set_approval("missing", true));
        assert_eq!(scoped, before);
    }

    #[test]
    fn test_params_serialize_in_wire_shape() {
        assert_eq!(serde_json::to_value(NoParams {}).unwrap(), json!({}));
        assert_eq!(
            serde_json::to_value(RequestByEmployeeParams {
                employee_id: "e1".into()
            })
            .unwrap(),
            json!({ "employeeId": "e1" })
        );
        assert_eq!(
            serde_json::to_value(SetTransactionApprovalParams {
                transaction_id: "t1".into(),
                value: true
            })
            .unwrap(),
            json!({ "transactionId": "t1", "value": true })
        );
    }
}
