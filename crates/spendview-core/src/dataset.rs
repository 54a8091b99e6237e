//! # Dataset
//!
//! The server's side of the data: the full employee list and every
//! transaction, sliced into fixed-size pages on request.
//!
//! In-process API implementations (and tests) wrap a `Dataset` to answer the
//! four remote endpoints without a network.
//!
//! ## Paging
//! ```text
//! transactions: [t0 t1 t2 t3 t4 | t5 t6 t7 t8 t9 | t10 t11]   page_size = 5
//!                 page 0           page 1          page 2
//!                 next = 1         next = 2        next = null
//! ```

use crate::error::{CoreError, CoreResult};
use crate::types::{Employee, PaginatedResponse, Transaction};
use crate::DEFAULT_PAGE_SIZE;

/// Employees and transactions as stored behind the API.
#[derive(Debug, Clone)]
pub struct Dataset {
    employees: Vec<Employee>,
    transactions: Vec<Transaction>,
    page_size: usize,
}

impl Dataset {
    /// Creates a dataset that serves `page_size` transactions per page.
    pub fn new(
        employees: Vec<Employee>,
        transactions: Vec<Transaction>,
        page_size: usize,
    ) -> CoreResult<Self> {
        if page_size == 0 {
            return Err(CoreError::InvalidPageSize);
        }

        Ok(Dataset {
            employees,
            transactions,
            page_size,
        })
    }

    /// Creates a dataset with [`DEFAULT_PAGE_SIZE`].
    pub fn with_default_page_size(
        employees: Vec<Employee>,
        transactions: Vec<Transaction>,
    ) -> CoreResult<Self> {
        Self::new(employees, transactions, DEFAULT_PAGE_SIZE)
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages needed to serve every transaction.
    pub fn page_count(&self) -> u32 {
        self.transactions.len().div_ceil(self.page_size) as u32
    }

    /// Returns page `page` and the token of the page after it.
    ///
    /// An empty dataset still answers page 0 (with no data and no next page).
    pub fn page(&self, page: u32) -> CoreResult<PaginatedResponse<Vec<Transaction>>> {
        let page_count = self.page_count();

        if page_count == 0 && page == 0 {
            return Ok(PaginatedResponse::new(Vec::new(), None));
        }
        if page >= page_count {
            return Err(CoreError::PageOutOfRange { page, page_count });
        }

        let start = page as usize * self.page_size;
        let end = (start + self.page_size).min(self.transactions.len());
        let next_page = if page + 1 < page_count {
            Some(page + 1)
        } else {
            None
        };

        Ok(PaginatedResponse::new(
            self.transactions[start..end].to_vec(),
            next_page,
        ))
    }

    /// Every transaction owned by `employee_id`, in dataset order.
    pub fn transactions_for(&self, employee_id: &str) -> CoreResult<Vec<Transaction>> {
        if employee_id.is_empty() {
            return Err(CoreError::MissingEmployeeId);
        }

        Ok(self
            .transactions
            .iter()
            .filter(|t| t.employee_id == employee_id)
            .cloned()
            .collect())
    }

    /// Persists an approval change.
    pub fn set_approval(&mut self, transaction_id: &str, approved: bool) -> CoreResult<()> {
        if crate::types::set_approval(&mut self.transactions, transaction_id, approved) {
            Ok(())
        } else {
            Err(CoreError::TransactionNotFound(transaction_id.to_string()))
        }
    }
}
