//! Employee list shown in the picker. Loaded once, through the cache.

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use spendview_core::{Employee, NoParams};

use crate::cache::ApiClient;
use crate::transport::Endpoint;

pub struct EmployeeDirectory {
    client: ApiClient,
    employees: RwLock<Option<Vec<Employee>>>,
}

impl EmployeeDirectory {
    pub fn new(client: ApiClient) -> Self {
        EmployeeDirectory {
            client,
            employees: RwLock::new(None),
        }
    }

    /// Loads the employee list unless it is already present.
    ///
    /// A failure leaves the list absent so a later call can retry.
    pub async fn ensure_loaded(&self) -> Option<Vec<Employee>> {
        if let Some(employees) = self.employees.read().await.as_ref() {
            return Some(employees.clone());
        }

        let fetched: Option<Vec<Employee>> = self
            .client
            .fetch_with_cache(Endpoint::Employees, &NoParams {})
            .await;

        let mut employees = self.employees.write().await;
        if let Some(existing) = employees.as_ref() {
            debug!("Employee list stored by a concurrent load");
            return Some(existing.clone());
        }

        match fetched {
            Some(fetched) => {
                info!(count = fetched.len(), "Employees loaded");
                *employees = Some(fetched.clone());
                Some(fetched)
            }
            None => {
                warn!("Employee list unavailable");
                None
            }
        }
    }

    /// Drops the loaded list. The next `ensure_loaded` fetches again.
    pub async fn reset(&self) {
        *self.employees.write().await = None;
    }

    pub async fn employees(&self) -> Option<Vec<Employee>> {
        self.employees.read().await.clone()
    }

    pub async fn is_loaded(&self) -> bool {
        self.employees.read().await.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.client.is_loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::test_support::{fixture_dataset, ScriptedApi};

    #[tokio::test]
    async fn test_loads_once() {
        let api = ScriptedApi::new(fixture_dataset(3, 3));
        let directory = EmployeeDirectory::new(ApiClient::new(api.clone(), &ClientConfig::default()));
        assert!(!directory.is_loaded().await);

        let employees = directory.ensure_loaded().await.unwrap();
        assert_eq!(employees.len(), 3);
        assert_eq!(employees[0].full_name(), "Ada Lovelace");

        directory.ensure_loaded().await.unwrap();
        assert!(directory.is_loaded().await);
        assert_eq!(api.calls(Endpoint::Employees), 1);
    }

    #[tokio::test]
    async fn test_failed_load_retries() {
        let api = ScriptedApi::new(fixture_dataset(3, 3));
        api.fail_next(Endpoint::Employees, 1);
        let directory = EmployeeDirectory::new(ApiClient::new(api.clone(), &ClientConfig::default()));

        assert!(directory.ensure_loaded().await.is_none());
        assert!(directory.employees().await.is_none());

        assert!(directory.ensure_loaded().await.is_some());
        assert_eq!(api.calls(Endpoint::Employees), 2);
    }
}
