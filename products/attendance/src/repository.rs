use std::sync::Arc;

use platform_db::KeyValueStore;
use tracing::{debug, warn};

use crate::{error::AttendanceResult, model::Employee};

/// Storage slot holding the whole collection as one JSON array.
pub const EMPLOYEES_KEY: &str = "employees";

/// Reads and writes the employee collection as a single blob.
#[derive(Clone)]
pub struct EmployeeRepository {
    store: Arc<dyn KeyValueStore>,
}

impl EmployeeRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// An absent slot, a JSON `null`, and a blob that fails to parse all load
    /// as an empty collection.
    pub async fn load(&self) -> AttendanceResult<Vec<Employee>> {
        let Some(blob) = self.store.get(EMPLOYEES_KEY).await? else {
            debug!("no stored employees");
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Option<Vec<Employee>>>(&blob) {
            Ok(employees) => Ok(employees.unwrap_or_default()),
            Err(err) => {
                warn!(error = %err, "stored employees are malformed; starting empty");
                Ok(Vec::new())
            }
        }
    }

    pub async fn save(&self, employees: &[Employee]) -> AttendanceResult<()> {
        let blob = serde_json::to_string(employees)?;
        self.store.put(EMPLOYEES_KEY, &blob).await?;
        debug!(count = employees.len(), "employees persisted");
        Ok(())
    }

    /// The stored blob exactly as persisted.
    pub async fn raw(&self) -> AttendanceResult<Option<String>> {
        Ok(self.store.get(EMPLOYEES_KEY).await?)
    }

    pub async fn is_reachable(&self) -> bool {
        self.store.ping().await
    }
}
