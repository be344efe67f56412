// emsctl - api/backend.rs
//
// The collaborator seam between the pipelines and the employee service.
// The import, bulk-delete and log-viewing pipelines consume exactly these
// operations and nothing else, which is what lets the tests drive them
// with in-memory fakes. `rest::RestClient` is the production
// implementation.

use async_trait::async_trait;

use crate::core::model::{Department, Employee, LineCount, NewEmployee};
use crate::util::error::ApiError;

#[async_trait]
pub trait Backend: Send + Sync {
    /// Authoritative employee list, one record per employee.
    async fn list_employees(&self) -> Result<Vec<Employee>, ApiError>;

    /// Create a single employee. The service returns the stored record
    /// with its assigned id.
    async fn create_employee(&self, payload: &NewEmployee) -> Result<Employee, ApiError>;

    /// Delete a single employee by id.
    async fn delete_employee(&self, id: u64) -> Result<(), ApiError>;

    /// Authoritative department list.
    async fn list_departments(&self) -> Result<Vec<Department>, ApiError>;

    /// Delete a single department by id.
    async fn delete_department(&self, id: u64) -> Result<(), ApiError>;

    /// Raw text of the last `lines` lines of the service activity log.
    async fn fetch_logs(&self, lines: LineCount) -> Result<String, ApiError>;
}
