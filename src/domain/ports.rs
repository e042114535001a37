use crate::domain::model::{EmployeeAssignments, Record};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 關聯式儲存層。整個行程共用一個 handle，啟動時開啟、關閉時呼叫 `close`。
#[async_trait]
pub trait Storage: Send + Sync {
    /// Bulk insert; a record whose `unique_key` value already exists (stored, or
    /// earlier in `records`) is skipped. Returns the number of rows inserted.
    async fn insert_candidates_skipping_conflicts(
        &self,
        records: Vec<Record>,
        unique_key: &str,
    ) -> Result<u64>;

    /// Inserts `pending` assignments, skipping (employee, candidate) pairs that exist.
    async fn insert_assignments_skipping_conflicts(
        &self,
        employee_id: i64,
        candidate_ids: &[i64],
    ) -> Result<u64>;

    async fn employees_with_assignments(&self) -> Result<Vec<EmployeeAssignments>>;

    async fn close(&self);
}

pub trait ConfigProvider: Send + Sync {
    fn bind_addr(&self) -> &str;
    fn database_url(&self) -> Option<&str>;
    fn max_connections(&self) -> u32;
    fn allowed_origins(&self) -> &[String];
}
