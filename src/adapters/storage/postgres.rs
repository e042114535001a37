use crate::adapters::storage::candidate_row::{ensure_unique_key, CandidateRow};
use crate::core::{Assignment, AssignmentStatus, Employee, EmployeeAssignments, Record, Storage};
use crate::utils::error::{IntakeError, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::collections::HashMap;
use std::str::FromStr;

const SCHEMA: &str = include_str!("../../../migrations/0001_init.sql");

// Postgres 單一語句最多 65535 個 bind 參數
const CANDIDATE_CHUNK_ROWS: usize = 5_000;
const ASSIGNMENT_CHUNK_ROWS: usize = 10_000;

fn db_error(e: sqlx::Error) -> IntakeError {
    IntakeError::storage(e.to_string())
}

#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// 建立連線池並確保資料表存在
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        tracing::info!("Connecting to database");
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        let storage = Self::new(pool);
        storage.ensure_schema().await?;
        Ok(storage)
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        tracing::debug!("Database schema ensured");
        Ok(())
    }

    fn map_employee_row(row: &PgRow) -> Employee {
        Employee {
            id: row.get("id"),
            full_name: row.get("full_name"),
            position: row.get("position"),
        }
    }

    fn map_assignment_row(row: &PgRow) -> Result<Assignment> {
        let status_raw: String = row.get("status");
        let status = AssignmentStatus::from_str(&status_raw).map_err(IntakeError::storage)?;
        Ok(Assignment {
            employee_id: row.get("employee_id"),
            candidate_id: row.get("candidate_id"),
            status,
        })
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn insert_candidates_skipping_conflicts(
        &self,
        records: Vec<Record>,
        unique_key: &str,
    ) -> Result<u64> {
        ensure_unique_key(unique_key)?;
        let mut rows = CandidateRow::from_records(records)?;
        // 依 phone 排序，並行交易以相同順序取得鎖，避免互相等待造成 deadlock。
        // 穩定排序保留批次內重複資料的先後，仍是第一筆寫入
        rows.sort_by(|a, b| a.phone.cmp(&b.phone));

        // 分批寫入但共用一個交易，任一批失敗整體回滾
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let mut inserted = 0;

        for chunk in rows.chunks(CANDIDATE_CHUNK_ROWS) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                "insert into candidates \
                 (phone, name, age, address, company, position, education, upload_batch, extra) ",
            );
            qb.push_values(chunk, |mut b, row| {
                b.push_bind(&row.phone)
                    .push_bind(&row.name)
                    .push_bind(row.age)
                    .push_bind(&row.address)
                    .push_bind(&row.company)
                    .push_bind(&row.position)
                    .push_bind(&row.education)
                    .push_bind(&row.upload_batch)
                    .push_bind(Json(&row.extra));
            });
            qb.push(" on conflict (phone) do nothing");

            let result = qb.build().execute(&mut *tx).await.map_err(db_error)?;
            inserted += result.rows_affected();
        }

        tx.commit().await.map_err(db_error)?;
        Ok(inserted)
    }

    async fn insert_assignments_skipping_conflicts(
        &self,
        employee_id: i64,
        candidate_ids: &[i64],
    ) -> Result<u64> {
        let mut ids = candidate_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let mut inserted = 0;

        for chunk in ids.chunks(ASSIGNMENT_CHUNK_ROWS) {
            let mut qb: QueryBuilder<Postgres> =
                QueryBuilder::new("insert into assignments (employee_id, candidate_id, status) ");
            qb.push_values(chunk, |mut b, candidate_id| {
                b.push_bind(employee_id)
                    .push_bind(*candidate_id)
                    .push_bind(AssignmentStatus::Pending.as_str());
            });
            qb.push(" on conflict (employee_id, candidate_id) do nothing");

            let result = qb.build().execute(&mut *tx).await.map_err(db_error)?;
            inserted += result.rows_affected();
        }

        tx.commit().await.map_err(db_error)?;
        Ok(inserted)
    }

    async fn employees_with_assignments(&self) -> Result<Vec<EmployeeAssignments>> {
        let employee_rows = sqlx::query("select id, full_name, position from employees order by id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        let assignment_rows =
            sqlx::query("select employee_id, candidate_id, status from assignments order by id")
                .fetch_all(&self.pool)
                .await
                .map_err(db_error)?;

        let mut by_employee: HashMap<i64, Vec<Assignment>> = HashMap::new();
        for row in &assignment_rows {
            let assignment = Self::map_assignment_row(row)?;
            by_employee
                .entry(assignment.employee_id)
                .or_default()
                .push(assignment);
        }

        Ok(employee_rows
            .iter()
            .map(|row| {
                let employee = Self::map_employee_row(row);
                let assignments = by_employee.remove(&employee.id).unwrap_or_default();
                EmployeeAssignments {
                    employee,
                    assignments,
                }
            })
            .collect())
    }

    async fn close(&self) {
        tracing::info!("Closing database pool");
        self.pool.close().await;
    }
}
