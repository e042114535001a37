use crate::adapters::storage::candidate_row::{ensure_unique_key, CandidateRow};
use crate::core::{Assignment, AssignmentStatus, Employee, EmployeeAssignments, Record, Storage};
use crate::utils::error::{IntakeError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Tables {
    candidates: Vec<(i64, CandidateRow)>,
    phones: HashSet<String>,
    employees: Vec<Employee>,
    assignments: Vec<Assignment>,
}

/// 以記憶體模擬資料表與其 unique constraint，開發模式與測試使用。
/// 每次呼叫都在同一把鎖內完成，等同單一交易。
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: Mutex<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_employees(employees: Vec<Employee>) -> Self {
        Self {
            tables: Mutex::new(Tables {
                employees,
                ..Tables::default()
            }),
        }
    }

    /// Stored candidates in insertion order, with `id` added.
    pub async fn candidates(&self) -> Vec<Record> {
        let tables = self.tables.lock().await;
        tables
            .candidates
            .iter()
            .map(|(id, row)| {
                let mut record = row.clone().into_record();
                record.insert("id", *id);
                record
            })
            .collect()
    }

    pub async fn set_assignment_status(
        &self,
        employee_id: i64,
        candidate_id: i64,
        status: AssignmentStatus,
    ) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let assignment = tables
            .assignments
            .iter_mut()
            .find(|a| a.employee_id == employee_id && a.candidate_id == candidate_id)
            .ok_or_else(|| {
                IntakeError::storage(format!(
                    "no assignment for employee {} and candidate {}",
                    employee_id, candidate_id
                ))
            })?;
        assignment.status = status;
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn insert_candidates_skipping_conflicts(
        &self,
        records: Vec<Record>,
        unique_key: &str,
    ) -> Result<u64> {
        ensure_unique_key(unique_key)?;
        // 先全部轉換，任何一筆格式錯誤整批失敗，不留下部分資料
        let rows = CandidateRow::from_records(records)?;

        let mut tables = self.tables.lock().await;
        let mut inserted = 0;
        for row in rows {
            if !tables.phones.insert(row.phone.clone()) {
                tracing::trace!("Skipping duplicate phone {}", row.phone);
                continue;
            }
            let id = tables.candidates.len() as i64 + 1;
            tables.candidates.push((id, row));
            inserted += 1;
        }

        Ok(inserted)
    }

    async fn insert_assignments_skipping_conflicts(
        &self,
        employee_id: i64,
        candidate_ids: &[i64],
    ) -> Result<u64> {
        let mut tables = self.tables.lock().await;

        if !tables.employees.iter().any(|e| e.id == employee_id) {
            return Err(IntakeError::storage(format!(
                "employee {} does not exist",
                employee_id
            )));
        }
        let known: HashSet<i64> = tables.candidates.iter().map(|(id, _)| *id).collect();
        if let Some(missing) = candidate_ids.iter().find(|id| !known.contains(*id)) {
            return Err(IntakeError::storage(format!(
                "candidate {} does not exist",
                missing
            )));
        }

        let mut inserted = 0;
        for &candidate_id in candidate_ids {
            let exists = tables
                .assignments
                .iter()
                .any(|a| a.employee_id == employee_id && a.candidate_id == candidate_id);
            if exists {
                continue;
            }
            tables.assignments.push(Assignment {
                employee_id,
                candidate_id,
                status: AssignmentStatus::Pending,
            });
            inserted += 1;
        }

        Ok(inserted)
    }

    async fn employees_with_assignments(&self) -> Result<Vec<EmployeeAssignments>> {
        let tables = self.tables.lock().await;

        let mut by_employee: HashMap<i64, Vec<Assignment>> = HashMap::new();
        for assignment in &tables.assignments {
            by_employee
                .entry(assignment.employee_id)
                .or_default()
                .push(assignment.clone());
        }

        Ok(tables
            .employees
            .iter()
            .map(|employee| EmployeeAssignments {
                employee: employee.clone(),
                assignments: by_employee.remove(&employee.id).unwrap_or_default(),
            })
            .collect())
    }

    async fn close(&self) {
        tracing::debug!("Memory storage closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(phone: &str) -> Record {
        serde_json::from_value(json!({ "phone": phone, "uploadBatch": "b1" })).unwrap()
    }

    fn employee(id: i64) -> Employee {
        Employee {
            id,
            full_name: format!("Employee {}", id),
            position: None,
        }
    }

    #[tokio::test]
    async fn test_skips_existing_and_intra_batch_duplicates() {
        let storage = MemoryStorage::new();
        let first = storage
            .insert_candidates_skipping_conflicts(vec![candidate("1"), candidate("1")], "phone")
            .await
            .unwrap();
        let second = storage
            .insert_candidates_skipping_conflicts(vec![candidate("1"), candidate("2")], "phone")
            .await
            .unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 1);
        assert_eq!(storage.candidates().await.len(), 2);
    }

    #[tokio::test]
    async fn test_rejects_unknown_unique_key() {
        let storage = MemoryStorage::new();
        let result = storage
            .insert_candidates_skipping_conflicts(vec![candidate("1")], "name")
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_assignments_skip_existing_pairs() {
        let storage = MemoryStorage::with_employees(vec![employee(1)]);
        storage
            .insert_candidates_skipping_conflicts(vec![candidate("1"), candidate("2")], "phone")
            .await
            .unwrap();

        assert_eq!(
            storage
                .insert_assignments_skipping_conflicts(1, &[1])
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            storage
                .insert_assignments_skipping_conflicts(1, &[1, 2])
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_assignment_to_unknown_employee_fails() {
        let storage = MemoryStorage::new();
        let result = storage.insert_assignments_skipping_conflicts(9, &[1]).await;
        assert!(matches!(result, Err(IntakeError::StorageError { .. })));
    }

    #[tokio::test]
    async fn test_employees_listed_with_their_assignments() {
        let storage = MemoryStorage::with_employees(vec![employee(1), employee(2)]);
        storage
            .insert_candidates_skipping_conflicts(vec![candidate("1")], "phone")
            .await
            .unwrap();
        storage
            .insert_assignments_skipping_conflicts(2, &[1])
            .await
            .unwrap();
        storage
            .set_assignment_status(2, 1, AssignmentStatus::Completed)
            .await
            .unwrap();

        let listed = storage.employees_with_assignments().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].assignments.is_empty());
        assert_eq!(listed[1].assignments[0].status, AssignmentStatus::Completed);
    }
}
