use crate::core::{AssignmentStatus, EmployeeAssignments, EmployeeSummary, Storage};
use crate::utils::error::Result;

pub fn summarize(employees: &[EmployeeAssignments]) -> Vec<EmployeeSummary> {
    employees
        .iter()
        .map(|entry| {
            let count = |status: AssignmentStatus| {
                entry
                    .assignments
                    .iter()
                    .filter(|a| a.status == status)
                    .count()
            };

            EmployeeSummary {
                id: entry.employee.id,
                name: entry.employee.full_name.clone(),
                position: entry.employee.position.clone(),
                total_assigned: entry.assignments.len(),
                completed: count(AssignmentStatus::Completed),
                in_progress: count(AssignmentStatus::InProgress),
                pending: count(AssignmentStatus::Pending),
            }
        })
        .collect()
}

pub async fn load_summary(storage: &dyn Storage) -> Result<Vec<EmployeeSummary>> {
    let employees = storage.employees_with_assignments().await?;
    tracing::debug!("Summarizing {} employees", employees.len());
    Ok(summarize(&employees))
}
