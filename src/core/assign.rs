use crate::core::Storage;
use crate::utils::error::Result;

/// 將候選人指派給員工 (狀態固定為 pending)，已存在的指派會被略過
pub async fn assign_candidates(
    storage: &dyn Storage,
    employee_id: i64,
    candidate_ids: &[i64],
) -> Result<u64> {
    if candidate_ids.is_empty() {
        return Ok(0);
    }

    let inserted = storage
        .insert_assignments_skipping_conflicts(employee_id, candidate_ids)
        .await?;

    tracing::info!(
        employee_id,
        requested = candidate_ids.len(),
        inserted,
        "📋 Candidates assigned"
    );
    Ok(inserted)
}
