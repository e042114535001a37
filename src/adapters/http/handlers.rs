use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::requests::{CreateAssignmentsRequest, UploadCandidatesRequest};
use crate::adapters::http::responses::CountResponse;
use crate::adapters::http::AppState;
use crate::core::{assign, summary, EmployeeSummary};
use crate::utils::error::IntakeError;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn upload_candidates(
    State(state): State<AppState>,
    payload: Result<Json<UploadCandidatesRequest>, JsonRejection>,
) -> Result<Json<CountResponse>, ApiError> {
    let Json(body) = payload?;
    let candidates = body
        .candidates
        .ok_or_else(|| IntakeError::validation("`candidates` must be an array of objects"))?;

    let outcome = state
        .ingest
        .ingest(candidates, body.upload_batch.as_deref())
        .await?;

    Ok(Json(CountResponse {
        success: true,
        count: outcome.inserted,
    }))
}

pub async fn create_assignments(
    State(state): State<AppState>,
    payload: Result<Json<CreateAssignmentsRequest>, JsonRejection>,
) -> Result<Json<CountResponse>, ApiError> {
    let Json(body) = payload?;
    let employee_id = body
        .employee_id
        .ok_or_else(|| IntakeError::validation("`employeeId` is required"))?;
    let candidate_ids = body
        .candidate_ids
        .ok_or_else(|| IntakeError::validation("`candidateIds` must be an array of ids"))?;

    let count = assign::assign_candidates(state.storage.as_ref(), employee_id, &candidate_ids).await?;
    Ok(Json(CountResponse {
        success: true,
        count,
    }))
}

pub async fn employee_summary(
    State(state): State<AppState>,
) -> Result<Json<Vec<EmployeeSummary>>, ApiError> {
    let summary = summary::load_summary(state.storage.as_ref()).await?;
    Ok(Json(summary))
}
