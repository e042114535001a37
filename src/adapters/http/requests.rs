use serde::Deserialize;

use crate::core::Record;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCandidatesRequest {
    pub candidates: Option<Vec<Record>>,
    pub upload_batch: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentsRequest {
    pub employee_id: Option<i64>,
    pub candidate_ids: Option<Vec<i64>>,
}
