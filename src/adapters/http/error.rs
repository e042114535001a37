use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::adapters::http::responses::FailureResponse;
use crate::utils::error::IntakeError;

pub struct ApiError(pub IntakeError);

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(IntakeError::validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            IntakeError::ValidationError { message } => (StatusCode::BAD_REQUEST, message.clone()),
            IntakeError::StorageError { message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message.clone())
            }
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "❌ Request failed");
        } else {
            tracing::warn!(error = %self.0, "Rejected request");
        }

        let body = FailureResponse {
            success: false,
            error: message,
        };
        (status, Json(body)).into_response()
    }
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({ "error": "Method not allowed" })),
    )
}
