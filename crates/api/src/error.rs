use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use yarning_core::error::CoreError;
use yarning_core::store::StoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `yarning_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Core(err.into())
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut details = None;
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::ConsultationConflict {
                    consultation_id,
                    status,
                    advisor_id,
                } => {
                    details = Some(json!({
                        "consultation_id": consultation_id,
                        "status": status,
                        "advisor_id": advisor_id,
                    }));
                    (
                        StatusCode::CONFLICT,
                        "CONSULTATION_CONFLICT",
                        core.to_string(),
                    )
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Lookup(msg) => {
                    tracing::error!(error = %msg, "Lookup failure surfaced to client");
                    details = Some(json!({ "retryable": true }));
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "LOOKUP_FAILED",
                        "Consultation records are temporarily unavailable; retry later".to_string(),
                    )
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use yarning_core::consultation::ConsultationStatus;

    use super::*;

    #[test]
    fn lookup_failure_is_service_unavailable() {
        let response = AppError::from(CoreError::Lookup("timeout".into())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn consultation_conflict_is_409() {
        let response = AppError::from(CoreError::ConsultationConflict {
            consultation_id: 3,
            status: ConsultationStatus::Scheduled,
            advisor_id: None,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn validation_is_400() {
        let response =
            AppError::from(CoreError::Validation("purpose is required".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
