//! Handlers for Elder consultations.
//!
//! Creation and every status change go through the approval gate, which
//! enforces the one-active-consultation rule and the transition table.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use yarning_core::consultation::{
    ApprovalStatus, Consultation, ConsultationAction, CreateConsultationRequest,
};
use yarning_core::types::{DbId, Timestamp};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ContentQuery {
    pub content_type: Option<String>,
    pub content_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub scheduled_for: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    pub decision: ApprovalStatus,
    pub recommendations: Option<String>,
}

/// POST /api/v1/consultations
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateConsultationRequest>,
) -> AppResult<impl IntoResponse> {
    let consultation = state.gate.create_consultation(input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: consultation })))
}

/// GET /api/v1/consultations?content_type=..&content_id=..
pub async fn list_for_content(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> AppResult<Json<DataResponse<Vec<Consultation>>>> {
    let (Some(content_type), Some(content_id)) = (query.content_type, query.content_id) else {
        return Err(AppError::BadRequest(
            "content_type and content_id query parameters are required".to_string(),
        ));
    };
    let history = state
        .gate
        .consultation_history(&content_type, &content_id)
        .await?;
    Ok(Json(DataResponse { data: history }))
}

/// GET /api/v1/consultations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Consultation>>> {
    let consultation = state.gate.consultation(id).await?;
    Ok(Json(DataResponse { data: consultation }))
}

/// POST /api/v1/consultations/{id}/schedule
pub async fn schedule(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ScheduleRequest>,
) -> AppResult<Json<DataResponse<Consultation>>> {
    let action = ConsultationAction::Schedule {
        at: input.scheduled_for,
    };
    let consultation = state.gate.transition(id, action).await?;
    Ok(Json(DataResponse { data: consultation }))
}

/// POST /api/v1/consultations/{id}/start
pub async fn start(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Consultation>>> {
    let consultation = state.gate.transition(id, ConsultationAction::Start).await?;
    Ok(Json(DataResponse { data: consultation }))
}

/// POST /api/v1/consultations/{id}/complete
pub async fn complete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CompleteRequest>,
) -> AppResult<Json<DataResponse<Consultation>>> {
    let action = ConsultationAction::Complete {
        decision: input.decision,
        recommendations: input.recommendations,
    };
    let consultation = state.gate.transition(id, action).await?;
    Ok(Json(DataResponse { data: consultation }))
}
