//! Handler for the publish gate.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use yarning_core::gate::GateOutcome;

use crate::error::AppResult;
use crate::handlers::ContentRequest;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/cultural/publish-check
///
/// `200` when publication may proceed, `403` when a consultation must be
/// requested, `409` while one is underway. Store failures surface as `503`.
pub async fn publish_check(
    State(state): State<AppState>,
    Json(input): Json<ContentRequest>,
) -> AppResult<impl IntoResponse> {
    let decision = state.gate.check(&input.content, &input.context).await?;

    let status = match &decision.outcome {
        GateOutcome::Allowed { .. } => StatusCode::OK,
        GateOutcome::ConsultationRequired { .. } => StatusCode::FORBIDDEN,
        GateOutcome::AwaitingConsultation { .. } => StatusCode::CONFLICT,
    };

    Ok((status, Json(DataResponse { data: decision })))
}
