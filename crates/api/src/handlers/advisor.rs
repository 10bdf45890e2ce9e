//! Handlers for the cultural advisor directory.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use yarning_core::advisor::{Advisor, CreateAdvisor};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AdvisorQuery {
    #[serde(default)]
    pub active_only: bool,
}

/// GET /api/v1/advisors
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<AdvisorQuery>,
) -> AppResult<Json<DataResponse<Vec<Advisor>>>> {
    let advisors = if query.active_only {
        state.advisors.list_active().await
    } else {
        state.advisors.list_all().await
    }?;
    Ok(Json(DataResponse { data: advisors }))
}

/// POST /api/v1/advisors
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateAdvisor>,
) -> AppResult<impl IntoResponse> {
    let input = input.validated()?;
    let advisor = state.advisors.create(&input).await?;

    tracing::info!(
        advisor_id = advisor.id,
        specialties = ?advisor.specialties,
        "Cultural advisor registered",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: advisor })))
}
