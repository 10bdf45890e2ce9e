//! Handlers for staged approval workflows.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use yarning_core::error::CoreError;
use yarning_core::protocols::sensitivity::{SensitivityTier, TierReason};
use yarning_core::types::DbId;
use yarning_core::workflow::{
    plan_stage_update, plan_stages, workflow_status, ApprovalWorkflowStage, StageAction,
    StageStatus, WorkflowStatus,
};

use crate::error::{AppError, AppResult};
use crate::handlers::ContentRequest;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WorkflowResponse {
    pub status: WorkflowStatus,
    pub stages: Vec<ApprovalWorkflowStage>,
}

#[derive(Debug, Serialize)]
pub struct OpenedWorkflow {
    pub tier: SensitivityTier,
    pub reason: TierReason,
    #[serde(flatten)]
    pub workflow: WorkflowResponse,
}

#[derive(Debug, Serialize)]
pub struct StageResponse {
    pub stage: ApprovalWorkflowStage,
    pub workflow_status: WorkflowStatus,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub assignee: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub status: StageStatus,
    pub comments: Option<String>,
}

/// POST /api/v1/workflows
///
/// Classify the content and create the approval stages its tier requires.
/// Public content needs no stages and nothing is stored.
pub async fn open(
    State(state): State<AppState>,
    Json(input): Json<ContentRequest>,
) -> AppResult<impl IntoResponse> {
    let content_type = input.context.content_type.trim().to_string();
    let content_id = input.context.content_id.trim().to_string();
    if content_type.is_empty() || content_id.is_empty() {
        return Err(AppError::BadRequest(
            "context.content_type and context.content_id are required".to_string(),
        ));
    }

    let result = state.engine.validate(&input.content, &input.context);
    let recommendation = state.engine.explain_sensitivity(&result, &input.context);
    let planned = plan_stages(recommendation.tier, &state.engine.config().escalation);

    let (status, stages) = if planned.is_empty() {
        (StatusCode::OK, Vec::new())
    } else {
        let stages = state
            .workflows
            .create_stages(&content_type, &content_id, &planned)
            .await?;
        tracing::info!(
            content_type = %content_type,
            content_id = %content_id,
            tier = %recommendation.tier,
            stages = stages.len(),
            "Approval workflow opened",
        );
        (StatusCode::CREATED, stages)
    };

    let body = OpenedWorkflow {
        tier: recommendation.tier,
        reason: recommendation.reason,
        workflow: WorkflowResponse {
            status: workflow_status(&stages),
            stages,
        },
    };
    Ok((status, Json(DataResponse { data: body })))
}

/// GET /api/v1/workflows/{content_type}/{content_id}
pub async fn get_for_content(
    State(state): State<AppState>,
    Path((content_type, content_id)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<WorkflowResponse>>> {
    let stages = state
        .workflows
        .list_stages(&content_type, &content_id)
        .await?;
    Ok(Json(DataResponse {
        data: WorkflowResponse {
            status: workflow_status(&stages),
            stages,
        },
    }))
}

/// POST /api/v1/workflows/stages/{stage_id}/review
pub async fn start_review(
    State(state): State<AppState>,
    Path(stage_id): Path<DbId>,
    Json(input): Json<ReviewRequest>,
) -> AppResult<Json<DataResponse<StageResponse>>> {
    let action = StageAction::StartReview {
        assignee: input.assignee,
    };
    apply_stage_action(&state, stage_id, action).await
}

/// POST /api/v1/workflows/stages/{stage_id}/decision
pub async fn decide(
    State(state): State<AppState>,
    Path(stage_id): Path<DbId>,
    Json(input): Json<DecisionRequest>,
) -> AppResult<Json<DataResponse<StageResponse>>> {
    let action = StageAction::Decide {
        status: input.status,
        comments: input.comments,
    };
    apply_stage_action(&state, stage_id, action).await
}

async fn apply_stage_action(
    state: &AppState,
    stage_id: DbId,
    action: StageAction,
) -> AppResult<Json<DataResponse<StageResponse>>> {
    let stage = state
        .workflows
        .find_stage(stage_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "ApprovalWorkflowStage",
            id: stage_id,
        })?;

    let mut stages = state
        .workflows
        .list_stages(&stage.content_type, &stage.content_id)
        .await?;
    let update = plan_stage_update(&stages, stage_id, action)?;
    let updated = state
        .workflows
        .update_stage(stage_id, stage.status, &update)
        .await?;

    tracing::info!(
        stage_id,
        stage = %updated.stage,
        from = %stage.status,
        to = %updated.status,
        "Approval stage updated",
    );

    if let Some(slot) = stages.iter_mut().find(|s| s.id == stage_id) {
        *slot = updated.clone();
    }
    Ok(Json(DataResponse {
        data: StageResponse {
            stage: updated,
            workflow_status: workflow_status(&stages),
        },
    }))
}
