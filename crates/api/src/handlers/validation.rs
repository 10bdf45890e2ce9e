//! Handlers for rule listing, validation and sensitivity recommendation.
//!
//! These never touch storage; they run the engine over the request body.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use yarning_core::protocols::analysis::{assess_analysis_text, reconcile, SensitivityAssessment};
use yarning_core::protocols::rules::RuleDescriptor;
use yarning_core::protocols::sensitivity::TierReason;
use yarning_core::protocols::{Assessment, ContentItem, ValidationContext};

use crate::error::AppResult;
use crate::handlers::ContentRequest;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/cultural/rules
pub async fn list_rules(State(state): State<AppState>) -> Json<DataResponse<Vec<RuleDescriptor>>> {
    let rules = state.engine.rules().cloned().collect();
    Json(DataResponse { data: rules })
}

/// POST /api/v1/cultural/validate
///
/// Validation result plus the tier and consultation need derived from it.
pub async fn validate(
    State(state): State<AppState>,
    Json(input): Json<ContentRequest>,
) -> AppResult<Json<DataResponse<Assessment>>> {
    let assessment = state.engine.assess(&input.content, &input.context);

    tracing::debug!(
        content_type = %input.context.content_type,
        content_id = %input.context.content_id,
        valid = assessment.result.valid,
        violations = assessment.result.violations.len(),
        warnings = assessment.result.warnings.len(),
        tier = %assessment.sensitivity.tier,
        "Content validated",
    );

    Ok(Json(DataResponse { data: assessment }))
}

#[derive(Debug, Deserialize)]
pub struct SensitivityRequest {
    pub content: ContentItem,
    #[serde(default)]
    pub context: ValidationContext,
    /// Optional free-text AI analysis to compare against the rule tier.
    pub analysis: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SensitivityResponse {
    #[serde(flatten)]
    pub assessment: SensitivityAssessment,
    pub reason: TierReason,
}

/// POST /api/v1/cultural/sensitivity
pub async fn sensitivity(
    State(state): State<AppState>,
    Json(input): Json<SensitivityRequest>,
) -> AppResult<Json<DataResponse<SensitivityResponse>>> {
    let result = state.engine.validate(&input.content, &input.context);
    let recommendation = state.engine.explain_sensitivity(&result, &input.context);
    let signal = input.analysis.as_deref().map(assess_analysis_text);
    let assessment = reconcile(recommendation.tier, signal);

    if assessment.needs_review {
        tracing::info!(
            content_type = %input.context.content_type,
            content_id = %input.context.content_id,
            tier = %assessment.tier,
            "AI analysis suggests a higher tier than the rules",
        );
    }

    Ok(Json(DataResponse {
        data: SensitivityResponse {
            assessment,
            reason: recommendation.reason,
        },
    }))
}
