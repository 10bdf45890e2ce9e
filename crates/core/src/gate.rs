//! Publish gate: decides whether content may go out now, must wait for an
//! existing consultation, or needs a new one.
//!
//! The gate never allows by default. A store failure is returned as
//! [`CoreError::Lookup`] and a missing advisor still blocks.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::advisor::{select_advisor, Advisor};
use crate::consultation::{
    Consultation, ConsultationAction, ConsultationPriority, ConsultationStatus,
    CreateConsultationRequest,
};
use crate::error::CoreError;
use crate::protocols::{Assessment, ContentItem, ValidationContext, ValidationEngine};
use crate::store::{AdvisorDirectory, ConsultationStore, StoreError};
use crate::types::DbId;

/// What the caller should do to unblock publication.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NextAction {
    pub action: &'static str,
    pub priority: ConsultationPriority,
    pub purpose: String,
    pub triggers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GateOutcome {
    /// Publication may proceed.
    Allowed {
        requires_consultation: bool,
        consultation_id: Option<DbId>,
        recommendations: Option<String>,
    },
    /// A consultation is underway; the caller must wait for it.
    AwaitingConsultation {
        consultation_id: DbId,
        status: ConsultationStatus,
        advisor_id: Option<DbId>,
    },
    /// No consultation exists yet; one has to be requested.
    ConsultationRequired {
        recommended_advisor: Option<Advisor>,
        next_action: NextAction,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GateDecision {
    #[serde(flatten)]
    pub outcome: GateOutcome,
    pub assessment: Assessment,
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self.outcome, GateOutcome::Allowed { .. })
    }
}

pub struct ApprovalGate {
    engine: Arc<ValidationEngine>,
    consultations: Arc<dyn ConsultationStore>,
    advisors: Arc<dyn AdvisorDirectory>,
}

impl ApprovalGate {
    pub fn new(
        engine: Arc<ValidationEngine>,
        consultations: Arc<dyn ConsultationStore>,
        advisors: Arc<dyn AdvisorDirectory>,
    ) -> Self {
        Self {
            engine,
            consultations,
            advisors,
        }
    }

    pub fn engine(&self) -> &ValidationEngine {
        &self.engine
    }

    /// Decide whether `content` may be published.
    pub async fn check(
        &self,
        content: &ContentItem,
        context: &ValidationContext,
    ) -> Result<GateDecision, CoreError> {
        let assessment = self.engine.assess(content, context);
        let decide = |outcome| GateDecision {
            outcome,
            assessment: assessment.clone(),
        };

        if !assessment.consultation.required {
            return Ok(decide(GateOutcome::Allowed {
                requires_consultation: false,
                consultation_id: None,
                recommendations: None,
            }));
        }

        let content_type = context.content_type.trim();
        let content_id = context.content_id.trim();
        if content_type.is_empty() || content_id.is_empty() {
            return Err(CoreError::Validation(
                "content_type and content_id are required for content that needs consultation"
                    .to_string(),
            ));
        }

        let approved = self
            .consultations
            .find_approved(content_type, content_id)
            .await
            .map_err(|e| lookup_failed(e, content_type, content_id))?;
        if let Some(approved) = approved {
            tracing::info!(
                content_type,
                content_id,
                consultation_id = approved.id,
                "Publication allowed by approved consultation",
            );
            return Ok(decide(GateOutcome::Allowed {
                requires_consultation: true,
                consultation_id: Some(approved.id),
                recommendations: approved.recommendations,
            }));
        }

        let active = self
            .consultations
            .find_active(content_type, content_id)
            .await
            .map_err(|e| lookup_failed(e, content_type, content_id))?;
        if let Some(active) = active {
            tracing::info!(
                content_type,
                content_id,
                consultation_id = active.id,
                status = %active.status,
                "Publication blocked by active consultation",
            );
            return Ok(decide(GateOutcome::AwaitingConsultation {
                consultation_id: active.id,
                status: active.status,
                advisor_id: active.advisor_id,
            }));
        }

        let advisors = self
            .advisors
            .list_active()
            .await
            .map_err(|e| lookup_failed(e, content_type, content_id))?;
        let need = &assessment.consultation;
        let recommended_advisor = select_advisor(
            &advisors,
            &need.triggers,
            &self.engine.config().advisor_preferences,
        )
        .cloned();

        match &recommended_advisor {
            Some(advisor) => tracing::info!(
                content_type,
                content_id,
                advisor_id = advisor.id,
                priority = %need.priority,
                "Publication blocked pending consultation",
            ),
            None => tracing::warn!(
                content_type,
                content_id,
                priority = %need.priority,
                "Publication blocked pending consultation; no active advisor available",
            ),
        }

        let next_action = NextAction {
            action: "create_consultation",
            priority: need.priority,
            purpose: consultation_purpose(&need.triggers),
            triggers: need.triggers.clone(),
        };
        Ok(decide(GateOutcome::ConsultationRequired {
            recommended_advisor,
            next_action,
        }))
    }

    /// Create a consultation. Fails with [`CoreError::ConsultationConflict`]
    /// when the item already has an active one.
    pub async fn create_consultation(
        &self,
        request: CreateConsultationRequest,
    ) -> Result<Consultation, CoreError> {
        let input = request.into_new()?;

        let advisor = self.advisors.find_by_id(input.advisor_id).await?;
        match advisor {
            Some(a) if a.is_active => {}
            Some(_) => {
                return Err(CoreError::Validation(format!(
                    "Advisor {} is not active",
                    input.advisor_id
                )))
            }
            None => {
                return Err(CoreError::Validation(format!(
                    "Advisor {} does not exist",
                    input.advisor_id
                )))
            }
        }

        let consultation = self.consultations.create(&input).await.map_err(|e| {
            if let StoreError::ActiveConsultationExists {
                consultation_id, ..
            } = &e
            {
                tracing::info!(
                    content_type = %input.content_type,
                    content_id = %input.content_id,
                    consultation_id,
                    "Consultation already active",
                );
            }
            CoreError::from(e)
        })?;

        tracing::info!(
            consultation_id = consultation.id,
            content_type = %consultation.content_type,
            content_id = %consultation.content_id,
            advisor_id = ?consultation.advisor_id,
            priority = %consultation.priority,
            "Consultation requested",
        );
        Ok(consultation)
    }

    pub async fn consultation(&self, id: DbId) -> Result<Consultation, CoreError> {
        self.consultations
            .find_by_id(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Consultation",
                id,
            })
    }

    pub async fn consultation_history(
        &self,
        content_type: &str,
        content_id: &str,
    ) -> Result<Vec<Consultation>, CoreError> {
        Ok(self
            .consultations
            .list_for_content(content_type, content_id)
            .await?)
    }

    /// Move a consultation one step along its lifecycle.
    pub async fn transition(
        &self,
        id: DbId,
        action: ConsultationAction,
    ) -> Result<Consultation, CoreError> {
        let current = self.consultation(id).await?;
        let update = current.plan(action, Utc::now())?;
        let updated = self
            .consultations
            .update_status(id, current.status, &update)
            .await?;

        tracing::info!(
            consultation_id = id,
            from = %current.status,
            to = %updated.status,
            approval_status = %updated.approval_status,
            "Consultation status changed",
        );
        Ok(updated)
    }
}

fn lookup_failed(err: StoreError, content_type: &str, content_id: &str) -> CoreError {
    tracing::error!(
        content_type,
        content_id,
        error = %err,
        "Consultation lookup failed; blocking publication",
    );
    CoreError::from(err)
}

fn consultation_purpose(triggers: &[String]) -> String {
    if triggers.is_empty() {
        "Cultural review before publication".to_string()
    } else {
        format!(
            "Cultural review before publication (matched: {})",
            triggers.join(", ")
        )
    }
}
