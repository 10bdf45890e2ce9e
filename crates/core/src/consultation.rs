//! Elder consultation records and their status state machine.
//!
//! Statuses only move forward: `REQUESTED -> SCHEDULED -> IN_PROGRESS ->
//! COMPLETED`. A completed consultation is immutable history; asking again
//! means creating a new request.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{string_enum, DbId, Timestamp};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsultationStatus {
    Requested,
    Scheduled,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsultationPriority {
    Low,
    Medium,
    High,
    Urgent,
}

string_enum!(ConsultationStatus, "consultation status", {
    Requested => "REQUESTED",
    Scheduled => "SCHEDULED",
    InProgress => "IN_PROGRESS",
    Completed => "COMPLETED",
});

string_enum!(ApprovalStatus, "approval status", {
    Pending => "PENDING",
    Approved => "APPROVED",
    Rejected => "REJECTED",
});

string_enum!(ConsultationPriority, "consultation priority", {
    Low => "LOW",
    Medium => "MEDIUM",
    High => "HIGH",
    Urgent => "URGENT",
});

impl ConsultationStatus {
    /// Not yet completed. At most one active consultation may exist per content item.
    pub fn is_active(self) -> bool {
        self != ConsultationStatus::Completed
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Statuses reachable from `from`. `Completed` is terminal.
pub fn valid_transitions(from: ConsultationStatus) -> &'static [ConsultationStatus] {
    match from {
        ConsultationStatus::Requested => &[ConsultationStatus::Scheduled],
        ConsultationStatus::Scheduled => &[ConsultationStatus::InProgress],
        ConsultationStatus::InProgress => &[ConsultationStatus::Completed],
        ConsultationStatus::Completed => &[],
    }
}

pub fn can_transition(from: ConsultationStatus, to: ConsultationStatus) -> bool {
    valid_transitions(from).contains(&to)
}

pub fn validate_transition(
    from: ConsultationStatus,
    to: ConsultationStatus,
) -> Result<(), CoreError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot move consultation from {from} to {to}. Allowed: {:?}",
            valid_transitions(from)
        )))
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Consultation {
    pub id: DbId,
    pub content_type: String,
    pub content_id: String,
    pub purpose: String,
    pub priority: ConsultationPriority,
    pub status: ConsultationStatus,
    pub approval_status: ApprovalStatus,
    pub advisor_id: Option<DbId>,
    pub requested_by: String,
    pub recommendations: Option<String>,
    pub scheduled_for: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Consultation {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Completed with an approval: publication may proceed.
    pub fn is_approved(&self) -> bool {
        self.status == ConsultationStatus::Completed
            && self.approval_status == ApprovalStatus::Approved
    }

    /// Validate `action` against the current status and compute the update.
    pub fn plan(
        &self,
        action: ConsultationAction,
        now: Timestamp,
    ) -> Result<StatusUpdate, CoreError> {
        let target = action.target_status();
        validate_transition(self.status, target)?;

        let update = match action {
            ConsultationAction::Schedule { at } => StatusUpdate {
                status: target,
                approval_status: self.approval_status,
                scheduled_for: Some(at),
                recommendations: self.recommendations.clone(),
                completed_at: None,
            },
            ConsultationAction::Start => StatusUpdate {
                status: target,
                approval_status: self.approval_status,
                scheduled_for: self.scheduled_for,
                recommendations: self.recommendations.clone(),
                completed_at: None,
            },
            ConsultationAction::Complete {
                decision,
                recommendations,
            } => {
                if decision == ApprovalStatus::Pending {
                    return Err(CoreError::Validation(
                        "A completed consultation must be APPROVED or REJECTED".to_string(),
                    ));
                }
                StatusUpdate {
                    status: target,
                    approval_status: decision,
                    scheduled_for: self.scheduled_for,
                    recommendations: recommendations.or_else(|| self.recommendations.clone()),
                    completed_at: Some(now),
                }
            }
        };
        Ok(update)
    }
}

/// A forward step requested by an advisor or coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsultationAction {
    Schedule {
        at: Timestamp,
    },
    Start,
    Complete {
        decision: ApprovalStatus,
        recommendations: Option<String>,
    },
}

impl ConsultationAction {
    pub fn target_status(&self) -> ConsultationStatus {
        match self {
            ConsultationAction::Schedule { .. } => ConsultationStatus::Scheduled,
            ConsultationAction::Start => ConsultationStatus::InProgress,
            ConsultationAction::Complete { .. } => ConsultationStatus::Completed,
        }
    }
}

/// Column values written by a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: ConsultationStatus,
    pub approval_status: ApprovalStatus,
    pub scheduled_for: Option<Timestamp>,
    pub recommendations: Option<String>,
    pub completed_at: Option<Timestamp>,
}

/// A validated consultation ready to be stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewConsultation {
    pub content_type: String,
    pub content_id: String,
    pub purpose: String,
    pub priority: ConsultationPriority,
    pub advisor_id: DbId,
    pub requested_by: String,
    pub scheduled_for: Option<Timestamp>,
}

/// Request body for explicitly creating a consultation.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateConsultationRequest {
    #[validate(length(min = 1, message = "content_type is required"))]
    #[serde(default)]
    pub content_type: String,
    #[validate(length(min = 1, message = "content_id is required"))]
    #[serde(default)]
    pub content_id: String,
    #[validate(length(min = 1, max = 2000, message = "purpose is required (max 2000 characters)"))]
    #[serde(default)]
    pub purpose: String,
    #[validate(required(message = "advisor_id is required"))]
    pub advisor_id: Option<DbId>,
    #[validate(length(min = 1, message = "requested_by is required"))]
    #[serde(default)]
    pub requested_by: String,
    pub priority: Option<ConsultationPriority>,
    pub scheduled_for: Option<Timestamp>,
}

impl CreateConsultationRequest {
    /// Trim, validate, and convert. Missing priority defaults to `MEDIUM`.
    pub fn into_new(self) -> Result<NewConsultation, CoreError> {
        let trimmed = Self {
            content_type: self.content_type.trim().to_string(),
            content_id: self.content_id.trim().to_string(),
            purpose: self.purpose.trim().to_string(),
            requested_by: self.requested_by.trim().to_string(),
            ..self
        };
        trimmed
            .validate()
            .map_err(|e| CoreError::Validation(format!("Invalid consultation request: {e}")))?;

        let advisor_id = trimmed
            .advisor_id
            .ok_or_else(|| CoreError::Validation("advisor_id is required".to_string()))?;

        Ok(NewConsultation {
            content_type: trimmed.content_type,
            content_id: trimmed.content_id,
            purpose: trimmed.purpose,
            priority: trimmed.priority.unwrap_or(ConsultationPriority::Medium),
            advisor_id,
            requested_by: trimmed.requested_by,
            scheduled_for: trimmed.scheduled_for,
        })
    }
}
