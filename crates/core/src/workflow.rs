//! Staged approval workflow for content above the public tier.
//!
//! The escalation table decides which stages a tier needs and in what order.
//! Each stage moves through its own small state machine, and a stage may
//! only enter review once every earlier stage is approved.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::protocols::sensitivity::SensitivityTier;
use crate::types::{string_enum, DbId, Timestamp};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Elder,
    CulturalAdvisor,
    Community,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    InReview,
    Approved,
    Rejected,
    RequiresChanges,
}

string_enum!(StageKind, "workflow stage", {
    Elder => "elder",
    CulturalAdvisor => "cultural_advisor",
    Community => "community",
});

string_enum!(StageStatus, "stage status", {
    Pending => "pending",
    InReview => "in_review",
    Approved => "approved",
    Rejected => "rejected",
    RequiresChanges => "requires_changes",
});

/// Roll-up of every stage for one content item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// The tier needs no stages.
    NotRequired,
    InProgress,
    ChangesRequested,
    Rejected,
    Approved,
}

// ---------------------------------------------------------------------------
// Escalation table
// ---------------------------------------------------------------------------

/// Tier -> ordered list of approval stages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct EscalationTable(BTreeMap<SensitivityTier, Vec<StageKind>>);

impl Default for EscalationTable {
    fn default() -> Self {
        let full = vec![
            StageKind::CulturalAdvisor,
            StageKind::Elder,
            StageKind::Community,
        ];
        Self(BTreeMap::from([
            (SensitivityTier::Public, vec![]),
            (SensitivityTier::Community, vec![StageKind::Community]),
            (
                SensitivityTier::Sensitive,
                vec![StageKind::CulturalAdvisor, StageKind::Elder],
            ),
            (SensitivityTier::Sacred, full.clone()),
            (SensitivityTier::Restricted, full),
        ]))
    }
}

impl EscalationTable {
    /// Stages required for `tier`; none when the tier is not configured.
    pub fn stages_for(&self, tier: SensitivityTier) -> &[StageKind] {
        self.0.get(&tier).map_or(&[], Vec::as_slice)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        for (tier, stages) in &self.0 {
            for (i, stage) in stages.iter().enumerate() {
                if stages[..i].contains(stage) {
                    return Err(CoreError::Validation(format!(
                        "escalation for '{tier}' lists stage '{stage}' more than once"
                    )));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApprovalWorkflowStage {
    pub id: DbId,
    pub content_type: String,
    pub content_id: String,
    pub stage: StageKind,
    /// Zero-based order within the workflow.
    pub position: i32,
    pub assignee: Option<String>,
    pub status: StageStatus,
    pub comments: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewWorkflowStage {
    pub stage: StageKind,
    pub position: i32,
    pub assignee: Option<String>,
}

/// A reviewer's step on one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageAction {
    StartReview {
        assignee: Option<String>,
    },
    Decide {
        status: StageStatus,
        comments: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageUpdate {
    pub status: StageStatus,
    pub assignee: Option<String>,
    pub comments: Option<String>,
}

// ---------------------------------------------------------------------------
// Stage state machine
// ---------------------------------------------------------------------------

pub fn valid_stage_transitions(from: StageStatus) -> &'static [StageStatus] {
    match from {
        StageStatus::Pending => &[StageStatus::InReview],
        StageStatus::InReview => &[
            StageStatus::Approved,
            StageStatus::Rejected,
            StageStatus::RequiresChanges,
        ],
        StageStatus::RequiresChanges => &[StageStatus::InReview],
        StageStatus::Approved | StageStatus::Rejected => &[],
    }
}

pub fn validate_stage_transition(from: StageStatus, to: StageStatus) -> Result<(), CoreError> {
    if valid_stage_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot move approval stage from '{from}' to '{to}'. Allowed: {:?}",
            valid_stage_transitions(from)
        )))
    }
}

/// Stages to create for content recommended at `tier`.
pub fn plan_stages(tier: SensitivityTier, table: &EscalationTable) -> Vec<NewWorkflowStage> {
    table
        .stages_for(tier)
        .iter()
        .zip(0..)
        .map(|(stage, position)| NewWorkflowStage {
            stage: *stage,
            position,
            assignee: None,
        })
        .collect()
}

/// Validate `action` on `stage_id` against the whole workflow and compute
/// the update to store.
pub fn plan_stage_update(
    stages: &[ApprovalWorkflowStage],
    stage_id: DbId,
    action: StageAction,
) -> Result<StageUpdate, CoreError> {
    let stage = stages
        .iter()
        .find(|s| s.id == stage_id)
        .ok_or(CoreError::NotFound {
            entity: "ApprovalWorkflowStage",
            id: stage_id,
        })?;

    match action {
        StageAction::StartReview { assignee } => {
            validate_stage_transition(stage.status, StageStatus::InReview)?;
            if let Some(blocking) = stages
                .iter()
                .filter(|s| s.position < stage.position)
                .find(|s| s.status != StageStatus::Approved)
            {
                return Err(CoreError::Validation(format!(
                    "Stage '{}' must be approved before '{}' can be reviewed",
                    blocking.stage, stage.stage
                )));
            }
            Ok(StageUpdate {
                status: StageStatus::InReview,
                assignee: assignee.or_else(|| stage.assignee.clone()),
                comments: stage.comments.clone(),
            })
        }
        StageAction::Decide { status, comments } => {
            if !matches!(
                status,
                StageStatus::Approved | StageStatus::Rejected | StageStatus::RequiresChanges
            ) {
                return Err(CoreError::Validation(format!(
                    "'{status}' is not a review decision"
                )));
            }
            validate_stage_transition(stage.status, status)?;
            let missing_comments = comments.as_deref().is_none_or(|c| c.trim().is_empty());
            if status != StageStatus::Approved && missing_comments {
                return Err(CoreError::Validation(
                    "Comments are required when rejecting or requesting changes".to_string(),
                ));
            }
            Ok(StageUpdate {
                status,
                assignee: stage.assignee.clone(),
                comments: comments.or_else(|| stage.comments.clone()),
            })
        }
    }
}

/// Roll every stage up into one status. Rejection dominates, then requested
/// changes; the workflow is approved only when every stage is.
pub fn workflow_status(stages: &[ApprovalWorkflowStage]) -> WorkflowStatus {
    if stages.is_empty() {
        WorkflowStatus::NotRequired
    } else if stages.iter().any(|s| s.status == StageStatus::Rejected) {
        WorkflowStatus::Rejected
    } else if stages.iter().any(|s| s.status == StageStatus::RequiresChanges) {
        WorkflowStatus::ChangesRequested
    } else if stages.iter().all(|s| s.status == StageStatus::Approved) {
        WorkflowStatus::Approved
    } else {
        WorkflowStatus::InProgress
    }
}
