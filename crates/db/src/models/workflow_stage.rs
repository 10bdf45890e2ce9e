//! Approval workflow stage rows.

use serde::Serialize;
use sqlx::FromRow;
use yarning_core::store::StoreError;
use yarning_core::types::{DbId, Timestamp};
use yarning_core::workflow::ApprovalWorkflowStage;

use super::decode;

/// A row from the `approval_workflow_stages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkflowStageRow {
    pub id: DbId,
    pub content_type: String,
    pub content_id: String,
    pub stage: String,
    pub position: i32,
    pub assignee: Option<String>,
    pub status: String,
    pub comments: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<WorkflowStageRow> for ApprovalWorkflowStage {
    type Error = StoreError;

    fn try_from(row: WorkflowStageRow) -> Result<Self, Self::Error> {
        Ok(ApprovalWorkflowStage {
            id: row.id,
            stage: decode("stage", &row.stage)?,
            status: decode("status", &row.status)?,
            content_type: row.content_type,
            content_id: row.content_id,
            position: row.position,
            assignee: row.assignee,
            comments: row.comments,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
