//! Repository for the `approval_workflow_stages` table.

use sqlx::PgPool;
use yarning_core::types::DbId;
use yarning_core::workflow::{NewWorkflowStage, StageStatus, StageUpdate};

use crate::models::workflow_stage::WorkflowStageRow;

const COLUMNS: &str = "id, content_type, content_id, stage, position, assignee, status, \
    comments, created_at, updated_at";

pub struct WorkflowStageRepo;

impl WorkflowStageRepo {
    /// Insert every stage in one statement so a workflow is created whole
    /// or not at all. A second workflow for the same item violates
    /// `uq_approval_workflow_stages_position`.
    pub async fn create_all(
        pool: &PgPool,
        content_type: &str,
        content_id: &str,
        stages: &[NewWorkflowStage],
    ) -> Result<Vec<WorkflowStageRow>, sqlx::Error> {
        let kinds: Vec<&str> = stages.iter().map(|s| s.stage.as_str()).collect();
        let positions: Vec<i32> = stages.iter().map(|s| s.position).collect();
        let assignees: Vec<Option<String>> = stages.iter().map(|s| s.assignee.clone()).collect();

        let query = format!(
            "INSERT INTO approval_workflow_stages
                (content_type, content_id, stage, position, assignee)
             SELECT $1, $2, s.stage, s.position, s.assignee
             FROM UNNEST($3::text[], $4::int[], $5::text[]) AS s(stage, position, assignee)
             RETURNING {COLUMNS}"
        );
        let mut rows = sqlx::query_as::<_, WorkflowStageRow>(&query)
            .bind(content_type)
            .bind(content_id)
            .bind(&kinds)
            .bind(&positions)
            .bind(&assignees)
            .fetch_all(pool)
            .await?;
        rows.sort_by_key(|r| r.position);
        Ok(rows)
    }

    pub async fn list_for_content(
        pool: &PgPool,
        content_type: &str,
        content_id: &str,
    ) -> Result<Vec<WorkflowStageRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approval_workflow_stages
             WHERE content_type = $1 AND content_id = $2
             ORDER BY position ASC"
        );
        sqlx::query_as::<_, WorkflowStageRow>(&query)
            .bind(content_type)
            .bind(content_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WorkflowStageRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM approval_workflow_stages WHERE id = $1");
        sqlx::query_as::<_, WorkflowStageRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Apply a stage update if the stage is still in status `from`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        from: StageStatus,
        update: &StageUpdate,
    ) -> Result<Option<WorkflowStageRow>, sqlx::Error> {
        let query = format!(
            "UPDATE approval_workflow_stages SET
                status = $3,
                assignee = $4,
                comments = $5,
                updated_at = now()
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowStageRow>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(update.status.as_str())
            .bind(&update.assignee)
            .bind(&update.comments)
            .fetch_optional(pool)
            .await
    }
}
