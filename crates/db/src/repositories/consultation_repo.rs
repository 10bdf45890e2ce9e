//! Repository for the `cultural_consultations` table.

use sqlx::PgPool;
use yarning_core::consultation::{ConsultationStatus, NewConsultation, StatusUpdate};
use yarning_core::types::DbId;

use crate::models::consultation::ConsultationRow;

const COLUMNS: &str = "id, content_type, content_id, purpose, priority, status, \
    approval_status, advisor_id, requested_by, recommendations, scheduled_for, \
    completed_at, created_at, updated_at";

pub struct ConsultationRepo;

impl ConsultationRepo {
    /// Insert a `REQUESTED` consultation unless the item already has an
    /// active one.
    ///
    /// Relies on the partial unique index `uq_cultural_consultations_active`,
    /// so concurrent callers cannot both succeed. Returns `None` when the
    /// insert was skipped.
    pub async fn create_if_no_active(
        pool: &PgPool,
        input: &NewConsultation,
    ) -> Result<Option<ConsultationRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO cultural_consultations
                (content_type, content_id, purpose, priority, advisor_id, requested_by,
                 scheduled_for)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (content_type, content_id) WHERE status <> 'COMPLETED' DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ConsultationRow>(&query)
            .bind(&input.content_type)
            .bind(&input.content_id)
            .bind(&input.purpose)
            .bind(input.priority.as_str())
            .bind(input.advisor_id)
            .bind(&input.requested_by)
            .bind(input.scheduled_for)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ConsultationRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cultural_consultations WHERE id = $1");
        sqlx::query_as::<_, ConsultationRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_active(
        pool: &PgPool,
        content_type: &str,
        content_id: &str,
    ) -> Result<Option<ConsultationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cultural_consultations
             WHERE content_type = $1 AND content_id = $2 AND status <> 'COMPLETED'"
        );
        sqlx::query_as::<_, ConsultationRow>(&query)
            .bind(content_type)
            .bind(content_id)
            .fetch_optional(pool)
            .await
    }

    /// Most recent approved consultation for the item.
    pub async fn find_approved(
        pool: &PgPool,
        content_type: &str,
        content_id: &str,
    ) -> Result<Option<ConsultationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cultural_consultations
             WHERE content_type = $1 AND content_id = $2
               AND status = 'COMPLETED' AND approval_status = 'APPROVED'
             ORDER BY completed_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, ConsultationRow>(&query)
            .bind(content_type)
            .bind(content_id)
            .fetch_optional(pool)
            .await
    }

    /// History for one item, newest first.
    pub async fn list_for_content(
        pool: &PgPool,
        content_type: &str,
        content_id: &str,
    ) -> Result<Vec<ConsultationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cultural_consultations
             WHERE content_type = $1 AND content_id = $2
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ConsultationRow>(&query)
            .bind(content_type)
            .bind(content_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a status change if the row is still in status `from`.
    /// Returns `None` when the row is missing or has moved on.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        from: ConsultationStatus,
        update: &StatusUpdate,
    ) -> Result<Option<ConsultationRow>, sqlx::Error> {
        let query = format!(
            "UPDATE cultural_consultations SET
                status = $3,
                approval_status = $4,
                scheduled_for = $5,
                recommendations = $6,
                completed_at = $7,
                updated_at = now()
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ConsultationRow>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(update.status.as_str())
            .bind(update.approval_status.as_str())
            .bind(update.scheduled_for)
            .bind(&update.recommendations)
            .bind(update.completed_at)
            .fetch_optional(pool)
            .await
    }
}
