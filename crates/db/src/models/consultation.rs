//! Elder consultation rows.

use serde::Serialize;
use sqlx::FromRow;
use yarning_core::consultation::Consultation;
use yarning_core::store::StoreError;
use yarning_core::types::{DbId, Timestamp};

use super::decode;

/// A row from the `cultural_consultations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConsultationRow {
    pub id: DbId,
    pub content_type: String,
    pub content_id: String,
    pub purpose: String,
    pub priority: String,
    pub status: String,
    pub approval_status: String,
    pub advisor_id: Option<DbId>,
    pub requested_by: String,
    pub recommendations: Option<String>,
    pub scheduled_for: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<ConsultationRow> for Consultation {
    type Error = StoreError;

    fn try_from(row: ConsultationRow) -> Result<Self, Self::Error> {
        Ok(Consultation {
            id: row.id,
            priority: decode("priority", &row.priority)?,
            status: decode("status", &row.status)?,
            approval_status: decode("approval_status", &row.approval_status)?,
            content_type: row.content_type,
            content_id: row.content_id,
            purpose: row.purpose,
            advisor_id: row.advisor_id,
            requested_by: row.requested_by,
            recommendations: row.recommendations,
            scheduled_for: row.scheduled_for,
            completed_at: row.completed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
