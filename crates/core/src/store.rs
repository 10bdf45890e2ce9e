//! Storage seams used by the approval gate and the workflow endpoints.
//!
//! The gate only ever talks to these traits. `yarning-db` implements them
//! over PostgreSQL and [`crate::memory`] implements them in process.

use async_trait::async_trait;

use crate::advisor::{Advisor, CreateAdvisor};
use crate::consultation::{Consultation, ConsultationStatus, NewConsultation, StatusUpdate};
use crate::error::CoreError;
use crate::types::DbId;
use crate::workflow::{ApprovalWorkflowStage, NewWorkflowStage, StageStatus, StageUpdate};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached or the query failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Insert refused because the content item already has an active
    /// consultation.
    #[error("consultation {consultation_id} is already active ({status})")]
    ActiveConsultationExists {
        consultation_id: DbId,
        status: ConsultationStatus,
        advisor_id: Option<DbId>,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// The row exists but changed since it was read, or a duplicate was refused.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored value could not be decoded into a domain type.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => CoreError::Lookup(msg),
            StoreError::ActiveConsultationExists {
                consultation_id,
                status,
                advisor_id,
            } => CoreError::ConsultationConflict {
                consultation_id,
                status,
                advisor_id,
            },
            StoreError::NotFound { entity, id } => CoreError::NotFound { entity, id },
            StoreError::Conflict(msg) => CoreError::Conflict(msg),
            StoreError::Corrupt(msg) => CoreError::Internal(msg),
        }
    }
}

/// Consultation records, keyed by `(content_type, content_id)`.
#[async_trait]
pub trait ConsultationStore: Send + Sync {
    /// The single non-completed consultation for the item, if any.
    async fn find_active(
        &self,
        content_type: &str,
        content_id: &str,
    ) -> Result<Option<Consultation>, StoreError>;

    /// The most recently completed consultation that approved the item.
    async fn find_approved(
        &self,
        content_type: &str,
        content_id: &str,
    ) -> Result<Option<Consultation>, StoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<Consultation>, StoreError>;

    /// Every consultation for the item, newest first.
    async fn list_for_content(
        &self,
        content_type: &str,
        content_id: &str,
    ) -> Result<Vec<Consultation>, StoreError>;

    /// Insert a consultation in `REQUESTED` state.
    ///
    /// Check and insert are atomic: when an active consultation already
    /// exists this returns [`StoreError::ActiveConsultationExists`].
    async fn create(&self, input: &NewConsultation) -> Result<Consultation, StoreError>;

    /// Apply `update` only if the row is still in status `from`.
    async fn update_status(
        &self,
        id: DbId,
        from: ConsultationStatus,
        update: &StatusUpdate,
    ) -> Result<Consultation, StoreError>;

    /// Cheap reachability check for health endpoints.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait AdvisorDirectory: Send + Sync {
    /// Active advisors in registration order.
    async fn list_active(&self) -> Result<Vec<Advisor>, StoreError>;

    async fn list_all(&self) -> Result<Vec<Advisor>, StoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<Advisor>, StoreError>;

    async fn create(&self, input: &CreateAdvisor) -> Result<Advisor, StoreError>;
}

#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Stages for the item ordered by position.
    async fn list_stages(
        &self,
        content_type: &str,
        content_id: &str,
    ) -> Result<Vec<ApprovalWorkflowStage>, StoreError>;

    async fn find_stage(&self, id: DbId) -> Result<Option<ApprovalWorkflowStage>, StoreError>;

    /// Create every stage for an item at once. Fails with
    /// [`StoreError::Conflict`] when the item already has a workflow.
    async fn create_stages(
        &self,
        content_type: &str,
        content_id: &str,
        stages: &[NewWorkflowStage],
    ) -> Result<Vec<ApprovalWorkflowStage>, StoreError>;

    /// Apply `update` only if the stage is still in status `from`.
    async fn update_stage(
        &self,
        id: DbId,
        from: StageStatus,
        update: &StageUpdate,
    ) -> Result<ApprovalWorkflowStage, StoreError>;
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn unavailable_becomes_retryable_lookup() {
        let err: CoreError = StoreError::Unavailable("connection refused".into()).into();
        assert!(err.is_retryable());
        assert_matches!(err, CoreError::Lookup(_));
    }

    #[test]
    fn active_exists_becomes_conflict() {
        let err: CoreError = StoreError::ActiveConsultationExists {
            consultation_id: 7,
            status: ConsultationStatus::InProgress,
            advisor_id: Some(2),
        }
        .into();
        assert_matches!(
            err,
            CoreError::ConsultationConflict {
                consultation_id: 7,
                status: ConsultationStatus::InProgress,
                advisor_id: Some(2),
            }
        );
    }
}
