use crate::consultation::ConsultationStatus;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// An active consultation already exists for the content item.
    #[error(
        "Consultation {consultation_id} is already {status} for this content; wait for it to complete"
    )]
    ConsultationConflict {
        consultation_id: DbId,
        status: ConsultationStatus,
        advisor_id: Option<DbId>,
    },

    /// A concurrent change or a duplicate record.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The consultation or advisor store could not be reached. Retryable.
    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Lookup(_))
    }
}
