//! PostgreSQL implementations of the `yarning-core` store traits.

use async_trait::async_trait;
use sqlx::PgPool;
use yarning_core::advisor::{Advisor, CreateAdvisor};
use yarning_core::consultation::{Consultation, ConsultationStatus, NewConsultation, StatusUpdate};
use yarning_core::store::{AdvisorDirectory, ConsultationStore, StoreError, WorkflowStore};
use yarning_core::types::DbId;
use yarning_core::workflow::{ApprovalWorkflowStage, NewWorkflowStage, StageStatus, StageUpdate};

use crate::repositories::{AdvisorRepo, ConsultationRepo, WorkflowStageRepo};

/// Map a driver error to a store error. Unique violations on `uq_`
/// constraints are conflicts; everything else means the store is unusable.
fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505")
            && db_err.constraint().is_some_and(|c| c.starts_with("uq_"))
        {
            return StoreError::Conflict(db_err.message().to_string());
        }
    }
    tracing::error!(error = %err, "Database query failed");
    StoreError::Unavailable(err.to_string())
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

// ---------------------------------------------------------------------------
// Consultations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PgConsultationStore {
    pool: PgPool,
}

impl PgConsultationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConsultationStore for PgConsultationStore {
    async fn find_active(
        &self,
        content_type: &str,
        content_id: &str,
    ) -> Result<Option<Consultation>, StoreError> {
        ConsultationRepo::find_active(&self.pool, content_type, content_id)
            .await
            .map_err(store_error)?
            .map(Consultation::try_from)
            .transpose()
    }

    async fn find_approved(
        &self,
        content_type: &str,
        content_id: &str,
    ) -> Result<Option<Consultation>, StoreError> {
        ConsultationRepo::find_approved(&self.pool, content_type, content_id)
            .await
            .map_err(store_error)?
            .map(Consultation::try_from)
            .transpose()
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Consultation>, StoreError> {
        ConsultationRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_error)?
            .map(Consultation::try_from)
            .transpose()
    }

    async fn list_for_content(
        &self,
        content_type: &str,
        content_id: &str,
    ) -> Result<Vec<Consultation>, StoreError> {
        let rows = ConsultationRepo::list_for_content(&self.pool, content_type, content_id)
            .await
            .map_err(store_error)?;
        convert_all(rows)
    }

    async fn create(&self, input: &NewConsultation) -> Result<Consultation, StoreError> {
        if let Some(row) = ConsultationRepo::create_if_no_active(&self.pool, input)
            .await
            .map_err(store_error)?
        {
            return Consultation::try_from(row);
        }

        // The insert was skipped; report the consultation that won.
        match self.find_active(&input.content_type, &input.content_id).await? {
            Some(active) => Err(StoreError::ActiveConsultationExists {
                consultation_id: active.id,
                status: active.status,
                advisor_id: active.advisor_id,
            }),
            None => Err(StoreError::Conflict(format!(
                "consultation for {}/{} changed concurrently; retry",
                input.content_type, input.content_id
            ))),
        }
    }

    async fn update_status(
        &self,
        id: DbId,
        from: ConsultationStatus,
        update: &StatusUpdate,
    ) -> Result<Consultation, StoreError> {
        if let Some(row) = ConsultationRepo::update_status(&self.pool, id, from, update)
            .await
            .map_err(store_error)?
        {
            return Consultation::try_from(row);
        }

        match self.find_by_id(id).await? {
            Some(current) => Err(StoreError::Conflict(format!(
                "consultation {id} is now {}, expected {from}",
                current.status
            ))),
            None => Err(StoreError::NotFound {
                entity: "Consultation",
                id,
            }),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await.map_err(store_error)
    }
}

// ---------------------------------------------------------------------------
// Advisors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PgAdvisorDirectory {
    pool: PgPool,
}

impl PgAdvisorDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdvisorDirectory for PgAdvisorDirectory {
    async fn list_active(&self) -> Result<Vec<Advisor>, StoreError> {
        let rows = AdvisorRepo::list_active(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(Advisor::from).collect())
    }

    async fn list_all(&self) -> Result<Vec<Advisor>, StoreError> {
        let rows = AdvisorRepo::list_all(&self.pool).await.map_err(store_error)?;
        Ok(rows.into_iter().map(Advisor::from).collect())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Advisor>, StoreError> {
        let row = AdvisorRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_error)?;
        Ok(row.map(Advisor::from))
    }

    async fn create(&self, input: &CreateAdvisor) -> Result<Advisor, StoreError> {
        let row = AdvisorRepo::create(&self.pool, input)
            .await
            .map_err(store_error)?;
        Ok(row.into())
    }
}

// ---------------------------------------------------------------------------
// Workflow stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PgWorkflowStore {
    pool: PgPool,
}

impl PgWorkflowStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkflowStore for PgWorkflowStore {
    async fn list_stages(
        &self,
        content_type: &str,
        content_id: &str,
    ) -> Result<Vec<ApprovalWorkflowStage>, StoreError> {
        let rows = WorkflowStageRepo::list_for_content(&self.pool, content_type, content_id)
            .await
            .map_err(store_error)?;
        convert_all(rows)
    }

    async fn find_stage(&self, id: DbId) -> Result<Option<ApprovalWorkflowStage>, StoreError> {
        WorkflowStageRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_error)?
            .map(ApprovalWorkflowStage::try_from)
            .transpose()
    }

    async fn create_stages(
        &self,
        content_type: &str,
        content_id: &str,
        stages: &[NewWorkflowStage],
    ) -> Result<Vec<ApprovalWorkflowStage>, StoreError> {
        let rows = WorkflowStageRepo::create_all(&self.pool, content_type, content_id, stages)
            .await
            .map_err(|e| match store_error(e) {
                StoreError::Conflict(_) => StoreError::Conflict(format!(
                    "an approval workflow already exists for {content_type}/{content_id}"
                )),
                other => other,
            })?;
        convert_all(rows)
    }

    async fn update_stage(
        &self,
        id: DbId,
        from: StageStatus,
        update: &StageUpdate,
    ) -> Result<ApprovalWorkflowStage, StoreError> {
        if let Some(row) = WorkflowStageRepo::update(&self.pool, id, from, update)
            .await
            .map_err(store_error)?
        {
            return ApprovalWorkflowStage::try_from(row);
        }

        match self.find_stage(id).await? {
            Some(current) => Err(StoreError::Conflict(format!(
                "stage {id} is now {}, expected {from}",
                current.status
            ))),
            None => Err(StoreError::NotFound {
                entity: "ApprovalWorkflowStage",
                id,
            }),
        }
    }
}
