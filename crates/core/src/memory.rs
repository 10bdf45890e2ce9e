//! In-process store implementations.
//!
//! Used by the API tests and by embedders that run without a database. Each store
//! keeps its rows behind a single `RwLock`, so check-then-insert sequences
//! run under one write guard.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::advisor::{Advisor, CreateAdvisor};
use crate::consultation::{
    ApprovalStatus, Consultation, ConsultationStatus, NewConsultation, StatusUpdate,
};
use crate::store::{AdvisorDirectory, ConsultationStore, StoreError, WorkflowStore};
use crate::types::DbId;
use crate::workflow::{ApprovalWorkflowStage, NewWorkflowStage, StageStatus, StageUpdate};

#[derive(Debug)]
struct Table<T> {
    rows: Vec<T>,
    next_id: DbId,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> DbId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Simulated outage switch shared by the memory stores.
#[derive(Debug, Default)]
struct Availability(AtomicBool);

impl Availability {
    fn check(&self) -> Result<(), StoreError> {
        if self.0.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("in-memory store marked unavailable".into()))
        } else {
            Ok(())
        }
    }

    fn set(&self, unavailable: bool) {
        self.0.store(unavailable, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Consultations
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryConsultationStore {
    table: RwLock<Table<Consultation>>,
    down: Availability,
}

impl MemoryConsultationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with [`StoreError::Unavailable`] until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.down.set(unavailable);
    }
}

fn same_item(c: &Consultation, content_type: &str, content_id: &str) -> bool {
    c.content_type == content_type && c.content_id == content_id
}

#[async_trait]
impl ConsultationStore for MemoryConsultationStore {
    async fn find_active(
        &self,
        content_type: &str,
        content_id: &str,
    ) -> Result<Option<Consultation>, StoreError> {
        self.down.check()?;
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .find(|c| c.is_active() && same_item(c, content_type, content_id))
            .cloned())
    }

    async fn find_approved(
        &self,
        content_type: &str,
        content_id: &str,
    ) -> Result<Option<Consultation>, StoreError> {
        self.down.check()?;
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .filter(|c| c.is_approved() && same_item(c, content_type, content_id))
            .max_by_key(|c| (c.completed_at, c.id))
            .cloned())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Consultation>, StoreError> {
        self.down.check()?;
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|c| c.id == id).cloned())
    }

    async fn list_for_content(
        &self,
        content_type: &str,
        content_id: &str,
    ) -> Result<Vec<Consultation>, StoreError> {
        self.down.check()?;
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .rev()
            .filter(|c| same_item(c, content_type, content_id))
            .cloned()
            .collect())
    }

    async fn create(&self, input: &NewConsultation) -> Result<Consultation, StoreError> {
        self.down.check()?;
        let mut table = self.table.write().await;
        if let Some(active) = table
            .rows
            .iter()
            .find(|c| c.is_active() && same_item(c, &input.content_type, &input.content_id))
        {
            return Err(StoreError::ActiveConsultationExists {
                consultation_id: active.id,
                status: active.status,
                advisor_id: active.advisor_id,
            });
        }

        let now = Utc::now();
        let consultation = Consultation {
            id: table.allocate_id(),
            content_type: input.content_type.clone(),
            content_id: input.content_id.clone(),
            purpose: input.purpose.clone(),
            priority: input.priority,
            status: ConsultationStatus::Requested,
            approval_status: ApprovalStatus::Pending,
            advisor_id: Some(input.advisor_id),
            requested_by: input.requested_by.clone(),
            recommendations: None,
            scheduled_for: input.scheduled_for,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        table.rows.push(consultation.clone());
        Ok(consultation)
    }

    async fn update_status(
        &self,
        id: DbId,
        from: ConsultationStatus,
        update: &StatusUpdate,
    ) -> Result<Consultation, StoreError> {
        self.down.check()?;
        let mut table = self.table.write().await;
        let row = table
            .rows
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound {
                entity: "Consultation",
                id,
            })?;
        if row.status != from {
            return Err(StoreError::Conflict(format!(
                "consultation {id} is now {}, expected {from}",
                row.status
            )));
        }

        row.status = update.status;
        row.approval_status = update.approval_status;
        row.scheduled_for = update.scheduled_for;
        row.recommendations = update.recommendations.clone();
        row.completed_at = update.completed_at;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.down.check()
    }
}

// ---------------------------------------------------------------------------
// Advisors
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryAdvisorDirectory {
    table: RwLock<Table<Advisor>>,
    down: Availability,
}

impl MemoryAdvisorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the directory with existing records, keeping their ids.
    pub fn with_advisors(advisors: Vec<Advisor>) -> Self {
        let next_id = advisors.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        Self {
            table: RwLock::new(Table {
                rows: advisors,
                next_id,
            }),
            down: Availability::default(),
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.down.set(unavailable);
    }
}

#[async_trait]
impl AdvisorDirectory for MemoryAdvisorDirectory {
    async fn list_active(&self) -> Result<Vec<Advisor>, StoreError> {
        self.down.check()?;
        let table = self.table.read().await;
        Ok(table.rows.iter().filter(|a| a.is_active).cloned().collect())
    }

    async fn list_all(&self) -> Result<Vec<Advisor>, StoreError> {
        self.down.check()?;
        Ok(self.table.read().await.rows.clone())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Advisor>, StoreError> {
        self.down.check()?;
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|a| a.id == id).cloned())
    }

    async fn create(&self, input: &CreateAdvisor) -> Result<Advisor, StoreError> {
        self.down.check()?;
        let mut table = self.table.write().await;
        let advisor = Advisor {
            id: table.allocate_id(),
            name: input.name.clone(),
            community: input.community.clone(),
            specialties: input.specialties.clone(),
            is_active: true,
        };
        table.rows.push(advisor.clone());
        Ok(advisor)
    }
}

// ---------------------------------------------------------------------------
// Workflow stages
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryWorkflowStore {
    table: RwLock<Table<ApprovalWorkflowStage>>,
}

impl MemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowStore for MemoryWorkflowStore {
    async fn list_stages(
        &self,
        content_type: &str,
        content_id: &str,
    ) -> Result<Vec<ApprovalWorkflowStage>, StoreError> {
        let table = self.table.read().await;
        let mut stages: Vec<_> = table
            .rows
            .iter()
            .filter(|s| s.content_type == content_type && s.content_id == content_id)
            .cloned()
            .collect();
        stages.sort_by_key(|s| s.position);
        Ok(stages)
    }

    async fn find_stage(&self, id: DbId) -> Result<Option<ApprovalWorkflowStage>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|s| s.id == id).cloned())
    }

    async fn create_stages(
        &self,
        content_type: &str,
        content_id: &str,
        stages: &[NewWorkflowStage],
    ) -> Result<Vec<ApprovalWorkflowStage>, StoreError> {
        let mut table = self.table.write().await;
        if table
            .rows
            .iter()
            .any(|s| s.content_type == content_type && s.content_id == content_id)
        {
            return Err(StoreError::Conflict(format!(
                "an approval workflow already exists for {content_type}/{content_id}"
            )));
        }

        let now = Utc::now();
        let mut created = Vec::with_capacity(stages.len());
        for stage in stages {
            let row = ApprovalWorkflowStage {
                id: table.allocate_id(),
                content_type: content_type.to_string(),
                content_id: content_id.to_string(),
                stage: stage.stage,
                position: stage.position,
                assignee: stage.assignee.clone(),
                status: StageStatus::Pending,
                comments: None,
                created_at: now,
                updated_at: now,
            };
            table.rows.push(row.clone());
            created.push(row);
        }
        Ok(created)
    }

    async fn update_stage(
        &self,
        id: DbId,
        from: StageStatus,
        update: &StageUpdate,
    ) -> Result<ApprovalWorkflowStage, StoreError> {
        let mut table = self.table.write().await;
        let row = table
            .rows
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound {
                entity: "ApprovalWorkflowStage",
                id,
            })?;
        if row.status != from {
            return Err(StoreError::Conflict(format!(
                "stage {id} is now {}, expected {from}",
                row.status
            )));
        }

        row.status = update.status;
        row.assignee = update.assignee.clone();
        row.comments = update.comments.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}
