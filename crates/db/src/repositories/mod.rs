//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod advisor_repo;
pub mod consultation_repo;
pub mod workflow_stage_repo;

pub use advisor_repo::AdvisorRepo;
pub use consultation_repo::ConsultationRepo;
pub use workflow_stage_repo::WorkflowStageRepo;
