use std::sync::Arc;

use yarning_core::gate::ApprovalGate;
use yarning_core::protocols::ValidationEngine;
use yarning_core::store::{AdvisorDirectory, ConsultationStore, WorkflowStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Rule engine compiled from the protocol configuration.
    pub engine: Arc<ValidationEngine>,
    /// Publish gate sharing the engine and stores below.
    pub gate: Arc<ApprovalGate>,
    pub consultations: Arc<dyn ConsultationStore>,
    pub advisors: Arc<dyn AdvisorDirectory>,
    pub workflows: Arc<dyn WorkflowStore>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        engine: ValidationEngine,
        consultations: Arc<dyn ConsultationStore>,
        advisors: Arc<dyn AdvisorDirectory>,
        workflows: Arc<dyn WorkflowStore>,
    ) -> Self {
        let engine = Arc::new(engine);
        let gate = Arc::new(ApprovalGate::new(
            Arc::clone(&engine),
            Arc::clone(&consultations),
            Arc::clone(&advisors),
        ));
        Self {
            engine,
            gate,
            consultations,
            advisors,
            workflows,
            config: Arc::new(config),
        }
    }
}
