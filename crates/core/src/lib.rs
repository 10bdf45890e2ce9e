//! Domain logic for cultural-protocol validation and Elder consultation.
//!
//! Pure rule evaluation lives in [`protocols`]; the stateful pieces
//! (consultations, approval stages, the publish gate) talk to storage only
//! through the traits in [`store`].

pub mod advisor;
pub mod consultation;
pub mod error;
pub mod gate;
pub mod memory;
pub mod protocols;
pub mod store;
pub mod types;
pub mod workflow;
