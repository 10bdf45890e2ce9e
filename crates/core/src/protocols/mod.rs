//! Cultural sensitivity validation.
//!
//! Rules, a pure engine, and tiering, without database or network access.
//! The approval gate in [`crate::gate`] builds on top of this.

pub mod analysis;
pub mod config;
pub mod content;
pub mod context;
pub mod engine;
pub mod result;
pub mod rules;
pub mod sensitivity;

pub use config::ProtocolConfig;
pub use content::{ContentItem, MediaDescriptor};
pub use context::ValidationContext;
pub use engine::{Assessment, ConsultationNeed, ValidationEngine};
pub use result::AggregateValidationResult;
pub use sensitivity::SensitivityTier;
