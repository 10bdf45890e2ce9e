pub mod advisor;
pub mod consultation;
pub mod publish;
pub mod validation;
pub mod workflow;

use serde::Deserialize;
use yarning_core::protocols::{ContentItem, ValidationContext};

/// Request body shared by every endpoint that evaluates content.
#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub content: ContentItem,
    #[serde(default)]
    pub context: ValidationContext,
}
