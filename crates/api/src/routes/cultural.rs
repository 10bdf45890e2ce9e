//! Route definitions for the `/cultural` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{publish, validation};
use crate::state::AppState;

/// Routes mounted at `/cultural`.
///
/// ```text
/// GET    /rules          -> list_rules
/// POST   /validate       -> validate
/// POST   /sensitivity    -> sensitivity
/// POST   /publish-check  -> publish_check
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rules", get(validation::list_rules))
        .route("/validate", post(validation::validate))
        .route("/sensitivity", post(validation::sensitivity))
        .route("/publish-check", post(publish::publish_check))
}
