//! Route definitions for the `/workflows` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::workflow;
use crate::state::AppState;

/// Routes mounted at `/workflows`.
///
/// ```text
/// POST   /                                -> open
/// GET    /{content_type}/{content_id}     -> get_for_content
/// POST   /stages/{stage_id}/review        -> start_review
/// POST   /stages/{stage_id}/decision      -> decide
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(workflow::open))
        .route("/{content_type}/{content_id}", get(workflow::get_for_content))
        .route("/stages/{stage_id}/review", post(workflow::start_review))
        .route("/stages/{stage_id}/decision", post(workflow::decide))
}
