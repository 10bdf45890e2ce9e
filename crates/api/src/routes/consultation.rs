//! Route definitions for the `/consultations` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::consultation;
use crate::state::AppState;

/// Routes mounted at `/consultations`.
///
/// ```text
/// GET    /                -> list_for_content (?content_type, ?content_id)
/// POST   /                -> create
/// GET    /{id}            -> get_by_id
/// POST   /{id}/schedule   -> schedule
/// POST   /{id}/start      -> start
/// POST   /{id}/complete   -> complete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(consultation::list_for_content).post(consultation::create),
        )
        .route("/{id}", get(consultation::get_by_id))
        .route("/{id}/schedule", post(consultation::schedule))
        .route("/{id}/start", post(consultation::start))
        .route("/{id}/complete", post(consultation::complete))
}
