pub mod advisor;
pub mod consultation;
pub mod cultural;
pub mod health;
pub mod workflow;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /cultural/rules                                   list rules (GET)
/// /cultural/validate                                validate content (POST)
/// /cultural/sensitivity                             recommend a tier (POST)
/// /cultural/publish-check                           run the publish gate (POST)
///
/// /consultations                                    history (GET), request (POST)
/// /consultations/{id}                               get
/// /consultations/{id}/schedule                      schedule (POST)
/// /consultations/{id}/start                         start (POST)
/// /consultations/{id}/complete                      complete (POST)
///
/// /advisors                                         list, register
///
/// /workflows                                        open a workflow (POST)
/// /workflows/{content_type}/{content_id}            stages and status (GET)
/// /workflows/stages/{stage_id}/review               start review (POST)
/// /workflows/stages/{stage_id}/decision             record decision (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/cultural", cultural::router())
        .nest("/consultations", consultation::router())
        .nest("/advisors", advisor::router())
        .nest("/workflows", workflow::router())
}
