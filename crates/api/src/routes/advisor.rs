//! Route definitions for the `/advisors` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::advisor;
use crate::state::AppState;

/// Routes mounted at `/advisors`.
///
/// ```text
/// GET    /   -> list (?active_only)
/// POST   /   -> create
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(advisor::list).post(advisor::create))
}
