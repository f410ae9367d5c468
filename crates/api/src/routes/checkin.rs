//! Route definitions for the `/checkin` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::checkin;
use crate::state::AppState;

/// Routes mounted at `/checkin`.
///
/// ```text
/// POST /                              -> checkin (student)
/// GET  /sessions/code/{code}          -> get_session_info (public)
/// POST /sessions                      -> create_session (teacher/admin)
/// GET  /sessions                      -> list_sessions (teacher/admin)
/// GET  /sessions/{id}/records         -> list_records (owner/admin)
/// POST /sessions/{id}/records         -> manual_checkin (owner/admin)
/// POST /sessions/{id}/end             -> end_session (owner/admin)
/// POST /sessions/{id}/manual-end      -> manual_end_session (owner/admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(checkin::checkin))
        .route("/sessions/code/{code}", get(checkin::get_session_info))
        .route(
            "/sessions",
            post(checkin::create_session).get(checkin::list_sessions),
        )
        .route(
            "/sessions/{id}/records",
            get(checkin::list_records).post(checkin::manual_checkin),
        )
        .route("/sessions/{id}/end", post(checkin::end_session))
        .route("/sessions/{id}/manual-end", post(checkin::manual_end_session))
}
