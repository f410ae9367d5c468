pub mod auth;
pub mod checkin;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
///
/// /checkin                                         student self check-in
/// /checkin/sessions/code/{code}                    session display info (public)
/// /checkin/sessions                                open, list (teacher/admin)
/// /checkin/sessions/{id}/records                   attendance report, manual correction
/// /checkin/sessions/{id}/end                       end now
/// /checkin/sessions/{id}/manual-end                end now, record elapsed minutes
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/checkin", checkin::router())
}
