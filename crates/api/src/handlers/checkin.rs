//! Handlers for check-in sessions and attendance records.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rollcall_core::checkin::{EndReason, DEFAULT_DURATION_MINS};
use rollcall_core::service::{AttendanceReportEntry, SessionDisplayInfo};
use rollcall_core::store::{AttendanceRecord, Session, SessionOverview};
use rollcall_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireStudent, RequireTeacher};
use crate::qr;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /checkin/sessions`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionRequest {
    pub course_id: DbId,
    /// Session length in minutes; defaults to 10.
    #[validate(range(min = 1, max = 60, message = "duration_mins must be between 1 and 60"))]
    pub duration_mins: Option<i32>,
}

/// A freshly opened session together with its check-in link, both as a URL
/// and as a base64 PNG QR code.
#[derive(Debug, Serialize)]
pub struct CreatedSessionResponse {
    pub id: DbId,
    pub session_code: String,
    pub course_id: DbId,
    pub start_time: Timestamp,
    pub duration_mins: i32,
    pub deadline: Timestamp,
    pub checkin_url: String,
    pub qr_code: String,
}

/// Request body for `POST /checkin`.
#[derive(Debug, Deserialize, Validate)]
pub struct CheckinRequest {
    #[validate(length(min = 1, message = "session_code is required"))]
    pub session_code: String,
}

/// Request body for `POST /checkin/sessions/{id}/records`.
#[derive(Debug, Deserialize, Validate)]
pub struct ManualCheckinRequest {
    pub student_id: DbId,
    /// One of `present`, `late`, `absent`.
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
}

// ---------------------------------------------------------------------------
// Public
// ---------------------------------------------------------------------------

/// GET /api/v1/checkin/sessions/code/{code}
///
/// Display info for the student check-in page. Unknown, ended and expired
/// codes all return the same 404.
pub async fn get_session_info(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<DataResponse<SessionDisplayInfo>>> {
    let info = state.checkin.session_display_info(&code).await?;
    Ok(Json(DataResponse { data: info }))
}

// ---------------------------------------------------------------------------
// Student
// ---------------------------------------------------------------------------

/// POST /api/v1/checkin
///
/// Record the calling student's own attendance.
pub async fn checkin(
    State(state): State<AppState>,
    RequireStudent(user): RequireStudent,
    Json(input): Json<CheckinRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AttendanceRecord>>)> {
    input.validate()?;
    let record = state
        .checkin
        .record_checkin(input.session_code.trim(), user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

// ---------------------------------------------------------------------------
// Teacher / admin
// ---------------------------------------------------------------------------

/// POST /api/v1/checkin/sessions
pub async fn create_session(
    State(state): State<AppState>,
    RequireTeacher(user): RequireTeacher,
    Json(input): Json<CreateSessionRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedSessionResponse>>)> {
    input.validate()?;
    let session = state
        .checkin
        .create_session(
            user.user_id,
            input.course_id,
            input.duration_mins.unwrap_or(DEFAULT_DURATION_MINS),
        )
        .await?;

    let checkin_url = state.config.checkin_url(&session.session_code);
    let qr_code = qr::render_png_base64(&checkin_url)
        .map_err(|e| AppError::InternalError(format!("QR code generation failed: {e}")))?;
    let data = CreatedSessionResponse {
        id: session.id,
        deadline: session.deadline(),
        session_code: session.session_code,
        course_id: session.course_id,
        start_time: session.start_time,
        duration_mins: session.duration_mins,
        checkin_url,
        qr_code,
    };
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/checkin/sessions
///
/// Admins see every session; teachers see their own.
pub async fn list_sessions(
    State(state): State<AppState>,
    RequireTeacher(user): RequireTeacher,
) -> AppResult<Json<DataResponse<Vec<SessionOverview>>>> {
    let sessions = state.checkin.list_sessions(&user.actor()).await?;
    Ok(Json(DataResponse { data: sessions }))
}

/// GET /api/v1/checkin/sessions/{id}/records
///
/// Full roster for the session: one row per enrolled student, absentees
/// included.
pub async fn list_records(
    State(state): State<AppState>,
    RequireTeacher(user): RequireTeacher,
    Path(session_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AttendanceReportEntry>>>> {
    state
        .checkin
        .get_owned_session(session_id, user.actor().owner_filter())
        .await?;
    let report = state.checkin.build_attendance_report(session_id).await?;
    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/checkin/sessions/{id}/records
///
/// Create or overwrite a student's record for the session.
pub async fn manual_checkin(
    State(state): State<AppState>,
    RequireTeacher(user): RequireTeacher,
    Path(session_id): Path<DbId>,
    Json(input): Json<ManualCheckinRequest>,
) -> AppResult<Json<DataResponse<AttendanceRecord>>> {
    input.validate()?;
    state
        .checkin
        .get_owned_session(session_id, user.actor().owner_filter())
        .await?;
    let record = state
        .checkin
        .manual_checkin(session_id, input.student_id, &input.status)
        .await?;
    Ok(Json(DataResponse { data: record }))
}

/// POST /api/v1/checkin/sessions/{id}/end
pub async fn end_session(
    State(state): State<AppState>,
    RequireTeacher(user): RequireTeacher,
    Path(session_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Session>>> {
    let session = state
        .checkin
        .end_session(session_id, EndReason::ExplicitEnd, user.actor().owner_filter())
        .await?;
    Ok(Json(DataResponse { data: session }))
}

/// POST /api/v1/checkin/sessions/{id}/manual-end
///
/// End early and record the minutes actually elapsed as the duration.
pub async fn manual_end_session(
    State(state): State<AppState>,
    RequireTeacher(user): RequireTeacher,
    Path(session_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Session>>> {
    let session = state
        .checkin
        .end_session(session_id, EndReason::ManualOverride, user.actor().owner_filter())
        .await?;
    Ok(Json(DataResponse { data: session }))
}
