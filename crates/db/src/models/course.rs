//! Course rows (read-only reference data).

use rollcall_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub course_code: String,
    pub name: String,
    pub teacher_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a course.
#[derive(Debug, Clone)]
pub struct CreateCourse {
    pub course_code: String,
    pub name: String,
    pub teacher_id: Option<DbId>,
}
