//! Enrollment rows. Enrollments are managed elsewhere; this crate only reads
//! them, apart from the insert used to seed fixtures.

use rollcall_core::store::RosterEntry;
use rollcall_core::types::{DbId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Enrollment {
    pub id: DbId,
    pub student_id: DbId,
    pub course_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One enrolled student joined with their display name.
#[derive(Debug, Clone, FromRow)]
pub struct RosterRow {
    pub student_id: DbId,
    pub student_name: String,
}

impl From<RosterRow> for RosterEntry {
    fn from(row: RosterRow) -> Self {
        RosterEntry {
            student_id: row.student_id,
            student_name: row.student_name,
        }
    }
}
