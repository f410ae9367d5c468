//! Repository for the `enrollments` table.

use rollcall_core::types::DbId;
use sqlx::PgPool;

use crate::models::enrollment::{Enrollment, RosterRow};

const COLUMNS: &str = "id, student_id, course_id, created_at, updated_at";

pub struct EnrollmentRepo;

impl EnrollmentRepo {
    pub async fn create(
        pool: &PgPool,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<Enrollment, sqlx::Error> {
        let query = format!(
            "INSERT INTO enrollments (student_id, course_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(student_id)
            .bind(course_id)
            .fetch_one(pool)
            .await
    }

    pub async fn is_enrolled(
        pool: &PgPool,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE student_id = $1 AND course_id = $2)",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(pool)
        .await?;
        Ok(exists.0)
    }

    /// Every enrolled student with their display name, ordered by name then id.
    pub async fn list_roster(pool: &PgPool, course_id: DbId) -> Result<Vec<RosterRow>, sqlx::Error> {
        sqlx::query_as::<_, RosterRow>(
            "SELECT u.id AS student_id, u.name AS student_name
             FROM enrollments e
             JOIN users u ON u.id = e.student_id
             WHERE e.course_id = $1
             ORDER BY u.name ASC, u.id ASC",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }
}
