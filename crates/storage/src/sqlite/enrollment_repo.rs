use edustream_core::model::{Enrollment, EnrollmentId};
use edustream_core::playback::Percent;

use super::SqliteRepository;
use super::mapping::{
    enrollment_id_from_i64, id_to_i64, map_enrollment_row, read_err, user_id_to_text, write_err,
};
use crate::repository::{EnrollmentFilter, EnrollmentRepository, NewEnrollmentRecord, StorageError};

#[async_trait::async_trait]
impl EnrollmentRepository for SqliteRepository {
    async fn insert_new_enrollment(
        &self,
        enrollment: NewEnrollmentRecord,
    ) -> Result<EnrollmentId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO enrollments (user_id, course_id, progress_percentage, payment_status, enrolled_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(user_id_to_text(enrollment.user_id))
        .bind(id_to_i64("course_id", enrollment.course_id.value())?)
        .bind(enrollment.progress.value())
        .bind(enrollment.payment_status.as_str())
        .bind(enrollment.enrolled_at)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        enrollment_id_from_i64(res.last_insert_rowid())
    }

    async fn list_enrollments(
        &self,
        filter: EnrollmentFilter,
    ) -> Result<Vec<Enrollment>, StorageError> {
        let course_id = filter
            .course_id
            .map(|c| id_to_i64("course_id", c.value()))
            .transpose()?;

        // NULL parameters disable the matching predicate.
        let rows = sqlx::query(
            r"
            SELECT id, user_id, course_id, progress_percentage, payment_status, enrolled_at
            FROM enrollments
            WHERE (?1 IS NULL OR user_id = ?1)
              AND (?2 IS NULL OR course_id = ?2)
            ORDER BY enrolled_at DESC, id DESC
            ",
        )
        .bind(filter.user_id.map(user_id_to_text))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(read_err)?;

        rows.iter().map(map_enrollment_row).collect()
    }

    async fn update_enrollment_progress(
        &self,
        id: EnrollmentId,
        progress: Percent,
    ) -> Result<(), StorageError> {
        let res = sqlx::query("UPDATE enrollments SET progress_percentage = ?1 WHERE id = ?2")
            .bind(progress.value())
            .bind(id_to_i64("enrollment_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(write_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
