use edustream_core::model::{CourseId, CourseProgress, ProgressId, UserId};

use super::SqliteRepository;
use super::mapping::{
    id_to_i64, map_progress_row, progress_id_from_i64, read_err, user_id_to_text, write_err,
};
use crate::repository::{NewProgressRecord, ProgressRepository, ProgressUpdate, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn insert_new_progress(
        &self,
        progress: NewProgressRecord,
    ) -> Result<ProgressId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO course_progress (user_id, course_id, video_position, completed)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(user_id_to_text(progress.user_id))
        .bind(id_to_i64("course_id", progress.course_id.value())?)
        .bind(progress.video_position)
        .bind(i64::from(progress.completed))
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        progress_id_from_i64(res.last_insert_rowid())
    }

    async fn list_progress(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Vec<CourseProgress>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, course_id, video_position, completed
            FROM course_progress
            WHERE user_id = ?1 AND course_id = ?2
            ORDER BY id ASC
            ",
        )
        .bind(user_id_to_text(user_id))
        .bind(id_to_i64("course_id", course_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(read_err)?;

        rows.iter().map(map_progress_row).collect()
    }

    async fn update_progress(
        &self,
        id: ProgressId,
        update: ProgressUpdate,
    ) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE course_progress
            SET video_position = ?1, completed = ?2
            WHERE id = ?3
            ",
        )
        .bind(update.video_position)
        .bind(i64::from(update.completed))
        .bind(id_to_i64("progress_id", id.value())?)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
