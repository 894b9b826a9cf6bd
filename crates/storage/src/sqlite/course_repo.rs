use edustream_core::model::{Course, CourseId};

use super::SqliteRepository;
use super::mapping::{course_id_from_i64, id_to_i64, map_course_row, media_to_text, read_err, write_err};
use crate::repository::{CourseRepository, NewCourseRecord, StorageError};

const COURSE_COLUMNS: &str = "id, title, description, instructor_name, price_cents, thumbnail_ref, \
     video_ref, duration_minutes, level, category, created_at";

#[async_trait::async_trait]
impl CourseRepository for SqliteRepository {
    async fn insert_new_course(&self, course: NewCourseRecord) -> Result<CourseId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO courses (title, description, instructor_name, price_cents, thumbnail_ref,
                                 video_ref, duration_minutes, level, category, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ",
        )
        .bind(course.title)
        .bind(course.description)
        .bind(course.instructor_name)
        .bind(id_to_i64("price_cents", course.price.cents())?)
        .bind(media_to_text(course.thumbnail.as_ref()))
        .bind(media_to_text(course.video.as_ref()))
        .bind(i64::from(course.duration_minutes))
        .bind(course.level.as_str())
        .bind(course.category)
        .bind(course.created_at)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        course_id_from_i64(res.last_insert_rowid())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let row = sqlx::query(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?1"))
            .bind(id_to_i64("course_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_err)?;

        row.as_ref().map(map_course_row).transpose()
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(read_err)?;

        rows.iter().map(map_course_row).collect()
    }

    async fn delete_course(&self, id: CourseId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM courses WHERE id = ?1")
            .bind(id_to_i64("course_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(write_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
