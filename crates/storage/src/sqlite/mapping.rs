use edustream_core::model::{
    Course, CourseId, CourseLevel, CourseProgress, Enrollment, EnrollmentId, MediaRef, NewCourse,
    PaymentStatus, Price, ProgressId, UserId,
};
use edustream_core::playback::Percent;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Maps driver errors from writes, surfacing constraint violations distinctly.
pub(crate) fn write_err(e: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StorageError::Conflict;
        }
        if db.is_foreign_key_violation() {
            return StorageError::NotFound;
        }
    }
    StorageError::Connection(e.to_string())
}

pub(crate) fn read_err(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn course_id_from_i64(v: i64) -> Result<CourseId, StorageError> {
    Ok(CourseId::new(i64_to_u64("course_id", v)?))
}

pub(crate) fn enrollment_id_from_i64(v: i64) -> Result<EnrollmentId, StorageError> {
    Ok(EnrollmentId::new(i64_to_u64("enrollment_id", v)?))
}

pub(crate) fn progress_id_from_i64(v: i64) -> Result<ProgressId, StorageError> {
    Ok(ProgressId::new(i64_to_u64("progress_id", v)?))
}

/// User ids are stored as hyphenated UUID text so rows stay readable in the sqlite shell.
pub(crate) fn user_id_to_text(id: UserId) -> String {
    id.as_uuid().hyphenated().to_string()
}

fn user_id_from_text(raw: &str) -> Result<UserId, StorageError> {
    raw.parse::<UserId>().map_err(ser)
}

fn media_from_text(raw: Option<String>) -> Result<Option<MediaRef>, StorageError> {
    raw.map(|s| MediaRef::parse(s).map_err(ser)).transpose()
}

pub(crate) fn media_to_text(media: Option<&MediaRef>) -> Option<String> {
    media.map(ToString::to_string)
}

pub(crate) fn map_course_row(row: &SqliteRow) -> Result<Course, StorageError> {
    let level: String = row.try_get("level").map_err(ser)?;
    let price_cents: i64 = row.try_get("price_cents").map_err(ser)?;
    let duration: i64 = row.try_get("duration_minutes").map_err(ser)?;

    let draft = NewCourse {
        title: row.try_get("title").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        instructor_name: row.try_get("instructor_name").map_err(ser)?,
        price: Price::from_cents(i64_to_u64("price_cents", price_cents)?),
        thumbnail: media_from_text(row.try_get("thumbnail_ref").map_err(ser)?)?,
        video: media_from_text(row.try_get("video_ref").map_err(ser)?)?,
        duration_minutes: u32::try_from(duration)
            .map_err(|_| StorageError::Serialization(format!("invalid duration: {duration}")))?,
        level: level.parse::<CourseLevel>().map_err(ser)?,
        category: row.try_get("category").map_err(ser)?,
    };

    Course::new(
        course_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        draft,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_enrollment_row(row: &SqliteRow) -> Result<Enrollment, StorageError> {
    let user_id: String = row.try_get("user_id").map_err(ser)?;
    let status: String = row.try_get("payment_status").map_err(ser)?;
    let progress: f64 = row.try_get("progress_percentage").map_err(ser)?;

    Ok(Enrollment::from_persisted(
        enrollment_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        user_id_from_text(&user_id)?,
        course_id_from_i64(row.try_get::<i64, _>("course_id").map_err(ser)?)?,
        Percent::new(progress).map_err(ser)?,
        status.parse::<PaymentStatus>().map_err(ser)?,
        row.try_get("enrolled_at").map_err(ser)?,
    ))
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<CourseProgress, StorageError> {
    let user_id: String = row.try_get("user_id").map_err(ser)?;

    CourseProgress::from_persisted(
        progress_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        user_id_from_text(&user_id)?,
        course_id_from_i64(row.try_get::<i64, _>("course_id").map_err(ser)?)?,
        row.try_get("video_position").map_err(ser)?,
        row.try_get::<i64, _>("completed").map_err(ser)? != 0,
    )
    .map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_text_round_trips() {
        let id = UserId::random();
        assert_eq!(user_id_from_text(&user_id_to_text(id)).unwrap(), id);
    }

    #[test]
    fn negative_ids_are_rejected() {
        assert!(course_id_from_i64(-1).is_err());
        assert!(id_to_i64("course_id", u64::MAX).is_err());
    }

    #[test]
    fn media_text_round_trips() {
        let media = MediaRef::parse("https://cdn.example.com/a.mp4").unwrap();
        let text = media_to_text(Some(&media));
        assert_eq!(media_from_text(text).unwrap(), Some(media));
        assert_eq!(media_from_text(None).unwrap(), None);
    }
}
