use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::SqliteInitError;

/// Applies every pending schema version in order, each inside its own transaction.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;
        create_catalog_schema(&mut tx).await?;
        mark_applied(&mut tx, 1).await?;
        tx.commit().await?;
    }

    Ok(())
}

async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
        .bind(version)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

async fn mark_applied(tx: &mut Transaction<'_, Sqlite>, version: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
            INSERT INTO schema_migrations (version, applied_at)
            VALUES (?1, ?2)
            ON CONFLICT(version) DO NOTHING
        ",
    )
    .bind(version)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Version 1: courses, enrollments and per-course progress.
///
/// One enrollment and one progress row per (user, course) is enforced here.
async fn create_catalog_schema(tx: &mut Transaction<'_, Sqlite>) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS courses (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                instructor_name TEXT NOT NULL,
                price_cents INTEGER NOT NULL CHECK (price_cents >= 0),
                thumbnail_ref TEXT,
                video_ref TEXT,
                duration_minutes INTEGER NOT NULL CHECK (duration_minutes > 0),
                level TEXT NOT NULL CHECK (level IN ('beginner', 'intermediate', 'advanced')),
                category TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
        ",
    )
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS enrollments (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                course_id INTEGER NOT NULL,
                progress_percentage REAL NOT NULL
                    CHECK (progress_percentage >= 0 AND progress_percentage <= 100),
                payment_status TEXT NOT NULL CHECK (payment_status IN ('pending', 'completed')),
                enrolled_at TEXT NOT NULL,
                UNIQUE (user_id, course_id),
                FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
            );
        ",
    )
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS course_progress (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                course_id INTEGER NOT NULL,
                video_position REAL NOT NULL CHECK (video_position >= 0),
                completed INTEGER NOT NULL CHECK (completed IN (0, 1)),
                UNIQUE (user_id, course_id),
                FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
            );
        ",
    )
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r"
            CREATE INDEX IF NOT EXISTS idx_courses_created
                ON courses (created_at DESC, id DESC);
        ",
    )
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r"
            CREATE INDEX IF NOT EXISTS idx_enrollments_user_enrolled
                ON enrollments (user_id, enrolled_at DESC);
        ",
    )
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r"
            CREATE INDEX IF NOT EXISTS idx_enrollments_course
                ON enrollments (course_id);
        ",
    )
    .execute(&mut **tx)
    .await?;

    Ok(())
}
