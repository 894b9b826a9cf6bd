//! Shared error types for the services crate.

use thiserror::Error;

use edustream_core::model::{CourseError, CourseId, MediaRefError, ProgressError, UserError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::notice::Notice;

/// Errors emitted by `AuthSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("no user is signed in")]
    SignedOut,
    #[error(transparent)]
    User(#[from] UserError),
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Media(#[from] MediaRefError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `EnrollmentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EnrollError {
    #[error("course {0} does not exist")]
    CourseNotFound(CourseId),
    #[error("already enrolled in course {0}")]
    AlreadyEnrolled(CourseId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl EnrollError {
    /// Toast shown when enrolling fails.
    #[must_use]
    pub fn notice(&self) -> Notice {
        Notice::error("Failed to enroll in course")
    }
}

/// Errors emitted by `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The player could not fetch what it needs to start. Terminal for the view.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("failed to load course information: {0}")]
    Fetch(#[from] StorageError),
}

impl LoadError {
    /// Toast shown instead of the player.
    #[must_use]
    pub fn notice(&self) -> Notice {
        Notice::error("Failed to load course information")
    }
}

/// A single sync tick failed. Logged and superseded by the next tick.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    #[error("progress write failed: {0}")]
    ProgressWrite(#[source] StorageError),
    #[error("enrollment lookup failed: {0}")]
    EnrollmentLookup(#[source] StorageError),
    #[error("enrollment write failed: {0}")]
    EnrollmentWrite(#[source] StorageError),
    #[error(transparent)]
    Position(#[from] ProgressError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
