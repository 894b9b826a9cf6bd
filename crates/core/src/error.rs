use thiserror::Error;

use crate::model::{CourseError, EnrollmentError, MediaRefError, ProgressError, UserError};
use crate::playback::PercentError;

/// Umbrella for every domain validation failure in this crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Enrollment(#[from] EnrollmentError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Media(#[from] MediaRefError),
    #[error(transparent)]
    Percent(#[from] PercentError),
}
