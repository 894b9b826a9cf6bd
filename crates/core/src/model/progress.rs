use thiserror::Error;

use crate::model::ids::{CourseId, ProgressId, UserId};
use crate::playback::Percent;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("video position must be a finite, non-negative number of seconds, got {0}")]
    InvalidPosition(f64),
}

/// Fine-grained watch state for one user in one course.
///
/// `completed` is a latch: once the completion threshold is crossed it stays
/// set, even if the viewer rewinds afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseProgress {
    id: ProgressId,
    user_id: UserId,
    course_id: CourseId,
    video_position: f64,
    completed: bool,
}

impl CourseProgress {
    /// The record created alongside an enrollment: start of video, not completed.
    #[must_use]
    pub fn start(id: ProgressId, user_id: UserId, course_id: CourseId) -> Self {
        Self {
            id,
            user_id,
            course_id,
            video_position: 0.0,
            completed: false,
        }
    }

    /// Rehydrates a stored record.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidPosition` for a negative or non-finite position.
    pub fn from_persisted(
        id: ProgressId,
        user_id: UserId,
        course_id: CourseId,
        video_position: f64,
        completed: bool,
    ) -> Result<Self, ProgressError> {
        validate_position(video_position)?;
        Ok(Self {
            id,
            user_id,
            course_id,
            video_position,
            completed,
        })
    }

    #[must_use]
    pub fn id(&self) -> ProgressId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn video_position(&self) -> f64 {
        self.video_position
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Position to resume from, if the viewer got past the first frame.
    #[must_use]
    pub fn resume_position(&self) -> Option<f64> {
        (self.video_position > 0.0).then_some(self.video_position)
    }

    /// Records a new sample. The completion latch only ever moves to `true`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidPosition` for a negative or non-finite position.
    pub fn record(&mut self, position: f64, percent: Percent) -> Result<(), ProgressError> {
        validate_position(position)?;
        self.video_position = position;
        self.completed = self.completed || percent.is_complete();
        Ok(())
    }

    #[must_use]
    pub fn with_id(mut self, id: ProgressId) -> Self {
        self.id = id;
        self
    }
}

fn validate_position(position: f64) -> Result<(), ProgressError> {
    if position.is_finite() && position >= 0.0 {
        Ok(())
    } else {
        Err(ProgressError::InvalidPosition(position))
    }
}
