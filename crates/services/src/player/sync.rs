use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use edustream_core::model::{CourseId, CourseProgress, ProgressId, UserId};
use edustream_core::playback::{Percent, percent_complete};
use storage::repository::{
    EnrollmentFilter, EnrollmentRepository, ProgressRepository, ProgressUpdate,
};

use crate::error::SyncError;

use super::media::MediaElement;

/// The records one player session writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTarget {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub progress_id: ProgressId,
}

impl From<&CourseProgress> for SyncTarget {
    fn from(progress: &CourseProgress) -> Self {
        Self {
            user_id: progress.user_id(),
            course_id: progress.course_id(),
            progress_id: progress.id(),
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Duration unknown or zero; nothing was written.
    Skipped,
    Synced {
        percent: Percent,
        completed: bool,
        /// `false` when no enrollment matched the pair.
        enrollment_updated: bool,
    },
}

/// One progress write: read the element, overwrite the progress record,
/// then mirror the percentage onto the enrollment.
///
/// Clones share one in-memory copy of the progress record, so every clone
/// agrees on whether the course has already been finished.
#[derive(Clone)]
pub struct ProgressSync {
    record: Arc<Mutex<CourseProgress>>,
    media: Arc<dyn MediaElement>,
    enrollments: Arc<dyn EnrollmentRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressSync {
    /// `stored` is the record loaded at bootstrap; its completion flag seeds
    /// the latch.
    #[must_use]
    pub fn new(
        stored: CourseProgress,
        media: Arc<dyn MediaElement>,
        enrollments: Arc<dyn EnrollmentRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            record: Arc::new(Mutex::new(stored)),
            media,
            enrollments,
            progress,
        }
    }

    // Never held across an await; a poisoned lock still holds a valid record.
    fn record(&self) -> MutexGuard<'_, CourseProgress> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn target(&self) -> SyncTarget {
        SyncTarget::from(&*self.record())
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.record().completed()
    }

    /// Run one write cycle against the live media element.
    ///
    /// Once a tick has seen the completion threshold the stored flag stays
    /// `true`, even if the learner rewinds afterwards.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::ProgressWrite` if the progress update fails, in
    /// which case the enrollment is not touched. Enrollment failures surface
    /// as `SyncError::EnrollmentLookup` or `SyncError::EnrollmentWrite`.
    /// A negative or non-finite position is rejected as `SyncError::Position`
    /// before anything is written.
    pub async fn tick(&self) -> Result<TickOutcome, SyncError> {
        let position = self.media.current_time();
        let Some(percent) = percent_complete(position, self.media.duration()) else {
            return Ok(TickOutcome::Skipped);
        };
        let (target, completed) = {
            let mut record = self.record();
            record.record(position, percent)?;
            (SyncTarget::from(&*record), record.completed())
        };

        self.progress
            .update_progress(
                target.progress_id,
                ProgressUpdate {
                    video_position: position,
                    completed,
                },
            )
            .await
            .map_err(SyncError::ProgressWrite)?;

        let enrollment = self
            .enrollments
            .list_enrollments(EnrollmentFilter::for_pair(
                target.user_id,
                target.course_id,
            ))
            .await
            .map_err(SyncError::EnrollmentLookup)?
            .into_iter()
            .next();

        let enrollment_updated = match enrollment {
            Some(enrollment) => {
                self.enrollments
                    .update_enrollment_progress(enrollment.id(), percent)
                    .await
                    .map_err(SyncError::EnrollmentWrite)?;
                true
            }
            None => {
                debug!(
                    user_id = %target.user_id,
                    course_id = %target.course_id,
                    "no enrollment for this pair; progress record only"
                );
                false
            }
        };

        Ok(TickOutcome::Synced {
            percent,
            completed,
            enrollment_updated,
        })
    }
}
