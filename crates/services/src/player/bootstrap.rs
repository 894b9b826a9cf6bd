use std::sync::Arc;

use tracing::{debug, info};

use edustream_core::model::{CourseId, User};
use storage::repository::{CourseRepository, EnrollmentRepository, ProgressRepository};

use crate::config::PlayerConfig;
use crate::error::LoadError;

use super::media::MediaElement;
use super::observer::PlaybackObserver;
use super::sampler::ProgressSampler;
use super::session::PlayerSession;
use super::sync::ProgressSync;

/// Result of opening the player for a course.
pub enum Bootstrap {
    /// The course does not exist; the view shows "Course not found".
    NotFound,
    Ready(PlayerSession),
}

impl Bootstrap {
    #[must_use]
    pub fn into_session(self) -> Option<PlayerSession> {
        match self {
            Bootstrap::Ready(session) => Some(session),
            Bootstrap::NotFound => None,
        }
    }
}

/// Loads a course and the learner's stored position before playback starts.
#[derive(Clone)]
pub struct SessionBootstrap {
    courses: Arc<dyn CourseRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    progress: Arc<dyn ProgressRepository>,
    config: PlayerConfig,
}

impl SessionBootstrap {
    #[must_use]
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        progress: Arc<dyn ProgressRepository>,
        config: PlayerConfig,
    ) -> Self {
        Self {
            courses,
            enrollments,
            progress,
            config,
        }
    }

    /// Fetch the course and the user's progress, then seek `media` to the
    /// stored position.
    ///
    /// A stored position of zero leaves the element where it is. With no
    /// progress record the session plays normally but never writes.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Fetch` if either lookup fails.
    pub async fn load(
        &self,
        course_id: CourseId,
        user: &User,
        media: Arc<dyn MediaElement>,
    ) -> Result<Bootstrap, LoadError> {
        let Some(course) = self.courses.get_course(course_id).await? else {
            debug!(course_id = %course_id, "course not found");
            return Ok(Bootstrap::NotFound);
        };

        let stored = self
            .progress
            .list_progress(user.id(), course_id)
            .await?
            .into_iter()
            .next();

        let mut observer = PlaybackObserver::new();
        let (sampler, completed_on_load) = match stored {
            Some(progress) => {
                if let Some(position) = progress.resume_position() {
                    media.seek(position);
                }
                let completed = progress.completed();
                let sync = ProgressSync::new(
                    progress,
                    media.clone(),
                    self.enrollments.clone(),
                    self.progress.clone(),
                );
                let sampler = ProgressSampler::new(sync, self.config.sync_interval());
                (Some(sampler), completed)
            }
            None => {
                info!(
                    user_id = %user.id(),
                    course_id = %course_id,
                    "no progress record; playback will not be saved"
                );
                (None, false)
            }
        };
        observer.refresh(media.as_ref());

        Ok(Bootstrap::Ready(PlayerSession::new(
            course,
            media,
            observer,
            sampler,
            self.config,
            completed_on_load,
        )))
    }
}
