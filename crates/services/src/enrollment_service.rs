use std::sync::Arc;

use tracing::{info, warn};

use edustream_core::model::{
    CourseId, CourseProgress, Enrollment, EnrollmentId, PaymentStatus, ProgressId, User, UserId,
};
use storage::repository::{
    CourseRepository, EnrollmentFilter, EnrollmentRepository, NewEnrollmentRecord,
    NewProgressRecord, ProgressRepository, StorageError,
};

use crate::Clock;
use crate::error::EnrollError;
use crate::notice::Notice;

/// Records created by a successful enrollment.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentOutcome {
    pub enrollment: Enrollment,
    pub progress: CourseProgress,
}

impl EnrollmentOutcome {
    /// Toast shown after enrolling.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self.enrollment.payment_status() {
            PaymentStatus::Pending => Notice::success("Enrollment pending payment"),
            PaymentStatus::Completed => Notice::success("Successfully enrolled in course"),
        }
    }
}

/// Creates the enrollment + progress pair and answers "am I enrolled?".
#[derive(Clone)]
pub struct EnrollmentService {
    clock: Clock,
    courses: Arc<dyn CourseRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl EnrollmentService {
    #[must_use]
    pub fn new(
        clock: Clock,
        courses: Arc<dyn CourseRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            courses,
            enrollments,
            progress,
        }
    }

    /// The user's enrollment in a course, if any.
    ///
    /// # Errors
    ///
    /// Returns `EnrollError::Storage` if the lookup fails.
    pub async fn enrollment_for(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<Enrollment>, EnrollError> {
        let found = self
            .enrollments
            .list_enrollments(EnrollmentFilter::for_pair(user_id, course_id))
            .await?;
        Ok(found.into_iter().next())
    }

    /// Enroll `user` in a course: one enrollment at 0 % and one progress record
    /// at the start of the video.
    ///
    /// The two inserts are independent; if the progress insert finds a record
    /// already there (left by an earlier partial enrollment) that record is reused.
    ///
    /// # Errors
    ///
    /// Returns `EnrollError::CourseNotFound` for an unknown course,
    /// `EnrollError::AlreadyEnrolled` if the enrollment exists, or
    /// `EnrollError::Storage` for other persistence failures.
    pub async fn enroll(
        &self,
        user: &User,
        course_id: CourseId,
    ) -> Result<EnrollmentOutcome, EnrollError> {
        let course = self
            .courses
            .get_course(course_id)
            .await?
            .ok_or(EnrollError::CourseNotFound(course_id))?;

        let draft = Enrollment::start(EnrollmentId::new(0), user.id(), &course, self.clock.now());
        let enrollment_id = match self
            .enrollments
            .insert_new_enrollment(NewEnrollmentRecord::from_enrollment(&draft))
            .await
        {
            Ok(id) => id,
            Err(StorageError::Conflict) => return Err(EnrollError::AlreadyEnrolled(course_id)),
            Err(StorageError::NotFound) => return Err(EnrollError::CourseNotFound(course_id)),
            Err(e) => return Err(e.into()),
        };
        let enrollment = draft.with_id(enrollment_id);

        let fresh = CourseProgress::start(ProgressId::new(0), user.id(), course_id);
        let progress = match self
            .progress
            .insert_new_progress(NewProgressRecord::from_progress(&fresh))
            .await
        {
            Ok(id) => fresh.with_id(id),
            Err(StorageError::Conflict) => {
                warn!(user_id = %user.id(), course_id = %course_id, "progress record already present; reusing it");
                self.progress
                    .list_progress(user.id(), course_id)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or(StorageError::NotFound)?
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            user_id = %user.id(),
            course_id = %course_id,
            payment = %enrollment.payment_status(),
            "enrolled"
        );
        Ok(EnrollmentOutcome {
            enrollment,
            progress,
        })
    }
}
