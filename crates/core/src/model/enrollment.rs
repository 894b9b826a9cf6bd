use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::course::Course;
use crate::model::ids::{CourseId, EnrollmentId, UserId};
use crate::playback::Percent;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EnrollmentError {
    #[error("unknown payment status: {0}")]
    UnknownPaymentStatus(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Completed,
}

impl PaymentStatus {
    /// Paid courses wait for payment, free ones are settled immediately.
    #[must_use]
    pub fn for_course(course: &Course) -> Self {
        if course.price().is_free() {
            Self::Completed
        } else {
            Self::Pending
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = EnrollmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(EnrollmentError::UnknownPaymentStatus(other.to_owned())),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate record of one user's enrollment in one course.
///
/// The progress percentage is what dashboards read; the player overwrites it
/// on every successful sync tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    id: EnrollmentId,
    user_id: UserId,
    course_id: CourseId,
    progress: Percent,
    payment_status: PaymentStatus,
    enrolled_at: DateTime<Utc>,
}

impl Enrollment {
    /// A fresh enrollment at 0 % with the payment status implied by the course price.
    #[must_use]
    pub fn start(
        id: EnrollmentId,
        user_id: UserId,
        course: &Course,
        enrolled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            course_id: course.id(),
            progress: Percent::ZERO,
            payment_status: PaymentStatus::for_course(course),
            enrolled_at,
        }
    }

    #[must_use]
    pub fn from_persisted(
        id: EnrollmentId,
        user_id: UserId,
        course_id: CourseId,
        progress: Percent,
        payment_status: PaymentStatus,
        enrolled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            course_id,
            progress,
            payment_status,
            enrolled_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> EnrollmentId {
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
    pub fn progress(&self) -> Percent {
        self.progress
    }

    #[must_use]
    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    #[must_use]
    pub fn enrolled_at(&self) -> DateTime<Utc> {
        self.enrolled_at
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.progress.is_complete()
    }

    pub fn set_progress(&mut self, progress: Percent) {
        self.progress = progress;
    }

    #[must_use]
    pub fn with_id(mut self, id: EnrollmentId) -> Self {
        self.id = id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::course::Price;
    use crate::model::course::fixtures::draft;
    use crate::time::fixed_now;

    #[test]
    fn paid_course_starts_pending() {
        let course = Course::new(CourseId::new(3), draft("React"), fixed_now()).unwrap();
        let e = Enrollment::start(EnrollmentId::new(1), UserId::random(), &course, fixed_now());
        assert_eq!(e.payment_status(), PaymentStatus::Pending);
        assert_eq!(e.progress(), Percent::ZERO);
        assert_eq!(e.course_id(), CourseId::new(3));
    }

    #[test]
    fn free_course_is_settled() {
        let mut d = draft("Intro");
        d.price = Price::FREE;
        let course = Course::new(CourseId::new(4), d, fixed_now()).unwrap();
        assert_eq!(PaymentStatus::for_course(&course), PaymentStatus::Completed);
    }

    #[test]
    fn payment_status_round_trips_storage_text() {
        for status in [PaymentStatus::Pending, PaymentStatus::Completed] {
            assert_eq!(status.as_str().parse::<PaymentStatus>(), Ok(status));
        }
        assert!("refunded".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn completed_follows_threshold() {
        let course = Course::new(CourseId::new(3), draft("React"), fixed_now()).unwrap();
        let mut e = Enrollment::start(EnrollmentId::new(1), UserId::random(), &course, fixed_now());
        e.set_progress(Percent::new(89.9).unwrap());
        assert!(!e.is_completed());
        e.set_progress(Percent::new(90.0).unwrap());
        assert!(e.is_completed());
    }
}
