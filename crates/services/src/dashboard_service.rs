use std::sync::Arc;

use tracing::debug;

use edustream_core::model::{
    Course, CourseAudience, DashboardStats, EnrolledCourse, Enrollment, UserId,
};
use storage::repository::{CourseRepository, EnrollmentFilter, EnrollmentRepository};

use crate::error::DashboardError;

/// What the learner dashboard renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dashboard {
    /// Most recently enrolled first.
    pub courses: Vec<EnrolledCourse>,
    pub stats: DashboardStats,
}

impl Dashboard {
    /// Enrollments the learner has not finished, for the "continue learning" row.
    pub fn in_progress(&self) -> impl Iterator<Item = &EnrolledCourse> {
        self.courses.iter().filter(|c| !c.enrollment.is_completed())
    }
}

/// One row of the instructor page.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructorCourse {
    pub course: Course,
    pub audience: CourseAudience,
}

/// Read-side joins over courses and enrollments.
#[derive(Clone)]
pub struct DashboardService {
    courses: Arc<dyn CourseRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
}

impl DashboardService {
    #[must_use]
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
    ) -> Self {
        Self {
            courses,
            enrollments,
        }
    }

    /// The user's enrolled courses with headline stats.
    ///
    /// Enrollments whose course has been retired are left out.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Storage` if any lookup fails.
    pub async fn dashboard(&self, user_id: UserId) -> Result<Dashboard, DashboardError> {
        let enrollments = self
            .enrollments
            .list_enrollments(EnrollmentFilter::for_user(user_id))
            .await?;

        let mut courses = Vec::with_capacity(enrollments.len());
        for enrollment in enrollments {
            match self.courses.get_course(enrollment.course_id()).await? {
                Some(course) => courses.push(EnrolledCourse { course, enrollment }),
                None => debug!(
                    enrollment_id = %enrollment.id(),
                    course_id = %enrollment.course_id(),
                    "enrollment points at a missing course; skipping"
                ),
            }
        }

        let stats = DashboardStats::compute(&courses);
        Ok(Dashboard { courses, stats })
    }

    /// Every course taught by `instructor_name` with its enrollment count and
    /// average progress.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Storage` if any lookup fails.
    pub async fn instructor_courses(
        &self,
        instructor_name: &str,
    ) -> Result<Vec<InstructorCourse>, DashboardError> {
        let taught: Vec<Course> = self
            .courses
            .list_courses()
            .await?
            .into_iter()
            .filter(|c| c.instructor_name() == instructor_name)
            .collect();

        let mut rows = Vec::with_capacity(taught.len());
        for course in taught {
            let enrollments: Vec<Enrollment> = self
                .enrollments
                .list_enrollments(EnrollmentFilter::for_course(course.id()))
                .await?;
            let audience = CourseAudience::compute(&enrollments);
            rows.push(InstructorCourse { course, audience });
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use edustream_core::model::{CourseId, CourseLevel, NewCourse, PaymentStatus, Price};
    use edustream_core::playback::Percent;
    use edustream_core::time::fixed_now;
    use storage::repository::{InMemoryRepository, NewCourseRecord, NewEnrollmentRecord};

    async fn add_course(repo: &InMemoryRepository, title: &str, minutes: u32) -> CourseId {
        let course = Course::new(
            CourseId::new(0),
            NewCourse {
                title: title.into(),
                description: String::new(),
                instructor_name: "Sarah Johnson".into(),
                price: Price::FREE,
                thumbnail: None,
                video: None,
                duration_minutes: minutes,
                level: CourseLevel::Beginner,
                category: "Development".into(),
            },
            fixed_now(),
        )
        .unwrap();
        repo.insert_new_course(NewCourseRecord::from_course(&course))
            .await
            .unwrap()
    }

    async fn enroll(
        repo: &InMemoryRepository,
        user_id: UserId,
        course_id: CourseId,
        progress: f64,
        days_ago: i64,
    ) {
        repo.insert_new_enrollment(NewEnrollmentRecord {
            user_id,
            course_id,
            progress: Percent::new(progress).unwrap(),
            payment_status: PaymentStatus::Completed,
            enrolled_at: fixed_now() - Duration::days(days_ago),
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn dashboard_joins_and_skips_retired_courses() {
        let repo = InMemoryRepository::new();
        let shared = Arc::new(repo.clone());
        let service = DashboardService::new(shared.clone(), shared);
        let user = UserId::random();

        let react = add_course(&repo, "React", 120).await;
        let css = add_course(&repo, "CSS", 60).await;
        let gone = add_course(&repo, "Flash", 30).await;
        enroll(&repo, user, react, 95.0, 3).await;
        enroll(&repo, user, css, 20.0, 1).await;
        enroll(&repo, user, gone, 50.0, 0).await;
        repo.delete_course(gone).await.unwrap();

        let dashboard = service.dashboard(user).await.unwrap();
        let titles: Vec<&str> = dashboard.courses.iter().map(|c| c.course.title()).collect();
        assert_eq!(titles, ["CSS", "React"]);
        assert_eq!(dashboard.stats.total_courses, 2);
        assert_eq!(dashboard.stats.completed_courses, 1);
        assert!((dashboard.stats.total_hours - 3.0).abs() < f64::EPSILON);
        assert_eq!(dashboard.stats.average_progress, 58);
        assert_eq!(dashboard.in_progress().count(), 1);
    }

    #[tokio::test]
    async fn instructor_rows_aggregate_enrollments() {
        let repo = InMemoryRepository::new();
        let shared = Arc::new(repo.clone());
        let service = DashboardService::new(shared.clone(), shared);

        let course = add_course(&repo, "React", 120).await;
        enroll(&repo, UserId::random(), course, 40.0, 0).await;
        enroll(&repo, UserId::random(), course, 60.0, 0).await;

        let rows = service.instructor_courses("Sarah Johnson").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].audience.enrollments, 2);
        assert_eq!(rows[0].audience.average_progress, 50);
        assert!(service.instructor_courses("Nobody").await.unwrap().is_empty());
    }
}
