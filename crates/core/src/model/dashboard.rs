use crate::model::course::Course;
use crate::model::enrollment::Enrollment;

/// A course the user is enrolled in, joined with its enrollment record.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrolledCourse {
    pub course: Course,
    pub enrollment: Enrollment,
}

/// Headline numbers on the learner dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DashboardStats {
    pub total_courses: usize,
    pub completed_courses: usize,
    /// Sum of course lengths, in hours with one decimal.
    pub total_hours: f64,
    /// Mean enrollment progress, rounded to a whole percent.
    pub average_progress: u8,
}

impl DashboardStats {
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn compute(entries: &[EnrolledCourse]) -> Self {
        let total_courses = entries.len();
        if total_courses == 0 {
            return Self::default();
        }

        let completed_courses = entries
            .iter()
            .filter(|e| e.enrollment.is_completed())
            .count();
        let minutes: u64 = entries
            .iter()
            .map(|e| u64::from(e.course.duration_minutes()))
            .sum();
        let total_hours = (minutes as f64 / 60.0 * 10.0).round() / 10.0;
        let progress_sum: f64 = entries.iter().map(|e| e.enrollment.progress().value()).sum();
        let average_progress = (progress_sum / total_courses as f64).round() as u8;

        Self {
            total_courses,
            completed_courses,
            total_hours,
            average_progress,
        }
    }
}

/// Per-course numbers on the instructor page.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CourseAudience {
    pub enrollments: usize,
    pub average_progress: u8,
}

impl CourseAudience {
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn compute<'a>(enrollments: impl IntoIterator<Item = &'a Enrollment>) -> Self {
        let (count, sum) = enrollments
            .into_iter()
            .fold((0usize, 0.0f64), |(n, s), e| (n + 1, s + e.progress().value()));
        if count == 0 {
            return Self::default();
        }
        Self {
            enrollments: count,
            average_progress: (sum / count as f64).round() as u8,
        }
    }
}
