use std::sync::Arc;

use tracing::info;

use edustream_core::model::{Course, CourseId, MediaRef, NewCourse};
use storage::repository::{CourseRepository, NewCourseRecord};

use crate::Clock;
use crate::error::CatalogError;

/// Video attached to courses published without one.
pub const PLACEHOLDER_VIDEO_URL: &str =
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4";

/// Category selector on the browse page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// `"all"` (any case) or blank selects everything.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(raw.to_owned())
        }
    }

    fn matches(&self, course: &Course) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => course.category() == category,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub search: String,
    pub category: CategoryFilter,
}

impl CatalogQuery {
    #[must_use]
    pub fn matches(&self, course: &Course) -> bool {
        course.matches_search(&self.search) && self.category.matches(course)
    }
}

/// Browsing plus the instructor's publish/retire actions.
#[derive(Clone)]
pub struct CatalogService {
    clock: Clock,
    courses: Arc<dyn CourseRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(clock: Clock, courses: Arc<dyn CourseRepository>) -> Self {
        Self { clock, courses }
    }

    /// Courses matching the query, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the listing fails.
    pub async fn browse(&self, query: &CatalogQuery) -> Result<Vec<Course>, CatalogError> {
        let courses = self.courses.list_courses().await?;
        Ok(courses.into_iter().filter(|c| query.matches(c)).collect())
    }

    /// Distinct categories in catalog order, for the filter chips.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the listing fails.
    pub async fn categories(&self) -> Result<Vec<String>, CatalogError> {
        let courses = self.courses.list_courses().await?;
        let mut seen: Vec<String> = Vec::new();
        for course in &courses {
            if !seen.iter().any(|c| c == course.category()) {
                seen.push(course.category().to_owned());
            }
        }
        Ok(seen)
    }

    /// Returns `Ok(None)` when the course does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn course(&self, id: CourseId) -> Result<Option<Course>, CatalogError> {
        Ok(self.courses.get_course(id).await?)
    }

    /// Validate and store a new course. A draft without a video gets the
    /// placeholder clip.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Course` for validation failures and
    /// `CatalogError::Storage` if persistence fails.
    pub async fn publish(&self, mut draft: NewCourse) -> Result<Course, CatalogError> {
        if draft.video.is_none() {
            draft.video = Some(MediaRef::parse(PLACEHOLDER_VIDEO_URL)?);
        }
        let course = Course::new(CourseId::new(0), draft, self.clock.now())?;
        let id = self
            .courses
            .insert_new_course(NewCourseRecord::from_course(&course))
            .await?;
        info!(course_id = %id, title = course.title(), "course published");
        Ok(course.with_id(id))
    }

    /// Remove a course along with its enrollments and progress.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the course is missing or deletion fails.
    pub async fn retire(&self, id: CourseId) -> Result<(), CatalogError> {
        self.courses.delete_course(id).await?;
        info!(course_id = %id, "course retired");
        Ok(())
    }
}
