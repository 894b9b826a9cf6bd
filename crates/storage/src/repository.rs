use async_trait::async_trait;
use chrono::{DateTime, Utc};
use edustream_core::model::{
    Course, CourseId, CourseLevel, CourseProgress, Enrollment, EnrollmentId, MediaRef,
    PaymentStatus, Price, ProgressId, UserId,
};
use edustream_core::playback::Percent;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// Insert shape for a course; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewCourseRecord {
    pub title: String,
    pub description: String,
    pub instructor_name: String,
    pub price: Price,
    pub thumbnail: Option<MediaRef>,
    pub video: Option<MediaRef>,
    pub duration_minutes: u32,
    pub level: CourseLevel,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl NewCourseRecord {
    #[must_use]
    pub fn from_course(course: &Course) -> Self {
        Self {
            title: course.title().to_owned(),
            description: course.description().to_owned(),
            instructor_name: course.instructor_name().to_owned(),
            price: course.price(),
            thumbnail: course.thumbnail().cloned(),
            video: course.video().cloned(),
            duration_minutes: course.duration_minutes(),
            level: course.level(),
            category: course.category().to_owned(),
            created_at: course.created_at(),
        }
    }
}

/// Insert shape for an enrollment; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewEnrollmentRecord {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub progress: Percent,
    pub payment_status: PaymentStatus,
    pub enrolled_at: DateTime<Utc>,
}

impl NewEnrollmentRecord {
    #[must_use]
    pub fn from_enrollment(enrollment: &Enrollment) -> Self {
        Self {
            user_id: enrollment.user_id(),
            course_id: enrollment.course_id(),
            progress: enrollment.progress(),
            payment_status: enrollment.payment_status(),
            enrolled_at: enrollment.enrolled_at(),
        }
    }
}

/// Insert shape for a progress record; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewProgressRecord {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub video_position: f64,
    pub completed: bool,
}

impl NewProgressRecord {
    #[must_use]
    pub fn from_progress(progress: &CourseProgress) -> Self {
        Self {
            user_id: progress.user_id(),
            course_id: progress.course_id(),
            video_position: progress.video_position(),
            completed: progress.completed(),
        }
    }
}

/// Fields the player overwrites on a progress record each sync tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub video_position: f64,
    pub completed: bool,
}

/// List-by-filter selector for enrollments. `None` fields match anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrollmentFilter {
    pub user_id: Option<UserId>,
    pub course_id: Option<CourseId>,
}

impl EnrollmentFilter {
    #[must_use]
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            course_id: None,
        }
    }

    #[must_use]
    pub fn for_course(course_id: CourseId) -> Self {
        Self {
            user_id: None,
            course_id: Some(course_id),
        }
    }

    #[must_use]
    pub fn for_pair(user_id: UserId, course_id: CourseId) -> Self {
        Self {
            user_id: Some(user_id),
            course_id: Some(course_id),
        }
    }

    #[must_use]
    pub fn matches(&self, enrollment: &Enrollment) -> bool {
        self.user_id.is_none_or(|u| u == enrollment.user_id())
            && self.course_id.is_none_or(|c| c == enrollment.course_id())
    }
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Insert a new course and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the course cannot be stored.
    async fn insert_new_course(&self, course: NewCourseRecord) -> Result<CourseId, StorageError>;

    /// Fetch a course by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError>;

    /// All courses, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn list_courses(&self) -> Result<Vec<Course>, StorageError>;

    /// Delete a course together with its enrollments and progress records.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the course does not exist.
    async fn delete_course(&self, id: CourseId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Insert a new enrollment and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the (user, course) pair is already enrolled.
    async fn insert_new_enrollment(
        &self,
        enrollment: NewEnrollmentRecord,
    ) -> Result<EnrollmentId, StorageError>;

    /// Enrollments matching the filter, most recently enrolled first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn list_enrollments(
        &self,
        filter: EnrollmentFilter,
    ) -> Result<Vec<Enrollment>, StorageError>;

    /// Overwrite the aggregate progress percentage of one enrollment.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the enrollment does not exist.
    async fn update_enrollment_progress(
        &self,
        id: EnrollmentId,
        progress: Percent,
    ) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Insert a new progress record and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the (user, course) pair already has one.
    async fn insert_new_progress(
        &self,
        progress: NewProgressRecord,
    ) -> Result<ProgressId, StorageError>;

    /// Progress records for a (user, course) pair, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn list_progress(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Vec<CourseProgress>, StorageError>;

    /// Overwrite position and completion flag of one progress record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the record does not exist.
    async fn update_progress(
        &self,
        id: ProgressId,
        update: ProgressUpdate,
    ) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct MemoryState {
    next_id: u64,
    courses: BTreeMap<CourseId, Course>,
    enrollments: BTreeMap<EnrollmentId, Enrollment>,
    progress: BTreeMap<ProgressId, CourseProgress>,
}

impl MemoryState {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn insert_new_course(&self, course: NewCourseRecord) -> Result<CourseId, StorageError> {
        let mut guard = self.lock()?;
        let id = CourseId::new(guard.allocate());
        let course = Course::new(
            id,
            edustream_core::model::NewCourse {
                title: course.title,
                description: course.description,
                instructor_name: course.instructor_name,
                price: course.price,
                thumbnail: course.thumbnail,
                video: course.video,
                duration_minutes: course.duration_minutes,
                level: course.level,
                category: course.category,
            },
            course.created_at,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        guard.courses.insert(id, course);
        Ok(id)
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.courses.get(&id).cloned())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        let guard = self.lock()?;
        let mut courses: Vec<Course> = guard.courses.values().cloned().collect();
        courses.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(courses)
    }

    async fn delete_course(&self, id: CourseId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if guard.courses.remove(&id).is_none() {
            return Err(StorageError::NotFound);
        }
        guard.enrollments.retain(|_, e| e.course_id() != id);
        guard.progress.retain(|_, p| p.course_id() != id);
        Ok(())
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryRepository {
    async fn insert_new_enrollment(
        &self,
        enrollment: NewEnrollmentRecord,
    ) -> Result<EnrollmentId, StorageError> {
        let mut guard = self.lock()?;
        if !guard.courses.contains_key(&enrollment.course_id) {
            return Err(StorageError::NotFound);
        }
        let pair = EnrollmentFilter::for_pair(enrollment.user_id, enrollment.course_id);
        if guard.enrollments.values().any(|e| pair.matches(e)) {
            return Err(StorageError::Conflict);
        }
        let id = EnrollmentId::new(guard.allocate());
        guard.enrollments.insert(
            id,
            Enrollment::from_persisted(
                id,
                enrollment.user_id,
                enrollment.course_id,
                enrollment.progress,
                enrollment.payment_status,
                enrollment.enrolled_at,
            ),
        );
        Ok(id)
    }

    async fn list_enrollments(
        &self,
        filter: EnrollmentFilter,
    ) -> Result<Vec<Enrollment>, StorageError> {
        let guard = self.lock()?;
        let mut found: Vec<Enrollment> = guard
            .enrollments
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.enrolled_at()
                .cmp(&a.enrolled_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(found)
    }

    async fn update_enrollment_progress(
        &self,
        id: EnrollmentId,
        progress: Percent,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let enrollment = guard
            .enrollments
            .get_mut(&id)
            .ok_or(StorageError::NotFound)?;
        enrollment.set_progress(progress);
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn insert_new_progress(
        &self,
        progress: NewProgressRecord,
    ) -> Result<ProgressId, StorageError> {
        let mut guard = self.lock()?;
        if !guard.courses.contains_key(&progress.course_id) {
            return Err(StorageError::NotFound);
        }
        if guard
            .progress
            .values()
            .any(|p| p.user_id() == progress.user_id && p.course_id() == progress.course_id)
        {
            return Err(StorageError::Conflict);
        }
        let id = ProgressId::new(guard.allocate());
        let record = CourseProgress::from_persisted(
            id,
            progress.user_id,
            progress.course_id,
            progress.video_position,
            progress.completed,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        guard.progress.insert(id, record);
        Ok(id)
    }

    async fn list_progress(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Vec<CourseProgress>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .progress
            .values()
            .filter(|p| p.user_id() == user_id && p.course_id() == course_id)
            .cloned()
            .collect())
    }

    async fn update_progress(
        &self,
        id: ProgressId,
        update: ProgressUpdate,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let current = guard.progress.get(&id).ok_or(StorageError::NotFound)?;
        let replaced = CourseProgress::from_persisted(
            id,
            current.user_id(),
            current.course_id(),
            update.video_position,
            update.completed,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        guard.progress.insert(id, replaced);
        Ok(())
    }
}

/// Aggregates the collection repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub courses: Arc<dyn CourseRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let courses: Arc<dyn CourseRepository> = Arc::new(repo.clone());
        let enrollments: Arc<dyn EnrollmentRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Self {
            courses,
            enrollments,
            progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use edustream_core::time::fixed_now;

    fn course_record(title: &str, created_at: DateTime<Utc>) -> NewCourseRecord {
        NewCourseRecord {
            title: title.to_owned(),
            description: "desc".to_owned(),
            instructor_name: "Emily Davis".to_owned(),
            price: Price::from_cents(1_999),
            thumbnail: None,
            video: None,
            duration_minutes: 90,
            level: CourseLevel::Beginner,
            category: "Design".to_owned(),
            created_at,
        }
    }

    fn enrollment_record(user_id: UserId, course_id: CourseId) -> NewEnrollmentRecord {
        NewEnrollmentRecord {
            user_id,
            course_id,
            progress: Percent::ZERO,
            payment_status: PaymentStatus::Pending,
            enrolled_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn lists_courses_newest_first() {
        let repo = InMemoryRepository::new();
        let old = repo
            .insert_new_course(course_record("Old", fixed_now()))
            .await
            .unwrap();
        let new = repo
            .insert_new_course(course_record("New", fixed_now() + Duration::days(1)))
            .await
            .unwrap();

        let ids: Vec<CourseId> = repo
            .list_courses()
            .await
            .unwrap()
            .iter()
            .map(Course::id)
            .collect();
        assert_eq!(ids, vec![new, old]);
    }

    #[tokio::test]
    async fn duplicate_enrollment_is_a_conflict() {
        let repo = InMemoryRepository::new();
        let course = repo
            .insert_new_course(course_record("UX", fixed_now()))
            .await
            .unwrap();
        let user = UserId::random();
        repo.insert_new_enrollment(enrollment_record(user, course))
            .await
            .unwrap();
        let err = repo
            .insert_new_enrollment(enrollment_record(user, course))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
    }

    #[tokio::test]
    async fn filter_by_pair_returns_only_that_pair() {
        let repo = InMemoryRepository::new();
        let a = repo
            .insert_new_course(course_record("A", fixed_now()))
            .await
            .unwrap();
        let b = repo
            .insert_new_course(course_record("B", fixed_now()))
            .await
            .unwrap();
        let user = UserId::random();
        let other = UserId::random();
        repo.insert_new_enrollment(enrollment_record(user, a))
            .await
            .unwrap();
        repo.insert_new_enrollment(enrollment_record(user, b))
            .await
            .unwrap();
        repo.insert_new_enrollment(enrollment_record(other, a))
            .await
            .unwrap();

        let found = repo
            .list_enrollments(EnrollmentFilter::for_pair(user, a))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].course_id(), a);
        assert_eq!(
            repo.list_enrollments(EnrollmentFilter::for_user(user))
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn update_progress_overwrites_and_missing_is_not_found() {
        let repo = InMemoryRepository::new();
        let course = repo
            .insert_new_course(course_record("A", fixed_now()))
            .await
            .unwrap();
        let user = UserId::random();
        let id = repo
            .insert_new_progress(NewProgressRecord {
                user_id: user,
                course_id: course,
                video_position: 0.0,
                completed: false,
            })
            .await
            .unwrap();

        let update = ProgressUpdate {
            video_position: 120.0,
            completed: true,
        };
        repo.update_progress(id, update).await.unwrap();
        let stored = repo.list_progress(user, course).await.unwrap();
        assert_eq!(stored[0].video_position(), 120.0);
        assert!(stored[0].completed());

        let err = repo
            .update_progress(ProgressId::new(999), update)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn deleting_a_course_drops_its_enrollments() {
        let repo = InMemoryRepository::new();
        let course = repo
            .insert_new_course(course_record("A", fixed_now()))
            .await
            .unwrap();
        let user = UserId::random();
        repo.insert_new_enrollment(enrollment_record(user, course))
            .await
            .unwrap();
        repo.delete_course(course).await.unwrap();
        assert!(
            repo.list_enrollments(EnrollmentFilter::for_user(user))
                .await
                .unwrap()
                .is_empty()
        );
        assert!(matches!(
            repo.delete_course(course).await,
            Err(StorageError::NotFound)
        ));
    }
}
