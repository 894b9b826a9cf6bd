use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use edustream_core::model::{
    Course, CourseId, CourseLevel, NewCourse, Price, User, UserId,
};
use edustream_core::time::fixed_clock;
use services::{
    AppServices, Bootstrap, MediaElement, PlayerConfig, PlayerSession, SamplerState,
    SimulatedMedia,
};
use storage::repository::{
    CourseRepository, InMemoryRepository, NewCourseRecord, NewProgressRecord, ProgressRepository,
    ProgressUpdate, Storage, StorageError,
};

struct Harness {
    app: AppServices,
    repo: InMemoryRepository,
    user: User,
}

fn storage_over(repo: &InMemoryRepository) -> Storage {
    Storage {
        courses: Arc::new(repo.clone()),
        enrollments: Arc::new(repo.clone()),
        progress: Arc::new(repo.clone()),
    }
}

fn harness() -> Harness {
    let repo = InMemoryRepository::new();
    let app = AppServices::new(&storage_over(&repo), fixed_clock(), PlayerConfig::default());
    let user = User::new(UserId::random(), "learner@example.com", None).unwrap();
    Harness { app, repo, user }
}

fn react_course() -> NewCourse {
    NewCourse {
        title: "Complete React Development".into(),
        description: "Hooks, state and routing".into(),
        instructor_name: "Sarah Johnson".into(),
        price: Price::FREE,
        thumbnail: None,
        video: None,
        duration_minutes: 240,
        level: CourseLevel::Intermediate,
        category: "Development".into(),
    }
}

async fn open(h: &Harness, course_id: CourseId, media: &SimulatedMedia) -> PlayerSession {
    match h
        .app
        .player()
        .load(course_id, &h.user, Arc::new(media.clone()))
        .await
        .unwrap()
    {
        Bootstrap::Ready(session) => session,
        Bootstrap::NotFound => panic!("course {course_id} should exist"),
    }
}

async fn stored_position(h: &Harness, course_id: CourseId) -> (f64, bool) {
    let progress = h
        .repo
        .list_progress(h.user.id(), course_id)
        .await
        .unwrap();
    (progress[0].video_position(), progress[0].completed())
}

#[tokio::test(start_paused = true)]
async fn playing_writes_progress_to_both_records() {
    let h = harness();
    let course = h.app.catalog().publish(react_course()).await.unwrap();
    h.app.enrollments().enroll(&h.user, course.id()).await.unwrap();

    let media = SimulatedMedia::with_duration(300.0);
    let mut session = open(&h, course.id(), &media).await;
    assert_eq!(session.sampler_state(), SamplerState::Idle);

    session.toggle_play();
    assert_eq!(session.sampler_state(), SamplerState::Sampling);

    // Offsets keep media movement away from the 10 s tick boundaries.
    tokio::time::sleep(Duration::from_secs(3)).await;
    media.advance(30.0);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(stored_position(&h, course.id()).await, (30.0, false));

    media.advance(30.0);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(stored_position(&h, course.id()).await, (60.0, false));

    let dashboard = h.app.dashboard().dashboard(h.user.id()).await.unwrap();
    assert_eq!(dashboard.courses[0].enrollment.progress().rounded(), 20);
    assert_eq!(dashboard.stats.average_progress, 20);

    session.toggle_play();
    assert_eq!(session.sampler_state(), SamplerState::Idle);
    media.seek(150.0);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(stored_position(&h, course.id()).await, (60.0, false));
}

#[tokio::test(start_paused = true)]
async fn crossing_ninety_percent_latches_completion() {
    let h = harness();
    let course = h.app.catalog().publish(react_course()).await.unwrap();
    h.app.enrollments().enroll(&h.user, course.id()).await.unwrap();

    let media = SimulatedMedia::with_duration(250.0);
    let mut session = open(&h, course.id(), &media).await;
    session.seek(200.0);
    session.toggle_play();

    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(stored_position(&h, course.id()).await, (200.0, false));
    assert!(!session.is_course_complete());

    session.seek(225.0);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(stored_position(&h, course.id()).await, (225.0, true));
    assert!(session.is_course_complete());

    session.seek(20.0);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(stored_position(&h, course.id()).await, (20.0, true));

    let dashboard = h.app.dashboard().dashboard(h.user.id()).await.unwrap();
    assert_eq!(dashboard.courses[0].enrollment.progress().rounded(), 8);
}

#[tokio::test(start_paused = true)]
async fn unknown_duration_writes_nothing() {
    let h = harness();
    let course = h.app.catalog().publish(react_course()).await.unwrap();
    h.app.enrollments().enroll(&h.user, course.id()).await.unwrap();

    let media = SimulatedMedia::new();
    let mut session = open(&h, course.id(), &media).await;
    media.seek(40.0);
    session.toggle_play();
    tokio::time::sleep(Duration::from_secs(35)).await;

    assert_eq!(stored_position(&h, course.id()).await, (0.0, false));
    assert_eq!(session.state().percent().value(), 0.0);
}

#[tokio::test(start_paused = true)]
async fn settling_after_pause_leaves_the_final_write_stored() {
    let h = harness();
    let course = h.app.catalog().publish(react_course()).await.unwrap();
    h.app.enrollments().enroll(&h.user, course.id()).await.unwrap();

    let media = SimulatedMedia::with_duration(100.0);
    let mut session = open(&h, course.id(), &media).await;
    session.seek(95.0);
    session.toggle_play();
    tokio::time::sleep(Duration::from_secs(11)).await;

    session.toggle_play();
    session.settle().await;
    assert_eq!(stored_position(&h, course.id()).await, (95.0, true));
    assert!(session.is_course_complete());

    // Idle session with nothing in flight.
    session.settle().await;
    assert_eq!(session.sampler_state(), SamplerState::Idle);
}

#[tokio::test]
async fn resumes_from_stored_position() {
    let h = harness();
    let course = h.app.catalog().publish(react_course()).await.unwrap();
    let outcome = h.app.enrollments().enroll(&h.user, course.id()).await.unwrap();
    h.repo
        .update_progress(
            outcome.progress.id(),
            ProgressUpdate {
                video_position: 45.0,
                completed: false,
            },
        )
        .await
        .unwrap();

    let media = SimulatedMedia::with_duration(300.0);
    let session = open(&h, course.id(), &media).await;
    assert_eq!(media.current_time(), 45.0);
    assert_eq!(session.state().percent().rounded(), 15);
    assert_eq!(session.state().time_label(), "0:45 / 5:00");
    assert!(session.saves_progress());
}

#[tokio::test(start_paused = true)]
async fn missing_progress_record_plays_without_saving() {
    let h = harness();
    let course = h.app.catalog().publish(react_course()).await.unwrap();

    let media = SimulatedMedia::with_duration(120.0);
    let mut session = open(&h, course.id(), &media).await;
    assert_eq!(session.state().current_time, 0.0);
    assert!(!session.saves_progress());

    session.toggle_play();
    assert!(!media.is_paused());
    assert_eq!(session.sampler_state(), SamplerState::Idle);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(
        h.repo
            .list_progress(h.user.id(), course.id())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test(start_paused = true)]
async fn missing_enrollment_still_saves_position() {
    let h = harness();
    let course = h.app.catalog().publish(react_course()).await.unwrap();
    h.repo
        .insert_new_progress(NewProgressRecord {
            user_id: h.user.id(),
            course_id: course.id(),
            video_position: 0.0,
            completed: false,
        })
        .await
        .unwrap();

    let media = SimulatedMedia::with_duration(100.0);
    let mut session = open(&h, course.id(), &media).await;
    session.skip_forward();
    session.skip_forward();
    session.rewind();
    assert_eq!(media.current_time(), 10.0);

    session.toggle_play();
    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(stored_position(&h, course.id()).await, (10.0, false));
    assert!(h.app.dashboard().dashboard(h.user.id()).await.unwrap().courses.is_empty());
}

#[tokio::test]
async fn unknown_course_is_not_found() {
    let h = harness();
    let media = SimulatedMedia::with_duration(100.0);
    let outcome = h
        .app
        .player()
        .load(CourseId::new(404), &h.user, Arc::new(media))
        .await
        .unwrap();
    assert!(outcome.into_session().is_none());
}

struct UnreachableCourses;

#[async_trait]
impl CourseRepository for UnreachableCourses {
    async fn insert_new_course(&self, _course: NewCourseRecord) -> Result<CourseId, StorageError> {
        Err(StorageError::Connection("connection refused".into()))
    }

    async fn get_course(&self, _id: CourseId) -> Result<Option<Course>, StorageError> {
        Err(StorageError::Connection("connection refused".into()))
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        Err(StorageError::Connection("connection refused".into()))
    }

    async fn delete_course(&self, _id: CourseId) -> Result<(), StorageError> {
        Err(StorageError::Connection("connection refused".into()))
    }
}

#[tokio::test]
async fn fetch_failure_becomes_an_error_notice() {
    let repo = InMemoryRepository::new();
    let storage = Storage {
        courses: Arc::new(UnreachableCourses),
        ..storage_over(&repo)
    };
    let app = AppServices::new(&storage, fixed_clock(), PlayerConfig::default());
    let user = User::new(UserId::random(), "learner@example.com", None).unwrap();

    let err = match app
        .player()
        .load(CourseId::new(1), &user, Arc::new(SimulatedMedia::new()))
        .await
    {
        Err(err) => err,
        Ok(_) => panic!("load should fail"),
    };
    let notice = err.notice();
    assert!(notice.is_error());
    assert_eq!(notice.description, "Failed to load course information");
}
