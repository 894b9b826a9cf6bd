use chrono::Duration;
use edustream_core::model::{CourseId, CourseLevel, MediaRef, PaymentStatus, Price, UserId};
use edustream_core::playback::Percent;
use edustream_core::time::fixed_now;
use storage::repository::{
    CourseRepository, EnrollmentFilter, EnrollmentRepository, NewCourseRecord,
    NewEnrollmentRecord, NewProgressRecord, ProgressRepository, ProgressUpdate, StorageError,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn course(title: &str, offset_days: i64) -> NewCourseRecord {
    NewCourseRecord {
        title: title.to_owned(),
        description: "Closures, prototypes and the event loop".to_owned(),
        instructor_name: "Mike Chen".to_owned(),
        price: Price::from_cents(2_500),
        thumbnail: Some(MediaRef::parse("https://cdn.example.com/js.png").unwrap()),
        video: Some(MediaRef::parse("videos/js.mp4").unwrap()),
        duration_minutes: 240,
        level: CourseLevel::Advanced,
        category: "Development".to_owned(),
        created_at: fixed_now() + Duration::days(offset_days),
    }
}

fn enrollment(user_id: UserId, course_id: CourseId) -> NewEnrollmentRecord {
    NewEnrollmentRecord {
        user_id,
        course_id,
        progress: Percent::ZERO,
        payment_status: PaymentStatus::Pending,
        enrolled_at: fixed_now(),
    }
}

#[tokio::test]
async fn sqlite_round_trips_courses_newest_first() {
    let repo = connect("memdb_courses").await;
    let older = repo.insert_new_course(course("JS", 0)).await.unwrap();
    let newer = repo.insert_new_course(course("TS", 2)).await.unwrap();

    let fetched = repo.get_course(older).await.unwrap().expect("course");
    assert_eq!(fetched.title(), "JS");
    assert_eq!(fetched.level(), CourseLevel::Advanced);
    assert_eq!(fetched.price(), Price::from_cents(2_500));
    assert_eq!(
        fetched.video().and_then(MediaRef::as_path),
        Some(std::path::Path::new("videos/js.mp4"))
    );

    let ids: Vec<_> = repo
        .list_courses()
        .await
        .unwrap()
        .iter()
        .map(edustream_core::model::Course::id)
        .collect();
    assert_eq!(ids, vec![newer, older]);
    assert!(repo.get_course(CourseId::new(404)).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_enforces_one_enrollment_per_pair() {
    let repo = connect("memdb_unique").await;
    let course_id = repo.insert_new_course(course("JS", 0)).await.unwrap();
    let user = UserId::random();

    repo.insert_new_enrollment(enrollment(user, course_id))
        .await
        .unwrap();
    let err = repo
        .insert_new_enrollment(enrollment(user, course_id))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let missing_course = repo
        .insert_new_enrollment(enrollment(user, CourseId::new(999)))
        .await
        .unwrap_err();
    assert!(matches!(missing_course, StorageError::NotFound));
}

#[tokio::test]
async fn sqlite_filters_and_updates_enrollments() {
    let repo = connect("memdb_filter").await;
    let a = repo.insert_new_course(course("A", 0)).await.unwrap();
    let b = repo.insert_new_course(course("B", 0)).await.unwrap();
    let user = UserId::random();
    let other = UserId::random();

    let mine = repo.insert_new_enrollment(enrollment(user, a)).await.unwrap();
    repo.insert_new_enrollment(enrollment(user, b)).await.unwrap();
    repo.insert_new_enrollment(enrollment(other, a)).await.unwrap();

    repo.update_enrollment_progress(mine, Percent::new(42.5).unwrap())
        .await
        .unwrap();

    let pair = repo
        .list_enrollments(EnrollmentFilter::for_pair(user, a))
        .await
        .unwrap();
    assert_eq!(pair.len(), 1);
    assert_eq!(pair[0].id(), mine);
    assert_eq!(pair[0].progress().value(), 42.5);

    assert_eq!(
        repo.list_enrollments(EnrollmentFilter::for_user(user))
            .await
            .unwrap()
            .len(),
        2
    );
    assert_eq!(
        repo.list_enrollments(EnrollmentFilter::for_course(a))
            .await
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn sqlite_progress_update_and_cascade_delete() {
    let repo = connect("memdb_progress").await;
    let course_id = repo.insert_new_course(course("JS", 0)).await.unwrap();
    let user = UserId::random();

    let id = repo
        .insert_new_progress(NewProgressRecord {
            user_id: user,
            course_id,
            video_position: 0.0,
            completed: false,
        })
        .await
        .unwrap();
    repo.update_progress(
        id,
        ProgressUpdate {
            video_position: 225.0,
            completed: true,
        },
    )
    .await
    .unwrap();

    let stored = repo.list_progress(user, course_id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].video_position(), 225.0);
    assert!(stored[0].completed());

    repo.delete_course(course_id).await.unwrap();
    assert!(repo.list_progress(user, course_id).await.unwrap().is_empty());
    assert!(matches!(
        repo.update_progress(
            id,
            ProgressUpdate {
                video_position: 1.0,
                completed: false
            }
        )
        .await,
        Err(StorageError::NotFound)
    ));
}
