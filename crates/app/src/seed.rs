use edustream_core::model::{CourseLevel, NewCourse, Price};
use services::{AppServices, CatalogQuery};
use tracing::info;

struct SampleCourse {
    title: &'static str,
    description: &'static str,
    instructor: &'static str,
    cents: u64,
    minutes: u32,
    level: CourseLevel,
    category: &'static str,
}

const SAMPLE_COURSES: &[SampleCourse] = &[
    SampleCourse {
        title: "Complete React Development",
        description: "Build modern web apps with hooks, context and routing.",
        instructor: "Sarah Johnson",
        cents: 8_999,
        minutes: 720,
        level: CourseLevel::Intermediate,
        category: "Development",
    },
    SampleCourse {
        title: "Machine Learning Foundations",
        description: "Regression, classification and model evaluation in practice.",
        instructor: "Dr. Michael Chen",
        cents: 12_999,
        minutes: 960,
        level: CourseLevel::Advanced,
        category: "Data Science",
    },
    SampleCourse {
        title: "UI/UX Design Fundamentals",
        description: "Research, wireframes and prototypes that users love.",
        instructor: "Emily Rodriguez",
        cents: 0,
        minutes: 300,
        level: CourseLevel::Beginner,
        category: "Design",
    },
    SampleCourse {
        title: "Portrait Photography Basics",
        description: "Light, lenses and composition for striking portraits.",
        instructor: "Lisa Thompson",
        cents: 4_999,
        minutes: 45,
        level: CourseLevel::Beginner,
        category: "Photography",
    },
];

/// Publishes the sample catalog into an empty database. Does nothing if any
/// course already exists.
pub async fn seed_catalog(app: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = app.catalog();
    let existing = catalog.browse(&CatalogQuery::default()).await?;
    if !existing.is_empty() {
        println!("Catalog already has {} courses; nothing to seed", existing.len());
        return Ok(());
    }

    for sample in SAMPLE_COURSES {
        let course = catalog
            .publish(NewCourse {
                title: sample.title.into(),
                description: sample.description.into(),
                instructor_name: sample.instructor.into(),
                price: Price::from_cents(sample.cents),
                thumbnail: None,
                video: None,
                duration_minutes: sample.minutes,
                level: sample.level,
                category: sample.category.into(),
            })
            .await?;
        println!("{:>4}  {}", course.id(), course.title());
    }
    info!(count = SAMPLE_COURSES.len(), "sample catalog seeded");
    Ok(())
}
