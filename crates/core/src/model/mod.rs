mod course;
mod dashboard;
mod enrollment;
mod ids;
mod media;
mod progress;
mod user;

pub use ids::{CourseId, EnrollmentId, ParseIdError, ProgressId, UserId};
pub use media::{MediaRef, MediaRefError};

pub use course::{Course, CourseError, CourseLevel, NewCourse, Price};
pub use dashboard::{CourseAudience, DashboardStats, EnrolledCourse};
pub use enrollment::{Enrollment, EnrollmentError, PaymentStatus};
pub use progress::{CourseProgress, ProgressError};
pub use user::{User, UserError};
