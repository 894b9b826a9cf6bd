use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::CourseId;
use crate::model::media::MediaRef;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("instructor name cannot be empty")]
    EmptyInstructor,

    #[error("course category cannot be empty")]
    EmptyCategory,

    #[error("course duration must be > 0 minutes")]
    InvalidDuration,

    #[error("unknown course level: {0}")]
    UnknownLevel(String),
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CourseLevel::Beginner => "beginner",
            CourseLevel::Intermediate => "intermediate",
            CourseLevel::Advanced => "advanced",
        }
    }
}

impl FromStr for CourseLevel {
    type Err = CourseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(CourseError::UnknownLevel(s.to_owned())),
        }
    }
}

impl fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── PRICE ─────────────────────────────────────────────────────────────────────
//

/// Course price in whole cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Price(u64);

impl Price {
    pub const FREE: Price = Price(0);

    #[must_use]
    pub fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub fn cents(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn is_free(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_free() {
            f.write_str("Free")
        } else {
            write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
        }
    }
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// Fields an instructor supplies when publishing a course.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub instructor_name: String,
    pub price: Price,
    pub thumbnail: Option<MediaRef>,
    pub video: Option<MediaRef>,
    pub duration_minutes: u32,
    pub level: CourseLevel,
    pub category: String,
}

/// A published course. Read-only once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    id: CourseId,
    title: String,
    description: String,
    instructor_name: String,
    price: Price,
    thumbnail: Option<MediaRef>,
    video: Option<MediaRef>,
    duration_minutes: u32,
    level: CourseLevel,
    category: String,
    created_at: DateTime<Utc>,
}

impl Course {
    /// Validates a draft and assigns it an id.
    ///
    /// # Errors
    ///
    /// Returns `CourseError` when title, instructor, or category is blank, or the
    /// duration is zero.
    pub fn new(id: CourseId, draft: NewCourse, created_at: DateTime<Utc>) -> Result<Self, CourseError> {
        let title = draft.title.trim().to_owned();
        if title.is_empty() {
            return Err(CourseError::EmptyTitle);
        }
        let instructor_name = draft.instructor_name.trim().to_owned();
        if instructor_name.is_empty() {
            return Err(CourseError::EmptyInstructor);
        }
        let category = draft.category.trim().to_owned();
        if category.is_empty() {
            return Err(CourseError::EmptyCategory);
        }
        if draft.duration_minutes == 0 {
            return Err(CourseError::InvalidDuration);
        }

        Ok(Self {
            id,
            title,
            description: draft.description.trim().to_owned(),
            instructor_name,
            price: draft.price,
            thumbnail: draft.thumbnail,
            video: draft.video,
            duration_minutes: draft.duration_minutes,
            level: draft.level,
            category,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn instructor_name(&self) -> &str {
        &self.instructor_name
    }

    #[must_use]
    pub fn price(&self) -> Price {
        self.price
    }

    #[must_use]
    pub fn thumbnail(&self) -> Option<&MediaRef> {
        self.thumbnail.as_ref()
    }

    #[must_use]
    pub fn video(&self) -> Option<&MediaRef> {
        self.video.as_ref()
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn level(&self) -> CourseLevel {
        self.level
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Case-insensitive match against title, description and instructor.
    ///
    /// An empty needle matches every course.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self.instructor_name.to_lowercase().contains(&needle)
    }

    /// Returns a copy with a different id, used after the store assigns one.
    #[must_use]
    pub fn with_id(mut self, id: CourseId) -> Self {
        self.id = id;
        self
    }
}
