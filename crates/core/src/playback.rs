//! Playback arithmetic shared by the player, the enrollment records and the dashboard.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Watched share at which a course counts as complete.
pub const COMPLETION_THRESHOLD: f64 = 90.0;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum PercentError {
    #[error("percentage must be a finite number in 0..=100, got {0}")]
    OutOfRange(f64),
}

/// A percentage in `0.0..=100.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Percent(f64);

impl Percent {
    pub const ZERO: Percent = Percent(0.0);
    pub const FULL: Percent = Percent(100.0);

    /// Validates a stored or user-supplied percentage.
    ///
    /// # Errors
    ///
    /// Returns `PercentError::OutOfRange` for NaN, infinities, or values outside `0..=100`.
    pub fn new(value: f64) -> Result<Self, PercentError> {
        if value.is_finite() && (0.0..=100.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PercentError::OutOfRange(value))
        }
    }

    /// Clamps any finite value into range; NaN becomes zero.
    #[must_use]
    pub fn saturating(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 100.0))
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// True once the completion threshold is reached.
    #[must_use]
    pub fn is_complete(self) -> bool {
        self.0 >= COMPLETION_THRESHOLD
    }

    /// Nearest whole percent, for progress bars and dashboard cards.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn rounded(self) -> u8 {
        self.0.round() as u8
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.rounded())
    }
}

/// Share of `duration` covered by `position`, both in seconds.
///
/// Returns `None` when the duration is zero, negative, or not yet known (NaN or
/// infinite, as a media element reports before metadata loads). A position that
/// is not a usable number reads as the start of the video.
#[must_use]
pub fn percent_complete(position: f64, duration: f64) -> Option<Percent> {
    if !duration.is_finite() || duration <= 0.0 {
        return None;
    }
    let position = if position.is_finite() { position.max(0.0) } else { 0.0 };
    Some(Percent::saturating(position / duration * 100.0))
}

/// Formats a playback offset as `m:ss`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Formats a course length given in minutes as `1h 5m` or `45m`.
#[must_use]
pub fn format_course_length(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}
