use std::sync::{Arc, Mutex, MutexGuard};

/// Transport events a media element emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    LoadedMetadata,
    TimeUpdate,
    Play,
    Pause,
    Ended,
}

/// The seam to whatever renders the video.
///
/// Reads are live: `current_time` and `duration` answer from the element
/// itself, not from any mirrored display state. `duration` is NaN until
/// metadata has loaded, like a browser media element.
pub trait MediaElement: Send + Sync {
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn seek(&self, to: f64);
    fn play(&self);
    fn pause(&self);
    fn is_paused(&self) -> bool;
}

#[derive(Debug)]
struct SimState {
    position: f64,
    duration: f64,
    paused: bool,
}

/// A media element driven by hand: tests and the CLI advance it explicitly.
#[derive(Debug, Clone)]
pub struct SimulatedMedia {
    state: Arc<Mutex<SimState>>,
}

impl Default for SimulatedMedia {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedMedia {
    /// An element whose metadata has not loaded yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                position: 0.0,
                duration: f64::NAN,
                paused: true,
            })),
        }
    }

    #[must_use]
    pub fn with_duration(duration: f64) -> Self {
        let media = Self::new();
        media.set_duration(duration);
        media
    }

    // A poisoned lock only means a panicking test thread; the state itself is plain data.
    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn set_duration(&self, duration: f64) {
        self.lock().duration = duration;
    }

    /// Moves the playhead forward if playing. Returns `true` when this reached the end.
    pub fn advance(&self, seconds: f64) -> bool {
        let mut state = self.lock();
        if state.paused {
            return false;
        }
        let end = if state.duration.is_finite() {
            state.duration
        } else {
            f64::INFINITY
        };
        state.position = (state.position + seconds).min(end);
        if state.position >= end {
            state.paused = true;
            return true;
        }
        false
    }
}

impl MediaElement for SimulatedMedia {
    fn current_time(&self) -> f64 {
        self.lock().position
    }

    fn duration(&self) -> f64 {
        self.lock().duration
    }

    fn seek(&self, to: f64) {
        let mut state = self.lock();
        let upper = if state.duration.is_finite() {
            state.duration
        } else {
            f64::INFINITY
        };
        state.position = if to.is_finite() { to.clamp(0.0, upper) } else { 0.0 };
    }

    fn play(&self) {
        self.lock().paused = false;
    }

    fn pause(&self) {
        self.lock().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.lock().paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_only_while_playing_and_stops_at_end() {
        let media = SimulatedMedia::with_duration(20.0);
        assert!(!media.advance(5.0));
        assert_eq!(media.current_time(), 0.0);

        media.play();
        assert!(!media.advance(15.0));
        assert!(media.advance(15.0));
        assert_eq!(media.current_time(), 20.0);
        assert!(media.is_paused());
    }

    #[test]
    fn seek_clamps_to_known_duration() {
        let media = SimulatedMedia::with_duration(100.0);
        media.seek(250.0);
        assert_eq!(media.current_time(), 100.0);
        media.seek(-3.0);
        assert_eq!(media.current_time(), 0.0);
    }

    #[test]
    fn duration_is_unknown_before_metadata() {
        assert!(SimulatedMedia::new().duration().is_nan());
    }
}
