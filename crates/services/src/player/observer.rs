use edustream_core::playback::{Percent, format_clock, percent_complete};

use super::media::{MediaElement, MediaEvent};

/// Display copy of the media element's transport state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackState {
    pub current_time: f64,
    /// Zero until metadata reports a usable duration.
    pub duration: f64,
    pub playing: bool,
}

impl PlaybackState {
    /// Progress bar value; zero while the duration is unknown.
    #[must_use]
    pub fn percent(&self) -> Percent {
        percent_complete(self.current_time, self.duration).unwrap_or(Percent::ZERO)
    }

    /// `elapsed / total` as shown under the video.
    #[must_use]
    pub fn time_label(&self) -> String {
        format!(
            "{} / {}",
            format_clock(self.current_time),
            format_clock(self.duration)
        )
    }
}

/// Mirrors the element into `PlaybackState` on every event. Purely reactive.
#[derive(Debug, Default)]
pub struct PlaybackObserver {
    state: PlaybackState,
}

impl PlaybackObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn handle(&mut self, event: MediaEvent, media: &dyn MediaElement) {
        match event {
            MediaEvent::LoadedMetadata | MediaEvent::TimeUpdate => self.refresh(media),
            MediaEvent::Play => {
                self.refresh(media);
                self.state.playing = true;
            }
            MediaEvent::Pause | MediaEvent::Ended => {
                self.refresh(media);
                self.state.playing = false;
            }
        }
    }

    /// Re-reads position and duration from the element.
    pub fn refresh(&mut self, media: &dyn MediaElement) {
        let position = media.current_time();
        self.state.current_time = if position.is_finite() { position } else { 0.0 };
        let duration = media.duration();
        self.state.duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };
    }
}
