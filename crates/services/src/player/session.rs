use std::sync::Arc;

use edustream_core::model::Course;

use crate::config::PlayerConfig;

use super::media::{MediaElement, MediaEvent};
use super::observer::{PlaybackObserver, PlaybackState};
use super::sampler::{ProgressSampler, SamplerState};

/// A loaded player view: the course, its media element, and the machinery
/// that keeps display state and stored progress in step with it.
///
/// Dropping the session cancels any pending progress writes.
pub struct PlayerSession {
    course: Course,
    media: Arc<dyn MediaElement>,
    observer: PlaybackObserver,
    sampler: Option<ProgressSampler>,
    config: PlayerConfig,
    completed_on_load: bool,
}

impl PlayerSession {
    pub(crate) fn new(
        course: Course,
        media: Arc<dyn MediaElement>,
        observer: PlaybackObserver,
        sampler: Option<ProgressSampler>,
        config: PlayerConfig,
        completed_on_load: bool,
    ) -> Self {
        Self {
            course,
            media,
            observer,
            sampler,
            config,
            completed_on_load,
        }
    }

    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.observer.state()
    }

    /// Feed one element event through the observer and drive the sampler.
    ///
    /// Playing starts sampling; pausing or reaching the end stops it.
    pub fn handle_event(&mut self, event: MediaEvent) {
        self.observer.handle(event, self.media.as_ref());
        let Some(sampler) = self.sampler.as_mut() else {
            return;
        };
        match event {
            MediaEvent::Play => sampler.start(),
            MediaEvent::Pause | MediaEvent::Ended => sampler.stop(),
            MediaEvent::LoadedMetadata | MediaEvent::TimeUpdate => {}
        }
    }

    pub fn toggle_play(&mut self) {
        if self.media.is_paused() {
            self.media.play();
            self.handle_event(MediaEvent::Play);
        } else {
            self.media.pause();
            self.handle_event(MediaEvent::Pause);
        }
    }

    /// Jump to `seconds`, clamped to the known duration.
    pub fn seek(&mut self, seconds: f64) {
        let duration = self.observer.state().duration;
        let target = if duration > 0.0 {
            seconds.clamp(0.0, duration)
        } else {
            seconds.max(0.0)
        };
        self.media.seek(target);
        self.handle_event(MediaEvent::TimeUpdate);
    }

    pub fn skip_forward(&mut self) {
        let step = self.config.skip_step().as_secs_f64();
        self.seek(self.media.current_time() + step);
    }

    pub fn rewind(&mut self) {
        let step = self.config.skip_step().as_secs_f64();
        self.seek(self.media.current_time() - step);
    }

    /// Whether progress for this course has been stored as complete, either
    /// before this session or by one of its writes.
    #[must_use]
    pub fn is_course_complete(&self) -> bool {
        match &self.sampler {
            Some(sampler) => sampler.is_course_complete(),
            None => self.completed_on_load,
        }
    }

    /// Waits for a progress write that is already running. Call after pausing
    /// so the stored position and completion flag are final.
    pub async fn settle(&self) {
        if let Some(sampler) = &self.sampler {
            sampler.settle().await;
        }
    }

    /// `Idle` also when the session has no progress record to write to.
    #[must_use]
    pub fn sampler_state(&self) -> SamplerState {
        self.sampler
            .as_ref()
            .map_or(SamplerState::Idle, ProgressSampler::state)
    }

    /// `false` when there was no progress record at load time; playback then
    /// works but nothing is saved.
    #[must_use]
    pub fn saves_progress(&self) -> bool {
        self.sampler.is_some()
    }
}
