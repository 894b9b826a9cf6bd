use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, warn};

use super::sync::{ProgressSync, TickOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Idle,
    Sampling,
}

/// Aborts the sampling loop when dropped. Writes already spawned keep running.
struct SamplingHandle(JoinHandle<()>);

impl Drop for SamplingHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Periodic progress writer, active only while the video plays.
///
/// The first write happens one full period after `start`. A tick that finds
/// the previous write still running is skipped rather than queued.
pub struct ProgressSampler {
    sync: ProgressSync,
    period: Duration,
    task: Option<SamplingHandle>,
    // One permit: held by the write task for as long as it runs.
    in_flight: Arc<Semaphore>,
}

impl ProgressSampler {
    #[must_use]
    pub fn new(sync: ProgressSync, period: Duration) -> Self {
        Self {
            sync,
            period,
            task: None,
            in_flight: Arc::new(Semaphore::new(1)),
        }
    }

    /// Begin sampling. A second call while sampling is a no-op, so there is
    /// never more than one timer per session.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.task.is_some() {
            return;
        }
        let target = self.sync.target();
        debug!(course_id = %target.course_id, period = ?self.period, "progress sampling started");
        let handle = tokio::spawn(sample(
            self.sync.clone(),
            self.period,
            self.in_flight.clone(),
        ));
        self.task = Some(SamplingHandle(handle));
    }

    /// Cancel future ticks. Idempotent. A write that already started is left
    /// to finish; use [`settle`](Self::settle) to wait for it.
    pub fn stop(&mut self) {
        if self.task.take().is_some() {
            debug!(course_id = %self.sync.target().course_id, "progress sampling stopped");
        }
    }

    /// Resolves once no progress write is running.
    ///
    /// Returns immediately when nothing is in flight. While sampling, a later
    /// tick may start another write right after this returns.
    pub async fn settle(&self) {
        // The semaphore is never closed, so acquiring only waits.
        if let Ok(permit) = self.in_flight.acquire().await {
            drop(permit);
        }
    }

    #[must_use]
    pub fn state(&self) -> SamplerState {
        if self.task.is_some() {
            SamplerState::Sampling
        } else {
            SamplerState::Idle
        }
    }

    /// Whether a write has ever recorded the course as complete.
    #[must_use]
    pub fn is_course_complete(&self) -> bool {
        self.sync.is_completed()
    }
}

async fn sample(sync: ProgressSync, period: Duration, in_flight: Arc<Semaphore>) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Ok(permit) = in_flight.clone().try_acquire_owned() else {
            debug!("previous progress write still running; skipping tick");
            continue;
        };
        let sync = sync.clone();
        tokio::spawn(async move {
            let _permit = permit;
            match sync.tick().await {
                Ok(TickOutcome::Skipped) => debug!("duration unknown; nothing to sync"),
                Ok(TickOutcome::Synced {
                    percent, completed, ..
                }) => debug!(%percent, completed, "progress synced"),
                Err(e) => warn!(error = %e, "progress sync failed"),
            }
        });
    }
}
