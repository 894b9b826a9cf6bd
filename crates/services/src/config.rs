use std::time::Duration;

/// How often the player writes progress while a video is playing.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(10);

/// Player tuning knobs. The binary fills these from flags and environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerConfig {
    sync_interval: Duration,
    skip_step: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            sync_interval: DEFAULT_SYNC_INTERVAL,
            skip_step: Duration::from_secs(10),
        }
    }
}

impl PlayerConfig {
    /// Overrides the sync period. A zero period falls back to the default,
    /// since a zero-length interval would spin.
    #[must_use]
    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = if interval.is_zero() {
            DEFAULT_SYNC_INTERVAL
        } else {
            interval
        };
        self
    }

    #[must_use]
    pub fn sync_interval(&self) -> Duration {
        self.sync_interval
    }

    /// Distance covered by the skip-forward and rewind buttons.
    #[must_use]
    pub fn skip_step(&self) -> Duration {
        self.skip_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_keeps_default() {
        let config = PlayerConfig::default().with_sync_interval(Duration::ZERO);
        assert_eq!(config.sync_interval(), DEFAULT_SYNC_INTERVAL);
        let config = config.with_sync_interval(Duration::from_secs(3));
        assert_eq!(config.sync_interval(), Duration::from_secs(3));
    }
}
