use std::time::Duration;

use crate::constants::{DEFAULT_STATS_INTERVAL_SECS, RESPONSE_TIME_WINDOW};

#[derive(Debug, Clone)]
pub struct StatsConfig {
    /// Sampling period of the monitor task. Default: 5s.
    pub interval: Duration,
    /// Number of response-time samples kept. Default: `1000`.
    pub window: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_STATS_INTERVAL_SECS),
            window: RESPONSE_TIME_WINDOW,
        }
    }
}

impl StatsConfig {
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }
}
