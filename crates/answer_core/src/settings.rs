use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(300);
pub const DEFAULT_STALE_TIMEOUT: Duration = Duration::from_millis(60_000);
pub const DEFAULT_TYPE_SPEED: Duration = Duration::from_millis(10);

/// Timing knobs for polling, stall detection and text reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSettings {
    pub poll_interval: Duration,
    pub stale_timeout: Duration,
    pub type_speed: Duration,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            stale_timeout: DEFAULT_STALE_TIMEOUT,
            type_speed: DEFAULT_TYPE_SPEED,
        }
    }
}
