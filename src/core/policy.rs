use crate::config::Config;
use chrono::Duration;

/// Timing thresholds of the check workflow.
///
/// The defaults are product values: 30-minute cadence, Due for the first 10
/// minutes, Missed once the next slot would be due, reminders up to two hours
/// after the event ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckPolicy {
    pub interval_minutes: i64,
    pub grace_minutes: i64,
    pub missed_after_minutes: i64,
    pub post_event_grace_minutes: i64,
}

impl Default for CheckPolicy {
    fn default() -> Self {
        Self {
            interval_minutes: 30,
            grace_minutes: 10,
            missed_after_minutes: 30,
            post_event_grace_minutes: 120,
        }
    }
}

impl CheckPolicy {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            interval_minutes: cfg.check_interval_minutes,
            grace_minutes: cfg.grace_minutes,
            missed_after_minutes: cfg.missed_after_minutes,
            post_event_grace_minutes: cfg.post_event_grace_minutes,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::minutes(self.interval_minutes)
    }

    pub fn grace(&self) -> Duration {
        Duration::minutes(self.grace_minutes)
    }

    pub fn missed_after(&self) -> Duration {
        Duration::minutes(self.missed_after_minutes)
    }

    pub fn post_event_grace(&self) -> Duration {
        Duration::minutes(self.post_event_grace_minutes)
    }
}
