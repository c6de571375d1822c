//! A single simulated pod.

use std::time::{Duration, Instant};

use hpa_core::PodStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pod {
    status: PodStatus,
    last_status_change: Instant,
}

impl Pod {
    /// A pod that has just been created.
    pub fn starting(now: Instant) -> Self {
        Self {
            status: PodStatus::Starting,
            last_status_change: now,
        }
    }

    /// A pod that is already serving, e.g. when seeding a fleet.
    pub fn running(now: Instant) -> Self {
        Self {
            status: PodStatus::Running,
            last_status_change: now,
        }
    }

    pub fn status(&self) -> PodStatus {
        self.status
    }

    pub fn last_status_change(&self) -> Instant {
        self.last_status_change
    }

    /// Time spent in the current status. Zero if `now` is before the stamp.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_status_change)
    }

    pub(crate) fn transition(&mut self, status: PodStatus, now: Instant) {
        self.status = status;
        self.last_status_change = now;
    }
}
