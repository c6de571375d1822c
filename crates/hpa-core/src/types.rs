//! Domain types shared by the autoscaler, the fleet simulator and the
//! control loop.

use serde::{Deserialize, Serialize};

use crate::error::MetricsError;

// ── Metrics ───────────────────────────────────────────────────────

/// Point-in-time inputs for one autoscaler evaluation.
///
/// CPU quantities are in millicores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Replica count fed into the formula.
    pub current_pods: u32,
    /// Aggregate measured CPU usage across all pods.
    pub total_cpu_usage: u64,
    /// Per-pod CPU ceiling.
    pub pod_cpu_limit: u64,
    /// Per-pod CPU reservation.
    pub pod_cpu_request: u64,
    /// Target average utilization, as a percentage of the request.
    pub target_utilization_percent: u32,
    pub min_replicas: u32,
    pub max_replicas: u32,
}

impl MetricsSnapshot {
    /// Reject snapshots that would make the formula divide by zero.
    pub fn validate(&self) -> Result<(), MetricsError> {
        if self.current_pods == 0 {
            return Err(MetricsError::ZeroPods);
        }
        if self.pod_cpu_request == 0 {
            return Err(MetricsError::ZeroCpuRequest);
        }
        if self.pod_cpu_limit == 0 {
            return Err(MetricsError::ZeroCpuLimit);
        }
        if self.target_utilization_percent == 0 {
            return Err(MetricsError::ZeroTarget);
        }
        Ok(())
    }

    /// True when `min_replicas > max_replicas`.
    pub fn has_inconsistent_bounds(&self) -> bool {
        self.min_replicas > self.max_replicas
    }
}

// ── Pods ──────────────────────────────────────────────────────────

/// Lifecycle status of a simulated pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PodStatus {
    Starting,
    Running,
    Terminating,
}

impl std::fmt::Display for PodStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PodStatus::Starting => write!(f, "starting"),
            PodStatus::Running => write!(f, "running"),
            PodStatus::Terminating => write!(f, "terminating"),
        }
    }
}

/// Aggregate pod counts for a fleet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodCounts {
    pub starting: usize,
    pub running: usize,
    pub terminating: usize,
    pub total: usize,
}

impl PodCounts {
    /// Tally a sequence of statuses.
    pub fn tally<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = PodStatus>,
    {
        let mut counts = PodCounts::default();
        for status in statuses {
            match status {
                PodStatus::Starting => counts.starting += 1,
                PodStatus::Running => counts.running += 1,
                PodStatus::Terminating => counts.terminating += 1,
            }
            counts.total += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> MetricsSnapshot {
        MetricsSnapshot {
            current_pods: 2,
            total_cpu_usage: 180,
            pod_cpu_limit: 600,
            pod_cpu_request: 100,
            target_utilization_percent: 80,
            min_replicas: 1,
            max_replicas: 10,
        }
    }

    #[test]
    fn valid_snapshot_passes() {
        assert_eq!(snapshot().validate(), Ok(()));
    }

    #[test]
    fn zero_pods_rejected() {
        let snap = MetricsSnapshot { current_pods: 0, ..snapshot() };
        assert_eq!(snap.validate(), Err(MetricsError::ZeroPods));
    }

    #[test]
    fn zero_request_rejected() {
        let snap = MetricsSnapshot { pod_cpu_request: 0, ..snapshot() };
        assert_eq!(snap.validate(), Err(MetricsError::ZeroCpuRequest));
    }

    #[test]
    fn zero_limit_and_target_rejected() {
        let snap = MetricsSnapshot { pod_cpu_limit: 0, ..snapshot() };
        assert_eq!(snap.validate(), Err(MetricsError::ZeroCpuLimit));

        let snap = MetricsSnapshot { target_utilization_percent: 0, ..snapshot() };
        assert_eq!(snap.validate(), Err(MetricsError::ZeroTarget));
    }

    #[test]
    fn inconsistent_bounds_detected() {
        let snap = MetricsSnapshot { min_replicas: 10, max_replicas: 5, ..snapshot() };
        assert!(snap.has_inconsistent_bounds());
        assert!(!snapshot().has_inconsistent_bounds());
    }

    #[test]
    fn tally_counts_every_status() {
        let counts = PodCounts::tally([
            PodStatus::Running,
            PodStatus::Starting,
            PodStatus::Running,
            PodStatus::Terminating,
        ]);
        assert_eq!(
            counts,
            PodCounts { starting: 1, running: 2, terminating: 1, total: 4 }
        );
    }
}
