//! Deployment reconciliation.

use std::time::{Duration, Instant};

use tracing::debug;

use hpa_core::{PodCounts, PodStatus};

use crate::pod::Pod;

/// What one reconciliation changed.
///
/// After a pass, `total == previous_total - expired + created`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Starting pods promoted to Running.
    pub promoted: usize,
    /// Terminating pods removed after their grace period.
    pub expired: usize,
    /// Running pods flipped to Terminating.
    pub terminated: usize,
    /// New Starting pods appended.
    pub created: usize,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// The simulated pods of one workload and the replica count they converge to.
///
/// Not shareable between concurrent reconciliations; give each simulated
/// fleet its own `Deployment`.
#[derive(Debug, Clone)]
pub struct Deployment {
    pods: Vec<Pod>,
    desired_replicas: u32,
    startup_duration: Duration,
    shutdown_duration: Duration,
}

impl Deployment {
    /// An empty deployment with no desired replicas.
    pub fn new(startup_duration: Duration, shutdown_duration: Duration) -> Self {
        Self {
            pods: Vec::new(),
            desired_replicas: 0,
            startup_duration,
            shutdown_duration,
        }
    }

    /// A deployment already serving `replicas` Running pods.
    pub fn with_running(
        replicas: u32,
        now: Instant,
        startup_duration: Duration,
        shutdown_duration: Duration,
    ) -> Self {
        Self {
            pods: (0..replicas).map(|_| Pod::running(now)).collect(),
            desired_replicas: replicas,
            startup_duration,
            shutdown_duration,
        }
    }

    /// Set the replica count the next reconciliation converges to.
    pub fn scale(&mut self, replicas: u32) {
        if replicas != self.desired_replicas {
            debug!(from = self.desired_replicas, to = replicas, "deployment scaled");
        }
        self.desired_replicas = replicas;
    }

    pub fn desired_replicas(&self) -> u32 {
        self.desired_replicas
    }

    /// Number of pods in any status.
    pub fn replicas(&self) -> usize {
        self.pods.len()
    }

    pub fn pods(&self) -> &[Pod] {
        &self.pods
    }

    pub fn startup_duration(&self) -> Duration {
        self.startup_duration
    }

    pub fn shutdown_duration(&self) -> Duration {
        self.shutdown_duration
    }

    pub fn counts(&self) -> PodCounts {
        PodCounts::tally(self.pods.iter().map(Pod::status))
    }

    /// Move the pod list one step toward `desired_replicas`.
    ///
    /// 1. expire Terminating pods whose grace period elapsed, promote
    ///    Starting pods whose startup elapsed, count Running pods;
    /// 2. flip the first `running - desired` Running pods to Terminating;
    /// 3. append Starting pods until the list holds `desired` pods.
    ///
    /// Starting and Running pods are never dropped here. Calling this twice
    /// with the same `now` changes nothing the second time unless the
    /// shutdown duration is zero.
    pub fn reconcile(&mut self, now: Instant) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let desired = self.desired_replicas as usize;

        let mut pods = Vec::with_capacity(self.pods.len().max(desired));
        let mut running = 0usize;

        for mut pod in std::mem::take(&mut self.pods) {
            match pod.status() {
                PodStatus::Terminating => {
                    if pod.age(now) >= self.shutdown_duration {
                        report.expired += 1;
                        continue;
                    }
                }
                PodStatus::Starting => {
                    if pod.age(now) > self.startup_duration {
                        pod.transition(PodStatus::Running, now);
                        report.promoted += 1;
                        running += 1;
                    }
                }
                PodStatus::Running => running += 1,
            }
            pods.push(pod);
        }

        let mut excess = running.saturating_sub(desired);
        for pod in pods.iter_mut() {
            if excess == 0 {
                break;
            }
            if pod.status() == PodStatus::Running {
                pod.transition(PodStatus::Terminating, now);
                report.terminated += 1;
                excess -= 1;
            }
        }

        let deficit = desired.saturating_sub(pods.len());
        pods.extend((0..deficit).map(|_| Pod::starting(now)));
        report.created = deficit;

        self.pods = pods;

        if !report.is_noop() {
            let counts = self.counts();
            debug!(
                desired,
                promoted = report.promoted,
                expired = report.expired,
                terminated = report.terminated,
                created = report.created,
                starting = counts.starting,
                running = counts.running,
                terminating = counts.terminating,
                "deployment reconciled"
            );
        }

        report
    }
}
