//! Tick-driven control loop.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use hpa_autoscale::{
    Resolution, ScalingDecision, ScalingPolicy, StabilizationState, evaluate, resolve,
};
use hpa_core::{MetricsSnapshot, PodCounts, ScenarioConfig, Settings};
use hpa_fleet::Deployment;

use crate::error::SimResult;
use crate::history::History;

/// The fleet never drops below this many replicas; with zero pods there is
/// no utilization to measure and the autoscaler could not bring it back.
pub const MIN_FLEET_REPLICAS: u32 = 1;

/// One autoscaler run and what came of it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub decision: ScalingDecision,
    pub resolution: Resolution,
}

/// Everything observable about one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickSample {
    /// Zero-based tick index.
    pub tick: u64,
    pub cpu_usage: u64,
    /// Replica count in force after this tick's evaluation, if any.
    pub replicas: u32,
    pub pod_load: u64,
    pub unmet_load: u64,
    pub pods: PodCounts,
    pub evaluation: Option<Evaluation>,
}

#[derive(Debug)]
pub struct Controller {
    settings: Settings,
    policy: ScalingPolicy,
    /// Replica count the autoscaler last settled on.
    replicas: u32,
    tick: u64,
    ticks_since_evaluation: u32,
    stabilization: StabilizationState,
    deployment: Deployment,
    history: History,
    /// Next instant handed out by [`Controller::simulate`].
    clock: Instant,
}

impl Controller {
    /// Validate `config` and seed a fleet of `initial_replicas` Running pods
    /// at `now`.
    pub fn new(config: &ScenarioConfig, now: Instant) -> SimResult<Self> {
        for warning in config.warnings() {
            warn!(%warning, "scenario warning");
        }
        let settings = config.validate()?;
        Ok(Self::from_settings(settings, now))
    }

    pub fn from_settings(settings: Settings, now: Instant) -> Self {
        info!(
            replicas = settings.initial_replicas,
            min = settings.min_replicas,
            max = settings.max_replicas,
            target = settings.target_cpu_utilization,
            timing = %settings.describe_timing(),
            "simulation initialized"
        );

        let deployment = Deployment::with_running(
            settings.initial_replicas,
            now,
            settings.startup,
            settings.shutdown,
        );

        Self {
            policy: ScalingPolicy::with_tolerance(settings.tolerance),
            replicas: settings.initial_replicas,
            tick: 0,
            ticks_since_evaluation: 0,
            stabilization: StabilizationState::new(),
            deployment,
            history: History::new(settings.history_size),
            clock: now,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn replicas(&self) -> u32 {
        self.replicas
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn resize_history(&mut self, len: usize) {
        self.history.resize(len);
    }

    /// Override the replica count by hand, as if an operator scaled the
    /// workload. The autoscaler continues from the new value, floored at
    /// [`MIN_FLEET_REPLICAS`].
    pub fn set_replicas(&mut self, replicas: u32) {
        let replicas = floor_replicas(replicas);
        info!(from = self.replicas, to = replicas, "replicas set manually");
        self.replicas = replicas;
        self.deployment.scale(replicas);
    }

    /// The metrics the autoscaler would see right now for `total_cpu_usage`.
    pub fn snapshot(&self, total_cpu_usage: u64) -> MetricsSnapshot {
        MetricsSnapshot {
            current_pods: self.replicas,
            total_cpu_usage,
            pod_cpu_limit: self.settings.pod_cpu_limit,
            pod_cpu_request: self.settings.pod_cpu_request,
            target_utilization_percent: self.settings.target_cpu_utilization,
            min_replicas: self.settings.min_replicas,
            max_replicas: self.settings.max_replicas,
        }
    }

    /// Run the autoscaler once and apply the result if it is not vetoed.
    pub fn evaluate(&mut self, total_cpu_usage: u64, now: Instant) -> SimResult<Evaluation> {
        let metrics = self.snapshot(total_cpu_usage);
        metrics.validate()?;

        let decision = evaluate(&metrics, &self.policy);
        let mut resolution = resolve(
            &decision,
            self.replicas,
            self.settings.scale_down_stabilization,
            &mut self.stabilization,
            now,
        );

        if resolution.applied {
            resolution.replicas = floor_replicas(resolution.replicas);
            self.replicas = resolution.replicas;
            self.deployment.scale(self.replicas);
        }

        Ok(Evaluation {
            decision,
            resolution,
        })
    }

    /// Advance one tick at `now`.
    ///
    /// `now` is used for both the stabilization check and the fleet
    /// reconciliation of this tick.
    pub fn tick(&mut self, now: Instant) -> TickSample {
        let tick = self.tick;
        self.tick += 1;
        let cpu_usage = self.settings.load.usage_at(tick);

        self.ticks_since_evaluation += 1;
        let evaluation = if self.ticks_since_evaluation >= self.settings.evaluation_period_ticks {
            self.ticks_since_evaluation = 0;
            match self.evaluate(cpu_usage, now) {
                Ok(evaluation) => Some(evaluation),
                Err(e) => {
                    warn!(tick, error = %e, "skipping hpa evaluation");
                    None
                }
            }
        } else {
            None
        };

        self.deployment.reconcile(now);

        let (pod_load, unmet_load) =
            split_load(cpu_usage, self.replicas, self.settings.pod_cpu_limit);
        self.history.push(self.replicas, pod_load, unmet_load);

        let pods = self.deployment.counts();
        debug!(
            tick,
            cpu_usage,
            replicas = self.replicas,
            pod_load,
            unmet_load,
            running = pods.running,
            "tick"
        );

        TickSample {
            tick,
            cpu_usage,
            replicas: self.replicas,
            pod_load,
            unmet_load,
            pods,
            evaluation,
        }
    }

    /// Run `ticks` ticks on a virtual clock that starts at the instant given
    /// to [`Controller::new`] and advances by the configured tick length.
    pub fn simulate(&mut self, ticks: u64) -> Vec<TickSample> {
        let mut samples = Vec::new();
        for _ in 0..ticks {
            let now = self.clock;
            samples.push(self.tick(now));
            self.clock = now + self.settings.tick;
        }
        samples
    }
}

fn floor_replicas(replicas: u32) -> u32 {
    if replicas < MIN_FLEET_REPLICAS {
        warn!(
            requested = replicas,
            applied = MIN_FLEET_REPLICAS,
            "refusing to scale the fleet to zero"
        );
    }
    replicas.max(MIN_FLEET_REPLICAS)
}

/// Split total usage into what each pod absorbs (capped at the limit) and
/// what is left over.
pub fn split_load(total_cpu_usage: u64, replicas: u32, pod_cpu_limit: u64) -> (u64, u64) {
    if replicas == 0 {
        return (0, total_cpu_usage);
    }
    let usage = total_cpu_usage as f64;
    let pods = f64::from(replicas);
    let per_pod = (usage / pods).min(pod_cpu_limit as f64);
    let unmet = usage - per_pod * pods;
    // float -> int casts truncate and saturate negatives to 0
    (per_pod as u64, unmet as u64)
}
