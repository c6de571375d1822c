//! Scenario configuration parser.
//!
//! A scenario file replaces the demo's control panel: it fixes the
//! workload's per-pod CPU request/limit, the HPA bounds and target, the
//! fleet's startup/shutdown delays, the tick cadence and the load profile.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::duration::{format_duration, parse_duration};
use crate::error::{ConfigError, ConfigResult};
use crate::load::LoadProfile;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub workload: WorkloadConfig,
    pub hpa: HpaConfig,
    pub fleet: FleetConfig,
    pub simulation: SimulationConfig,
    pub load: LoadProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Replica count at tick 0.
    pub initial_replicas: u32,
    /// Millicores reserved per pod.
    pub pod_cpu_request: u64,
    /// Millicores a pod may consume at most.
    pub pod_cpu_limit: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HpaConfig {
    pub min_replicas: u32,
    pub max_replicas: u32,
    /// Target utilization, percent of the CPU request.
    pub target_cpu_utilization: u32,
    /// Half-width of the no-scaling band around a usage ratio of 1.0.
    pub tolerance: f64,
    /// Minimum time between applied scale-downs (e.g., "300s").
    pub scale_down_stabilization: String,
    /// The autoscaler runs once every this many ticks.
    pub evaluation_period_ticks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Time a pod spends in Starting (e.g., "30s").
    pub startup: String,
    /// Grace period of a Terminating pod (e.g., "20s").
    pub shutdown: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Wall-clock length of one tick.
    pub tick: String,
    /// Points kept per chart history.
    pub history_size: usize,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            initial_replicas: 1,
            pod_cpu_request: 500,
            pod_cpu_limit: 1000,
        }
    }
}

impl Default for HpaConfig {
    fn default() -> Self {
        Self {
            min_replicas: 1,
            max_replicas: 10,
            target_cpu_utilization: 80,
            tolerance: 0.1,
            scale_down_stabilization: "300s".to_string(),
            evaluation_period_ticks: 15,
        }
    }
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            startup: "30s".to_string(),
            shutdown: "20s".to_string(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick: "1s".to_string(),
            history_size: 300,
        }
    }
}

/// A scenario with every duration parsed and every field checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub initial_replicas: u32,
    pub pod_cpu_request: u64,
    pub pod_cpu_limit: u64,
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub target_cpu_utilization: u32,
    pub tolerance: f64,
    pub scale_down_stabilization: Duration,
    pub evaluation_period_ticks: u32,
    pub startup: Duration,
    pub shutdown: Duration,
    pub tick: Duration,
    pub history_size: usize,
    pub load: LoadProfile,
}

impl ScenarioConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Build a scenario around a given per-pod request and HPA range,
    /// keeping defaults for everything else.
    pub fn scaffold(pod_cpu_request: u64, min_replicas: u32, max_replicas: u32) -> Self {
        ScenarioConfig {
            workload: WorkloadConfig {
                initial_replicas: min_replicas.max(1),
                pod_cpu_request,
                pod_cpu_limit: pod_cpu_request.saturating_mul(2),
            },
            hpa: HpaConfig {
                min_replicas,
                max_replicas,
                ..HpaConfig::default()
            },
            ..ScenarioConfig::default()
        }
    }

    /// Check every field and parse durations.
    ///
    /// Inconsistent-but-survivable settings (see [`ScenarioConfig::warnings`])
    /// are accepted here.
    pub fn validate(&self) -> ConfigResult<Settings> {
        let w = &self.workload;
        let h = &self.hpa;

        if w.initial_replicas == 0 {
            return Err(invalid("workload.initial_replicas", "must be at least 1"));
        }
        if w.pod_cpu_request == 0 {
            return Err(invalid("workload.pod_cpu_request", "must be greater than zero"));
        }
        if w.pod_cpu_limit == 0 {
            return Err(invalid("workload.pod_cpu_limit", "must be greater than zero"));
        }
        if h.min_replicas == 0 {
            return Err(invalid("hpa.min_replicas", "must be at least 1"));
        }
        if h.max_replicas == 0 {
            return Err(invalid("hpa.max_replicas", "must be at least 1"));
        }
        if h.target_cpu_utilization == 0 {
            return Err(invalid("hpa.target_cpu_utilization", "must be greater than zero"));
        }
        if !(0.0..1.0).contains(&h.tolerance) {
            return Err(invalid("hpa.tolerance", "must be in [0, 1)"));
        }
        if h.evaluation_period_ticks == 0 {
            return Err(invalid("hpa.evaluation_period_ticks", "must be at least 1"));
        }
        if self.simulation.history_size == 0 {
            return Err(invalid("simulation.history_size", "must be at least 1"));
        }
        if !self.load.is_ordered() {
            return Err(invalid("load.steps", "at_tick values must be strictly ascending"));
        }

        let tick = duration_field("simulation.tick", &self.simulation.tick)?;
        if tick.is_zero() {
            return Err(invalid("simulation.tick", "must be greater than zero"));
        }

        Ok(Settings {
            initial_replicas: w.initial_replicas,
            pod_cpu_request: w.pod_cpu_request,
            pod_cpu_limit: w.pod_cpu_limit,
            min_replicas: h.min_replicas,
            max_replicas: h.max_replicas,
            target_cpu_utilization: h.target_cpu_utilization,
            tolerance: h.tolerance,
            scale_down_stabilization: duration_field(
                "hpa.scale_down_stabilization",
                &h.scale_down_stabilization,
            )?,
            evaluation_period_ticks: h.evaluation_period_ticks,
            startup: duration_field("fleet.startup", &self.fleet.startup)?,
            shutdown: duration_field("fleet.shutdown", &self.fleet.shutdown)?,
            tick,
            history_size: self.simulation.history_size,
            load: self.load.clone(),
        })
    }

    /// Settings that are accepted but probably not what the author meant.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let w = &self.workload;
        let h = &self.hpa;

        if h.min_replicas > h.max_replicas {
            warnings.push(format!(
                "hpa.min_replicas ({}) is greater than hpa.max_replicas ({}); max wins",
                h.min_replicas, h.max_replicas
            ));
        }
        if w.pod_cpu_limit < w.pod_cpu_request {
            warnings.push(format!(
                "workload.pod_cpu_limit ({}) is below workload.pod_cpu_request ({})",
                w.pod_cpu_limit, w.pod_cpu_request
            ));
        }
        if w.initial_replicas < h.min_replicas || w.initial_replicas > h.max_replicas {
            warnings.push(format!(
                "workload.initial_replicas ({}) is outside [{}, {}]",
                w.initial_replicas, h.min_replicas, h.max_replicas
            ));
        }
        warnings
    }
}

impl Settings {
    /// Render durations back into scenario-file form, for logs.
    pub fn describe_timing(&self) -> String {
        format!(
            "tick={} startup={} shutdown={} stabilization={}",
            format_duration(self.tick),
            format_duration(self.startup),
            format_duration(self.shutdown),
            format_duration(self.scale_down_stabilization),
        )
    }
}

fn duration_field(field: &'static str, value: &str) -> ConfigResult<Duration> {
    parse_duration(value).ok_or_else(|| ConfigError::InvalidDuration {
        field,
        value: value.to_string(),
    })
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
