//! Replica count computation.
//!
//! [`evaluate`] is a pure function of the snapshot and the policy: it keeps
//! no state between calls, so the same inputs always give the same
//! decision.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use hpa_core::MetricsSnapshot;

/// Rounding allowance on the tolerance band edges.
pub const RATIO_SLACK: f64 = 4.0 * f64::EPSILON;

/// Tunables of the replica formula. `Default` holds the Kubernetes values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingPolicy {
    /// Half-width of the no-scaling band around a usage ratio of 1.0.
    pub tolerance: f64,
    /// A single evaluation may grow the fleet at most by this factor...
    pub scale_up_limit_factor: u32,
    /// ...or to this many replicas, whichever is larger.
    pub scale_up_limit_minimum: u32,
}

impl Default for ScalingPolicy {
    fn default() -> Self {
        Self {
            tolerance: 0.1,
            scale_up_limit_factor: 2,
            scale_up_limit_minimum: 4,
        }
    }
}

impl ScalingPolicy {
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    /// Highest replica count reachable from `current` in one evaluation.
    pub fn scale_up_limit(&self, current: u32) -> u32 {
        current
            .saturating_mul(self.scale_up_limit_factor)
            .max(self.scale_up_limit_minimum)
    }

    /// True when `usage_ratio` lies inside `[1 - tolerance, 1 + tolerance]`.
    ///
    /// A ratio that sits on an edge, like 720m over 800m, can round a few ulps
    /// outside it, so the edges carry [`RATIO_SLACK`].
    pub fn within_tolerance(&self, usage_ratio: f64) -> bool {
        (usage_ratio - 1.0).abs() <= self.tolerance + RATIO_SLACK
    }
}

/// A configuration problem noticed during evaluation. Never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalingWarning {
    /// `min_replicas > max_replicas`; the result was clamped to the max.
    InconsistentBounds { min_replicas: u32, max_replicas: u32 },
}

impl std::fmt::Display for ScalingWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalingWarning::InconsistentBounds {
                min_replicas,
                max_replicas,
            } => write!(
                f,
                "min replicas ({min_replicas}) is greater than max replicas ({max_replicas})"
            ),
        }
    }
}

/// Output of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingDecision {
    /// Clamped and speed-limited replica count.
    pub desired_replicas: u32,
    /// False when the usage ratio is inside the tolerance band.
    pub allowed: bool,
    /// `ceil(current_pods * usage_ratio)` before the speed limit and clamp.
    pub raw_replicas: u32,
    pub cpu_metric: f64,
    pub usage_ratio: f64,
    pub warning: Option<ScalingWarning>,
}

/// Compute the desired replica count for a snapshot.
///
/// The snapshot must satisfy [`MetricsSnapshot::validate`]; with zero pods
/// or a zero request the ratio is not finite and the result is meaningless.
pub fn evaluate(metrics: &MetricsSnapshot, policy: &ScalingPolicy) -> ScalingDecision {
    let current = metrics.current_pods;
    let pods = u64::from(current);

    // cannot actually consume more than the pods are allowed to
    let total_cpu_limit = metrics.pod_cpu_limit.saturating_mul(pods);
    let usage = metrics.total_cpu_usage.min(total_cpu_limit);

    let total_cpu_request = metrics.pod_cpu_request.saturating_mul(pods);
    let cpu_metric = usage as f64 / total_cpu_request as f64;
    let target = f64::from(metrics.target_utilization_percent) / 100.0;

    // usage / (request * target / 100), kept in integers until one division
    let scaled_usage = u128::from(usage) * 100;
    let target_usage =
        u128::from(total_cpu_request) * u128::from(metrics.target_utilization_percent);
    let usage_ratio = scaled_usage as f64 / target_usage as f64;

    let warning = metrics
        .has_inconsistent_bounds()
        .then_some(ScalingWarning::InconsistentBounds {
            min_replicas: metrics.min_replicas,
            max_replicas: metrics.max_replicas,
        });
    if let Some(w) = &warning {
        warn!(warning = %w, "inconsistent HPA bounds, max replicas wins");
    }

    if policy.within_tolerance(usage_ratio) {
        debug!(
            current,
            cpu_metric,
            usage_ratio,
            tolerance = policy.tolerance,
            "usage ratio within tolerance, not scaling"
        );
        return ScalingDecision {
            desired_replicas: current,
            allowed: false,
            raw_replicas: current,
            cpu_metric,
            usage_ratio,
            warning,
        };
    }

    // ceil(current * ratio) == ceil(usage * 100 / (pod request * target)), exactly.
    let per_pod_target =
        u128::from(metrics.pod_cpu_request) * u128::from(metrics.target_utilization_percent);
    let raw_replicas = match per_pod_target {
        0 => u32::MAX,
        divisor => u32::try_from(scaled_usage.div_ceil(divisor)).unwrap_or(u32::MAX),
    };
    let limited = raw_replicas.min(policy.scale_up_limit(current));
    let desired_replicas = clamp_replicas(limited, metrics.min_replicas, metrics.max_replicas);

    debug!(
        current,
        total_cpu_usage = usage,
        pod_cpu_request = metrics.pod_cpu_request,
        cpu_metric,
        target,
        raw = raw_replicas,
        desired = desired_replicas,
        "hpa evaluation"
    );

    ScalingDecision {
        desired_replicas,
        allowed: true,
        raw_replicas,
        cpu_metric,
        usage_ratio,
        warning,
    }
}

/// Apply `min` then `max`, so `max` wins when the two conflict.
///
/// `u32::clamp` would panic on `min > max`.
pub fn clamp_replicas(value: u32, min: u32, max: u32) -> u32 {
    value.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(current_pods: u32, total_cpu_usage: u64) -> MetricsSnapshot {
        MetricsSnapshot {
            current_pods,
            total_cpu_usage,
            pod_cpu_limit: 600,
            pod_cpu_request: 100,
            target_utilization_percent: 80,
            min_replicas: 1,
            max_replicas: 10,
        }
    }

    #[test]
    fn scale_up_above_tolerance() {
        // 2 pods, 180m used of 200m requested, target 80% -> ratio 1.125.
        let decision = evaluate(&snapshot(2, 180), &ScalingPolicy::default());

        assert!((decision.cpu_metric - 0.9).abs() < 1e-9);
        assert!((decision.usage_ratio - 1.125).abs() < 1e-9);
        assert_eq!(decision.raw_replicas, 3);
        assert_eq!(decision.desired_replicas, 3);
        assert!(decision.allowed);
        assert_eq!(decision.warning, None);
    }

    #[test]
    fn within_tolerance_keeps_current() {
        // 4 pods, 420m used of 400m requested, target 100% -> ratio 1.05.
        let snap = MetricsSnapshot {
            target_utilization_percent: 100,
            ..snapshot(4, 420)
        };
        let decision = evaluate(&snap, &ScalingPolicy::default());

        assert!((decision.usage_ratio - 1.05).abs() < 1e-9);
        assert_eq!(decision.desired_replicas, 4);
        assert!(!decision.allowed);
    }

    #[test]
    fn tolerance_band_is_inclusive() {
        let policy = ScalingPolicy::default();
        assert!(policy.within_tolerance(0.9));
        assert!(policy.within_tolerance(1.0));
        assert!(policy.within_tolerance(1.1));
        assert!(!policy.within_tolerance(0.89));
        assert!(!policy.within_tolerance(1.11));
        // 0.9 as reached through float division
        assert!(policy.within_tolerance(0.8999999999999999));
        assert!(policy.within_tolerance(1.1000000000000003));
    }

    #[test]
    fn exact_band_edges_hold_replicas() {
        // Request 100m per pod, target 80%: 72m per pod is a ratio of exactly
        // 0.9 and 88m per pod exactly 1.1.
        let policy = ScalingPolicy::default();
        for current in 10..=40u32 {
            for per_pod in [72u64, 88] {
                let decision = evaluate(&snapshot(current, per_pod * u64::from(current)), &policy);
                assert!(!decision.allowed, "current={current} per_pod={per_pod}");
                assert_eq!(decision.desired_replicas, current);
            }
        }
    }

    #[test]
    fn ten_pods_at_lower_edge_do_not_scale_down() {
        // 720m used of 1000m requested at an 80% target.
        let decision = evaluate(&snapshot(10, 720), &ScalingPolicy::default());
        assert!(!decision.allowed);
        assert_eq!(decision.desired_replicas, 10);

        // One millicore less leaves the band.
        let decision = evaluate(&snapshot(10, 719), &ScalingPolicy::default());
        assert!(decision.allowed);
        assert_eq!(decision.desired_replicas, 9);
    }

    #[test]
    fn ratios_across_band_never_scale() {
        // Request 100m per pod, target 100%: usage of 90m..=110m per pod.
        let policy = ScalingPolicy::default();
        for current in 1..=12u32 {
            for per_pod in 90..=110u64 {
                let snap = MetricsSnapshot {
                    target_utilization_percent: 100,
                    ..snapshot(current, per_pod * u64::from(current))
                };
                let decision = evaluate(&snap, &policy);
                assert!(!decision.allowed, "current={current} per_pod={per_pod}");
                assert_eq!(decision.desired_replicas, current);
            }
        }
    }

    #[test]
    fn scale_down_below_tolerance() {
        // 8 pods, 160m used of 800m requested, target 80% -> ratio 0.25.
        let decision = evaluate(&snapshot(8, 160), &ScalingPolicy::default());
        assert!(decision.allowed);
        assert_eq!(decision.desired_replicas, 2);
    }

    #[test]
    fn usage_clamped_to_total_limit() {
        // 1 pod limited to 600m; 10_000m reported counts as 600m.
        let decision = evaluate(&snapshot(1, 10_000), &ScalingPolicy::default());
        assert!((decision.cpu_metric - 6.0).abs() < 1e-9);
        assert_eq!(decision.raw_replicas, 8);
    }

    #[test]
    fn speed_limit_doubles_with_floor_of_four() {
        let policy = ScalingPolicy::default();
        assert_eq!(policy.scale_up_limit(1), 4);
        assert_eq!(policy.scale_up_limit(2), 4);
        assert_eq!(policy.scale_up_limit(3), 6);
        assert_eq!(policy.scale_up_limit(10), 20);

        // 1 pod -> raw 8, limited to 4.
        let decision = evaluate(&snapshot(1, 10_000), &policy);
        assert_eq!(decision.desired_replicas, 4);
    }

    #[test]
    fn speed_limit_never_exceeded() {
        let policy = ScalingPolicy::default();
        for current in 1..=20u32 {
            for usage in [0, 50, 500, 5_000, 50_000] {
                let snap = MetricsSnapshot {
                    max_replicas: 1_000,
                    ..snapshot(current, usage)
                };
                let decision = evaluate(&snap, &policy);
                assert!(decision.desired_replicas <= (2 * current).max(4));
            }
        }
    }

    #[test]
    fn result_within_bounds() {
        let policy = ScalingPolicy::default();
        for current in 1..=12u32 {
            for usage in [0, 10, 100, 1_000, 10_000] {
                let snap = MetricsSnapshot {
                    min_replicas: 2,
                    max_replicas: 7,
                    ..snapshot(current, usage)
                };
                let decision = evaluate(&snap, &policy);
                if decision.allowed {
                    assert!((2..=7).contains(&decision.desired_replicas));
                }
            }
        }
    }

    #[test]
    fn respects_min_replicas() {
        let snap = MetricsSnapshot {
            min_replicas: 3,
            ..snapshot(4, 0)
        };
        let decision = evaluate(&snap, &ScalingPolicy::default());
        assert_eq!(decision.raw_replicas, 0);
        assert_eq!(decision.desired_replicas, 3);
    }

    #[test]
    fn respects_max_replicas() {
        let snap = MetricsSnapshot {
            max_replicas: 5,
            ..snapshot(4, 2_400)
        };
        let decision = evaluate(&snap, &ScalingPolicy::default());
        assert_eq!(decision.desired_replicas, 5);
    }

    #[test]
    fn inconsistent_bounds_max_wins() {
        let policy = ScalingPolicy::default();
        // 4 pods, 400m requested, target 80%: every usage here is far from 320m.
        for usage in [0, 100, 1_000, 10_000] {
            let snap = MetricsSnapshot {
                min_replicas: 10,
                max_replicas: 5,
                ..snapshot(4, usage)
            };
            let decision = evaluate(&snap, &policy);
            assert!(decision.allowed, "usage={usage}");
            assert_eq!(decision.desired_replicas, 5);
            assert_eq!(
                decision.warning,
                Some(ScalingWarning::InconsistentBounds {
                    min_replicas: 10,
                    max_replicas: 5
                })
            );
        }
    }

    #[test]
    fn clamp_applies_min_then_max() {
        assert_eq!(clamp_replicas(3, 1, 10), 3);
        assert_eq!(clamp_replicas(0, 1, 10), 1);
        assert_eq!(clamp_replicas(12, 1, 10), 10);
        assert_eq!(clamp_replicas(1, 10, 5), 5);
    }

    #[test]
    fn custom_tolerance() {
        let policy = ScalingPolicy::with_tolerance(0.2);
        // ratio 1.125 is inside a 20% band.
        let decision = evaluate(&snapshot(2, 180), &policy);
        assert!(!decision.allowed);
        assert_eq!(decision.desired_replicas, 2);
    }
}
