//! hpa-autoscale — the HPA replica decision.
//!
//! [`evaluate`] turns a `MetricsSnapshot` into a [`ScalingDecision`];
//! [`resolve`] decides whether that decision takes effect given the
//! replica count currently in force and the scale-down stabilization state.
//!
//! # Scaling Algorithm
//!
//! ```text
//! usage        = min(total_cpu_usage, pod_cpu_limit * current_pods)
//! cpu_metric   = usage / (pod_cpu_request * current_pods)
//! usage_ratio  = cpu_metric / (target_utilization_percent / 100)
//!
//! if 1 - tolerance <= usage_ratio <= 1 + tolerance:
//!     desired = current_pods, allowed = false
//! else:
//!     desired = ceil(current_pods * usage_ratio)
//!     desired = min(desired, max(2 * current_pods, 4))
//!     desired = min(max(desired, min_replicas), max_replicas)
//!     allowed = true
//! ```
//!
//! Scale-ups take effect immediately. A scale-down only takes effect once
//! the stabilization window has passed since the last applied scale-down.

pub mod scaler;
pub mod stabilization;

pub use scaler::{
    RATIO_SLACK, ScalingDecision, ScalingPolicy, ScalingWarning, clamp_replicas, evaluate,
};
pub use stabilization::{Resolution, StabilizationState, Verdict, resolve};
