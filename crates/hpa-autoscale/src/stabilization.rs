//! Scale-down stabilization.
//!
//! The caller owns a [`StabilizationState`] and threads it through
//! [`resolve`] once per evaluation, so the window can be driven by any
//! clock (real or simulated).

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::scaler::ScalingDecision;

/// When the last scale-down actually took effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StabilizationState {
    last_scale_down: Option<Instant>,
}

impl StabilizationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_scale_down(&self) -> Option<Instant> {
        self.last_scale_down
    }

    /// Time left before another scale-down may apply, `None` if it may
    /// apply now. The window must be strictly exceeded.
    pub fn remaining(&self, window: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_scale_down?;
        let elapsed = now.saturating_duration_since(last);
        (elapsed <= window).then(|| window - elapsed)
    }

    fn record_scale_down(&mut self, now: Instant) {
        self.last_scale_down = Some(now);
    }
}

/// Why a decision did or did not take effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    Applied,
    /// Usage ratio was inside the tolerance band.
    WithinTolerance,
    /// The decision matches the replicas already in force.
    Unchanged,
    /// A scale-down inside the stabilization window.
    Stabilizing { remaining: Duration },
}

/// The replica count in force after resolving one decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub replicas: u32,
    pub applied: bool,
    pub verdict: Verdict,
}

/// Decide whether `decision` replaces `previous_replicas`.
///
/// Vetoes are checked in order: tolerance band, no change, then the
/// stabilization window (scale-downs only). `state` is updated only when a
/// scale-down is applied.
pub fn resolve(
    decision: &ScalingDecision,
    previous_replicas: u32,
    window: Duration,
    state: &mut StabilizationState,
    now: Instant,
) -> Resolution {
    let vetoed = |verdict| Resolution {
        replicas: previous_replicas,
        applied: false,
        verdict,
    };

    if !decision.allowed {
        return vetoed(Verdict::WithinTolerance);
    }

    let desired = decision.desired_replicas;
    if desired == previous_replicas {
        return vetoed(Verdict::Unchanged);
    }

    if desired < previous_replicas {
        if let Some(remaining) = state.remaining(window, now) {
            debug!(
                from = previous_replicas,
                to = desired,
                remaining_secs = remaining.as_secs_f64(),
                window_secs = window.as_secs_f64(),
                "scale-down held by stabilization window"
            );
            return vetoed(Verdict::Stabilizing { remaining });
        }
        state.record_scale_down(now);
        info!(from = previous_replicas, to = desired, "scaling down");
    } else {
        info!(from = previous_replicas, to = desired, "scaling up");
    }

    Resolution {
        replicas: desired,
        applied: true,
        verdict: Verdict::Applied,
    }
}
