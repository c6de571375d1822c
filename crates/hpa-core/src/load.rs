//! Synthetic CPU load profiles driving a simulation.

use serde::{Deserialize, Serialize};

/// Total CPU usage (millicores) as a function of the tick index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadProfile {
    /// The same usage on every tick.
    Constant { usage: u64 },
    /// Piecewise-constant usage; each step holds until the next one.
    Steps { steps: Vec<LoadStep> },
    /// Linear ramp from `from` to `to` over `over_ticks`, then holds `to`.
    Ramp { from: u64, to: u64, over_ticks: u64 },
}

/// A point in a [`LoadProfile::Steps`] schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStep {
    pub at_tick: u64,
    pub usage: u64,
}

impl Default for LoadProfile {
    fn default() -> Self {
        LoadProfile::Steps {
            steps: vec![
                LoadStep { at_tick: 0, usage: 400 },
                LoadStep { at_tick: 60, usage: 3000 },
                LoadStep { at_tick: 600, usage: 600 },
            ],
        }
    }
}

impl LoadProfile {
    /// Usage at the given (zero-based) tick.
    pub fn usage_at(&self, tick: u64) -> u64 {
        match self {
            LoadProfile::Constant { usage } => *usage,
            LoadProfile::Steps { steps } => steps
                .iter()
                .take_while(|s| s.at_tick <= tick)
                .last()
                .map_or(0, |s| s.usage),
            LoadProfile::Ramp { from, to, over_ticks } => {
                if *over_ticks == 0 || tick >= *over_ticks {
                    return *to;
                }
                let from = i128::from(*from);
                let to = i128::from(*to);
                let value = from + (to - from) * i128::from(tick) / i128::from(*over_ticks);
                value as u64
            }
        }
    }

    /// Steps must be listed in ascending `at_tick` order.
    pub fn is_ordered(&self) -> bool {
        match self {
            LoadProfile::Steps { steps } => steps.windows(2).all(|w| w[0].at_tick < w[1].at_tick),
            _ => true,
        }
    }
}
