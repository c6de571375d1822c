//! Fixed-length chart histories.
//!
//! Each series keeps the most recent `len` values; pushing shifts the
//! oldest value out.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Min, max and latest value of a series, as shown in a chart legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub min: u64,
    pub max: u64,
    pub current: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    values: VecDeque<u64>,
}

impl Series {
    /// A series of `len` points, all set to `fill`.
    pub fn new(len: usize, fill: u64) -> Self {
        Self {
            values: std::iter::repeat_n(fill, len).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Append `value`, dropping the oldest point.
    pub fn push(&mut self, value: u64) {
        if self.values.is_empty() {
            return;
        }
        self.values.pop_front();
        self.values.push_back(value);
    }

    /// Change the number of points. The newest `min(old, new)` values are
    /// kept at the end; new slots at the front are zero.
    pub fn resize(&mut self, len: usize) {
        let old = self.values.len();
        if len < old {
            self.values.drain(..old - len);
        } else {
            for _ in old..len {
                self.values.push_front(0);
            }
        }
    }

    pub fn values(&self) -> impl Iterator<Item = u64> + '_ {
        self.values.iter().copied()
    }

    pub fn latest(&self) -> Option<u64> {
        self.values.back().copied()
    }

    /// `None` for an empty series.
    pub fn stats(&self) -> Option<SeriesStats> {
        let current = self.latest()?;
        let (min, max) = self
            .values
            .iter()
            .fold((u64::MAX, u64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        Some(SeriesStats { min, max, current })
    }
}

/// The three charts of a simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    /// Replica count in force.
    pub replicas: Series,
    /// CPU usage absorbed by each pod.
    pub pod_load: Series,
    /// CPU usage no pod could absorb.
    pub unmet_load: Series,
}

impl History {
    /// Replicas start at 1, loads at 0.
    pub fn new(len: usize) -> Self {
        Self {
            replicas: Series::new(len, 1),
            pod_load: Series::new(len, 0),
            unmet_load: Series::new(len, 0),
        }
    }

    pub fn len(&self) -> usize {
        self.replicas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replicas.is_empty()
    }

    pub fn push(&mut self, replicas: u32, pod_load: u64, unmet_load: u64) {
        self.replicas.push(u64::from(replicas));
        self.pod_load.push(pod_load);
        self.unmet_load.push(unmet_load);
    }

    pub fn resize(&mut self, len: usize) {
        if len == self.len() {
            return;
        }
        self.replicas.resize(len);
        self.pod_load.resize(len);
        self.unmet_load.resize(len);
    }
}
