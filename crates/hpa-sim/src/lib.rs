//! hpa-sim — the control loop around the autoscaler and the fleet.
//!
//! A [`Controller`] is advanced one tick at a time. Each tick it reads the
//! load profile, re-runs the autoscaler every `evaluation_period_ticks`
//! ticks, reconciles the simulated deployment and records chart histories.
//!
//! # Architecture
//!
//! ```text
//! Controller::tick(now)
//!   ├── LoadProfile      (total CPU usage for this tick)
//!   ├── every N ticks:
//!   │     hpa_autoscale::evaluate  -> ScalingDecision
//!   │     hpa_autoscale::resolve   -> Resolution (stabilization window)
//!   │     Deployment::scale
//!   ├── Deployment::reconcile(now)
//!   └── History (replicas, per-pod load, unmet load)
//! ```
//!
//! Ticks can be driven by a virtual clock ([`Controller::simulate`]) or in
//! real time by [`run`].

pub mod controller;
pub mod driver;
pub mod error;
pub mod history;

pub use controller::{Controller, Evaluation, MIN_FLEET_REPLICAS, TickSample};
pub use driver::run;
pub use error::{SimError, SimResult};
pub use history::{History, Series, SeriesStats};
pub use hpa_autoscale::Verdict;
pub use hpa_core::{LoadProfile, LoadStep};
