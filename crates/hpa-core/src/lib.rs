//! hpa-core — shared types for the HPA simulator.
//!
//! Holds the metrics snapshot fed into the autoscaler, the pod status and
//! aggregate counts shared by the fleet simulator and its consumers, the
//! synthetic load profiles, and the TOML scenario configuration.

pub mod config;
pub mod duration;
pub mod error;
pub mod load;
pub mod types;

pub use config::{ScenarioConfig, Settings};
pub use duration::{format_duration, parse_duration};
pub use error::{ConfigError, ConfigResult, MetricsError};
pub use load::{LoadProfile, LoadStep};
pub use types::*;
