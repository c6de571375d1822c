//! Error types for configuration loading and metrics validation.

use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or validating a scenario configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid duration {value:?} for {field}")]
    InvalidDuration { field: &'static str, value: String },

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// A metrics snapshot that would make the scaling formula degenerate.
///
/// These are rejected at the boundary; the autoscaler itself assumes a
/// snapshot has passed [`MetricsSnapshot::validate`](crate::MetricsSnapshot::validate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MetricsError {
    #[error("current pod count must be at least 1")]
    ZeroPods,

    #[error("pod CPU request must be greater than zero")]
    ZeroCpuRequest,

    #[error("pod CPU limit must be greater than zero")]
    ZeroCpuLimit,

    #[error("target CPU utilization must be greater than zero")]
    ZeroTarget,
}
