//! Control loop error types.

use thiserror::Error;

/// Errors that can occur while setting up or evaluating a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid scenario: {0}")]
    Config(#[from] hpa_core::ConfigError),

    #[error("invalid metrics: {0}")]
    Metrics(#[from] hpa_core::MetricsError),
}

pub type SimResult<T> = Result<T, SimError>;
