//! Error types shared across the engine.
use thiserror::Error;

/// Errors raised when simulator configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be between {min:.3} and {max:.3} (got {value:.3})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} window invalid (min {min} > max {max})")]
    WindowInverted {
        field: &'static str,
        min: u32,
        max: u32,
    },
    #[error("{field} must be finite (got {value})")]
    NonFinite { field: &'static str, value: f64 },
    #[error("configuration overrides could not be parsed: {0}")]
    Parse(String),
}

/// Errors surfaced by policy scoring, pathway bookkeeping, simulation and divergence.
#[derive(Debug, Error, PartialEq)]
pub enum PathwayError {
    #[error("vector length mismatch: expected {expected}, got {actual}")]
    InputShape { expected: usize, actual: usize },
    #[error("divergence undefined: candidate probability is zero at pooled event {event_index}")]
    DivergenceUndefined { event_index: usize },
    #[error("probability distribution is empty or sums to zero")]
    EmptyDistribution,
    #[error("probability at index {index} must be finite and within [0, 1] (got {value})")]
    ProbabilityOutOfRange { index: usize, value: f64 },
    #[error("reward blend ratio must lie in [0, 1] (got {0})")]
    InvalidBlendRatio(f64),
    #[error("simulation requires at least one timestep")]
    NoTimesteps,
    #[error("metadata could not be encoded: {0}")]
    MetadataEncoding(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = PathwayError> = std::result::Result<T, E>;

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value.to_string())
    }
}
