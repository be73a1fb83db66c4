// loiter_core/src/error.rs

use thiserror::Error;

/// Rejections raised when validating a `ControlConfig`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("blend factor `{name}` must lie in [0, 1], got {value}")]
    BlendOutOfRange { name: &'static str, value: f64 },

    #[error("range `{name}` is inverted: min {min} > max {max}")]
    InvertedRange {
        name: &'static str,
        min: f64,
        max: f64,
    },

    #[error("`{name}` must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("`{name}` must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("particle count must be at least 1")]
    NoParticles,
}
