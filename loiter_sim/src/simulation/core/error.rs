// loiter_sim/src/simulation/core/error.rs

use loiter_core::error::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the simulation host. The control loop itself never errors
/// once built; everything here happens at startup or at the thread boundary.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("scenario file not found: {}", .0.display())]
    ScenarioNotFound(PathBuf),

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] Box<figment::Error>),

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("invalid control configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to spawn dispatch thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("dispatch thread hung up")]
    ChannelClosed,

    #[error("dispatch thread panicked")]
    DispatchPanicked,
}
