// loiter_core/src/prelude.rs

// --- Core Abstractions (The external collaborators) ---
pub use crate::localization::{FeatureDetector, ParticleLocalizer};

// --- Core Data Structures ---
pub use crate::messages::{
    FlightCommand, InboundEvent, ModeCode, ModeCommand, OutboundMessage, PoseTransform,
};
pub use crate::types::{CameraFrame, FeatureSet, FusedPose, HoldTarget, PoseEstimate, Tilt};

// --- Configuration & Errors ---
pub use crate::config::ControlConfig;
pub use crate::error::ConfigError;

// --- The Control Loop ---
pub use crate::orchestrator::FrameOrchestrator;
