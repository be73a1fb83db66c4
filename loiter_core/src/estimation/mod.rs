// loiter_core/src/estimation/mod.rs

//! Turning raw localizer output into a trusted pose: exponential smoothing
//! and the confidence hysteresis that decides when to restart localization.

pub mod confidence;
pub mod fusion;

pub use confidence::{ConfidenceState, ConfidenceTracker};
pub use fusion::PoseFusion;
