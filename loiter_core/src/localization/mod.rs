// loiter_core/src/localization/mod.rs

use crate::types::{CameraFrame, FeatureSet, PoseEstimate};
use dyn_clone::DynClone;
use std::fmt::Debug;

// --- FEATURE DETECTOR TRAIT ---
/// Extracts map-matchable features from a raw camera frame.
pub trait FeatureDetector: DynClone + Debug + Send {
    /// Returns `None` when the frame yields no usable features.
    fn detect(&mut self, frame: &CameraFrame) -> Option<FeatureSet>;
}

// --- PARTICLE LOCALIZER TRAIT ---
/// The map-relative Monte Carlo localizer. Its internals (resampling,
/// weighting, map representation) are opaque to the control loop.
pub trait ParticleLocalizer: DynClone + Debug + Send {
    /// Seeds a fresh particle population from one frame's features and
    /// returns the best particle.
    fn initialize(&mut self, particle_count: usize, features: &FeatureSet) -> PoseEstimate;

    /// Propagates the population using the motion observed between two
    /// frames, reweights it against the map and returns the best particle.
    fn update(
        &mut self,
        altitude: f64,
        tilt_x: f64,
        tilt_y: f64,
        prev_features: &FeatureSet,
        curr_features: &FeatureSet,
    ) -> PoseEstimate;
}

// These macros generate `Clone` for the boxed trait objects.
dyn_clone::clone_trait_object!(FeatureDetector);
dyn_clone::clone_trait_object!(ParticleLocalizer);

mod adapter;
#[cfg(test)]
pub(crate) mod testing;

pub use adapter::{AdapterOutput, PoseEstimatorAdapter};
