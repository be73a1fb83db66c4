// loiter_core/src/localization/adapter.rs

use super::{FeatureDetector, ParticleLocalizer};
use crate::types::{CameraFrame, FeatureSet, PoseEstimate, Tilt};
use tracing::{debug, warn};

/// A successful localization result for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdapterOutput {
    /// A fresh particle population was seeded from this frame alone. The
    /// caller adopts the estimate without blending.
    Initialized(PoseEstimate),
    /// A regular update against the previous frame's features.
    Updated(PoseEstimate),
}

/// Wraps the external feature detector and particle localizer behind a single
/// per-frame call.
#[derive(Debug, Clone)]
pub struct PoseEstimatorAdapter {
    detector: Box<dyn FeatureDetector>,
    localizer: Box<dyn ParticleLocalizer>,
    particle_count: usize,
    /// When set, the next usable frame seeds a new particle population.
    first_locate: bool,
    /// Detection result of the previous frame, kept even when empty.
    prev_features: Option<FeatureSet>,
}

impl PoseEstimatorAdapter {
    pub fn new(
        detector: Box<dyn FeatureDetector>,
        localizer: Box<dyn ParticleLocalizer>,
        particle_count: usize,
    ) -> Self {
        Self {
            detector,
            localizer,
            particle_count,
            first_locate: true,
            prev_features: None,
        }
    }

    /// Puts the adapter back into initialization mode.
    pub fn rearm(&mut self) {
        self.first_locate = true;
    }

    pub fn is_initializing(&self) -> bool {
        self.first_locate
    }

    /// Localizes one frame.
    ///
    /// Returns `None` when the frame has no usable features, or when the
    /// previous frame had none to match against. The current detection result
    /// always becomes the previous set for the next call.
    pub fn estimate(
        &mut self,
        frame: &CameraFrame,
        altitude: f64,
        tilt: &Tilt,
    ) -> Option<AdapterOutput> {
        let current = self.detector.detect(frame).filter(|f| !f.is_empty());

        let output = match &current {
            None => {
                warn!(
                    "No usable features in frame at t={:.3}s; holding last pose.",
                    frame.timestamp
                );
                None
            }
            Some(features) if self.first_locate => {
                let estimate = self.localizer.initialize(self.particle_count, features);
                self.first_locate = false;
                debug!(
                    "Seeded {} particles from {} features: ({:.3}, {:.3}, {:.3} rad)",
                    self.particle_count,
                    features.len(),
                    estimate.x,
                    estimate.y,
                    estimate.yaw
                );
                Some(AdapterOutput::Initialized(estimate))
            }
            Some(features) => match &self.prev_features {
                Some(prev) => Some(AdapterOutput::Updated(self.localizer.update(
                    altitude, tilt.x, tilt.y, prev, features,
                ))),
                None => {
                    debug!("Previous frame had no features; skipping update.");
                    None
                }
            },
        };

        self.prev_features = current;
        output
    }
}
