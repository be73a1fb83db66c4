// loiter_core/src/localization/testing.rs

//! Scripted stand-ins for the external detector and localizer.

use super::{FeatureDetector, ParticleLocalizer};
use crate::types::{CameraFrame, FeatureSet, PoseEstimate};
use nalgebra::Point2;
use std::collections::VecDeque;

/// Detector that replays a script of "has features" flags. An exhausted
/// script keeps returning features.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDetector {
    pub script: VecDeque<bool>,
}

impl FeatureDetector for ScriptedDetector {
    fn detect(&mut self, _frame: &CameraFrame) -> Option<FeatureSet> {
        if self.script.pop_front().unwrap_or(true) {
            Some(FeatureSet {
                keypoints: vec![Point2::new(10.0, 20.0); 8],
                descriptors: vec![[0u8; 32]; 8],
            })
        } else {
            None
        }
    }
}

/// Localizer that replays a queue of estimates for both entry points.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLocalizer {
    pub estimates: VecDeque<PoseEstimate>,
    pub fallback: PoseEstimate,
}

impl ScriptedLocalizer {
    fn next(&mut self) -> PoseEstimate {
        self.estimates.pop_front().unwrap_or(self.fallback)
    }
}

impl ParticleLocalizer for ScriptedLocalizer {
    fn initialize(&mut self, _particle_count: usize, _features: &FeatureSet) -> PoseEstimate {
        self.next()
    }

    fn update(
        &mut self,
        _altitude: f64,
        _tilt_x: f64,
        _tilt_y: f64,
        _prev: &FeatureSet,
        _curr: &FeatureSet,
    ) -> PoseEstimate {
        self.next()
    }
}

/// Localizer whose updates echo the tilt they were given as the estimated
/// position, so callers can observe which tilt sample was used.
#[derive(Debug, Clone, Default)]
pub struct TiltEchoLocalizer {
    pub weight: f64,
}

impl ParticleLocalizer for TiltEchoLocalizer {
    fn initialize(&mut self, _particle_count: usize, _features: &FeatureSet) -> PoseEstimate {
        PoseEstimate::new(0.0, 0.0, 0.0, 0.0, self.weight)
    }

    fn update(
        &mut self,
        _altitude: f64,
        tilt_x: f64,
        tilt_y: f64,
        _prev: &FeatureSet,
        _curr: &FeatureSet,
    ) -> PoseEstimate {
        PoseEstimate::new(tilt_x, tilt_y, 0.0, 0.0, self.weight)
    }
}
