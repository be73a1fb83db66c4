// loiter_sim/src/simulation/plugins/perception.rs

//! Stand-ins for the camera, the feature detector and the particle localizer.
//!
//! The real localizer matches features against a stored map. Here the
//! localizer peeks at the ground truth through a shared handle and corrupts
//! it with noise, which keeps the control loop honest without needing a map.

use loiter_core::localization::{FeatureDetector, ParticleLocalizer};
use loiter_core::types::{CameraFrame, FeatureSet, PoseEstimate};
use nalgebra::Point2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::sync::{Arc, RwLock};

use crate::simulation::config::structs::{in_any_window, PerceptionConfig};
use crate::simulation::core::error::SimError;
use crate::simulation::plugins::vehicle::GroundTruth;

pub const FRAME_WIDTH: u32 = 160;
pub const FRAME_HEIGHT: u32 = 120;

/// Ground truth published by the simulation loop before each camera frame.
pub type SharedTruth = Arc<RwLock<GroundTruth>>;

fn read_truth(truth: &SharedTruth) -> GroundTruth {
    match truth.read() {
        Ok(guard) => *guard,
        // A panicked writer cannot leave a `Copy` value half-written.
        Err(poisoned) => *poisoned.into_inner(),
    }
}

pub fn publish_truth(shared: &SharedTruth, truth: GroundTruth) {
    match shared.write() {
        Ok(mut guard) => *guard = truth,
        Err(poisoned) => *poisoned.into_inner() = truth,
    }
}

/// Produces a blank downward-camera frame stamped with `timestamp`.
pub fn render_frame(timestamp: f64) -> CameraFrame {
    CameraFrame {
        width: FRAME_WIDTH,
        height: FRAME_HEIGHT,
        encoding: "mono8".to_string(),
        data: vec![0; (FRAME_WIDTH * FRAME_HEIGHT) as usize],
        timestamp,
    }
}

// =========================================================================
// == Synthetic Feature Detector ==
// =========================================================================

#[derive(Debug, Clone)]
pub struct SyntheticDetector {
    rng: ChaCha8Rng,
    keypoints: usize,
    dropout_probability: f64,
    occlusions: Vec<[f64; 2]>,
}

impl SyntheticDetector {
    pub fn new(config: &PerceptionConfig, rng: ChaCha8Rng) -> Self {
        Self {
            rng,
            keypoints: config.keypoints,
            dropout_probability: config.dropout_probability,
            occlusions: config.occlusions.clone(),
        }
    }
}

impl FeatureDetector for SyntheticDetector {
    fn detect(&mut self, frame: &CameraFrame) -> Option<FeatureSet> {
        if in_any_window(&self.occlusions, frame.timestamp) {
            return None;
        }
        if self.rng.gen_bool(self.dropout_probability) {
            return None;
        }

        let keypoints = (0..self.keypoints)
            .map(|_| {
                Point2::new(
                    self.rng.gen_range(0.0..frame.width as f32),
                    self.rng.gen_range(0.0..frame.height as f32),
                )
            })
            .collect();
        let descriptors = (0..self.keypoints).map(|_| self.rng.gen()).collect();

        Some(FeatureSet {
            keypoints,
            descriptors,
        })
    }
}

// =========================================================================
// == Synthetic Particle Localizer ==
// =========================================================================

#[derive(Debug, Clone)]
pub struct SyntheticLocalizer {
    truth: SharedTruth,
    rng: ChaCha8Rng,
    position_noise: Normal<f64>,
    yaw_noise: Normal<f64>,
    degenerate_scatter: Normal<f64>,
    informative_weight: f64,
    uninformative_weight: f64,
    degenerate: Vec<[f64; 2]>,
}

impl SyntheticLocalizer {
    /// # Arguments
    /// * `uninformative_weight`: the weight every particle gets when the map
    ///   match carries no information. Must agree with the control loop's
    ///   confidence configuration.
    pub fn new(
        config: &PerceptionConfig,
        uninformative_weight: f64,
        truth: SharedTruth,
        rng: ChaCha8Rng,
    ) -> Result<Self, SimError> {
        let normal = |name: &str, stddev: f64| {
            Normal::new(0.0, stddev)
                .map_err(|e| SimError::InvalidScenario(format!("perception.{}: {}", name, e)))
        };

        Ok(Self {
            truth,
            rng,
            position_noise: normal("position_stddev", config.position_stddev)?,
            yaw_noise: normal("yaw_stddev", config.yaw_stddev)?,
            degenerate_scatter: normal("degenerate_scatter", config.degenerate_scatter)?,
            informative_weight: config.informative_weight,
            uninformative_weight,
            degenerate: config.degenerate.clone(),
        })
    }

    /// The best particle for the current ground truth.
    fn best_particle(&mut self) -> PoseEstimate {
        let truth = read_truth(&self.truth);

        if in_any_window(&self.degenerate, truth.time) {
            // Flat weights: the "best" particle is wherever it happens to be.
            return PoseEstimate::new(
                truth.position.x + self.degenerate_scatter.sample(&mut self.rng),
                truth.position.y + self.degenerate_scatter.sample(&mut self.rng),
                truth.position.z,
                truth.yaw + self.yaw_noise.sample(&mut self.rng),
                self.uninformative_weight,
            );
        }

        PoseEstimate::new(
            truth.position.x + self.position_noise.sample(&mut self.rng),
            truth.position.y + self.position_noise.sample(&mut self.rng),
            truth.position.z,
            truth.yaw + self.yaw_noise.sample(&mut self.rng),
            self.informative_weight,
        )
    }
}

impl ParticleLocalizer for SyntheticLocalizer {
    fn initialize(&mut self, _particle_count: usize, _features: &FeatureSet) -> PoseEstimate {
        self.best_particle()
    }

    fn update(
        &mut self,
        _altitude: f64,
        _tilt_x: f64,
        _tilt_y: f64,
        _prev_features: &FeatureSet,
        _curr_features: &FeatureSet,
    ) -> PoseEstimate {
        self.best_particle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use rand::SeedableRng;

    fn shared_at(time: f64, x: f64, y: f64) -> SharedTruth {
        Arc::new(RwLock::new(GroundTruth {
            time,
            position: Vector3::new(x, y, 0.5),
            ..GroundTruth::default()
        }))
    }

    #[test]
    fn test_detector_respects_occlusion_windows() {
        let config = PerceptionConfig {
            keypoints: 30,
            occlusions: vec![[1.0, 2.0]],
            ..PerceptionConfig::default()
        };
        let mut detector = SyntheticDetector::new(&config, ChaCha8Rng::seed_from_u64(1));

        let features = detector.detect(&render_frame(0.5)).unwrap();
        assert_eq!(features.len(), 30);
        assert!(features
            .keypoints
            .iter()
            .all(|p| p.x >= 0.0 && p.x < FRAME_WIDTH as f32 && p.y < FRAME_HEIGHT as f32));
        assert!(detector.detect(&render_frame(1.5)).is_none());
    }

    #[test]
    fn test_detector_full_dropout() {
        let config = PerceptionConfig {
            dropout_probability: 1.0,
            ..PerceptionConfig::default()
        };
        let mut detector = SyntheticDetector::new(&config, ChaCha8Rng::seed_from_u64(1));
        assert!((0..10).all(|i| detector.detect(&render_frame(i as f64)).is_none()));
    }

    #[test]
    fn test_localizer_weights_follow_degeneracy_windows() {
        let config = PerceptionConfig {
            degenerate: vec![[10.0, 20.0]],
            ..PerceptionConfig::default()
        };
        let truth = shared_at(5.0, 1.0, -1.0);
        let mut localizer =
            SyntheticLocalizer::new(&config, 0.005, truth.clone(), ChaCha8Rng::seed_from_u64(3))
                .unwrap();
        let features = FeatureSet::default();

        let good = localizer.initialize(50, &features);
        assert_eq!(good.weight, config.informative_weight);
        assert!((good.x - 1.0).abs() < 0.2);
        assert!((good.y + 1.0).abs() < 0.2);

        publish_truth(&truth, GroundTruth {
            time: 12.0,
            ..read_truth(&truth)
        });
        let flat = localizer.update(0.5, 0.0, 0.0, &features, &features);
        assert_eq!(flat.weight, 0.005);
    }
}
