// loiter_core/src/estimation/fusion.rs

use crate::config::FusionConfig;
use crate::types::{FusedPose, PoseEstimate};
use num_traits::Float;

/// Exponential blend: `alpha·new + (1 − alpha)·old`.
pub fn blend<T: Float>(alpha: T, new: T, old: T) -> T {
    alpha * new + (T::one() - alpha) * old
}

/// Suppresses per-frame localization noise by exponentially smoothing raw
/// estimates against the held pose. Position and yaw use separate factors.
#[derive(Debug, Clone)]
pub struct PoseFusion {
    position_alpha: f64,
    yaw_alpha: f64,
}

impl PoseFusion {
    pub fn new(config: &FusionConfig) -> Self {
        Self {
            position_alpha: config.position_alpha,
            yaw_alpha: config.yaw_alpha,
        }
    }

    /// PURE FUNCTION: adopts the first estimate after (re)initialization
    /// verbatim. There is no history to blend against.
    pub fn adopt(&self, estimate: &PoseEstimate, altitude: f64) -> FusedPose {
        FusedPose {
            x: estimate.x,
            y: estimate.y,
            z: altitude,
            yaw: estimate.yaw,
        }
    }

    /// PURE FUNCTION: blends a new estimate into the prior fused pose.
    /// Altitude always comes from the range finder, never from vision.
    pub fn fuse(&self, prior: &FusedPose, estimate: &PoseEstimate, altitude: f64) -> FusedPose {
        FusedPose {
            x: blend(self.position_alpha, estimate.x, prior.x),
            y: blend(self.position_alpha, estimate.y, prior.y),
            z: altitude,
            yaw: blend(self.yaw_alpha, estimate.yaw, prior.yaw),
        }
    }
}
