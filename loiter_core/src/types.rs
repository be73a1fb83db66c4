// loiter_core/src/types.rs

use nalgebra::{Isometry3, Point2, Translation3, UnitQuaternion};

// =========================================================================
// == Pose Types ==
// =========================================================================

/// A single raw pose estimate produced by the localizer for one frame.
///
/// `weight` is the localizer's match confidence. A value equal to the
/// localizer's "uninformative" weight means every particle scored the same
/// and the frame told us nothing about where we are.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseEstimate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Heading in radians.
    pub yaw: f64,
    pub weight: f64,
}

impl PoseEstimate {
    pub fn new(x: f64, y: f64, z: f64, yaw: f64, weight: f64) -> Self {
        Self {
            x,
            y,
            z,
            yaw,
            weight,
        }
    }
}

/// The vehicle's believed pose after smoothing.
///
/// `z` is always the latest valid altitude reading, never a vision value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FusedPose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f64,
}

impl FusedPose {
    pub fn new(x: f64, y: f64, z: f64, yaw: f64) -> Self {
        Self { x, y, z, yaw }
    }

    /// Builds a world-frame isometry from the planar pose. Roll and pitch are
    /// always zero; `z` is supplied by the caller.
    pub fn to_isometry(&self, z: f64) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::new(self.x, self.y, z),
            UnitQuaternion::from_euler_angles(0.0, 0.0, self.yaw),
        )
    }
}

/// The latched pose that position hold tries to maintain.
///
/// Rotational hold is not supported: `yaw` is always latched as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HoldTarget {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl HoldTarget {
    /// Latches a target from the current fused pose.
    pub fn latch(pose: &FusedPose) -> Self {
        Self {
            x: pose.x,
            y: pose.y,
            yaw: 0.0,
        }
    }
}

/// A roll/pitch proxy sample from the attitude estimator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tilt {
    pub x: f64,
    pub y: f64,
    /// Arrival time of the sample, in seconds.
    pub timestamp: f64,
}

impl Tilt {
    pub fn level() -> Self {
        Self::default()
    }
}

// =========================================================================
// == Perception Data ==
// =========================================================================

/// A raw camera frame. The pixels are opaque to the control loop; they are
/// only handed to the feature detector and, once per hold engagement,
/// republished as an operator snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Pixel encoding label, e.g. "bgr8" or "mono8".
    pub encoding: String,
    pub data: Vec<u8>,
    /// Receive time in seconds.
    pub timestamp: f64,
}

/// Features extracted from one camera frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureSet {
    /// Keypoint pixel coordinates.
    pub keypoints: Vec<Point2<f32>>,
    /// One binary descriptor per keypoint (ORB-style, 256 bits).
    pub descriptors: Vec<[u8; 32]>,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_isometry_uses_yaw_about_z() {
        let pose = FusedPose::new(1.0, 2.0, 0.4, FRAC_PI_2);
        let iso = pose.to_isometry(0.5);

        assert_abs_diff_eq!(iso.translation.vector.x, 1.0);
        assert_abs_diff_eq!(iso.translation.vector.y, 2.0);
        assert_abs_diff_eq!(iso.translation.vector.z, 0.5);

        let (roll, pitch, yaw) = iso.rotation.euler_angles();
        assert_abs_diff_eq!(roll, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pitch, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(yaw, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_latched_target_ignores_yaw() {
        let pose = FusedPose::new(0.3, -0.2, 0.6, 1.2);
        let target = HoldTarget::latch(&pose);
        assert_eq!(target, HoldTarget { x: 0.3, y: -0.2, yaw: 0.0 });
    }
}
