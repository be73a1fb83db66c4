// loiter_core/src/control/yaw.rs

use crate::config::YawConfig;

/// The proportional-integral heading loop used while holding position.
///
/// Unlike [`AxisController`](super::pid::AxisController) this has no
/// derivative term, no notion of elapsed time, and no output clamp: the
/// integral grows by `ki·e` on every frame.
#[derive(Debug, Clone)]
pub struct YawController {
    kp: f64,
    ki: f64,
    integral: f64,
}

impl YawController {
    pub fn new(config: &YawConfig) -> Self {
        Self {
            kp: config.kp,
            ki: config.ki,
            integral: 0.0,
        }
    }

    /// Returns the yaw rate command for a heading error in radians.
    pub fn step(&mut self, error: f64) -> f64 {
        self.integral += error * self.ki;
        error * self.kp + self.integral
    }

    pub fn reset_integral(&mut self) {
        self.integral = 0.0;
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_pi_output_is_unclamped() {
        let mut yaw = YawController::new(&YawConfig::default());
        // kp = 50, ki = 0.1
        assert_abs_diff_eq!(yaw.step(-0.2), -0.2 * 50.0 - 0.02, epsilon = 1e-12);
        assert_abs_diff_eq!(yaw.step(-0.2), -0.2 * 50.0 - 0.04, epsilon = 1e-12);
        assert_abs_diff_eq!(yaw.step(10.0), 500.0 + 1.0 - 0.04, epsilon = 1e-9);
    }

    #[test]
    fn test_reset_clears_accumulator() {
        let mut yaw = YawController::new(&YawConfig { kp: 0.0, ki: 1.0 });
        yaw.step(0.5);
        yaw.step(0.5);
        assert_abs_diff_eq!(yaw.integral(), 1.0);
        yaw.reset_integral();
        assert_abs_diff_eq!(yaw.step(0.0), 0.0);
    }
}
