// loiter_core/src/control/pid.rs

use crate::config::AxisConfig;

/// A proportional-integral-derivative controller for one translational axis.
///
/// Converts a scalar position error into a bounded velocity command:
///
/// `u = clamp(midpoint + kp·e + Σ ki·e·dt + kd·Δe/dt, output_range)`
///
/// The integral accumulator persists between steps and is only ever cleared by
/// the owner through [`AxisController::reset_integral`], e.g. when position
/// hold is toggled or localization restarts.
#[derive(Debug, Clone)]
pub struct AxisController {
    kp: f64,
    ki: f64,
    kd: f64,
    midpoint: f64,
    output_range: [f64; 2],
    integral_range: Option<[f64; 2]>,
    derivative_range: Option<[f64; 2]>,
    /// The accumulated integral term (already scaled by `ki`).
    integral: f64,
    /// The error seen on the previous step, for the derivative term.
    last_error: Option<f64>,
}

impl AxisController {
    pub fn new(config: &AxisConfig) -> Self {
        Self {
            kp: config.kp,
            ki: config.ki,
            kd: config.kd,
            midpoint: config.midpoint,
            output_range: config.output_range,
            integral_range: config.integral_range,
            derivative_range: config.derivative_range,
            integral: 0.0,
            last_error: None,
        }
    }

    /// Advances the controller by one step.
    ///
    /// # Arguments
    /// * `error`: target minus measured position.
    /// * `dt`: seconds since the previous step. A non-positive `dt` skips the
    ///   integral and derivative contributions for this step.
    pub fn step(&mut self, error: f64, dt: f64) -> f64 {
        let proportional = self.kp * error;

        let mut derivative = 0.0;
        if dt > 0.0 {
            self.integral += self.ki * error * dt;
            if let Some([lo, hi]) = self.integral_range {
                self.integral = self.integral.clamp(lo, hi);
            }

            // The first step after construction has no history to differentiate.
            if let Some(last) = self.last_error {
                derivative = self.kd * (error - last) / dt;
                if let Some([lo, hi]) = self.derivative_range {
                    derivative = derivative.clamp(lo, hi);
                }
            }
        }
        self.last_error = Some(error);

        let raw = self.midpoint + proportional + self.integral + derivative;
        raw.clamp(self.output_range[0], self.output_range[1])
    }

    /// Clears the integral accumulator.
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

    fn config(kp: f64, ki: f64, kd: f64) -> AxisConfig {
        AxisConfig {
            kp,
            ki,
            kd,
            ..AxisConfig::default()
        }
    }

    #[test]
    fn test_proportional_only_matches_default_gains() {
        let mut pid = AxisController::new(&AxisConfig::default());
        // kp = 10, range ±5.
        assert_abs_diff_eq!(pid.step(0.2, 0.05), 2.0);
        assert_abs_diff_eq!(pid.step(-0.1, 0.05), -1.0);
    }

    #[test]
    fn test_output_is_clamped_to_range() {
        let mut pid = AxisController::new(&AxisConfig::default());
        assert_abs_diff_eq!(pid.step(3.0, 0.05), 5.0);
        assert_abs_diff_eq!(pid.step(-3.0, 0.05), -5.0);
    }

    #[test]
    fn test_integral_accumulates_with_dt_and_resets() {
        let mut pid = AxisController::new(&config(0.0, 2.0, 0.0));
        pid.step(1.0, 0.5);
        pid.step(1.0, 0.5);
        assert_abs_diff_eq!(pid.integral(), 2.0);
        assert_abs_diff_eq!(pid.step(0.0, 0.5), 2.0);

        pid.reset_integral();
        assert_abs_diff_eq!(pid.integral(), 0.0);
        assert_abs_diff_eq!(pid.step(0.0, 0.5), 0.0);
    }

    #[test]
    fn test_integral_clamp() {
        let mut cfg = config(0.0, 10.0, 0.0);
        cfg.integral_range = Some([-1.0, 1.0]);
        let mut pid = AxisController::new(&cfg);
        for _ in 0..10 {
            pid.step(1.0, 1.0);
        }
        assert_abs_diff_eq!(pid.integral(), 1.0);
    }

    #[test]
    fn test_derivative_needs_history() {
        let mut pid = AxisController::new(&config(0.0, 0.0, 1.0));
        // No previous error: no derivative kick.
        assert_abs_diff_eq!(pid.step(1.0, 0.1), 0.0);
        // (1.2 - 1.0) / 0.1 = 2.0
        assert_abs_diff_eq!(pid.step(1.2, 0.1), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_non_positive_dt_skips_integral_and_derivative() {
        let mut pid = AxisController::new(&config(1.0, 1.0, 1.0));
        pid.step(1.0, 0.1);
        let integral = pid.integral();
        assert_abs_diff_eq!(pid.step(2.0, 0.0), 1.0 * 2.0 + integral);
        assert_abs_diff_eq!(pid.integral(), integral);
    }

    #[test]
    fn test_midpoint_offsets_output() {
        let mut cfg = config(1.0, 0.0, 0.0);
        cfg.midpoint = 1.5;
        let mut pid = AxisController::new(&cfg);
        assert_abs_diff_eq!(pid.step(0.5, 0.1), 2.0);
    }
}
