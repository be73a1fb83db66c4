// loiter_core/src/control/hold.rs

use crate::config::ControlConfig;
use crate::control::pid::AxisController;
use crate::control::yaw::YawController;
use crate::types::{FusedPose, HoldTarget};

/// What one hold cycle produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoldStep {
    /// First cycle after engagement: the target was latched and no command
    /// is issued this frame.
    Latched(HoldTarget),
    /// Regular cycle: velocities that drive the fused pose toward the target.
    Command {
        x_velocity: f64,
        y_velocity: f64,
        yaw_velocity: f64,
    },
}

/// Position hold: two independent axis controllers plus a yaw PI loop driving
/// the fused pose toward a latched target.
#[derive(Debug, Clone)]
pub struct HoldController {
    x_axis: AxisController,
    y_axis: AxisController,
    yaw: YawController,
    engaged: bool,
    /// Set on every toggle; the next hold cycle latches a fresh target.
    first_hold: bool,
    target: Option<HoldTarget>,
}

impl HoldController {
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            x_axis: AxisController::new(config.x_axis()),
            y_axis: AxisController::new(config.y_axis()),
            yaw: YawController::new(&config.yaw),
            engaged: false,
            first_hold: true,
            target: None,
        }
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    pub fn target(&self) -> Option<&HoldTarget> {
        self.target.as_ref()
    }

    /// Flips engagement, arms a fresh latch and clears all three integral
    /// accumulators. Returns the new engagement state.
    pub fn toggle(&mut self) -> bool {
        self.engaged = !self.engaged;
        self.first_hold = true;
        self.target = None;
        self.reset_integrals();
        self.engaged
    }

    /// Drops out of hold without touching the integrators.
    pub fn disengage(&mut self) {
        self.engaged = false;
    }

    pub fn reset_integrals(&mut self) {
        self.x_axis.reset_integral();
        self.y_axis.reset_integral();
        self.yaw.reset_integral();
    }

    /// Shifts the latched target. Returns the updated target, or `None` when
    /// nothing has been latched yet.
    pub fn nudge(&mut self, dx: f64, dy: f64) -> Option<HoldTarget> {
        let target = self.target.as_mut()?;
        target.x += dx;
        target.y += dy;
        Some(*target)
    }

    /// Runs one hold cycle against the current fused pose.
    ///
    /// # Arguments
    /// * `pose`: the fused pose for this frame.
    /// * `dt`: seconds since the previous camera frame.
    pub fn step(&mut self, pose: &FusedPose, dt: f64) -> HoldStep {
        let target = match self.target {
            Some(target) if !self.first_hold => target,
            _ => {
                let target = HoldTarget::latch(pose);
                self.target = Some(target);
                self.first_hold = false;
                return HoldStep::Latched(target);
            }
        };

        let err_x = target.x - pose.x;
        let err_y = target.y - pose.y;
        let err_yaw = target.yaw - pose.yaw;

        HoldStep::Command {
            x_velocity: self.x_axis.step(err_x, dt),
            y_velocity: self.y_axis.step(err_y, dt),
            yaw_velocity: self.yaw.step(err_yaw),
        }
    }

    /// The three integral accumulators as `(x, y, yaw)`.
    pub fn integrals(&self) -> (f64, f64, f64) {
        (
            self.x_axis.integral(),
            self.y_axis.integral(),
            self.yaw.integral(),
        )
    }
}
