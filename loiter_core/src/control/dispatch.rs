// loiter_core/src/control/dispatch.rs

use crate::config::ScalingConfig;
use crate::control::hold::HoldController;
use crate::messages::{FlightCommand, ModeCommand};
use crate::types::HoldTarget;

/// The outcome of routing one operator command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dispatch {
    /// Publish this command as-is; position hold is bypassed.
    Forward(FlightCommand),
    /// The command moved the hold target. Nothing is published.
    Nudged(HoldTarget),
    /// Hold is engaged but no target is latched yet; the nudge was dropped.
    Dropped,
}

/// Arbitrates between manual velocity commands and autonomous hold.
#[derive(Debug, Clone)]
pub struct ModeDispatcher {
    manual_vertical_scale: f64,
    nudge_scale: f64,
}

impl ModeDispatcher {
    pub fn new(config: &ScalingConfig) -> Self {
        Self {
            manual_vertical_scale: config.manual_vertical,
            nudge_scale: config.nudge,
        }
    }

    /// Routes a command.
    ///
    /// Outside of hold, or under an override code, the command is forwarded
    /// with its vertical velocity rescaled to the flight controller's units.
    /// Otherwise the horizontal velocities become a displacement of the hold
    /// target, applied on the next hold cycle.
    pub fn dispatch(&self, command: &ModeCommand, hold: &mut HoldController) -> Dispatch {
        if !hold.is_engaged() || command.mode.is_override() {
            return Dispatch::Forward(FlightCommand {
                x_velocity: command.x_velocity,
                y_velocity: command.y_velocity,
                z_velocity: command.z_velocity * self.manual_vertical_scale,
                yaw_velocity: command.yaw_velocity,
                mode: command.mode,
            });
        }

        match hold.nudge(
            command.x_velocity / self.nudge_scale,
            command.y_velocity / self.nudge_scale,
        ) {
            Some(target) => Dispatch::Nudged(target),
            None => Dispatch::Dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlConfig;
    use crate::messages::ModeCode;
    use crate::types::FusedPose;
    use approx::assert_abs_diff_eq;

    fn holding_at(x: f64, y: f64) -> HoldController {
        let mut hold = HoldController::new(&ControlConfig::default());
        hold.toggle();
        hold.step(&FusedPose::new(x, y, 0.5, 0.0), 0.05);
        hold
    }

    #[test]
    fn test_forwards_when_not_holding() {
        let dispatcher = ModeDispatcher::new(&ScalingConfig::default());
        let mut hold = HoldController::new(&ControlConfig::default());
        let cmd = ModeCommand {
            x_velocity: 3.0,
            z_velocity: 0.25,
            ..ModeCommand::default()
        };
        match dispatcher.dispatch(&cmd, &mut hold) {
            Dispatch::Forward(out) => {
                assert_abs_diff_eq!(out.x_velocity, 3.0);
                assert_abs_diff_eq!(out.z_velocity, 25.0);
                assert_eq!(out.mode, ModeCode::Normal);
            }
            other => panic!("expected forward, got {:?}", other),
        }
    }

    #[test]
    fn test_override_passes_through_while_holding() {
        let dispatcher = ModeDispatcher::new(&ScalingConfig::default());
        let mut hold = holding_at(0.0, 0.0);
        for mode in [ModeCode::OverrideA, ModeCode::OverrideB] {
            let cmd = ModeCommand {
                z_velocity: 1.0,
                mode,
                ..ModeCommand::default()
            };
            match dispatcher.dispatch(&cmd, &mut hold) {
                Dispatch::Forward(out) => {
                    assert_abs_diff_eq!(out.z_velocity, 100.0);
                    assert_eq!(out.mode, mode);
                }
                other => panic!("expected forward, got {:?}", other),
            }
        }
        assert_eq!(hold.target().map(|t| (t.x, t.y)), Some((0.0, 0.0)));
    }

    #[test]
    fn test_normal_command_nudges_target() {
        let dispatcher = ModeDispatcher::new(&ScalingConfig::default());
        let mut hold = holding_at(1.0, 1.0);
        let cmd = ModeCommand {
            x_velocity: 50.0,
            y_velocity: -20.0,
            ..ModeCommand::default()
        };
        match dispatcher.dispatch(&cmd, &mut hold) {
            Dispatch::Nudged(target) => {
                assert_abs_diff_eq!(target.x, 1.5, epsilon = 1e-12);
                assert_abs_diff_eq!(target.y, 0.8, epsilon = 1e-12);
            }
            other => panic!("expected nudge, got {:?}", other),
        }
    }

    #[test]
    fn test_nudge_without_target_is_dropped() {
        let dispatcher = ModeDispatcher::new(&ScalingConfig::default());
        let mut hold = HoldController::new(&ControlConfig::default());
        hold.toggle();
        let cmd = ModeCommand {
            x_velocity: 10.0,
            ..ModeCommand::default()
        };
        assert_eq!(dispatcher.dispatch(&cmd, &mut hold), Dispatch::Dropped);
    }
}
