// loiter_core/src/messages.rs

use crate::types::{CameraFrame, Tilt};
use nalgebra::Isometry3;
use serde::Deserialize;

// =========================================================================
// == Mode Commands ==
// =========================================================================

/// The flight mode carried by every velocity command.
///
/// Two codes are "override" codes: a command carrying one of them is always
/// passed straight through to the flight controller, even while position hold
/// is engaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ModeCode {
    OverrideA,
    OverrideB,
    #[default]
    Normal,
}

impl ModeCode {
    /// Decodes a raw wire code. Anything that is not an override code is
    /// treated as a normal flight command.
    pub fn from_raw(code: u8) -> Self {
        match code {
            3 => ModeCode::OverrideA,
            4 => ModeCode::OverrideB,
            _ => ModeCode::Normal,
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            ModeCode::OverrideA => 3,
            ModeCode::OverrideB => 4,
            ModeCode::Normal => 5,
        }
    }

    pub fn is_override(self) -> bool {
        matches!(self, ModeCode::OverrideA | ModeCode::OverrideB)
    }
}

/// An externally issued velocity/mode command (operator input).
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeCommand {
    #[serde(default)]
    pub x_velocity: f64,
    #[serde(default)]
    pub y_velocity: f64,
    #[serde(default)]
    pub z_velocity: f64,
    #[serde(default)]
    pub yaw_velocity: f64,
    #[serde(default)]
    pub mode: ModeCode,
}

/// The velocity command published to the flight controller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlightCommand {
    pub x_velocity: f64,
    pub y_velocity: f64,
    pub z_velocity: f64,
    pub yaw_velocity: f64,
    pub mode: ModeCode,
}

impl FlightCommand {
    /// Zeroes the horizontal and yaw velocities, leaving `z_velocity` and the
    /// mode untouched.
    pub fn halt(&mut self) {
        self.x_velocity = 0.0;
        self.y_velocity = 0.0;
        self.yaw_velocity = 0.0;
    }
}

// =========================================================================
// == Transforms ==
// =========================================================================

/// The pose of the vehicle published as a spatial transform every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseTransform {
    pub parent_frame: &'static str,
    pub child_frame: &'static str,
    pub pose: Isometry3<f64>,
    pub timestamp: f64,
}

pub const WORLD_FRAME: &str = "world";
pub const BASE_FRAME: &str = "base";

// =========================================================================
// == Event Envelopes ==
// =========================================================================

/// Every input the control loop reacts to. The host must deliver these one
/// at a time; each is handled to completion before the next.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    Frame(CameraFrame),
    /// Range-finder altitude in meters. `-1.0` marks an invalid reading.
    Altitude(f64),
    Tilt(Tilt),
    Mode(ModeCommand),
    Reset,
    ToggleHold,
}

/// Everything the control loop publishes.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    Command(FlightCommand),
    /// A one-shot copy of the frame on which the hold target was latched.
    Snapshot(CameraFrame),
    Transform(PoseTransform),
}

impl OutboundMessage {
    pub fn as_command(&self) -> Option<&FlightCommand> {
        match self {
            OutboundMessage::Command(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_transform(&self) -> Option<&PoseTransform> {
        match self {
            OutboundMessage::Transform(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_snapshot(&self) -> bool {
        matches!(self, OutboundMessage::Snapshot(_))
    }
}
