// loiter_sim/src/simulation/plugins/vehicle.rs

use loiter_core::messages::FlightCommand;
use loiter_core::types::Tilt;
use nalgebra::{Vector2, Vector3};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::simulation::config::structs::VehicleConfig;

// =========================================================================
// == Ground Truth ==
// =========================================================================

/// Where the vehicle really is. Only the simulation reads this directly; the
/// control loop sees it through the noisy sensor stand-ins.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GroundTruth {
    pub time: f64,
    pub position: Vector3<f64>,
    pub yaw: f64,
    pub velocity: Vector2<f64>,
}

// =========================================================================
// == Synthetic Vehicle ==
// =========================================================================

/// A kinematic multirotor: it flies at whatever velocity was last commanded,
/// pushed around by constant wind and a random walk.
#[derive(Debug, Clone)]
pub struct SyntheticVehicle {
    truth: GroundTruth,
    /// Commanded velocities in m/s and rad/s.
    commanded: Vector3<f64>,
    commanded_yaw_rate: f64,

    velocity_scale: f64,
    vertical_scale: f64,
    yaw_scale: f64,
    wind: Vector2<f64>,
    jitter_stddev: f64,
    tilt_gain: f64,
}

impl SyntheticVehicle {
    pub fn new(config: &VehicleConfig) -> Self {
        let [x, y, z] = config.initial_position;
        Self {
            truth: GroundTruth {
                time: 0.0,
                position: Vector3::new(x, y, z),
                yaw: config.initial_yaw,
                velocity: Vector2::zeros(),
            },
            commanded: Vector3::zeros(),
            commanded_yaw_rate: 0.0,
            velocity_scale: config.velocity_scale,
            vertical_scale: config.vertical_scale,
            yaw_scale: config.yaw_scale,
            wind: Vector2::new(config.wind[0], config.wind[1]),
            jitter_stddev: config.jitter_stddev,
            tilt_gain: config.tilt_gain,
        }
    }

    pub fn truth(&self) -> &GroundTruth {
        &self.truth
    }

    /// Latches a flight command. It stays in effect until the next one.
    pub fn apply(&mut self, command: &FlightCommand) {
        self.commanded = Vector3::new(
            command.x_velocity * self.velocity_scale,
            command.y_velocity * self.velocity_scale,
            command.z_velocity * self.vertical_scale,
        );
        self.commanded_yaw_rate = command.yaw_velocity * self.yaw_scale;
    }

    /// Advances the vehicle by `dt` seconds.
    pub fn step<R: Rng + ?Sized>(&mut self, dt: f64, rng: &mut R) {
        let velocity = self.commanded.xy() + self.wind;
        let mut displacement = velocity * dt;
        if self.jitter_stddev > 0.0 {
            let scale = self.jitter_stddev * dt.sqrt();
            let nx: f64 = StandardNormal.sample(rng);
            let ny: f64 = StandardNormal.sample(rng);
            displacement += Vector2::new(nx, ny) * scale;
        }

        let truth = &mut self.truth;
        truth.position.x += displacement.x;
        truth.position.y += displacement.y;
        truth.position.z = (truth.position.z + self.commanded.z * dt).max(0.0);
        truth.yaw += self.commanded_yaw_rate * dt;
        truth.velocity = velocity;
        truth.time += dt;
    }

    /// PURE FUNCTION: the attitude a real airframe would need to fly at its
    /// current velocity, as seen by the attitude estimator.
    pub fn tilt(&self) -> Tilt {
        Tilt {
            x: self.tilt_gain * self.truth.velocity.x,
            y: self.tilt_gain * self.truth.velocity.y,
            timestamp: self.truth.time,
        }
    }
}
