// loiter_sim/src/simulation/config/structs.rs

use loiter_core::config::ControlConfig;
use loiter_core::messages::ModeCommand;
use serde::Deserialize;

use crate::simulation::core::error::SimError;

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// # ScenarioConfig
/// The root of the data parsed from a `scenario.toml` file.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct ScenarioConfig {
    #[serde(default)] // Use default if the [simulation] section is missing
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub vehicle: VehicleConfig,

    #[serde(default)]
    pub sensors: SensorConfig,

    #[serde(default)]
    pub perception: PerceptionConfig,

    /// Tunables handed straight to the control loop.
    #[serde(default)]
    pub control: ControlConfig,

    // The TOML has `[[events]]`, which becomes a Vec of ScriptedEvent structs.
    #[serde(default)]
    pub events: Vec<ScriptedEvent>,
}

impl ScenarioConfig {
    /// Checks everything the runner relies on, including the control section.
    pub fn validate(&self) -> Result<(), SimError> {
        self.control.validate()?;

        let sim = &self.simulation;
        check_positive("simulation.duration", sim.duration)?;
        check_positive("simulation.physics_rate", sim.physics_rate)?;
        if sim.channel_capacity == 0 {
            return Err(SimError::InvalidScenario(
                "simulation.channel_capacity must be at least 1".to_string(),
            ));
        }

        check_positive("sensors.frame_rate", self.sensors.frame_rate)?;
        check_positive("sensors.tilt_rate", self.sensors.tilt_rate)?;
        check_positive("sensors.altitude_rate", self.sensors.altitude_rate)?;
        check_probability("sensors.altitude_dropout", self.sensors.altitude_dropout)?;
        check_probability("perception.dropout_probability", self.perception.dropout_probability)?;
        check_non_negative("sensors.altitude_stddev", self.sensors.altitude_stddev)?;
        check_non_negative("vehicle.jitter_stddev", self.vehicle.jitter_stddev)?;
        check_non_negative("perception.position_stddev", self.perception.position_stddev)?;
        check_non_negative("perception.yaw_stddev", self.perception.yaw_stddev)?;
        check_non_negative("perception.degenerate_scatter", self.perception.degenerate_scatter)?;
        check_windows("perception.occlusions", &self.perception.occlusions)?;
        check_windows("perception.degenerate", &self.perception.degenerate)?;

        for (i, event) in self.events.iter().enumerate() {
            if event.at.is_nan() || event.at < 0.0 {
                return Err(SimError::InvalidScenario(format!(
                    "events[{}].at must be a non-negative time, got {}",
                    i, event.at
                )));
            }
        }
        Ok(())
    }
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Seed for the pseudo-random number generator.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Duration of the run in seconds.
    #[serde(default = "default_duration")]
    pub duration: f64,
    /// Rate of the vehicle integration step in Hz.
    #[serde(default = "default_physics_rate")]
    pub physics_rate: f64,
    /// Bound of the event queue feeding the dispatch thread.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_seed() -> u64 {
    42
}
fn default_duration() -> f64 {
    60.0
}
fn default_physics_rate() -> f64 {
    200.0
}
fn default_channel_capacity() -> usize {
    16
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            duration: default_duration(),
            physics_rate: default_physics_rate(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VehicleConfig {
    /// Starting position [x, y, z] in meters.
    #[serde(default = "default_initial_position")]
    pub initial_position: [f64; 3],
    #[serde(default)]
    pub initial_yaw: f64,
    /// Converts horizontal command units to m/s.
    #[serde(default = "default_velocity_scale")]
    pub velocity_scale: f64,
    /// Converts vertical command units to m/s.
    #[serde(default = "default_vertical_scale")]
    pub vertical_scale: f64,
    /// Converts yaw command units to rad/s.
    #[serde(default = "default_yaw_scale")]
    pub yaw_scale: f64,
    /// Constant horizontal drift [x, y] in m/s.
    #[serde(default)]
    pub wind: [f64; 2],
    /// Standard deviation of the horizontal random walk, in m/sqrt(s).
    #[serde(default)]
    pub jitter_stddev: f64,
    /// Radians of tilt per m/s of horizontal velocity.
    #[serde(default = "default_tilt_gain")]
    pub tilt_gain: f64,
}

fn default_initial_position() -> [f64; 3] {
    [0.0, 0.0, 0.5]
}
fn default_velocity_scale() -> f64 {
    0.1
}
fn default_vertical_scale() -> f64 {
    0.001
}
fn default_yaw_scale() -> f64 {
    0.01
}
fn default_tilt_gain() -> f64 {
    0.1
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            initial_position: default_initial_position(),
            initial_yaw: 0.0,
            velocity_scale: default_velocity_scale(),
            vertical_scale: default_vertical_scale(),
            yaw_scale: default_yaw_scale(),
            wind: [0.0, 0.0],
            jitter_stddev: 0.0,
            tilt_gain: default_tilt_gain(),
        }
    }
}

/// Rates and noise of the non-camera sensors, plus the camera frame rate.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SensorConfig {
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
    #[serde(default = "default_tilt_rate")]
    pub tilt_rate: f64,
    #[serde(default = "default_altitude_rate")]
    pub altitude_rate: f64,
    #[serde(default)]
    pub altitude_stddev: f64,
    /// Probability that a range-finder sample has no return.
    #[serde(default)]
    pub altitude_dropout: f64,
}

fn default_frame_rate() -> f64 {
    20.0
}
fn default_tilt_rate() -> f64 {
    50.0
}
fn default_altitude_rate() -> f64 {
    10.0
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            tilt_rate: default_tilt_rate(),
            altitude_rate: default_altitude_rate(),
            altitude_stddev: 0.0,
            altitude_dropout: 0.0,
        }
    }
}

/// Behaviour of the synthetic feature detector and localizer.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PerceptionConfig {
    /// Keypoints emitted per usable frame.
    #[serde(default = "default_keypoints")]
    pub keypoints: usize,
    /// Probability that a frame yields no features at all.
    #[serde(default)]
    pub dropout_probability: f64,
    /// `[start, end]` windows, in seconds, during which the camera sees nothing.
    #[serde(default)]
    pub occlusions: Vec<[f64; 2]>,
    #[serde(default = "default_position_stddev")]
    pub position_stddev: f64,
    #[serde(default = "default_yaw_stddev")]
    pub yaw_stddev: f64,
    /// Weight reported for a good match.
    #[serde(default = "default_informative_weight")]
    pub informative_weight: f64,
    /// `[start, end]` windows during which every particle scores the same.
    #[serde(default)]
    pub degenerate: Vec<[f64; 2]>,
    /// Position scatter of the best particle while degenerate.
    #[serde(default = "default_degenerate_scatter")]
    pub degenerate_scatter: f64,
}

fn default_keypoints() -> usize {
    120
}
fn default_position_stddev() -> f64 {
    0.02
}
fn default_yaw_stddev() -> f64 {
    0.01
}
fn default_informative_weight() -> f64 {
    0.04
}
fn default_degenerate_scatter() -> f64 {
    0.2
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            keypoints: default_keypoints(),
            dropout_probability: 0.0,
            occlusions: Vec::new(),
            position_stddev: default_position_stddev(),
            yaw_stddev: default_yaw_stddev(),
            informative_weight: default_informative_weight(),
            degenerate: Vec::new(),
            degenerate_scatter: default_degenerate_scatter(),
        }
    }
}

// =========================================================================
// == Scripted Operator Inputs ==
// =========================================================================

/// One operator input injected at a fixed simulation time.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScriptedEvent {
    /// Simulation time in seconds.
    pub at: f64,
    pub action: OperatorAction,
}

/// In TOML: `action = "Reset"`, `action = "ToggleHold"` or
/// `action = { Mode = { x_velocity = 50.0 } }`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub enum OperatorAction {
    Reset,
    ToggleHold,
    Mode(ModeCommand),
}

// --- Validation helpers ---

fn check_positive(name: &str, value: f64) -> Result<(), SimError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidScenario(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}

fn check_probability(name: &str, value: f64) -> Result<(), SimError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::InvalidScenario(format!(
            "{} must lie in [0, 1], got {}",
            name, value
        )))
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<(), SimError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidScenario(format!(
            "{} must be a finite, non-negative value, got {}",
            name, value
        )))
    }
}

fn check_windows(name: &str, windows: &[[f64; 2]]) -> Result<(), SimError> {
    match windows.iter().find(|[start, end]| start > end) {
        Some([start, end]) => Err(SimError::InvalidScenario(format!(
            "{} contains an inverted window [{}, {}]",
            name, start, end
        ))),
        None => Ok(()),
    }
}

/// True when `t` lies inside any of the inclusive `[start, end]` windows.
pub fn in_any_window(windows: &[[f64; 2]], t: f64) -> bool {
    windows.iter().any(|[start, end]| (*start..=*end).contains(&t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use loiter_core::messages::ModeCode;

    #[test]
    fn test_empty_scenario_uses_defaults() {
        let config: ScenarioConfig = toml::from_str("").unwrap();
        assert_eq!(config, ScenarioConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parses_events_and_control_overrides() {
        let config: ScenarioConfig = toml::from_str(
            r#"
            [simulation]
            seed = 7
            duration = 12.5

            [control.axis]
            kp = 8.0

            [control.localization]
            max_tilt_age = 0.2

            [[events]]
            at = 1.0
            action = "Reset"

            [[events]]
            at = 2.0
            action = "ToggleHold"

            [[events]]
            at = 4.0
            action = { Mode = { x_velocity = 50.0, mode = "OverrideA" } }
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.control.axis.kp, 8.0);
        assert_eq!(config.control.localization.max_tilt_age, Some(0.2));
        assert_eq!(config.events.len(), 3);
        assert_eq!(config.events[0].action, OperatorAction::Reset);
        match &config.events[2].action {
            OperatorAction::Mode(cmd) => {
                assert_eq!(cmd.x_velocity, 50.0);
                assert_eq!(cmd.mode, ModeCode::OverrideA);
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result: Result<ScenarioConfig, _> = toml::from_str("[vehicle]\nmass = 1.2\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_catches_bad_values() {
        let mut config = ScenarioConfig::default();
        config.perception.degenerate = vec![[5.0, 3.0]];
        assert!(matches!(config.validate(), Err(SimError::InvalidScenario(_))));

        let mut config = ScenarioConfig::default();
        config.sensors.altitude_dropout = 1.5;
        assert!(config.validate().is_err());

        let mut config = ScenarioConfig::default();
        config.control.fusion.yaw_alpha = 2.0;
        assert!(matches!(config.validate(), Err(SimError::Config(_))));
    }

    #[test]
    fn test_negative_noise_is_rejected() {
        let config: ScenarioConfig = toml::from_str(
            r#"
            [perception]
            position_stddev = -0.5

            [sensors]
            altitude_stddev = -0.1
            "#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(SimError::InvalidScenario(_))));

        let negatives: [fn(&mut ScenarioConfig); 5] = [
            |c| c.sensors.altitude_stddev = -0.1,
            |c| c.vehicle.jitter_stddev = -0.1,
            |c| c.perception.position_stddev = -0.1,
            |c| c.perception.yaw_stddev = -0.1,
            |c| c.perception.degenerate_scatter = -0.1,
        ];
        for set_negative in negatives {
            let mut config = ScenarioConfig::default();
            set_negative(&mut config);
            assert!(matches!(config.validate(), Err(SimError::InvalidScenario(_))));
        }

        let mut config = ScenarioConfig::default();
        config.perception.yaw_stddev = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_window_membership_is_inclusive() {
        let windows = [[1.0, 2.0], [5.0, 5.5]];
        assert!(in_any_window(&windows, 1.0));
        assert!(in_any_window(&windows, 5.5));
        assert!(!in_any_window(&windows, 3.0));
        assert!(!in_any_window(&[], 0.0));
    }
}
