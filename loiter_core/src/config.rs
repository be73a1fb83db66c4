// loiter_core/src/config.rs

//! Tuning constants for the hold loop. Everything here used to be a module
//! level constant; it is now passed explicitly to each component at startup.

use crate::error::ConfigError;
use serde::Deserialize;

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ControlConfig {
    #[serde(default)]
    pub fusion: FusionConfig,
    #[serde(default)]
    pub confidence: ConfidenceConfig,
    /// Gains shared by both horizontal axes unless overridden below.
    #[serde(default)]
    pub axis: AxisConfig,
    #[serde(default)]
    pub x_axis: Option<AxisConfig>,
    #[serde(default)]
    pub y_axis: Option<AxisConfig>,
    #[serde(default)]
    pub yaw: YawConfig,
    #[serde(default)]
    pub scaling: ScalingConfig,
    #[serde(default)]
    pub localization: LocalizationConfig,
}

impl ControlConfig {
    pub fn x_axis(&self) -> &AxisConfig {
        self.x_axis.as_ref().unwrap_or(&self.axis)
    }

    pub fn y_axis(&self) -> &AxisConfig {
        self.y_axis.as_ref().unwrap_or(&self.axis)
    }

    /// Checks every section. Called once when the orchestrator is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fusion.validate()?;
        self.confidence.validate()?;
        self.x_axis().validate()?;
        self.y_axis().validate()?;
        self.scaling.validate()?;
        self.localization.validate()
    }
}

// =========================================================================
// == Sections ==
// =========================================================================

/// Exponential smoothing factors. Yaw is blended more slowly because the
/// localizer's heading is noisier than its position.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FusionConfig {
    #[serde(default = "default_position_alpha")]
    pub position_alpha: f64,
    #[serde(default = "default_yaw_alpha")]
    pub yaw_alpha: f64,
}

fn default_position_alpha() -> f64 {
    0.3
}
fn default_yaw_alpha() -> f64 {
    0.1
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            position_alpha: default_position_alpha(),
            yaw_alpha: default_yaw_alpha(),
        }
    }
}

impl FusionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_blend("fusion.position_alpha", self.position_alpha)?;
        check_blend("fusion.yaw_alpha", self.yaw_alpha)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfidenceConfig {
    /// The weight the localizer reports when all particles are equally likely.
    #[serde(default = "default_uninformative_weight")]
    pub uninformative_weight: f64,
    #[serde(default = "default_weight_tolerance")]
    pub tolerance: f64,
    /// Upper cap of the counter, and the magnitude of the lost threshold.
    #[serde(default = "default_counter_bound")]
    pub bound: i32,
}

fn default_uninformative_weight() -> f64 {
    0.005
}
fn default_weight_tolerance() -> f64 {
    1e-8
}
fn default_counter_bound() -> i32 {
    100
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            uninformative_weight: default_uninformative_weight(),
            tolerance: default_weight_tolerance(),
            bound: default_counter_bound(),
        }
    }
}

impl ConfidenceConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.tolerance < 0.0 {
            return Err(ConfigError::Negative {
                name: "confidence.tolerance",
                value: self.tolerance,
            });
        }
        if self.bound <= 0 {
            return Err(ConfigError::NotPositive {
                name: "confidence.bound",
                value: self.bound as f64,
            });
        }
        Ok(())
    }
}

/// Gains and limits for one horizontal axis controller.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AxisConfig {
    #[serde(default = "default_axis_kp")]
    pub kp: f64,
    #[serde(default)]
    pub ki: f64,
    #[serde(default)]
    pub kd: f64,
    #[serde(default)]
    pub midpoint: f64,
    /// `[min, max]` of the velocity command.
    #[serde(default = "default_output_range")]
    pub output_range: [f64; 2],
    #[serde(default)]
    pub integral_range: Option<[f64; 2]>,
    #[serde(default)]
    pub derivative_range: Option<[f64; 2]>,
}

fn default_axis_kp() -> f64 {
    10.0
}
fn default_output_range() -> [f64; 2] {
    [-5.0, 5.0]
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            kp: default_axis_kp(),
            ki: 0.0,
            kd: 0.0,
            midpoint: 0.0,
            output_range: default_output_range(),
            integral_range: None,
            derivative_range: None,
        }
    }
}

impl AxisConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_range("axis.output_range", self.output_range)?;
        if let Some(range) = self.integral_range {
            check_range("axis.integral_range", range)?;
        }
        if let Some(range) = self.derivative_range {
            check_range("axis.derivative_range", range)?;
        }
        Ok(())
    }
}

/// Gains of the hand-rolled yaw PI loop.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct YawConfig {
    #[serde(default = "default_yaw_kp")]
    pub kp: f64,
    #[serde(default = "default_yaw_ki")]
    pub ki: f64,
}

fn default_yaw_kp() -> f64 {
    50.0
}
fn default_yaw_ki() -> f64 {
    0.1
}

impl Default for YawConfig {
    fn default() -> Self {
        Self {
            kp: default_yaw_kp(),
            ki: default_yaw_ki(),
        }
    }
}

/// Unit conversions between operator input and the flight controller.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScalingConfig {
    /// Multiplier applied to `z_velocity` on pass-through commands.
    #[serde(default = "default_unit_scale")]
    pub manual_vertical: f64,
    /// Divisor converting operator velocity into a target displacement.
    #[serde(default = "default_unit_scale")]
    pub nudge: f64,
}

fn default_unit_scale() -> f64 {
    100.0
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            manual_vertical: default_unit_scale(),
            nudge: default_unit_scale(),
        }
    }
}

impl ScalingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.nudge <= 0.0 {
            return Err(ConfigError::NotPositive {
                name: "scaling.nudge",
                value: self.nudge,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LocalizationConfig {
    #[serde(default = "default_particle_count")]
    pub particle_count: usize,
    /// Altitude assumed before the first valid range reading, in meters.
    #[serde(default = "default_initial_altitude")]
    pub initial_altitude: f64,
    /// Range reading that marks an invalid measurement.
    #[serde(default = "default_invalid_altitude")]
    pub invalid_altitude: f64,
    /// When set, tilt samples older than this many seconds at frame time are
    /// replaced by a level attitude.
    #[serde(default)]
    pub max_tilt_age: Option<f64>,
}

fn default_particle_count() -> usize {
    50
}
fn default_initial_altitude() -> f64 {
    0.075
}
fn default_invalid_altitude() -> f64 {
    -1.0
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        Self {
            particle_count: default_particle_count(),
            initial_altitude: default_initial_altitude(),
            invalid_altitude: default_invalid_altitude(),
            max_tilt_age: None,
        }
    }
}

impl LocalizationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::NoParticles);
        }
        if let Some(age) = self.max_tilt_age {
            if age <= 0.0 {
                return Err(ConfigError::NotPositive {
                    name: "localization.max_tilt_age",
                    value: age,
                });
            }
        }
        Ok(())
    }
}

// --- Validation Helpers ---

fn check_blend(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::BlendOutOfRange { name, value })
    }
}

fn check_range(name: &'static str, range: [f64; 2]) -> Result<(), ConfigError> {
    if range[0] > range[1] {
        Err(ConfigError::InvertedRange {
            name,
            min: range[0],
            max: range[1],
        })
    } else {
        Ok(())
    }
}
