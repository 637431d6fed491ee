use serde::{Deserialize, Serialize};

use crate::constants::{MAX_BASE_WIND_SPEED, MAX_LAUNCH_ANGLE, MM_TO_M};
use crate::control::propulsion::Motor;
use crate::errors::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindProfile {
    Uniform,
    Water,
    Grassland,
    Suburban,
    Forest,
    Urban,
}

impl WindProfile {
    pub fn exponent(&self) -> f64 {
        match self {
            WindProfile::Uniform => 0.0,
            WindProfile::Water => 0.10,
            WindProfile::Grassland => 0.14,
            WindProfile::Suburban => 0.22,
            WindProfile::Forest => 0.30,
            WindProfile::Urban => 0.40,
        }
    }

    pub fn all() -> [WindProfile; 6] {
        [
            WindProfile::Uniform,
            WindProfile::Water,
            WindProfile::Grassland,
            WindProfile::Suburban,
            WindProfile::Forest,
            WindProfile::Urban,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parachute {
    Small,
    Medium,
    Large,
}

impl Parachute {
    pub fn diameter(&self) -> f64 {
        match self {
            Parachute::Small => 300.0,
            Parachute::Medium => 450.0,
            Parachute::Large => 600.0,
        }
    }

    // Canopy area, m².
    pub fn area(&self) -> f64 {
        let radius = self.diameter() * MM_TO_M / 2.0;
        std::f64::consts::PI * radius * radius
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchEnvironment {
    launch_angle: f64, // deg from vertical, positive toward +x
    wind_speed: f64,   // m/s, positive blowing toward +x
    pub wind_profile: WindProfile,
    pub motor: Motor,
    pub parachute: Parachute,
}

impl LaunchEnvironment {
    pub fn new(
        launch_angle: f64,
        wind_speed: f64,
        wind_profile: WindProfile,
        motor: Motor,
        parachute: Parachute,
    ) -> Result<Self, ValidationError> {
        Ok(LaunchEnvironment {
            launch_angle: within("launch_angle", launch_angle, MAX_LAUNCH_ANGLE)?,
            wind_speed: within("wind_speed", wind_speed, MAX_BASE_WIND_SPEED)?,
            wind_profile,
            motor,
            parachute,
        })
    }

    pub fn launch_angle(&self) -> f64 {
        self.launch_angle
    }

    pub fn launch_angle_rad(&self) -> f64 {
        self.launch_angle.to_radians()
    }

    pub fn wind_speed(&self) -> f64 {
        self.wind_speed
    }

    // Ejection charge time: burnout plus the motor's delay.
    pub fn ejection_time(&self) -> f64 {
        self.motor.burn_duration() + self.motor.ejection_delay
    }
}

impl Default for LaunchEnvironment {
    fn default() -> Self {
        LaunchEnvironment {
            launch_angle: 0.0,
            wind_speed: 0.0,
            wind_profile: WindProfile::Uniform,
            motor: Motor::default(),
            parachute: Parachute::Small,
        }
    }
}

fn within(field: &'static str, value: f64, limit: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite { field, value });
    }
    if value.abs() > limit {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min: -limit,
            max: limit,
        });
    }
    Ok(value)
}
