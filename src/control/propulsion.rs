use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::constants::TIME_STEP;
use crate::errors::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MotorClass {
    A8,
    B6,
    C6,
}

// (time s, thrust N) knots of the certified thrust curves.
const A8_CURVE: &[(f64, f64)] = &[
    (0.0, 0.0),
    (0.05, 3.0),
    (0.15, 10.7),
    (0.22, 6.0),
    (0.30, 4.0),
    (0.60, 3.0),
    (0.73, 0.0),
];

const B6_CURVE: &[(f64, f64)] = &[
    (0.0, 0.0),
    (0.10, 5.0),
    (0.20, 12.0),
    (0.30, 6.0),
    (0.40, 5.0),
    (0.80, 4.5),
    (0.86, 0.0),
];

const C6_CURVE: &[(f64, f64)] = &[
    (0.0, 0.0),
    (0.10, 6.0),
    (0.20, 14.0),
    (0.30, 6.0),
    (0.50, 5.0),
    (1.80, 4.5),
    (1.86, 0.0),
];

impl MotorClass {
    pub fn designation(&self) -> &'static str {
        match self {
            MotorClass::A8 => "A8",
            MotorClass::B6 => "B6",
            MotorClass::C6 => "C6",
        }
    }

    fn curve(&self) -> &'static [(f64, f64)] {
        match self {
            MotorClass::A8 => A8_CURVE,
            MotorClass::B6 => B6_CURVE,
            MotorClass::C6 => C6_CURVE,
        }
    }

    pub fn burn_time(&self) -> f64 {
        self.curve().last().map_or(0.0, |&(t, _)| t)
    }

    // Thrust at `time` by linear interpolation between curve knots.
    pub fn thrust_at(&self, time: f64) -> f64 {
        let curve = self.curve();
        if time <= 0.0 || time >= self.burn_time() {
            return 0.0;
        }
        curve
            .windows(2)
            .find(|w| time >= w[0].0 && time <= w[1].0)
            .map_or(0.0, |w| {
                let (t0, f0) = w[0];
                let (t1, f1) = w[1];
                f0 + (f1 - f0) * (time - t0) / (t1 - t0)
            })
    }

    // Thrust resampled onto the integrator grid, one entry per `TIME_STEP` tick.
    pub fn thrust_samples(&self) -> Vec<f64> {
        let ticks = (self.burn_time() / TIME_STEP).ceil() as usize;
        (0..ticks)
            .map(|i| self.thrust_at(i as f64 * TIME_STEP))
            .collect()
    }
}

impl FromStr for MotorClass {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A8" => Ok(MotorClass::A8),
            "B6" => Ok(MotorClass::B6),
            "C6" => Ok(MotorClass::C6),
            _ => Err(ValidationError::UnknownMotor(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Motor {
    pub class: MotorClass,
    pub ejection_delay: f64, // s after burnout
    thrust_samples: Vec<f64>,
}

impl Motor {
    pub fn new(class: MotorClass, ejection_delay: f64) -> Result<Self, ValidationError> {
        if !ejection_delay.is_finite() {
            return Err(ValidationError::NonFinite {
                field: "ejection_delay",
                value: ejection_delay,
            });
        }
        if ejection_delay < 0.0 {
            return Err(ValidationError::NonPositive {
                field: "ejection_delay",
                value: ejection_delay,
            });
        }
        Ok(Motor {
            class,
            ejection_delay,
            thrust_samples: class.thrust_samples(),
        })
    }

    pub fn thrust_samples(&self) -> &[f64] {
        &self.thrust_samples
    }

    pub fn thrust_at_step(&self, step: usize) -> f64 {
        self.thrust_samples.get(step).copied().unwrap_or(0.0)
    }

    pub fn burn_duration(&self) -> f64 {
        self.thrust_samples.len() as f64 * TIME_STEP
    }

    pub fn total_impulse(&self) -> f64 {
        self.thrust_samples.iter().sum::<f64>() * TIME_STEP
    }
}

impl Default for Motor {
    fn default() -> Self {
        Motor {
            class: MotorClass::A8,
            ejection_delay: 3.0,
            thrust_samples: MotorClass::A8.thrust_samples(),
        }
    }
}

impl FromStr for Motor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (class, delay) = s
            .split_once('-')
            .ok_or_else(|| ValidationError::UnknownMotor(s.to_string()))?;
        let class: MotorClass = class.parse()?;
        let delay: f64 = delay
            .trim()
            .parse()
            .map_err(|_| ValidationError::UnknownMotor(s.to_string()))?;
        Motor::new(class, delay)
    }
}

impl fmt::Display for Motor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.class.designation(), self.ejection_delay)
    }
}
