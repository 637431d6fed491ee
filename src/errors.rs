use serde::Serialize;
use thiserror::Error;

use crate::telemetry_system::stability::StabilityRecord;
use crate::trajectory_system::moments::{MomentBreakdown, MomentKind};
use crate::utils::vector2d::Vector2D;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must lie within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("fin count must be 3 or 4, got {0}")]
    FinCount(u32),

    #[error("unknown motor designation: {0}")]
    UnknownMotor(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MomentFault {
    #[error("{kind} moment evaluated to a non-finite value")]
    NonFinite { kind: MomentKind },
}

#[derive(Debug, Clone, Serialize)]
pub struct TorqueAbort {
    pub time: f64,            // s
    pub velocity: Vector2D,   // m/s
    pub speed: f64,           // m/s
    pub threshold: f64,       // N·m
    pub torque: f64,          // N·m, raw combined value
    pub moments: MomentBreakdown,
    pub stability: StabilityRecord,
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error(
        "Abnormal torque at t={:.2}s: |{:.3}| N·m exceeds {:.1} N·m (speed {:.2} m/s)",
        .0.time,
        .0.torque,
        .0.threshold,
        .0.speed
    )]
    AbnormalTorque(Box<TorqueAbort>),
}
