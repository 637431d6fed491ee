use std::f64::consts::FRAC_PI_2;

use crate::constants::{ANGULAR_VELOCITY_LIMIT, ENHANCED_ATTITUDE_GAIN, TIME_STEP};
use crate::utils::angles::normalize_angle;

// Couples the fine translational clock to the coarse rotational one.
// Every tick the torque is accumulated. Once `steps_per_update` ticks have gone by
// the mean torque is handed out for a rotational update, and the resulting angle
// change is released in equal slices over the following window.
#[derive(Debug, Clone)]
pub struct RotationScheduler {
    steps_per_update: usize,
    torque_sum: f64,
    accumulated: usize,
    increment: f64,
    remaining: usize,
}

impl RotationScheduler {
    pub fn new(steps_per_update: usize) -> Self {
        RotationScheduler {
            steps_per_update: steps_per_update.max(1),
            torque_sum: 0.0,
            accumulated: 0,
            increment: 0.0,
            remaining: 0,
        }
    }

    pub fn window_duration(&self) -> f64 {
        self.steps_per_update as f64 * TIME_STEP
    }

    pub fn accumulate(&mut self, torque: f64) -> Option<f64> {
        self.torque_sum += torque;
        self.accumulated += 1;
        if self.accumulated < self.steps_per_update {
            return None;
        }
        let mean = self.torque_sum / self.accumulated as f64;
        self.torque_sum = 0.0;
        self.accumulated = 0;
        Some(mean)
    }

    pub fn schedule(&mut self, window_delta: f64) {
        self.increment = window_delta / self.steps_per_update as f64;
        self.remaining = self.steps_per_update;
    }

    pub fn next_increment(&mut self) -> f64 {
        if self.remaining == 0 {
            return 0.0;
        }
        self.remaining -= 1;
        self.increment
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowUpdate {
    pub angular_velocity: f64,     // rad/s
    pub angular_acceleration: f64, // rad/s²
    pub clamped: bool,
}

// Advances the angular velocity across one window of length `dt`.
// The restoring spring is treated implicitly so that stiff designs settle instead
// of overshooting at the coarse cadence.
pub fn window_update(
    angular_velocity: f64,
    mean_torque: f64,
    inertia: f64,
    stiffness: f64,
    dt: f64,
) -> WindowUpdate {
    let explicit = angular_velocity + dt * mean_torque / inertia;
    let mut next = explicit / (1.0 + dt * dt * stiffness.max(0.0) / inertia);
    if !next.is_finite() {
        next = 0.0;
    }
    let clamped = next.abs() > ANGULAR_VELOCITY_LIMIT;
    let next = next.clamp(-ANGULAR_VELOCITY_LIMIT, ANGULAR_VELOCITY_LIMIT);
    WindowUpdate {
        angular_velocity: next,
        angular_acceleration: (next - angular_velocity) / dt,
        clamped,
    }
}

// Weathercock-seeking correction added to a window's angle change.
// When `limit_to_wind` is set and the rocket is moving upwind, the corrected
// attitude stays within 90° of the direction the wind blows from.
pub fn enhanced_correction(
    attitude: f64,
    window_delta: f64,
    flight_path: f64,
    horizontal_velocity: f64,
    wind_speed: f64,
    limit_to_wind: bool,
) -> f64 {
    let mut delta = window_delta
        + ENHANCED_ATTITUDE_GAIN * normalize_angle(flight_path - (attitude + window_delta));

    let heading_upwind = horizontal_velocity != 0.0
        && wind_speed != 0.0
        && horizontal_velocity.signum() == -wind_speed.signum();
    if limit_to_wind && heading_upwind {
        let upwind = -wind_speed.signum() * FRAC_PI_2;
        let offset = normalize_angle(attitude + delta - upwind);
        if offset.abs() > FRAC_PI_2 {
            let limited = upwind + offset.signum() * FRAC_PI_2;
            delta = normalize_angle(limited - attitude);
        }
    }
    delta
}
