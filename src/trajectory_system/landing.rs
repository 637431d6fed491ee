use log::{debug, warn};
use serde::Serialize;

use crate::constants::{
    LANDING_TIME_BUDGET, LANDING_TIME_STEP, MAX_SIMULATION_TIME, MAX_SPEED,
    PARACHUTE_DEPLOY_DURATION, PARACHUTE_SHOCK_FACTOR,
};
use crate::control::environment::LaunchEnvironment;
use crate::telemetry_system::telemetry::FlightSample;
use crate::trajectory_system::kinematics::{ForceInputs, ForceModel, Kinematics};
use crate::trajectory_system::wind::wind_speed_at_height;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LandingPrediction {
    pub landing_x: f64,         // m
    pub landing_distance: f64,  // m from the pad
    pub time_to_landing: f64,   // s after the main run
    pub total_flight_time: f64, // s
    pub is_predicted: bool,
    pub reached_ground: bool,
}

pub struct LandingPredictor<'a> {
    kinematics: &'a Kinematics<'a>,
    environment: &'a LaunchEnvironment,
}

impl<'a> LandingPredictor<'a> {
    pub fn new(kinematics: &'a Kinematics<'a>, environment: &'a LaunchEnvironment) -> Self {
        LandingPredictor {
            kinematics,
            environment,
        }
    }

    // `hit_time_cap` tells whether the main run stopped at the time limit rather
    // than on the ground.
    pub fn predict(&self, terminal: &FlightSample, hit_time_cap: bool) -> LandingPrediction {
        if !terminal.position.is_finite() || !terminal.velocity.is_finite() || !terminal.time.is_finite() {
            warn!("Terminal sample is not finite, landing prediction zeroed");
            return LandingPrediction::default();
        }

        if terminal.height() <= 0.0 {
            return LandingPrediction {
                landing_x: terminal.position.x,
                landing_distance: terminal.position.x.abs(),
                time_to_landing: 0.0,
                total_flight_time: terminal.time,
                is_predicted: false,
                reached_ground: true,
            };
        }

        let base_time = if hit_time_cap {
            MAX_SIMULATION_TIME
        } else {
            terminal.time
        };
        let dt = LANDING_TIME_STEP;
        let max_steps = (LANDING_TIME_BUDGET / dt).round() as usize;

        let mut position = terminal.position;
        let mut velocity = terminal.velocity;
        let mut attitude = terminal.attitude;
        let mut ejected = terminal.parachute_ejected;
        let mut active = terminal.parachute_active;
        let mut deploy_remaining = (1.0 - terminal.deployment_progress) * PARACHUTE_DEPLOY_DURATION;

        for step in 0..max_steps {
            let clock = terminal.time + step as f64 * dt;
            if !ejected && clock >= self.environment.ejection_time() {
                ejected = true;
                deploy_remaining = PARACHUTE_DEPLOY_DURATION;
            }
            if ejected && !active && deploy_remaining <= 0.0 {
                active = true;
                velocity = velocity * PARACHUTE_SHOCK_FACTOR;
            }

            let model = if active {
                ForceModel::Descending
            } else if ejected {
                ForceModel::Deploying
            } else {
                ForceModel::Ballistic
            };
            if model == ForceModel::Ballistic && velocity.magnitude() > 1.0 {
                attitude = velocity.angle_from_vertical();
            }

            let inputs = ForceInputs {
                velocity,
                attitude,
                rail_angle: attitude,
                thrust: 0.0,
                wind_speed: wind_speed_at_height(
                    self.environment.wind_speed(),
                    position.y,
                    self.environment.wind_profile,
                ),
            };
            let acceleration = self.kinematics.acceleration(model, &inputs);
            velocity = (velocity + acceleration * dt).clamp_magnitude(MAX_SPEED);
            let next = position + velocity * dt;
            if ejected && !active {
                deploy_remaining -= dt;
            }

            if next.y <= 0.0 {
                let fraction = position.y / (position.y - next.y);
                let landing_x = position.x + (next.x - position.x) * fraction;
                let time_to_landing = (step as f64 + fraction) * dt;
                debug!(
                    "Predicted landing at x={:.2}m after {:.2}s more",
                    landing_x, time_to_landing
                );
                return LandingPrediction {
                    landing_x,
                    landing_distance: landing_x.abs(),
                    time_to_landing,
                    total_flight_time: base_time + time_to_landing,
                    is_predicted: true,
                    reached_ground: true,
                };
            }
            position = next;
        }

        let elapsed = max_steps as f64 * dt;
        warn!(
            "Landing prediction exhausted its {:.0}s budget at h={:.1}m",
            LANDING_TIME_BUDGET, position.y
        );
        LandingPrediction {
            landing_x: position.x,
            landing_distance: position.x.abs(),
            time_to_landing: elapsed,
            total_flight_time: base_time + elapsed,
            is_predicted: true,
            reached_ground: false,
        }
    }
}
