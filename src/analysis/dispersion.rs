use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use crate::constants::{MAX_BASE_WIND_SPEED, MAX_LAUNCH_ANGLE};
use crate::control::config::SimulationConfig;
use crate::control::environment::LaunchEnvironment;
use crate::control::rocket::RocketDesign;
use crate::errors::{SimulationError, ValidationError};
use crate::telemetry_system::telemetry::FlightRecord;
use crate::trajectory_system::aerodynamics::AerodynamicProperties;
use crate::trajectory_system::integrator::FlightIntegrator;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispersionSettings {
    pub runs: usize,
    pub wind_spread: f64,  // m/s either side of the nominal wind
    pub angle_spread: f64, // deg either side of the nominal launch angle
    pub seed: u64,
}

impl Default for DispersionSettings {
    fn default() -> Self {
        DispersionSettings {
            runs: 100,
            wind_spread: 1.0,
            angle_spread: 2.0,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DispersionCase {
    pub launch_angle: f64,
    pub wind_speed: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DispersionSummary {
    pub runs: usize,
    pub completed: usize,
    pub aborted: usize,
    pub unsafe_runs: usize,
    pub mean_landing_x: f64,
    pub std_landing_x: f64,
    pub min_landing_x: f64,
    pub max_landing_x: f64,
    pub mean_max_height: f64,
}

// Spreads wider than the whole input range add nothing once cases are clamped.
fn finite_spread(
    field: &'static str,
    value: f64,
    range_limit: f64,
) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value.abs().min(2.0 * range_limit))
    } else {
        Err(ValidationError::NonFinite { field, value })
    }
}

// Jittered launch conditions, clamped to the valid input ranges.
pub fn sample_cases(
    environment: &LaunchEnvironment,
    settings: &DispersionSettings,
) -> Result<Vec<DispersionCase>, ValidationError> {
    let wind_spread = finite_spread("wind_spread", settings.wind_spread, MAX_BASE_WIND_SPEED)?;
    let angle_spread = finite_spread("angle_spread", settings.angle_spread, MAX_LAUNCH_ANGLE)?;
    let mut rng = StdRng::seed_from_u64(settings.seed);

    let cases = (0..settings.runs)
        .map(|_| {
            let wind = environment.wind_speed() + rng.gen_range(-wind_spread..=wind_spread);
            let angle = environment.launch_angle() + rng.gen_range(-angle_spread..=angle_spread);
            DispersionCase {
                launch_angle: angle.clamp(-MAX_LAUNCH_ANGLE, MAX_LAUNCH_ANGLE),
                wind_speed: wind.clamp(-MAX_BASE_WIND_SPEED, MAX_BASE_WIND_SPEED),
            }
        })
        .collect();
    Ok(cases)
}

pub fn run_dispersion(
    design: &RocketDesign,
    environment: &LaunchEnvironment,
    config: SimulationConfig,
    settings: &DispersionSettings,
) -> Result<DispersionSummary, SimulationError> {
    let cases = sample_cases(environment, settings)?;
    let properties = AerodynamicProperties::calculate(design);

    let outcomes: Vec<Result<FlightRecord, SimulationError>> = cases
        .par_iter()
        .map(|case| {
            let env = LaunchEnvironment::new(
                case.launch_angle,
                case.wind_speed,
                environment.wind_profile,
                environment.motor.clone(),
                environment.parachute,
            )?;
            FlightIntegrator::new(design, &env, &properties, config).run()
        })
        .collect();

    let mut landings = Vec::with_capacity(outcomes.len());
    let mut heights = Vec::with_capacity(outcomes.len());
    let mut aborted = 0;
    let mut unsafe_runs = 0;
    for outcome in outcomes {
        match outcome {
            Ok(record) => {
                if !record.verdict.is_safe {
                    unsafe_runs += 1;
                }
                landings.push(record.landing.landing_x);
                heights.push(record.max_height());
            }
            Err(SimulationError::AbnormalTorque(_)) => {
                aborted += 1;
                unsafe_runs += 1;
            }
            Err(e) => return Err(e),
        }
    }

    let summary = summarize(settings.runs, &landings, &heights, aborted, unsafe_runs);
    info!(
        "Dispersion: {} runs, {} aborted, landing x {:.1} ± {:.1} m",
        summary.runs, summary.aborted, summary.mean_landing_x, summary.std_landing_x
    );
    Ok(summary)
}

fn summarize(
    runs: usize,
    landings: &[f64],
    heights: &[f64],
    aborted: usize,
    unsafe_runs: usize,
) -> DispersionSummary {
    let mut summary = DispersionSummary {
        runs,
        completed: landings.len(),
        aborted,
        unsafe_runs,
        ..DispersionSummary::default()
    };
    if landings.is_empty() {
        return summary;
    }

    let n = landings.len() as f64;
    let mean = landings.iter().sum::<f64>() / n;
    let variance = landings.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    summary.mean_landing_x = mean;
    summary.std_landing_x = variance.sqrt();
    summary.min_landing_x = landings.iter().copied().fold(f64::INFINITY, f64::min);
    summary.max_landing_x = landings.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    summary.mean_max_height = heights.iter().sum::<f64>() / n;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::environment::{Parachute, WindProfile};
    use crate::control::propulsion::Motor;
    use approx::assert_relative_eq;

    fn environment(angle: f64, wind: f64) -> LaunchEnvironment {
        LaunchEnvironment::new(angle, wind, WindProfile::Grassland, Motor::default(), Parachute::Medium)
            .unwrap()
    }

    #[test]
    fn test_cases_are_reproducible_and_clamped() {
        let env = environment(29.0, 7.5);
        let settings = DispersionSettings {
            runs: 50,
            wind_spread: 2.0,
            angle_spread: 3.0,
            seed: 7,
        };
        let first = sample_cases(&env, &settings).unwrap();
        let second = sample_cases(&env, &settings).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 50);
        assert!(first.iter().all(|c| c.launch_angle.abs() <= MAX_LAUNCH_ANGLE));
        assert!(first.iter().all(|c| c.wind_speed.abs() <= MAX_BASE_WIND_SPEED));

        let other = sample_cases(&env, &DispersionSettings { seed: 8, ..settings }).unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn test_zero_spread_gives_identical_landings() {
        let settings = DispersionSettings {
            runs: 4,
            wind_spread: 0.0,
            angle_spread: 0.0,
            seed: 1,
        };
        let summary = run_dispersion(
            &RocketDesign::default(),
            &environment(0.0, 0.0),
            SimulationConfig::default(),
            &settings,
        )
        .unwrap();
        assert_eq!(summary.runs, 4);
        assert_eq!(summary.completed + summary.aborted, 4);
        assert_relative_eq!(summary.std_landing_x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(summary.min_landing_x, summary.max_landing_x, epsilon = 1e-12);
        assert!(summary.mean_max_height > 0.0);
    }

    #[test]
    fn test_non_finite_spread_is_rejected() {
        let env = environment(0.0, 2.0);
        let config = SimulationConfig::default();
        let design = RocketDesign::default();

        let nan_wind = DispersionSettings {
            wind_spread: f64::NAN,
            ..DispersionSettings::default()
        };
        match run_dispersion(&design, &env, config, &nan_wind) {
            Err(SimulationError::InvalidInput(ValidationError::NonFinite { field, .. })) => {
                assert_eq!(field, "wind_spread")
            }
            other => panic!("expected a non-finite spread error, got {:?}", other),
        }

        let infinite_angle = DispersionSettings {
            angle_spread: f64::INFINITY,
            ..DispersionSettings::default()
        };
        assert!(matches!(
            sample_cases(&env, &infinite_angle),
            Err(ValidationError::NonFinite { field: "angle_spread", .. })
        ));

        let huge = DispersionSettings {
            runs: 20,
            wind_spread: f64::MAX,
            angle_spread: -f64::MAX,
            seed: 3,
        };
        let cases = sample_cases(&env, &huge).unwrap();
        assert_eq!(cases.len(), 20);
        assert!(cases.iter().all(|c| c.wind_speed.abs() <= MAX_BASE_WIND_SPEED));
        assert!(cases.iter().all(|c| c.launch_angle.abs() <= MAX_LAUNCH_ANGLE));
    }

    #[test]
    fn test_summary_statistics() {
        let summary = summarize(5, &[1.0, 3.0], &[10.0, 20.0], 3, 3);
        assert_eq!(summary.completed, 2);
        assert_relative_eq!(summary.mean_landing_x, 2.0);
        assert_relative_eq!(summary.std_landing_x, 1.0);
        assert_relative_eq!(summary.min_landing_x, 1.0);
        assert_relative_eq!(summary.max_landing_x, 3.0);
        assert_relative_eq!(summary.mean_max_height, 15.0);

        let empty = summarize(2, &[], &[], 2, 2);
        assert_eq!(empty.completed, 0);
        assert_eq!(empty.mean_landing_x, 0.0);
    }
}
