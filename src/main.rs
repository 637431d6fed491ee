use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::info;
use model_rocket_simulation::*;

#[derive(Parser)]
#[command(name = "model-rocket-sim")]
#[command(version = "0.1.0")]
#[command(about = "2-D flight simulator for single-stage model rockets", long_about = None)]
struct Cli {
    /// Motor designation, class and ejection delay (A8-3, B6-4, C6-5)
    #[arg(short = 'm', long, default_value = "A8-3")]
    motor: Motor,

    /// Parachute size
    #[arg(short = 'p', long, value_enum, default_value = "small")]
    parachute: ParachuteArg,

    /// Launch angle from vertical (degrees, positive downwind)
    #[arg(short = 'a', long, default_value = "0.0", allow_hyphen_values = true)]
    angle: f64,

    /// Wind speed at the reference height (m/s)
    #[arg(short = 'w', long, default_value = "0.0", allow_hyphen_values = true)]
    wind: f64,

    /// Terrain class for the wind profile
    #[arg(long, value_enum, default_value = "grassland")]
    profile: ProfileArg,

    /// Rocket design as JSON; the built-in design is used when absent
    #[arg(short = 'd', long)]
    design: Option<PathBuf>,

    /// Let the body follow its flight path instead of integrating torque
    #[arg(long)]
    no_physical_attitude: bool,

    /// Add the weathercock-seeking correction
    #[arg(long)]
    enhanced_attitude: bool,

    /// Drop the 90° limit on upwind corrections
    #[arg(long)]
    no_wind_angle_limit: bool,

    /// Drop the ±4°/±18° launch angle compensation
    #[arg(long)]
    no_angle_compensation: bool,

    /// Print the full flight record as JSON
    #[arg(long)]
    json: bool,

    /// Fly this many jittered runs and report landing dispersion instead
    #[arg(long)]
    dispersion: Option<usize>,

    /// Wind jitter for dispersion runs (m/s)
    #[arg(long, default_value = "1.0")]
    wind_spread: f64,

    /// Launch angle jitter for dispersion runs (degrees)
    #[arg(long, default_value = "2.0")]
    angle_spread: f64,

    /// Seed for dispersion runs
    #[arg(long, default_value = "42")]
    seed: u64,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ParachuteArg {
    Small,
    Medium,
    Large,
}

impl From<ParachuteArg> for Parachute {
    fn from(arg: ParachuteArg) -> Self {
        match arg {
            ParachuteArg::Small => Parachute::Small,
            ParachuteArg::Medium => Parachute::Medium,
            ParachuteArg::Large => Parachute::Large,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ProfileArg {
    Uniform,
    Water,
    Grassland,
    Suburban,
    Forest,
    Urban,
}

impl From<ProfileArg> for WindProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Uniform => WindProfile::Uniform,
            ProfileArg::Water => WindProfile::Water,
            ProfileArg::Grassland => WindProfile::Grassland,
            ProfileArg::Suburban => WindProfile::Suburban,
            ProfileArg::Forest => WindProfile::Forest,
            ProfileArg::Urban => WindProfile::Urban,
        }
    }
}

fn load_design(path: Option<&PathBuf>) -> Result<RocketDesign, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            let params: DesignParameters = serde_json::from_str(&text)?;
            Ok(RocketDesign::try_from(&params)?)
        }
        None => Ok(RocketDesign::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let design = load_design(cli.design.as_ref())?;
    let environment = LaunchEnvironment::new(
        cli.angle,
        cli.wind,
        cli.profile.into(),
        cli.motor.clone(),
        cli.parachute.into(),
    )?;
    let config = SimulationConfig {
        physical_attitude_control: !cli.no_physical_attitude,
        enhanced_attitude_control: cli.enhanced_attitude,
        wind_angle_limitation: !cli.no_wind_angle_limit,
        launch_angle_compensation: !cli.no_angle_compensation,
    };

    if let Some(runs) = cli.dispersion {
        let settings = DispersionSettings {
            runs,
            wind_spread: cli.wind_spread,
            angle_spread: cli.angle_spread,
            seed: cli.seed,
        };
        let summary = run_dispersion(&design, &environment, config, &settings)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            println!(
                "Dispersion over {} runs ({} completed, {} aborted, {} unsafe)",
                summary.runs, summary.completed, summary.aborted, summary.unsafe_runs
            );
            println!(
                "  Landing x: {:.2} m ± {:.2} m",
                summary.mean_landing_x, summary.std_landing_x
            );
            println!(
                "  Range:     {:.2} m to {:.2} m",
                summary.min_landing_x, summary.max_landing_x
            );
            println!("  Mean apogee: {:.2} m", summary.mean_max_height);
        }
        return Ok(());
    }

    info!(
        "Simulating {} with {:?} parachute at {:.1}° in {:.1} m/s wind",
        environment.motor,
        environment.parachute,
        environment.launch_angle(),
        environment.wind_speed()
    );

    match simulate(&design, &environment, config) {
        Ok(record) => {
            info!(
                "Run ended ({:?}) with apogee {:.2} m, landing at x={:.2} m",
                record.termination,
                record.max_height(),
                record.landing.landing_x
            );
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("{}", record.telemetry);
                let predicted = if record.landing.is_predicted {
                    " (predicted)"
                } else {
                    ""
                };
                println!(
                    "Landing: x={:.2} m, {:.2} m from the pad, total flight {:.2} s{}",
                    record.landing.landing_x,
                    record.landing.landing_distance,
                    record.landing.total_flight_time,
                    predicted
                );
                println!(
                    "Stable: {}  Safe: {}",
                    record.stability.is_stable, record.verdict.is_safe
                );
            }
        }
        Err(SimulationError::AbnormalTorque(abort)) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&abort)?);
            } else {
                println!(
                    "Simulation aborted at t={:.2}s: torque {:.3} N·m exceeds {:.1} N·m",
                    abort.time, abort.torque, abort.threshold
                );
                println!("  Moments: {:?}", abort.moments);
            }
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
