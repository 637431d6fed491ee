pub mod analysis;
pub mod constants;
pub mod control;
pub mod errors;
pub mod telemetry_system;
pub mod trajectory_system;
pub mod utils;

pub use constants::*;
pub use control::config::SimulationConfig;
pub use control::environment::{LaunchEnvironment, Parachute, WindProfile};
pub use control::flight_phase::FlightPhase;
pub use control::propulsion::{Motor, MotorClass};
pub use control::rocket::{DesignParameters, FinCount, FinMaterial, NoseShape, RocketDesign};
pub use errors::{SimulationError, TorqueAbort, ValidationError};

// Re-export commonly used items from trajectory_system
pub use trajectory_system::aerodynamics::AerodynamicProperties;
pub use trajectory_system::integrator::{simulate, simulate_parameters, FlightIntegrator};
pub use trajectory_system::landing::{LandingPrediction, LandingPredictor};
pub use trajectory_system::moments::{MomentBreakdown, MomentCalculator};
pub use trajectory_system::wind::wind_speed_at_height;

// Re-export commonly used items from telemetry_system
pub use telemetry_system::stability::StabilityRecord;
pub use telemetry_system::telemetry::{FlightRecord, FlightSample, FlightTelemetry, SafetyVerdict};

// Re-export the dispersion entry point
pub use analysis::dispersion::{run_dispersion, DispersionSettings, DispersionSummary};

// Re-export commonly used utilities
pub use utils::vector2d::Vector2D;
