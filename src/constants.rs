// Physical Constants
pub const GRAVITY: f64 = 9.81; // m/s²
pub const AIR_DENSITY_SEA_LEVEL: f64 = 1.225; // kg/m³
pub const SEA_LEVEL_PRESSURE: f64 = 101_325.0; // Pa
pub const SPEED_OF_SOUND: f64 = 343.0; // m/s

// Simulation Parameters
pub const TIME_STEP: f64 = 0.02; // s, translational step
pub const ROTATION_STEPS: usize = 10; // translational steps per rotational update
pub const ROTATION_TIME_STEP: f64 = TIME_STEP * ROTATION_STEPS as f64; // s
pub const MAX_SIMULATION_TIME: f64 = 20.0; // s
pub const GROUND_GRACE_PERIOD: f64 = 0.1; // s before ground contact can end a run

// Launch
pub const LAUNCH_RAIL_LENGTH: f64 = 0.65; // m
pub const MAX_LAUNCH_ANGLE: f64 = 30.0; // deg
pub const MAX_BASE_WIND_SPEED: f64 = 8.0; // m/s

// Wind profile
pub const WIND_REFERENCE_HEIGHT: f64 = 1.5; // m
pub const WIND_MULTIPLIER_CAP: f64 = 3.0;
pub const ZERO_WIND_THRESHOLD: f64 = 0.1; // m/s, below this no aerodynamic torque

// Flight limits
pub const MAX_SPEED: f64 = 100.0; // m/s
pub const MIN_MASS: f64 = 0.001; // kg
pub const MIN_MOMENT_OF_INERTIA: f64 = 1e-6; // kg·m²

// Aerodynamics
pub const SIDE_DRAG_COEFFICIENT: f64 = 1.0;
pub const DEPLOYING_BODY_DRAG_COEFFICIENT: f64 = 0.3;
pub const PARACHUTE_DRAG_COEFFICIENT: f64 = 0.8;
pub const NOSE_NORMAL_FORCE_SLOPE: f64 = 2.0; // per rad
pub const FUSELAGE_VOLUME_FACTOR: f64 = 0.5;
pub const PITCH_DAMPING_COEFFICIENT: f64 = 1.0;
pub const STIFFNESS_ATTITUDE_FLOOR: f64 = 0.2; // minimum cos(α) used for stiffness
pub const FIN_BASE_LOAD_COEFFICIENT: f64 = 0.05;

// Moment model
pub const VELOCITY_SQUARED_CAP: f64 = 10_000.0; // (m/s)²
pub const MOMENT_WIND_CAP: f64 = 25.0; // m/s
pub const THRUST_MOMENT_FLOOR: f64 = 1e-5; // N·m
pub const MOTOR_MISALIGNMENT_FACTOR: f64 = 0.05;

// Torque and attitude guards
pub const TORQUE_ABORT_THRESHOLD: f64 = 10.0; // N·m
pub const TORQUE_LIMIT: f64 = 1.0; // N·m
pub const ANGULAR_VELOCITY_LIMIT: f64 = 5.0; // rad/s
pub const ANGLE_CHANGE_LIMIT: f64 = 45.0; // deg per rotational window
pub const ABSOLUTE_ANGLE_LIMIT: f64 = 112.5; // deg

// Parachute
pub const PARACHUTE_DEPLOY_DURATION: f64 = 1.0; // s
pub const PARACHUTE_SHOCK_FACTOR: f64 = 0.1; // fraction of velocity kept at full deployment
pub const DESCENT_RESTORING_STIFFNESS: f64 = 0.02; // N·m/rad
pub const DEPLOYING_RESTORING_STIFFNESS: f64 = 0.01; // N·m/rad

// Attitude controller
pub const ENHANCED_ATTITUDE_GAIN: f64 = 0.3;
pub const ATTITUDE_NUDGE: f64 = 1e-4; // rad
pub const COMPENSATED_TORQUE_FACTOR: f64 = 1.2;

// Fin structure
pub const FIN_DEFLECTION_MIN_SPEED: f64 = 5.0; // m/s
pub const MAX_FIN_DEFLECTION: f64 = 15.0; // mm
pub const FIN_DEFLECTION_SPAN_RATIO: f64 = 0.03;
pub const MIN_DIVERGENCE_SPEED: f64 = 20.0; // m/s
pub const MAX_DIVERGENCE_SPEED: f64 = 300.0; // m/s
pub const MIN_FLUTTER_SPEED: f64 = 30.0; // m/s
pub const MAX_FLUTTER_SPEED: f64 = 400.0; // m/s

// Landing prediction
pub const LANDING_TIME_STEP: f64 = 0.05; // s
pub const LANDING_TIME_BUDGET: f64 = 120.0; // s

// Key points
pub const APOGEE_CONFIRMATION_DROP: f64 = 1.0; // m below the running maximum

pub const MM_TO_M: f64 = 1e-3;
