use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    // Drive attitude from aerodynamic torque. When off, the body simply follows its flight path.
    pub physical_attitude_control: bool,
    // Adds a weathercock-seeking correction toward the relative airflow during free flight.
    pub enhanced_attitude_control: bool,
    // While heading upwind, keeps that correction within 90° of the wind direction.
    pub wind_angle_limitation: bool,
    // Keeps the nudge and coast torque boost applied at launch angles of ±4° and ±18°.
    pub launch_angle_compensation: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            physical_attitude_control: true,
            enhanced_attitude_control: false,
            wind_angle_limitation: true,
            launch_angle_compensation: true,
        }
    }
}
