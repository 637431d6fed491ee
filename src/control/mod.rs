pub mod config;
pub mod environment;
pub mod flight_phase;
pub mod propulsion;
pub mod rocket;
