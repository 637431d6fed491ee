pub mod stability;
pub mod telemetry;
