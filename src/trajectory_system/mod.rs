pub mod aerodynamics;
pub mod attitude;
pub mod integrator;
pub mod kinematics;
pub mod landing;
pub mod moments;
pub mod wind;
