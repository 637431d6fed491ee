use log::warn;
use serde::Serialize;

use crate::constants::{
    AIR_DENSITY_SEA_LEVEL, DEPLOYING_BODY_DRAG_COEFFICIENT, FIN_BASE_LOAD_COEFFICIENT,
    FIN_DEFLECTION_MIN_SPEED, GRAVITY, MAX_FIN_DEFLECTION, MIN_MASS, MM_TO_M,
    PARACHUTE_DRAG_COEFFICIENT, SIDE_DRAG_COEFFICIENT,
};
use crate::control::rocket::RocketDesign;
use crate::trajectory_system::aerodynamics::AerodynamicProperties;
use crate::utils::vector2d::Vector2D;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceModel {
    Rail,
    Ballistic,
    Deploying,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceInputs {
    pub velocity: Vector2D,
    pub attitude: f64,    // rad from vertical
    pub rail_angle: f64,  // rad from vertical
    pub thrust: f64,      // N
    pub wind_speed: f64,  // m/s
}

#[derive(Debug, Clone)]
pub struct Kinematics<'a> {
    props: &'a AerodynamicProperties,
    mass: f64,
    parachute_area: f64,
}

fn quadratic_drag(coefficient: f64, area: f64, relative_speed: f64) -> f64 {
    0.5 * AIR_DENSITY_SEA_LEVEL * coefficient * area * relative_speed * relative_speed.abs()
}

impl<'a> Kinematics<'a> {
    pub fn new(props: &'a AerodynamicProperties, mass: f64, parachute_area: f64) -> Self {
        let mass = if mass.is_finite() && mass >= MIN_MASS {
            mass
        } else {
            warn!("Mass {} kg below floor, using {} kg", mass, MIN_MASS);
            MIN_MASS
        };
        Kinematics {
            props,
            mass,
            parachute_area,
        }
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn acceleration(&self, model: ForceModel, inputs: &ForceInputs) -> Vector2D {
        match model {
            ForceModel::Rail => self.on_rail(inputs.velocity, inputs.rail_angle, inputs.thrust),
            ForceModel::Ballistic => {
                self.ballistic(inputs.velocity, inputs.attitude, inputs.thrust, inputs.wind_speed)
            }
            ForceModel::Deploying => self.deploying(inputs.velocity, inputs.wind_speed),
            ForceModel::Descending => self.descending(inputs.velocity, inputs.wind_speed),
        }
    }

    // Acceleration along the rail. The rail carries the lateral load, and the rocket
    // does not slide back down it.
    pub fn on_rail(&self, velocity: Vector2D, rail_angle: f64, thrust: f64) -> Vector2D {
        let along = Vector2D::from_attitude(rail_angle, 1.0);
        let speed = velocity.dot(&along);
        let drag = quadratic_drag(self.props.drag_coefficient, self.props.frontal_area, speed);
        let mut acceleration = (thrust - self.mass * GRAVITY * rail_angle.cos() - drag) / self.mass;
        if speed <= 0.0 && acceleration < 0.0 {
            acceleration = 0.0;
        }
        along * acceleration
    }

    // Free flight: thrust along the body, axial drag, crosswind push and gravity.
    pub fn ballistic(&self, velocity: Vector2D, attitude: f64, thrust: f64, wind_speed: f64) -> Vector2D {
        let thrust_force = Vector2D::from_attitude(attitude, thrust);
        let drag = velocity
            * (-0.5
                * AIR_DENSITY_SEA_LEVEL
                * self.props.drag_coefficient
                * self.props.frontal_area
                * velocity.magnitude());
        let crosswind = Vector2D::new(
            quadratic_drag(SIDE_DRAG_COEFFICIENT, self.props.side_area, wind_speed - velocity.x),
            0.0,
        );
        (thrust_force + drag + crosswind) / self.mass + self.gravity()
    }

    // Canopy still opening: light body drag and half the crosswind.
    pub fn deploying(&self, velocity: Vector2D, wind_speed: f64) -> Vector2D {
        let drag = velocity
            * (-0.5
                * AIR_DENSITY_SEA_LEVEL
                * DEPLOYING_BODY_DRAG_COEFFICIENT
                * self.props.frontal_area
                * velocity.magnitude());
        let crosswind = Vector2D::new(
            0.5 * quadratic_drag(SIDE_DRAG_COEFFICIENT, self.props.side_area, wind_speed - velocity.x),
            0.0,
        );
        (drag + crosswind) / self.mass + self.gravity()
    }

    // Under a full canopy: vertical canopy drag, the canopy drifting with the wind.
    pub fn descending(&self, velocity: Vector2D, wind_speed: f64) -> Vector2D {
        let vertical = -quadratic_drag(PARACHUTE_DRAG_COEFFICIENT, self.parachute_area, velocity.y);
        let horizontal =
            quadratic_drag(PARACHUTE_DRAG_COEFFICIENT, self.parachute_area, wind_speed - velocity.x);
        Vector2D::new(horizontal, vertical) / self.mass + self.gravity()
    }

    fn gravity(&self) -> Vector2D {
        Vector2D::new(0.0, -GRAVITY)
    }
}

// Tip deflection of one fin, mm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FinDeflection {
    pub millimetres: f64,
    pub saturated: bool,
}

// Fin bending under aerodynamic load, treated as a uniformly loaded cantilever
// clamped at the root.
pub fn fin_deflection(design: &RocketDesign, airspeed: f64, angle_of_attack: f64) -> FinDeflection {
    if airspeed.abs() <= FIN_DEFLECTION_MIN_SPEED || !airspeed.is_finite() {
        return FinDeflection::default();
    }
    let span = design.fin_height() * MM_TO_M;
    let chord = design.fin_base_width() * MM_TO_M;
    let thickness = design.fin_thickness() * MM_TO_M;
    let area = design.fin_planform_area() * MM_TO_M * MM_TO_M;

    let dynamic_pressure = 0.5 * AIR_DENSITY_SEA_LEVEL * airspeed * airspeed;
    let load = dynamic_pressure * area * (FIN_BASE_LOAD_COEFFICIENT + angle_of_attack.sin().abs());
    let second_moment = chord * thickness.powi(3) / 12.0;
    let deflection =
        load * span.powi(3) / (8.0 * design.fin_material().youngs_modulus() * second_moment) / MM_TO_M;

    if !deflection.is_finite() || deflection >= MAX_FIN_DEFLECTION {
        return FinDeflection {
            millimetres: MAX_FIN_DEFLECTION,
            saturated: true,
        };
    }
    FinDeflection {
        millimetres: deflection,
        saturated: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::rocket::DesignParameters;
    use approx::assert_relative_eq;

    fn props() -> AerodynamicProperties {
        AerodynamicProperties::calculate(&RocketDesign::default())
    }

    #[test]
    fn test_rail_blocks_backsliding() {
        let props = props();
        let kinematics = Kinematics::new(&props, 0.05, 0.07);
        let stalled = kinematics.on_rail(Vector2D::ZERO, 0.0, 0.1);
        assert_eq!(stalled, Vector2D::ZERO);

        let climbing = kinematics.on_rail(Vector2D::ZERO, 0.0, 5.0);
        assert_relative_eq!(climbing.y, 5.0 / 0.05 - GRAVITY, epsilon = 1e-9);
        assert_relative_eq!(climbing.x, 0.0);
    }

    #[test]
    fn test_rail_acceleration_follows_rail() {
        let props = props();
        let kinematics = Kinematics::new(&props, 0.05, 0.07);
        let angle = 10.0_f64.to_radians();
        let acceleration = kinematics.on_rail(Vector2D::ZERO, angle, 5.0);
        assert_relative_eq!(acceleration.angle_from_vertical(), angle, epsilon = 1e-12);
    }

    #[test]
    fn test_ballistic_without_wind_is_symmetric() {
        let props = props();
        let kinematics = Kinematics::new(&props, 0.05, 0.07);
        let acceleration = kinematics.ballistic(Vector2D::new(0.0, 20.0), 0.0, 3.0, 0.0);
        assert_eq!(acceleration.x, 0.0);
        assert!(acceleration.y < 3.0 / 0.05 - GRAVITY);
    }

    #[test]
    fn test_crosswind_pushes_downwind() {
        let props = props();
        let kinematics = Kinematics::new(&props, 0.05, 0.07);
        let v = Vector2D::new(0.0, 20.0);
        assert!(kinematics.ballistic(v, 0.0, 0.0, 4.0).x > 0.0);
        assert!(kinematics.ballistic(v, 0.0, 0.0, -4.0).x < 0.0);
        let full = kinematics.ballistic(v, 0.0, 0.0, 4.0).x;
        let half = kinematics.deploying(v, 4.0).x;
        assert_relative_eq!(half, full / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_descent_reaches_terminal_velocity() {
        let props = props();
        let area = 0.07;
        let kinematics = Kinematics::new(&props, 0.05, area);
        let terminal = -(2.0 * 0.05 * GRAVITY / (AIR_DENSITY_SEA_LEVEL * PARACHUTE_DRAG_COEFFICIENT * area)).sqrt();
        let acceleration = kinematics.descending(Vector2D::new(0.0, terminal), 0.0);
        assert_relative_eq!(acceleration.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_mass_floor() {
        let props = props();
        assert_eq!(Kinematics::new(&props, 0.0, 0.07).mass(), MIN_MASS);
        assert_eq!(Kinematics::new(&props, f64::NAN, 0.07).mass(), MIN_MASS);
    }

    #[test]
    fn test_fin_deflection() {
        let design = RocketDesign::default();
        assert_eq!(fin_deflection(&design, 4.0, 0.2), FinDeflection::default());

        let slow = fin_deflection(&design, 20.0, 0.1);
        let fast = fin_deflection(&design, 40.0, 0.1);
        assert!(slow.millimetres > 0.0);
        assert!(fast.millimetres > slow.millimetres);
        assert!(!fast.saturated);
    }

    #[test]
    fn test_fin_deflection_saturates() {
        let flimsy = RocketDesign::try_from(DesignParameters {
            fin_height: 200.0,
            fin_thickness: 0.3,
            ..DesignParameters::default()
        })
        .unwrap();
        let deflection = fin_deflection(&flimsy, 60.0, 0.5);
        assert!(deflection.saturated);
        assert_eq!(deflection.millimetres, MAX_FIN_DEFLECTION);
    }
}
