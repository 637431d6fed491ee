use std::fmt;

use log::warn;
use serde::Serialize;

use crate::constants::{
    AIR_DENSITY_SEA_LEVEL, MOMENT_WIND_CAP, MOTOR_MISALIGNMENT_FACTOR,
    PITCH_DAMPING_COEFFICIENT, STIFFNESS_ATTITUDE_FLOOR, THRUST_MOMENT_FLOOR,
    VELOCITY_SQUARED_CAP,
};
use crate::errors::MomentFault;
use crate::trajectory_system::aerodynamics::AerodynamicProperties;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MomentKind {
    Lift,
    Drag,
    Wind,
    Fin,
    Thrust,
    Damping,
}

impl fmt::Display for MomentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MomentKind::Lift => "lift",
            MomentKind::Drag => "drag",
            MomentKind::Wind => "wind",
            MomentKind::Fin => "fin",
            MomentKind::Thrust => "thrust",
            MomentKind::Damping => "damping",
        };
        write!(f, "{}", name)
    }
}

// Signed contributions in N·m, positive clockwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MomentBreakdown {
    pub lift: f64,
    pub drag: f64,
    pub wind: f64,
    pub fin: f64,
    pub thrust: f64,
    pub damping: f64,
}

impl MomentBreakdown {
    pub fn total(&self) -> f64 {
        self.lift + self.drag + self.wind + self.fin + self.thrust + self.damping
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowConditions {
    pub airspeed: f64,         // m/s, relative to the air
    pub angle_of_attack: f64,  // rad, attitude minus relative flight path
    pub attitude: f64,         // rad from vertical
    pub wind_speed: f64,       // m/s at the current height
    pub angular_velocity: f64, // rad/s
    pub thrust: f64,           // N
}

// Gives `magnitude` a direction. A centre behind the CG opposes the disturbance,
// a centre ahead of it follows the disturbance.
fn signed(magnitude: f64, center: f64, center_of_gravity: f64, disturbance: f64) -> f64 {
    if magnitude == 0.0 || disturbance == 0.0 {
        return 0.0;
    }
    if center > center_of_gravity {
        -disturbance.signum() * magnitude
    } else {
        disturbance.signum() * magnitude
    }
}

fn checked(kind: MomentKind, value: f64) -> Result<f64, MomentFault> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MomentFault::NonFinite { kind })
    }
}

fn dynamic_pressure(speed: f64) -> f64 {
    0.5 * AIR_DENSITY_SEA_LEVEL * (speed * speed).min(VELOCITY_SQUARED_CAP)
}

pub struct MomentCalculator<'a> {
    props: &'a AerodynamicProperties,
}

impl<'a> MomentCalculator<'a> {
    pub fn new(props: &'a AerodynamicProperties) -> Self {
        MomentCalculator { props }
    }

    // Body normal force acting at the aerodynamic centre.
    pub fn lift(&self, speed: f64, angle_of_attack: f64) -> Result<f64, MomentFault> {
        let p = self.props;
        let magnitude = dynamic_pressure(speed)
            * p.reference_area
            * p.normal_force_slope
            * angle_of_attack.sin().abs()
            * (p.aerodynamic_center - p.center_of_gravity).abs();
        checked(
            MomentKind::Lift,
            signed(magnitude, p.aerodynamic_center, p.center_of_gravity, angle_of_attack),
        )
    }

    // Cross-flow drag acting at the centre of pressure.
    pub fn drag(&self, speed: f64, angle_of_attack: f64) -> Result<f64, MomentFault> {
        let p = self.props;
        let magnitude = dynamic_pressure(speed)
            * p.drag_coefficient
            * p.frontal_area
            * angle_of_attack.sin().abs()
            * (p.center_of_pressure - p.center_of_gravity).abs();
        checked(
            MomentKind::Drag,
            signed(magnitude, p.center_of_pressure, p.center_of_gravity, angle_of_attack),
        )
    }

    pub fn wind(&self, wind_speed: f64, attitude: f64) -> Result<f64, MomentFault> {
        let p = self.props;
        let wind = wind_speed.clamp(-MOMENT_WIND_CAP, MOMENT_WIND_CAP);
        let magnitude = 0.5
            * AIR_DENSITY_SEA_LEVEL
            * wind
            * wind
            * p.side_area
            * (p.center_of_pressure - p.center_of_gravity).abs()
            * attitude.cos().abs();
        checked(
            MomentKind::Wind,
            signed(magnitude, p.center_of_pressure, p.center_of_gravity, wind),
        )
    }

    pub fn fin(&self, speed: f64, angle_of_attack: f64) -> Result<f64, MomentFault> {
        let p = self.props;
        let magnitude = dynamic_pressure(speed)
            * p.fin_lift_slope
            * p.effective_fin_area
            * angle_of_attack.sin().abs()
            * (p.fin_center_of_pressure - p.center_of_gravity).abs();
        checked(
            MomentKind::Fin,
            signed(magnitude, p.fin_center_of_pressure, p.center_of_gravity, angle_of_attack),
        )
    }

    // Misalignment torque of a burning motor. Never exactly zero while thrust is on.
    pub fn thrust(&self, thrust: f64, angle_of_attack: f64) -> Result<f64, MomentFault> {
        if thrust <= 0.0 {
            return Ok(0.0);
        }
        let p = self.props;
        let arm = (p.total_length - p.center_of_gravity).abs();
        let magnitude = (thrust * arm * angle_of_attack.sin().abs() * MOTOR_MISALIGNMENT_FACTOR)
            .max(THRUST_MOMENT_FLOOR);
        let direction = if angle_of_attack < 0.0 { -1.0 } else { 1.0 };
        checked(MomentKind::Thrust, direction * magnitude)
    }

    pub fn damping(&self, speed: f64, angular_velocity: f64) -> Result<f64, MomentFault> {
        checked(
            MomentKind::Damping,
            -self.damping_coefficient(speed) * angular_velocity,
        )
    }

    // Pitch damping in N·m·s/rad from the fins sweeping through the air.
    pub fn damping_coefficient(&self, speed: f64) -> f64 {
        let p = self.props;
        let arm = p.fin_center_of_pressure - p.center_of_gravity;
        0.5 * AIR_DENSITY_SEA_LEVEL
            * speed.abs().min(VELOCITY_SQUARED_CAP.sqrt())
            * p.effective_fin_area
            * arm
            * arm
            * PITCH_DAMPING_COEFFICIENT
    }

    // Magnitude of the aerodynamic spring rate in N·m/rad at this flow.
    pub fn restoring_stiffness(&self, speed: f64, angle_of_attack: f64) -> f64 {
        let p = self.props;
        let arms = p.reference_area
            * p.normal_force_slope
            * (p.aerodynamic_center - p.center_of_gravity).abs()
            + p.drag_coefficient * p.frontal_area * (p.center_of_pressure - p.center_of_gravity).abs()
            + p.fin_lift_slope
                * p.effective_fin_area
                * (p.fin_center_of_pressure - p.center_of_gravity).abs();
        let stiffness = dynamic_pressure(speed)
            * arms
            * angle_of_attack.cos().max(STIFFNESS_ATTITUDE_FLOOR);
        if stiffness.is_finite() {
            stiffness.max(0.0)
        } else {
            0.0
        }
    }

    // Evaluates every contribution. A faulted moment is logged and counted as zero.
    pub fn evaluate(&self, flow: &FlowConditions) -> MomentBreakdown {
        MomentBreakdown {
            lift: neutral(self.lift(flow.airspeed, flow.angle_of_attack)),
            drag: neutral(self.drag(flow.airspeed, flow.angle_of_attack)),
            wind: neutral(self.wind(flow.wind_speed, flow.attitude)),
            fin: neutral(self.fin(flow.airspeed, flow.angle_of_attack)),
            thrust: neutral(self.thrust(flow.thrust, flow.angle_of_attack)),
            damping: neutral(self.damping(flow.airspeed, flow.angular_velocity)),
        }
    }
}

fn neutral(result: Result<f64, MomentFault>) -> f64 {
    result.unwrap_or_else(|fault| {
        warn!("{}, using 0", fault);
        0.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::rocket::RocketDesign;
    use approx::assert_relative_eq;

    fn default_props() -> AerodynamicProperties {
        AerodynamicProperties::calculate(&RocketDesign::default())
    }

    #[test]
    fn test_sign_rule() {
        assert_eq!(signed(2.0, 0.3, 0.1, 0.5), -2.0);
        assert_eq!(signed(2.0, 0.3, 0.1, -0.5), 2.0);
        assert_eq!(signed(2.0, 0.05, 0.1, 0.5), 2.0);
        assert_eq!(signed(2.0, 0.3, 0.1, 0.0), 0.0);
        assert_eq!(signed(0.0, 0.3, 0.1, 1.0), 0.0);
    }

    #[test]
    fn test_stable_design_restores_angle_of_attack() {
        let props = default_props();
        let calc = MomentCalculator::new(&props);
        assert!(calc.lift(30.0, 0.1).unwrap() < 0.0);
        assert!(calc.lift(30.0, -0.1).unwrap() > 0.0);
        assert!(calc.fin(30.0, 0.1).unwrap() < 0.0);
        assert!(calc.drag(30.0, 0.1).unwrap() < 0.0);
        assert_eq!(calc.lift(30.0, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_wind_turns_nose_upwind() {
        let props = default_props();
        let calc = MomentCalculator::new(&props);
        // Wind toward +x pushes the tail downwind, turning the nose toward -x.
        assert!(calc.wind(5.0, 0.0).unwrap() < 0.0);
        assert!(calc.wind(-5.0, 0.0).unwrap() > 0.0);
    }

    #[test]
    fn test_inputs_are_capped() {
        let props = default_props();
        let calc = MomentCalculator::new(&props);
        assert_relative_eq!(
            calc.lift(100.0, 0.2).unwrap(),
            calc.lift(1e6, 0.2).unwrap(),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            calc.wind(25.0, 0.0).unwrap(),
            calc.wind(1e9, 0.0).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_non_finite_inputs_fault() {
        let props = default_props();
        let calc = MomentCalculator::new(&props);
        assert_eq!(
            calc.lift(10.0, f64::NAN),
            Err(MomentFault::NonFinite {
                kind: MomentKind::Lift
            })
        );
        let flow = FlowConditions {
            airspeed: 10.0,
            angle_of_attack: f64::NAN,
            attitude: 0.0,
            wind_speed: 3.0,
            angular_velocity: 0.0,
            thrust: 0.0,
        };
        let breakdown = calc.evaluate(&flow);
        assert_eq!(breakdown.lift, 0.0);
        assert_eq!(breakdown.fin, 0.0);
        assert!(breakdown.wind < 0.0);
        assert!(breakdown.total().is_finite());
    }

    #[test]
    fn test_thrust_moment_floor() {
        let props = default_props();
        let calc = MomentCalculator::new(&props);
        assert_eq!(calc.thrust(0.0, 0.3).unwrap(), 0.0);
        assert_relative_eq!(calc.thrust(5.0, 0.0).unwrap(), THRUST_MOMENT_FLOOR);
        assert!(calc.thrust(5.0, -0.2).unwrap() < 0.0);
    }

    #[test]
    fn test_damping_opposes_rotation() {
        let props = default_props();
        let calc = MomentCalculator::new(&props);
        assert!(calc.damping(20.0, 1.0).unwrap() < 0.0);
        assert!(calc.damping(20.0, -1.0).unwrap() > 0.0);
        assert_eq!(calc.damping(20.0, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_restoring_stiffness_is_non_negative() {
        let props = default_props();
        let calc = MomentCalculator::new(&props);
        assert_eq!(calc.restoring_stiffness(0.0, 0.0), 0.0);
        assert!(calc.restoring_stiffness(30.0, 0.1) > 0.0);
        // Sideways flow still keeps a floor of stiffness.
        assert!(calc.restoring_stiffness(30.0, std::f64::consts::FRAC_PI_2) > 0.0);
        assert_eq!(AerodynamicProperties::default().reference_area, 0.0);
        let zero = AerodynamicProperties::default();
        assert_eq!(MomentCalculator::new(&zero).restoring_stiffness(30.0, 0.0), 0.0);
    }
}
