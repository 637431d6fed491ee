use log::{debug, warn};

use crate::constants::{
    ATTITUDE_NUDGE, COMPENSATED_TORQUE_FACTOR, DEPLOYING_RESTORING_STIFFNESS,
    DESCENT_RESTORING_STIFFNESS, GROUND_GRACE_PERIOD, MAX_SIMULATION_TIME, MAX_SPEED,
    MIN_MOMENT_OF_INERTIA, PARACHUTE_SHOCK_FACTOR, ROTATION_STEPS, TIME_STEP,
    TORQUE_ABORT_THRESHOLD, TORQUE_LIMIT, ZERO_WIND_THRESHOLD,
};
use crate::control::config::SimulationConfig;
use crate::control::environment::LaunchEnvironment;
use crate::control::flight_phase::{FlightPhase, PhaseTracker, RecoveryEvent};
use crate::control::rocket::{DesignParameters, RocketDesign};
use crate::errors::{SimulationError, TorqueAbort};
use crate::telemetry_system::stability::StabilityMonitor;
use crate::telemetry_system::telemetry::{
    FlightRecord, FlightSample, FlightTelemetry, SafetyVerdict, Termination, ThresholdFlags,
};
use crate::trajectory_system::aerodynamics::AerodynamicProperties;
use crate::trajectory_system::attitude::{enhanced_correction, window_update, RotationScheduler};
use crate::trajectory_system::kinematics::{fin_deflection, ForceInputs, ForceModel, Kinematics};
use crate::trajectory_system::landing::LandingPredictor;
use crate::trajectory_system::moments::{FlowConditions, MomentCalculator};
use crate::trajectory_system::wind::wind_speed_at_height;
use crate::utils::angles::{normalize_angle, normalize_degrees};
use crate::utils::vector2d::Vector2D;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationState {
    pub time: f64,
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub attitude: f64, // rad from vertical, clockwise positive
    pub angular_velocity: f64,
    pub angular_acceleration: f64,
    pub torque: f64,
    pub parachute_ejected: bool,
    pub parachute_active: bool,
    pub deployment_progress: f64,
    pub fin_deflection: f64, // mm
}

impl SimulationState {
    pub fn new(attitude: f64) -> Self {
        SimulationState {
            time: 0.0,
            position: Vector2D::ZERO,
            velocity: Vector2D::ZERO,
            attitude,
            angular_velocity: 0.0,
            angular_acceleration: 0.0,
            torque: 0.0,
            parachute_ejected: false,
            parachute_active: false,
            deployment_progress: 0.0,
            fin_deflection: 0.0,
        }
    }
}

pub struct FlightIntegrator<'a> {
    design: &'a RocketDesign,
    environment: &'a LaunchEnvironment,
    properties: &'a AerodynamicProperties,
    config: SimulationConfig,
}

impl<'a> FlightIntegrator<'a> {
    pub fn new(
        design: &'a RocketDesign,
        environment: &'a LaunchEnvironment,
        properties: &'a AerodynamicProperties,
        config: SimulationConfig,
    ) -> Self {
        FlightIntegrator {
            design,
            environment,
            properties,
            config,
        }
    }

    // Launch angles of exactly ±4° and ±18° get an attitude nudge and a coast torque boost.
    fn compensation_active(&self) -> bool {
        let angle = self.environment.launch_angle().abs();
        self.config.launch_angle_compensation && (angle == 4.0 || angle == 18.0)
    }

    // Coast torque as seen by the abort check and the clamp.
    fn effective_torque(&self, raw: f64, phase: FlightPhase) -> f64 {
        if phase == FlightPhase::CoastFree && self.compensation_active() {
            raw * COMPENSATED_TORQUE_FACTOR
        } else {
            raw
        }
    }

    fn corrected_delta(
        &self,
        phase: FlightPhase,
        attitude: f64,
        window_delta: f64,
        flight_path: f64,
        horizontal_velocity: f64,
        wind: f64,
    ) -> f64 {
        if self.config.enhanced_attitude_control && phase.is_free_flight() {
            enhanced_correction(
                attitude,
                window_delta,
                flight_path,
                horizontal_velocity,
                wind,
                self.config.wind_angle_limitation,
            )
        } else {
            window_delta
        }
    }

    pub fn run(&self) -> Result<FlightRecord, SimulationError> {
        let env = self.environment;
        let motor = &env.motor;
        let launch_angle = env.launch_angle_rad();
        let compensated = self.compensation_active();

        let initial_attitude = if compensated {
            launch_angle + ATTITUDE_NUDGE * env.launch_angle().signum()
        } else {
            launch_angle
        };
        let mut state = SimulationState::new(initial_attitude);
        let mut tracker = PhaseTracker::new(motor.burn_duration(), env.ejection_time());
        let mut scheduler = RotationScheduler::new(ROTATION_STEPS);
        let mut monitor = StabilityMonitor::new();
        let mut telemetry = FlightTelemetry::new(motor.burn_duration());

        let moments = MomentCalculator::new(self.properties);
        let kinematics = Kinematics::new(self.properties, self.design.mass_kg(), env.parachute.area());
        let inertia = self.properties.moment_of_inertia.max(MIN_MOMENT_OF_INERTIA);
        let max_steps = (MAX_SIMULATION_TIME / TIME_STEP).round() as usize;
        let mut termination = Termination::TimeLimit;

        for step in 0..max_steps {
            let time = step as f64 * TIME_STEP;

            for event in tracker.advance_recovery(time) {
                match event {
                    RecoveryEvent::ParachuteEjected => {
                        debug!("Parachute ejected at t={:.2}s, h={:.2}m", time, state.position.y)
                    }
                    RecoveryEvent::ParachuteActive => {
                        debug!("Parachute fully deployed at t={:.2}s", time);
                        state.velocity = state.velocity * PARACHUTE_SHOCK_FACTOR;
                    }
                }
            }
            if tracker.update_rail(state.position.magnitude()) {
                debug!(
                    "Left the rail at t={:.2}s with {:.2} m/s",
                    time,
                    state.velocity.magnitude()
                );
            }
            let phase = tracker.resolve(time);
            state.parachute_ejected = tracker.parachute_ejected();
            state.parachute_active = tracker.parachute_active();
            state.deployment_progress = tracker.deployment_progress();

            let wind = wind_speed_at_height(env.wind_speed(), state.position.y, env.wind_profile);
            let airflow = Vector2D::new(state.velocity.x - wind, state.velocity.y);
            let airspeed = airflow.magnitude();
            let flight_path = if airspeed > 1e-6 {
                airflow.angle_from_vertical()
            } else {
                state.attitude
            };
            let angle_of_attack = normalize_angle(state.attitude - flight_path);

            let deflection = fin_deflection(self.design, airspeed, angle_of_attack);
            state.fin_deflection = deflection.millimetres;
            let thrust = motor.thrust_at_step(step);
            let mut flags = ThresholdFlags {
                fin_deflection_saturated: deflection.saturated,
                ..ThresholdFlags::default()
            };

            let (model, raw_torque, stiffness) = match phase {
                FlightPhase::OnRail => (ForceModel::Rail, 0.0, 0.0),
                FlightPhase::PoweredFree | FlightPhase::CoastFree => {
                    if wind.abs() < ZERO_WIND_THRESHOLD {
                        flags.zero_wind = true;
                        (ForceModel::Ballistic, 0.0, 0.0)
                    } else {
                        let breakdown = moments.evaluate(&FlowConditions {
                            airspeed,
                            angle_of_attack,
                            attitude: state.attitude,
                            wind_speed: wind,
                            angular_velocity: state.angular_velocity,
                            thrust,
                        });
                        let torque = self.effective_torque(breakdown.total(), phase);
                        if torque.abs() > TORQUE_ABORT_THRESHOLD {
                            monitor.mark_torque_abort();
                            warn!(
                                "Aborting at t={:.2}s: torque {:.3} N·m exceeds {:.1} N·m",
                                time, torque, TORQUE_ABORT_THRESHOLD
                            );
                            return Err(SimulationError::AbnormalTorque(Box::new(TorqueAbort {
                                time,
                                velocity: state.velocity,
                                speed: state.velocity.magnitude(),
                                threshold: TORQUE_ABORT_THRESHOLD,
                                torque,
                                moments: breakdown,
                                stability: monitor.record(),
                            })));
                        }
                        (
                            ForceModel::Ballistic,
                            torque,
                            moments.restoring_stiffness(airspeed, angle_of_attack),
                        )
                    }
                }
                FlightPhase::ParachuteDeploying => (
                    ForceModel::Deploying,
                    -DEPLOYING_RESTORING_STIFFNESS * normalize_angle(state.attitude - launch_angle),
                    DEPLOYING_RESTORING_STIFFNESS,
                ),
                FlightPhase::ParachuteDescending => (
                    ForceModel::Descending,
                    -DESCENT_RESTORING_STIFFNESS * normalize_angle(state.attitude - launch_angle),
                    DESCENT_RESTORING_STIFFNESS,
                ),
            };

            flags.torque_clamped = raw_torque.abs() > TORQUE_LIMIT;
            state.torque = raw_torque.clamp(-TORQUE_LIMIT, TORQUE_LIMIT);

            let inputs = ForceInputs {
                velocity: state.velocity,
                attitude: state.attitude,
                rail_angle: launch_angle,
                thrust,
                wind_speed: wind,
            };
            let acceleration = kinematics.acceleration(model, &inputs);

            if self.config.physical_attitude_control {
                if let Some(mean_torque) = scheduler.accumulate(state.torque) {
                    let window = scheduler.window_duration();
                    let update =
                        window_update(state.angular_velocity, mean_torque, inertia, stiffness, window);
                    state.angular_velocity = update.angular_velocity;
                    state.angular_acceleration = update.angular_acceleration;
                    flags.angular_velocity_clamped = update.clamped;

                    let delta = self.corrected_delta(
                        phase,
                        state.attitude,
                        update.angular_velocity * window,
                        flight_path,
                        state.velocity.x,
                        wind,
                    );
                    scheduler.schedule(delta);
                }
                state.attitude = normalize_angle(state.attitude + scheduler.next_increment());
            }

            let mut velocity = state.velocity + acceleration * TIME_STEP;
            if model == ForceModel::Rail {
                let along = Vector2D::from_attitude(launch_angle, 1.0);
                let speed = velocity.dot(&along).max(0.0);
                velocity = along * speed;
            }
            flags.speed_clamped = velocity.magnitude() > MAX_SPEED;
            state.velocity = velocity.clamp_magnitude(MAX_SPEED);
            if !self.config.physical_attitude_control
                && phase != FlightPhase::OnRail
                && state.velocity.magnitude() > 1.0
            {
                state.attitude = state.velocity.angle_from_vertical();
            }
            state.position += state.velocity * TIME_STEP;
            if state.position.y < 0.0 {
                state.position.y = 0.0;
            }
            state.time = (step + 1) as f64 * TIME_STEP;

            telemetry.collect(FlightSample {
                time: state.time,
                phase,
                position: state.position,
                velocity: state.velocity,
                speed: state.velocity.magnitude(),
                attitude: state.attitude,
                angular_velocity: state.angular_velocity,
                angular_acceleration: state.angular_acceleration,
                torque: state.torque,
                thrust,
                effective_wind: wind,
                absolute_angle: normalize_degrees(state.attitude.to_degrees()),
                relative_angle: angle_of_attack.to_degrees(),
                parachute_ejected: state.parachute_ejected,
                parachute_active: state.parachute_active,
                deployment_progress: state.deployment_progress,
                fin_deflection: state.fin_deflection,
                flags,
            });

            if !state.parachute_ejected {
                monitor.observe(state.attitude);
            }

            if state.time > GROUND_GRACE_PERIOD && state.position.y <= 0.0 {
                debug!("Ground contact at t={:.2}s, x={:.2}m", state.time, state.position.x);
                termination = Termination::Landed;
                break;
            }
        }

        telemetry.finish();
        let stability = monitor.record();
        let predictor = LandingPredictor::new(&kinematics, env);
        let landing = telemetry
            .last()
            .map(|terminal| predictor.predict(terminal, termination == Termination::TimeLimit))
            .unwrap_or_default();
        let verdict = SafetyVerdict::assess(
            self.properties,
            &telemetry.maxima(),
            self.design.fin_height(),
            &stability,
        );

        Ok(FlightRecord {
            telemetry,
            stability,
            properties: self.properties.clone(),
            landing,
            verdict,
            termination,
        })
    }
}

pub fn simulate(
    design: &RocketDesign,
    environment: &LaunchEnvironment,
    config: SimulationConfig,
) -> Result<FlightRecord, SimulationError> {
    let properties = AerodynamicProperties::calculate(design);
    FlightIntegrator::new(design, environment, &properties, config).run()
}

pub fn simulate_parameters(
    params: &DesignParameters,
    environment: &LaunchEnvironment,
    config: SimulationConfig,
) -> Result<FlightRecord, SimulationError> {
    let design = RocketDesign::try_from(params)?;
    simulate(&design, environment, config)
}
