use approx::assert_abs_diff_eq;
use model_rocket_simulation::{
    errors::SimulationError,
    trajectory_system::kinematics::Kinematics,
    telemetry_system::telemetry::Termination,
    AerodynamicProperties, DesignParameters, DispersionSettings, FinMaterial, FlightPhase,
    LandingPredictor, LaunchEnvironment, Motor, NoseShape, Parachute, RocketDesign,
    SimulationConfig, WindProfile, MAX_SIMULATION_TIME, MAX_SPEED, TIME_STEP,
};

// Helper function to build a launch environment with the default A8-3 motor
fn create_environment(angle: f64, wind: f64, profile: WindProfile) -> LaunchEnvironment {
    LaunchEnvironment::new(angle, wind, profile, Motor::default(), Parachute::Small).unwrap()
}

// Oversized fins on a long body, flown on a C6 in strong uniform wind
fn oversized_fin_design() -> RocketDesign {
    let params = DesignParameters {
        nose_shape: NoseShape::Cone,
        nose_height: 100.0,
        body_height: 600.0,
        body_width: 40.0,
        fin_height: 300.0,
        fin_base_width: 250.0,
        fin_tip_width: 150.0,
        fin_thickness: 3.0,
        fin_sweep: 5.0,
        fin_count: 4,
        fin_material: FinMaterial::Balsa,
        weight: 120.0,
        center_of_gravity: 150.0,
    };
    RocketDesign::try_from(params).unwrap()
}

#[test]
fn test_symmetric_calm_flight() {
    let design = RocketDesign::default();
    let env = create_environment(0.0, 0.0, WindProfile::Grassland);
    let record = model_rocket_simulation::simulate(&design, &env, SimulationConfig::default()).unwrap();

    assert!(record.max_height() > 0.0);
    for sample in record.samples() {
        assert_abs_diff_eq!(sample.position.x, 0.0, epsilon = 1e-9);
    }
    assert_abs_diff_eq!(record.landing.landing_x, 0.0, epsilon = 1e-9);
    assert!(record.stability.is_stable);
}

#[test]
fn test_abnormal_torque_aborts_before_time_limit() {
    let design = oversized_fin_design();
    let motor: Motor = "C6-5".parse().unwrap();
    let env = LaunchEnvironment::new(0.0, 8.0, WindProfile::Uniform, motor, Parachute::Small).unwrap();

    match model_rocket_simulation::simulate(&design, &env, SimulationConfig::default()) {
        Err(SimulationError::AbnormalTorque(abort)) => {
            assert!(abort.time < MAX_SIMULATION_TIME);
            assert!(abort.torque.abs() > abort.threshold);
            assert!(!abort.stability.torque_ok);
            assert!(!abort.stability.is_stable);
            assert_abs_diff_eq!(abort.moments.total(), abort.torque, epsilon = 1e-9);
        }
        other => panic!("expected a torque abort, got {:?}", other.map(|r| r.termination)),
    }
}

#[test]
fn test_termination_bounds() {
    let design = RocketDesign::default();
    for (angle, wind) in [(0.0, 0.0), (10.0, 3.0), (-15.0, -5.0), (4.0, 2.0)] {
        let env = create_environment(angle, wind, WindProfile::Suburban);
        let record = model_rocket_simulation::simulate(&design, &env, SimulationConfig::default()).unwrap();
        let last = record.samples().last().unwrap();
        assert!(last.time < MAX_SIMULATION_TIME + TIME_STEP);
        assert!(last.position.y >= 0.0);
        match record.termination {
            Termination::Landed => assert!(!record.landing.is_predicted),
            Termination::TimeLimit => assert!(record.landing.is_predicted),
        }
    }
}

#[test]
fn test_outputs_stay_clamped() {
    let design = RocketDesign::default();
    let env = create_environment(-20.0, 6.0, WindProfile::Uniform);
    let record = model_rocket_simulation::simulate(&design, &env, SimulationConfig::default()).unwrap();

    for sample in record.samples() {
        assert!(sample.torque.abs() <= 1.0);
        assert!(sample.angular_velocity.abs() <= 5.0);
        assert!(sample.speed <= MAX_SPEED + 1e-9);
        assert!(sample.absolute_angle.abs() <= 180.0 + 1e-9);
    }
    let props = &record.properties;
    assert!((20.0..=300.0).contains(&props.divergence_speed));
    assert!((30.0..=400.0).contains(&props.flutter_speed));
}

#[test]
fn test_landing_prediction_is_reproducible() {
    let design = RocketDesign::default();
    let env = create_environment(5.0, 2.0, WindProfile::Grassland);
    let record = model_rocket_simulation::simulate(&design, &env, SimulationConfig::default()).unwrap();

    let props = AerodynamicProperties::calculate(&design);
    let kinematics = Kinematics::new(&props, design.mass_kg(), env.parachute.area());
    let predictor = LandingPredictor::new(&kinematics, &env);
    let terminal = record.samples().last().unwrap();
    let hit_cap = record.termination == Termination::TimeLimit;

    let first = predictor.predict(terminal, hit_cap);
    let second = predictor.predict(terminal, hit_cap);
    assert_eq!(first, second);
    assert_eq!(first, record.landing);

    let mut grounded = *terminal;
    grounded.position.y = 0.0;
    let on_ground = predictor.predict(&grounded, hit_cap);
    assert!(!on_ground.is_predicted);
    assert_eq!(on_ground.time_to_landing, 0.0);
    assert_eq!(on_ground.landing_x, grounded.position.x);
}

#[test]
fn test_downwind_drift() {
    let design = RocketDesign::default();
    let env = create_environment(0.0, 3.0, WindProfile::Grassland);
    let record = model_rocket_simulation::simulate(&design, &env, SimulationConfig::default()).unwrap();

    assert!(record.max_height() > 10.0);
    assert!(record.landing.landing_x > 0.0);
    assert!(record.landing.total_flight_time > record.samples().last().unwrap().time - 1e-9);

    let key_points = record.key_points();
    let apogee = key_points.max_height.unwrap();
    let ejection = key_points.parachute_ejection.unwrap();
    assert!(key_points.thrust_end.unwrap().time <= apogee.time);
    assert!(ejection.phase >= FlightPhase::CoastFree);
}

#[test]
fn test_design_from_json() {
    let json = r#"{
        "nose_shape": "ogive",
        "nose_height": 70.0,
        "body_height": 300.0,
        "body_width": 33.0,
        "fin_height": 60.0,
        "fin_base_width": 55.0,
        "fin_tip_width": 25.0,
        "fin_thickness": 2.5,
        "fin_sweep": 15.0,
        "fin_count": 4,
        "fin_material": "plywood",
        "weight": 65.0,
        "center_of_gravity": 180.0
    }"#;
    let params: DesignParameters = serde_json::from_str(json).unwrap();
    let design = RocketDesign::try_from(&params).unwrap();
    assert_eq!(design.nose_shape(), NoseShape::Ogive);
    assert_eq!(design.fin_material(), FinMaterial::Plywood);

    let env = create_environment(0.0, 0.0, WindProfile::Uniform);
    let record = model_rocket_simulation::simulate(&design, &env, SimulationConfig::default()).unwrap();
    assert!(record.max_height() > 0.0);
}

#[test]
fn test_invalid_design_yields_zeroed_properties() {
    let params = DesignParameters {
        fin_count: 5,
        ..DesignParameters::default()
    };
    assert_eq!(AerodynamicProperties::from_parameters(&params), AerodynamicProperties::default());

    let env = create_environment(0.0, 0.0, WindProfile::Uniform);
    let result =
        model_rocket_simulation::simulate_parameters(&params, &env, SimulationConfig::default());
    assert!(matches!(result, Err(SimulationError::InvalidInput(_))));
}

#[test]
fn test_dispersion_is_seeded() {
    let design = RocketDesign::default();
    let env = create_environment(0.0, 2.0, WindProfile::Grassland);
    let settings = DispersionSettings {
        runs: 6,
        wind_spread: 1.0,
        angle_spread: 2.0,
        seed: 11,
    };
    let first =
        model_rocket_simulation::run_dispersion(&design, &env, SimulationConfig::default(), &settings)
            .unwrap();
    let second =
        model_rocket_simulation::run_dispersion(&design, &env, SimulationConfig::default(), &settings)
            .unwrap();
    assert_eq!(first, second);
    assert_eq!(first.completed + first.aborted, 6);
    assert!(first.min_landing_x <= first.mean_landing_x);
    assert!(first.mean_landing_x <= first.max_landing_x);
}
