use std::fmt;

use log::debug;
use serde::Serialize;

use crate::constants::{APOGEE_CONFIRMATION_DROP, FIN_DEFLECTION_SPAN_RATIO, MAX_FIN_DEFLECTION};
use crate::control::flight_phase::FlightPhase;
use crate::telemetry_system::stability::StabilityRecord;
use crate::trajectory_system::aerodynamics::AerodynamicProperties;
use crate::trajectory_system::landing::LandingPrediction;
use crate::utils::vector2d::Vector2D;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ThresholdFlags {
    pub zero_wind: bool,
    pub speed_clamped: bool,
    pub torque_clamped: bool,
    pub angular_velocity_clamped: bool,
    pub fin_deflection_saturated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlightSample {
    pub time: f64,
    pub phase: FlightPhase,
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub speed: f64,
    pub attitude: f64, // rad
    pub angular_velocity: f64,
    pub angular_acceleration: f64,
    pub torque: f64, // N·m after clamping
    pub thrust: f64,
    pub effective_wind: f64,
    pub absolute_angle: f64, // deg, [-180, 180]
    pub relative_angle: f64, // deg, angle of attack
    pub parachute_ejected: bool,
    pub parachute_active: bool,
    pub deployment_progress: f64,
    pub fin_deflection: f64, // mm
    pub flags: ThresholdFlags,
}

impl FlightSample {
    pub fn height(&self) -> f64 {
        self.position.y
    }

    pub fn fin_deflection_label(&self) -> String {
        if self.flags.fin_deflection_saturated {
            format!("{:.0}mm+", MAX_FIN_DEFLECTION)
        } else {
            format!("{:.2}mm", self.fin_deflection)
        }
    }
}

// Notable moments of a flight. Each slot is filled once; later writes are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeyPoints {
    pub thrust_end: Option<FlightSample>,
    pub precursor_max_height: Option<FlightSample>,
    pub max_height: Option<FlightSample>,
    pub parachute_ejection: Option<FlightSample>,
    pub parachute_active: Option<FlightSample>,
}

fn set_once(slot: &mut Option<FlightSample>, sample: &FlightSample, name: &str) {
    if slot.is_none() {
        debug!("{} at t={:.2}s, h={:.2}m", name, sample.time, sample.height());
        *slot = Some(*sample);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FlightMaxima {
    pub height: f64,
    pub speed: f64,
    pub horizontal_distance: f64,
    pub fin_deflection: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlightTelemetry {
    samples: Vec<FlightSample>,
    maxima: FlightMaxima,
    key_points: KeyPoints,
    phase_times: Vec<(FlightPhase, f64)>,
    burn_duration: f64,
    #[serde(skip)]
    apogee_candidate: Option<FlightSample>,
}

impl FlightTelemetry {
    pub fn new(burn_duration: f64) -> Self {
        FlightTelemetry {
            samples: Vec::new(),
            maxima: FlightMaxima::default(),
            key_points: KeyPoints::default(),
            phase_times: Vec::new(),
            burn_duration,
            apogee_candidate: None,
        }
    }

    fn format_time(elapsed_time: f64) -> String {
        if elapsed_time >= 60.0 {
            let minutes = (elapsed_time / 60.0).floor();
            let seconds = elapsed_time % 60.0;
            format!("{:.0}m {:.2}s", minutes, seconds)
        } else {
            format!("{:.2}s", elapsed_time)
        }
    }

    fn format_altitude(altitude: f64) -> String {
        if altitude >= 1000.0 {
            format!("{:.2} km", altitude / 1000.0)
        } else {
            format!("{:.2} m", altitude)
        }
    }

    pub fn collect(&mut self, sample: FlightSample) {
        self.maxima.height = self.maxima.height.max(sample.height());
        self.maxima.speed = self.maxima.speed.max(sample.speed);
        self.maxima.horizontal_distance = self.maxima.horizontal_distance.max(sample.position.x.abs());
        self.maxima.fin_deflection = self.maxima.fin_deflection.max(sample.fin_deflection);

        if self.phase_times.last().map(|(phase, _)| *phase) != Some(sample.phase) {
            debug!("Phase {:?} reached at t={:.2}s", sample.phase, sample.time);
            self.phase_times.push((sample.phase, sample.time));
        }

        if sample.time >= self.burn_duration {
            set_once(&mut self.key_points.thrust_end, &sample, "Thrust end");
        }
        if sample.velocity.y <= 0.0 && sample.time > self.burn_duration {
            set_once(&mut self.key_points.precursor_max_height, &sample, "Apogee candidate");
        }
        self.track_apogee(&sample);
        if sample.parachute_ejected {
            set_once(&mut self.key_points.parachute_ejection, &sample, "Parachute ejection");
        }
        if sample.parachute_active {
            set_once(&mut self.key_points.parachute_active, &sample, "Parachute active");
        }

        self.samples.push(sample);
    }

    // The apogee is confirmed once the rocket has dropped a metre below its best height.
    fn track_apogee(&mut self, sample: &FlightSample) {
        match self.apogee_candidate {
            Some(best) if sample.height() <= best.height() => {
                if sample.height() < best.height() - APOGEE_CONFIRMATION_DROP {
                    set_once(&mut self.key_points.max_height, &best, "Max height");
                }
            }
            _ => self.apogee_candidate = Some(*sample),
        }
    }

    // Settles key points still open when the run ends.
    pub fn finish(&mut self) {
        if let Some(best) = self.apogee_candidate {
            set_once(&mut self.key_points.max_height, &best, "Max height");
        }
    }

    pub fn samples(&self) -> &[FlightSample] {
        &self.samples
    }

    pub fn last(&self) -> Option<&FlightSample> {
        self.samples.last()
    }

    pub fn maxima(&self) -> FlightMaxima {
        self.maxima
    }

    pub fn key_points(&self) -> &KeyPoints {
        &self.key_points
    }

    pub fn phase_times(&self) -> &[(FlightPhase, f64)] {
        &self.phase_times
    }
}

impl fmt::Display for FlightTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Flight Summary ---")?;
        writeln!(f, "Samples: {}", self.samples.len())?;
        writeln!(f, "Max Height: {}", Self::format_altitude(self.maxima.height))?;
        writeln!(f, "Max Speed: {:.2} m/s", self.maxima.speed)?;
        writeln!(
            f,
            "Max Horizontal Distance: {}",
            Self::format_altitude(self.maxima.horizontal_distance)
        )?;
        writeln!(f, "Max Fin Deflection: {:.2} mm", self.maxima.fin_deflection)?;

        writeln!(f, "\n--- Phase Transitions ---")?;
        for (phase, time) in &self.phase_times {
            writeln!(f, "Phase {:?} reached at: {}", phase, Self::format_time(*time))?;
        }

        writeln!(f, "\n--- Key Points ---")?;
        let points = [
            ("Thrust end", &self.key_points.thrust_end),
            ("Max height", &self.key_points.max_height),
            ("Parachute ejection", &self.key_points.parachute_ejection),
            ("Parachute active", &self.key_points.parachute_active),
        ];
        for (name, point) in points {
            if let Some(sample) = point {
                writeln!(
                    f,
                    "{}: {} at {}",
                    name,
                    Self::format_time(sample.time),
                    Self::format_altitude(sample.height())
                )?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SafetyVerdict {
    pub divergence_ok: bool,
    pub flutter_ok: bool,
    pub deflection_ok: bool,
    pub deflection_limit: f64, // mm
    pub stability_ok: bool,
    pub is_safe: bool,
}

impl SafetyVerdict {
    pub fn assess(
        props: &AerodynamicProperties,
        maxima: &FlightMaxima,
        fin_span: f64,
        stability: &StabilityRecord,
    ) -> Self {
        let deflection_limit = fin_span * FIN_DEFLECTION_SPAN_RATIO;
        let divergence_ok = maxima.speed < props.divergence_speed;
        let flutter_ok = maxima.speed < props.flutter_speed;
        let deflection_ok = maxima.fin_deflection <= deflection_limit;
        SafetyVerdict {
            divergence_ok,
            flutter_ok,
            deflection_ok,
            deflection_limit,
            stability_ok: stability.is_stable,
            is_safe: divergence_ok && flutter_ok && deflection_ok && stability.is_stable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Termination {
    Landed,
    TimeLimit,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlightRecord {
    pub telemetry: FlightTelemetry,
    pub stability: StabilityRecord,
    pub properties: AerodynamicProperties,
    pub landing: LandingPrediction,
    pub verdict: SafetyVerdict,
    pub termination: Termination,
}

impl FlightRecord {
    pub fn samples(&self) -> &[FlightSample] {
        self.telemetry.samples()
    }

    pub fn key_points(&self) -> &KeyPoints {
        self.telemetry.key_points()
    }

    pub fn max_height(&self) -> f64 {
        self.telemetry.maxima().height
    }
}
