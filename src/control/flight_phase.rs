use serde::Serialize;

use crate::constants::{LAUNCH_RAIL_LENGTH, PARACHUTE_DEPLOY_DURATION};

// Flight phases in the order a run passes through them. A run may skip phases but never goes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FlightPhase {
    OnRail,
    PoweredFree,
    CoastFree,
    ParachuteDeploying,
    ParachuteDescending,
}

impl FlightPhase {
    pub fn is_free_flight(&self) -> bool {
        matches!(self, FlightPhase::PoweredFree | FlightPhase::CoastFree)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryEvent {
    ParachuteEjected,
    ParachuteActive,
}

#[derive(Debug, Clone)]
pub struct PhaseTracker {
    ejection_time: f64,
    burn_duration: f64,
    left_rail: bool,
    ejected_at: Option<f64>,
    parachute_active: bool,
    deployment_progress: f64,
    phase: FlightPhase,
}

impl PhaseTracker {
    pub fn new(burn_duration: f64, ejection_time: f64) -> Self {
        PhaseTracker {
            ejection_time,
            burn_duration,
            left_rail: false,
            ejected_at: None,
            parachute_active: false,
            deployment_progress: 0.0,
            phase: FlightPhase::OnRail,
        }
    }

    pub fn advance_recovery(&mut self, time: f64) -> Vec<RecoveryEvent> {
        let mut events = Vec::new();

        if self.ejected_at.is_none() && time >= self.ejection_time {
            self.ejected_at = Some(time);
            events.push(RecoveryEvent::ParachuteEjected);
        }

        if let Some(ejected_at) = self.ejected_at {
            if !self.parachute_active {
                self.deployment_progress =
                    ((time - ejected_at) / PARACHUTE_DEPLOY_DURATION).clamp(0.0, 1.0);
                if self.deployment_progress >= 1.0 {
                    self.parachute_active = true;
                    events.push(RecoveryEvent::ParachuteActive);
                }
            }
        }

        events
    }

    // Latches the rail exit; true only on the step the rocket leaves it.
    pub fn update_rail(&mut self, distance: f64) -> bool {
        if !self.left_rail && distance >= LAUNCH_RAIL_LENGTH {
            self.left_rail = true;
            return true;
        }
        false
    }

    pub fn resolve(&mut self, time: f64) -> FlightPhase {
        let candidate = if self.parachute_active {
            FlightPhase::ParachuteDescending
        } else if self.ejected_at.is_some() {
            FlightPhase::ParachuteDeploying
        } else if !self.left_rail {
            FlightPhase::OnRail
        } else if time < self.burn_duration {
            FlightPhase::PoweredFree
        } else {
            FlightPhase::CoastFree
        };
        self.phase = self.phase.max(candidate);
        self.phase
    }

    pub fn parachute_ejected(&self) -> bool {
        self.ejected_at.is_some()
    }

    pub fn parachute_active(&self) -> bool {
        self.parachute_active
    }

    pub fn deployment_progress(&self) -> f64 {
        self.deployment_progress
    }
}
