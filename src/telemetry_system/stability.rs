use std::collections::VecDeque;

use serde::Serialize;

use crate::constants::{ABSOLUTE_ANGLE_LIMIT, ANGLE_CHANGE_LIMIT, ROTATION_STEPS};
use crate::utils::angles::{normalize_angle, normalize_degrees};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StabilityRecord {
    pub max_angle_change: f64,   // deg per rotational window
    pub max_absolute_angle: f64, // deg from vertical
    pub angle_change_ok: bool,
    pub absolute_angle_ok: bool,
    pub torque_ok: bool,
    pub is_stable: bool,
}

impl Default for StabilityRecord {
    fn default() -> Self {
        StabilityRecord {
            max_angle_change: 0.0,
            max_absolute_angle: 0.0,
            angle_change_ok: true,
            absolute_angle_ok: true,
            torque_ok: true,
            is_stable: true,
        }
    }
}

// Watches attitude over a rolling 0.2 s window. Breaches are recorded, never fatal.
#[derive(Debug, Clone)]
pub struct StabilityMonitor {
    history: VecDeque<f64>,
    record: StabilityRecord,
}

impl Default for StabilityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl StabilityMonitor {
    pub fn new() -> Self {
        StabilityMonitor {
            history: VecDeque::with_capacity(ROTATION_STEPS + 1),
            record: StabilityRecord::default(),
        }
    }

    pub fn observe(&mut self, attitude: f64) {
        self.history.push_back(attitude);
        if self.history.len() > ROTATION_STEPS + 1 {
            self.history.pop_front();
        }

        if let (Some(&oldest), true) = (self.history.front(), self.history.len() > ROTATION_STEPS) {
            let change = normalize_angle(attitude - oldest).to_degrees().abs();
            self.record.max_angle_change = self.record.max_angle_change.max(change);
            if change > ANGLE_CHANGE_LIMIT {
                self.record.angle_change_ok = false;
            }
        }

        let absolute = normalize_degrees(attitude.to_degrees()).abs();
        self.record.max_absolute_angle = self.record.max_absolute_angle.max(absolute);
        if absolute > ABSOLUTE_ANGLE_LIMIT {
            self.record.absolute_angle_ok = false;
        }
    }

    pub fn mark_torque_abort(&mut self) {
        self.record.torque_ok = false;
    }

    pub fn record(&self) -> StabilityRecord {
        StabilityRecord {
            is_stable: self.record.angle_change_ok
                && self.record.absolute_angle_ok
                && self.record.torque_ok,
            ..self.record
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_steady_attitude_is_stable() {
        let mut monitor = StabilityMonitor::new();
        for _ in 0..50 {
            monitor.observe(0.1);
        }
        let record = monitor.record();
        assert!(record.is_stable);
        assert_eq!(record.max_angle_change, 0.0);
        assert_relative_eq!(record.max_absolute_angle, 0.1_f64.to_degrees(), epsilon = 1e-9);
    }

    #[test]
    fn test_window_spans_ten_steps() {
        let mut monitor = StabilityMonitor::new();
        // 5° per step is 50° per window, but only once ten steps have been seen.
        for i in 0..10 {
            monitor.observe((5.0 * i as f64).to_radians());
        }
        assert_eq!(monitor.record().max_angle_change, 0.0);
        monitor.observe(50.0_f64.to_radians());
        let record = monitor.record();
        assert_relative_eq!(record.max_angle_change, 50.0, epsilon = 1e-9);
        assert!(!record.angle_change_ok);
        assert!(record.absolute_angle_ok);
        assert!(!record.is_stable);
    }

    #[test]
    fn test_absolute_angle_breach() {
        let mut monitor = StabilityMonitor::new();
        monitor.observe(120.0_f64.to_radians());
        let record = monitor.record();
        assert!(!record.absolute_angle_ok);
        assert!(record.angle_change_ok);
        assert!(!record.is_stable);
    }

    #[test]
    fn test_wraparound_is_not_a_jump() {
        let mut monitor = StabilityMonitor::new();
        for i in 0..=ROTATION_STEPS {
            let angle = 179.0 + i as f64 * 0.2;
            monitor.observe(angle.to_radians());
        }
        assert!(monitor.record().max_angle_change < 3.0);
    }

    #[test]
    fn test_torque_abort_breaks_conjunction() {
        let mut monitor = StabilityMonitor::new();
        monitor.observe(0.0);
        monitor.mark_torque_abort();
        let record = monitor.record();
        assert!(!record.torque_ok);
        assert!(!record.is_stable);
    }
}
