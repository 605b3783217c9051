//! Simulated servo
//!
//! Stands in for real servo hardware: commands complete instantly in the model but the last
//! activity time is updated, so pacing behaves as it would against a real servo.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, warn};
use std::sync::Mutex;
use std::time::Instant;

use comms_if::eqpt::servo::Actuator;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A servo with no hardware behind it.
pub struct SimServo {
    name: String,

    /// Units: degrees/second
    velocity_limit_degs: f64,

    /// Units: degrees
    input_range_deg: (f64, f64),

    state: Mutex<SimServoState>,
}

struct SimServoState {
    angle_deg: f64,

    last_activity: Instant,

    /// Every command received, with the time it arrived
    commands: Vec<(Instant, f64)>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimServo {
    pub fn new(name: &str, velocity_limit_degs: f64, input_range_deg: (f64, f64)) -> Self {
        Self {
            name: name.to_string(),
            velocity_limit_degs,
            input_range_deg,
            state: Mutex::new(SimServoState {
                angle_deg: 0.0,
                last_activity: Instant::now(),
                commands: Vec::new(),
            }),
        }
    }

    /// Set the initial angle of the servo.
    pub fn with_angle_deg(self, angle_deg: f64) -> Self {
        if let Ok(mut s) = self.state.lock() {
            s.angle_deg = angle_deg;
        }
        self
    }

    /// Set the last activity time, as if the servo had just reported movement at that instant.
    pub fn set_last_activity(&self, instant: Instant) {
        match self.state.lock() {
            Ok(mut s) => s.last_activity = instant,
            Err(_) => warn!("State of servo {} is poisoned", self.name),
        }
    }

    /// All commands received so far.
    pub fn commands(&self) -> Vec<(Instant, f64)> {
        match self.state.lock() {
            Ok(s) => s.commands.clone(),
            Err(_) => Vec::new(),
        }
    }
}

impl Actuator for SimServo {
    fn name(&self) -> &str {
        &self.name
    }

    fn current_angle_deg(&self) -> f64 {
        match self.state.lock() {
            Ok(s) => s.angle_deg,
            Err(_) => 0.0,
        }
    }

    fn last_activity(&self) -> Instant {
        match self.state.lock() {
            Ok(s) => s.last_activity,
            Err(_) => Instant::now(),
        }
    }

    fn velocity_limit_degs(&self) -> f64 {
        self.velocity_limit_degs
    }

    fn input_range_deg(&self) -> (f64, f64) {
        self.input_range_deg
    }

    fn command_to(&self, angle_deg: f64) {
        let now = Instant::now();

        match self.state.lock() {
            Ok(mut s) => {
                s.angle_deg = angle_deg;
                s.last_activity = now;
                s.commands.push((now, angle_deg));
                debug!("Servo {} commanded to {:.2} deg", self.name, angle_deg);
            }
            Err(_) => warn!("State of servo {} is poisoned", self.name),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_command_updates_state() {
        let servo = SimServo::new("bicep", 60.0, (0.0, 180.0)).with_angle_deg(90.0);
        assert_eq!(servo.current_angle_deg(), 90.0);

        let before = Instant::now();
        servo.command_to(45.0);

        assert_eq!(servo.current_angle_deg(), 45.0);
        assert!(servo.last_activity() >= before);
        assert_eq!(servo.commands().len(), 1);
        assert_eq!(servo.commands()[0].1, 45.0);
    }
}
