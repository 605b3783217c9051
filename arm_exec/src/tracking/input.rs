//! Mapping of raw input events onto tracking actions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use nalgebra::Vector3;

use util::maths::deadband;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const START_BUTTON: &str = "0";
const STOP_BUTTON: &str = "1";

const X_AXIS: &str = "x";
const Y_AXIS: &str = "y";
const Z_AXIS: &str = "ry";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Turns input events into an end effector velocity.
#[derive(Debug, Clone)]
pub struct VelocityMapper {
    /// Axis values smaller than this in magnitude are zeroed
    threshold: f64,

    /// Scale from axis value to velocity
    ///
    /// Units: millimeters/second
    gain: f64,

    /// Units: millimeters/second
    velocity_mms: Vector3<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    None,
    StartTracking,
    StopTracking,

    /// The velocity changed, units millimeters/second
    Velocity(Vector3<f64>),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VelocityMapper {
    pub fn new(threshold: f64, gain: f64) -> Self {
        Self {
            threshold,
            gain,
            velocity_mms: Vector3::zeros(),
        }
    }

    pub fn velocity_mms(&self) -> Vector3<f64> {
        self.velocity_mms
    }

    /// Handle one input event.
    ///
    /// A button acts on its press event (non-zero value) and its release event (zero value) is
    /// ignored. The y axis is inverted.
    pub fn on_input(&mut self, id: &str, value: f32) -> InputAction {
        let value = value as f64;
        let axis = self.gain * deadband(value, self.threshold);

        match id {
            START_BUTTON if value != 0.0 => InputAction::StartTracking,
            STOP_BUTTON if value != 0.0 => InputAction::StopTracking,
            START_BUTTON | STOP_BUTTON => InputAction::None,
            X_AXIS => {
                self.velocity_mms.x = axis;
                InputAction::Velocity(self.velocity_mms)
            }
            Y_AXIS => {
                self.velocity_mms.y = -axis;
                InputAction::Velocity(self.velocity_mms)
            }
            Z_AXIS => {
                self.velocity_mms.z = axis;
                InputAction::Velocity(self.velocity_mms)
            }
            _ => {
                trace!("Ignoring input {}", id);
                InputAction::None
            }
        }
    }
}
