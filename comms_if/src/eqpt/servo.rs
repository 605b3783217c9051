//! # Servo Equipment Interface
//!
//! The planner never talks to servo hardware directly. Anything which can be commanded to an
//! angle and which reports when it was last active can drive a joint by implementing
//! [`Actuator`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::time::Instant;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Contract of an actuator bound to a joint.
///
/// Commands are asynchronous: `command_to` returns immediately and completion of the move is only
/// inferred from the time elapsed since `last_activity`.
pub trait Actuator: Send + Sync {
    /// Name of the actuator, used to bind it to a joint.
    fn name(&self) -> &str;

    /// The last angle the actuator reported or was commanded to.
    ///
    /// Units: degrees
    fn current_angle_deg(&self) -> f64;

    /// The instant the actuator was last commanded or last reported movement.
    fn last_activity(&self) -> Instant;

    /// Maximum angular velocity of the actuator.
    ///
    /// Units: degrees/second
    fn velocity_limit_degs(&self) -> f64;

    /// The range of input angles the actuator accepts, as `(min, max)`.
    ///
    /// Units: degrees
    fn input_range_deg(&self) -> (f64, f64);

    /// Command the actuator to move to the given angle.
    ///
    /// Units: degrees
    fn command_to(&self, angle_deg: f64);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Position feedback emitted by an actuator, for example after being moved by hand.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServoEvent {
    /// Name of the actuator (and so of the joint it drives)
    pub name: String,

    /// Reported position.
    ///
    /// Units: degrees
    pub pos_deg: f64,
}
