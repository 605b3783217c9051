//! A single revolute joint of a kinematic chain

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use util::maths::clamp;

use crate::geom::Transform;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Velocity limit given to joints which don't specify one.
///
/// Units: degrees/second
pub const DEFAULT_VELOCITY_LIMIT_DEGS: f64 = 60.0;

/// Half width of the range given to joints which don't specify limits.
///
/// Units: degrees
pub const DEFAULT_HALF_RANGE_DEG: f64 = 180.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Denavit-Hartenberg parameters of a joint, excluding the joint angle itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DhParams {
    /// Link offset along the previous z axis.
    ///
    /// Units: millimeters
    pub d_mm: f64,

    /// Link length along the new x axis.
    ///
    /// Units: millimeters
    pub r_mm: f64,

    /// Link twist about the new x axis.
    ///
    /// Units: radians
    pub alpha_rad: f64,
}

/// A revolute joint.
///
/// The joint angle `theta` is stored in absolute radians as used by the DH transform. The
/// "position" of a joint is the same angle expressed in degrees relative to the initial angle,
/// which is the frame the actuators and the genetic search work in.
///
/// Invariant: `min_rad <= theta_rad <= max_rad`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Joint {
    name: String,

    dh: DhParams,

    initial_theta_rad: f64,

    theta_rad: f64,

    min_rad: f64,

    max_rad: f64,

    velocity_limit_degs: f64,

    neutral_deg: f64,

    actuator: Option<String>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Joint {
    /// Create a new joint from its DH parameters, with angles in degrees.
    ///
    /// The joint starts at its initial angle with a range of +/-180 degrees about it.
    pub fn new(name: &str, d_mm: f64, theta_deg: f64, r_mm: f64, alpha_deg: f64) -> Self {
        let initial_theta_rad = theta_deg.to_radians();

        Self {
            name: name.to_string(),
            dh: DhParams {
                d_mm,
                r_mm,
                alpha_rad: alpha_deg.to_radians(),
            },
            initial_theta_rad,
            theta_rad: initial_theta_rad,
            min_rad: initial_theta_rad - DEFAULT_HALF_RANGE_DEG.to_radians(),
            max_rad: initial_theta_rad + DEFAULT_HALF_RANGE_DEG.to_radians(),
            velocity_limit_degs: DEFAULT_VELOCITY_LIMIT_DEGS,
            neutral_deg: 0.0,
            actuator: None,
        }
    }

    /// Set the range of the joint, in degrees relative to the initial angle.
    ///
    /// The bounds are sorted, and the current position is pulled into the new range.
    pub fn with_limits_deg(mut self, a_deg: f64, b_deg: f64) -> Self {
        let (min_deg, max_deg) = (a_deg.min(b_deg), a_deg.max(b_deg));
        self.min_rad = self.initial_theta_rad + min_deg.to_radians();
        self.max_rad = self.initial_theta_rad + max_deg.to_radians();
        self.theta_rad = clamp(self.theta_rad, self.min_rad, self.max_rad);
        self
    }

    pub fn with_velocity_limit_degs(mut self, velocity_limit_degs: f64) -> Self {
        self.velocity_limit_degs = velocity_limit_degs;
        self
    }

    /// Set the position the joint returns to when centred.
    pub fn with_neutral_deg(mut self, neutral_deg: f64) -> Self {
        self.neutral_deg = neutral_deg;
        self
    }

    /// Set the position of the joint (relative degrees).
    pub fn with_position_deg(mut self, position_deg: f64) -> Self {
        self.set_position_deg(position_deg);
        self
    }

    /// Bind the joint to the named actuator.
    pub fn with_actuator(mut self, actuator: &str) -> Self {
        self.actuator = Some(actuator.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dh(&self) -> &DhParams {
        &self.dh
    }

    pub fn actuator(&self) -> Option<&str> {
        self.actuator.as_deref()
    }

    pub fn velocity_limit_degs(&self) -> f64 {
        self.velocity_limit_degs
    }

    pub fn set_velocity_limit_degs(&mut self, velocity_limit_degs: f64) {
        self.velocity_limit_degs = velocity_limit_degs;
    }

    /// Absolute joint angle.
    pub fn theta_rad(&self) -> f64 {
        self.theta_rad
    }

    /// Joint angle in degrees relative to the initial angle.
    pub fn position_deg(&self) -> f64 {
        (self.theta_rad - self.initial_theta_rad).to_degrees()
    }

    /// Range of the joint in degrees relative to the initial angle, as `(min, max)`.
    pub fn range_deg(&self) -> (f64, f64) {
        (
            (self.min_rad - self.initial_theta_rad).to_degrees(),
            (self.max_rad - self.initial_theta_rad).to_degrees(),
        )
    }

    /// True if the given relative position lies within the joint's range.
    pub fn in_range_deg(&self, position_deg: f64) -> bool {
        let (min, max) = self.range_deg();
        position_deg >= min && position_deg <= max
    }

    /// Set the relative position of the joint, clamping it into range.
    ///
    /// Returns `true` if the position had to be clamped.
    pub fn set_position_deg(&mut self, position_deg: f64) -> bool {
        let theta = self.initial_theta_rad + position_deg.to_radians();
        self.theta_rad = clamp(theta, self.min_rad, self.max_rad);
        self.theta_rad != theta
    }

    /// Rotate the joint by an increment, clamping the result into range.
    pub fn rotate_by_rad(&mut self, delta_rad: f64) {
        self.theta_rad = clamp(self.theta_rad + delta_rad, self.min_rad, self.max_rad);
    }

    /// Return the joint to its neutral position.
    pub fn center(&mut self) {
        self.set_position_deg(self.neutral_deg);
    }

    /// DH transform of the joint at its current angle.
    pub fn transform(&self) -> Transform {
        Transform::dh(self.dh.d_mm, self.theta_rad, self.dh.r_mm, self.dh.alpha_rad)
    }
}
