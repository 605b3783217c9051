//! Pose of the end effector

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A position plus a roll/pitch/yaw orientation.
///
/// Only the position takes part in solving, the orientation is carried so targets and telemetry
/// keep the full six values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position in the arm base frame.
    ///
    /// Units: millimeters
    pub position_mm: Vector3<f64>,

    /// Roll, pitch and yaw.
    ///
    /// Units: degrees
    pub orientation_deg: Vector3<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    /// A pose at the given position with zero orientation.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self::from_position(Vector3::new(x, y, z))
    }

    pub fn from_position(position_mm: Vector3<f64>) -> Self {
        Self {
            position_mm,
            orientation_deg: Vector3::zeros(),
        }
    }

    /// A pose with both position and orientation.
    pub fn with_orientation(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self {
            position_mm: Vector3::new(x, y, z),
            orientation_deg: Vector3::new(roll, pitch, yaw),
        }
    }

    pub fn x(&self) -> f64 {
        self.position_mm.x
    }

    pub fn y(&self) -> f64 {
        self.position_mm.y
    }

    pub fn z(&self) -> f64 {
        self.position_mm.z
    }

    /// Scale the position part only, orientation is kept.
    ///
    /// Used to turn a velocity into a displacement over one period.
    pub fn scale_position(&self, factor: f64) -> Self {
        Self {
            position_mm: self.position_mm * factor,
            orientation_deg: self.orientation_deg,
        }
    }

    /// Euclidean distance between the positions of two poses.
    pub fn distance_to(&self, other: &Pose) -> f64 {
        (self.position_mm - other.position_mm).norm()
    }
}

impl Add for Pose {
    type Output = Pose;

    fn add(self, rhs: Pose) -> Pose {
        Pose {
            position_mm: self.position_mm + rhs.position_mm,
            orientation_deg: self.orientation_deg + rhs.orientation_deg,
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(x: {:.3}, y: {:.3}, z: {:.3}, roll: {:.2}, pitch: {:.2}, yaw: {:.2})",
            self.position_mm.x,
            self.position_mm.y,
            self.position_mm.z,
            self.orientation_deg.x,
            self.orientation_deg.y,
            self.orientation_deg.z
        )
    }
}
