//! Capsule items of the collision world

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::Serialize;
use std::collections::HashSet;

use super::closest_points;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A named capsule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollisionItem {
    pub name: String,

    /// Units: millimeters
    pub origin: Vector3<f64>,

    /// Units: millimeters
    pub end: Vector3<f64>,

    /// Units: millimeters
    pub radius_mm: f64,

    /// Names of the items this one may intersect
    pub ignore: HashSet<String>,
}

/// The first colliding pair found by an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collision {
    pub item_a: String,
    pub item_b: String,

    /// Point on `item_a` closest to `item_b`
    pub point_a: Vector3<f64>,

    /// Point on `item_b` closest to `item_a`
    pub point_b: Vector3<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CollisionItem {
    pub fn new(name: &str, origin: Vector3<f64>, end: Vector3<f64>, radius_mm: f64) -> Self {
        Self {
            name: name.to_string(),
            origin,
            end,
            radius_mm,
            ignore: HashSet::new(),
        }
    }

    /// A sphere at the world origin, used for obstacles registered by name only.
    pub fn sphere_at_origin(name: &str, radius_mm: f64) -> Self {
        Self::new(name, Vector3::zeros(), Vector3::zeros(), radius_mm)
    }

    pub fn ignoring(mut self, name: &str) -> Self {
        self.ignore.insert(name.to_string());
        self
    }

    pub fn ignores(&self, other: &CollisionItem) -> bool {
        self.ignore.contains(&other.name) || other.ignore.contains(&self.name)
    }

    /// Closest points between the two items, or `None` if they don't intersect.
    pub fn intersect(&self, other: &CollisionItem) -> Option<(Vector3<f64>, Vector3<f64>)> {
        let (a, b) = closest_points(&self.origin, &self.end, &other.origin, &other.end);

        if (a - b).norm() < self.radius_mm + other.radius_mm {
            Some((a, b))
        } else {
            None
        }
    }
}

impl Collision {
    /// Split the collision into `(own point, other point)` from the side of the named item.
    pub fn sides(&self, name: &str) -> Option<(Vector3<f64>, Vector3<f64>)> {
        if self.item_a == name {
            Some((self.point_a, self.point_b))
        } else if self.item_b == name {
            Some((self.point_b, self.point_a))
        } else {
            None
        }
    }

    pub fn involves(&self, name: &str) -> bool {
        self.item_a == name || self.item_b == name
    }
}
