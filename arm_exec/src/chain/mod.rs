//! # Kinematic chain module
//!
//! An arm is modelled as an ordered chain of revolute joints described by their
//! Denavit-Hartenberg parameters, from the base to the tip. Forward kinematics composes each
//! joint's transform in order starting from the identity at the base.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod joint;
mod params;
mod registry;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{DMatrix, Vector3};
use serde::Serialize;
use std::collections::HashMap;

use util::maths::wrap_360;

use crate::geom::{Pose, Transform};

pub use joint::*;
pub use params::*;
pub use registry::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An ordered chain of joints, base first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KinematicChain {
    joints: Vec<Joint>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while working with a chain.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("The chain has no joints so has no pose")]
    InvalidState,

    #[error("A joint named {0} already exists in the chain")]
    DuplicateJoint(String),

    #[error("No joint named {0} in the chain")]
    UnknownJoint(String),

    #[error("Expected {expected} joint positions but got {found}")]
    PositionCountMismatch { expected: usize, found: usize },

    #[error("A lock on the arm's state is poisoned")]
    Poisoned,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl KinematicChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a joint to the tip of the chain.
    pub fn add_joint(&mut self, joint: Joint) -> Result<(), ChainError> {
        if self.joint_by_name(joint.name()).is_some() {
            return Err(ChainError::DuplicateJoint(joint.name().to_string()));
        }

        self.joints.push(joint);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Get the joint at the given index.
    ///
    /// # Panics
    /// - If `index` is outside the chain.
    pub fn joint(&self, index: usize) -> &Joint {
        &self.joints[index]
    }

    /// Get a mutable reference to the joint at the given index.
    ///
    /// # Panics
    /// - If `index` is outside the chain.
    pub fn joint_mut(&mut self, index: usize) -> &mut Joint {
        &mut self.joints[index]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name() == name)
    }

    pub fn joint_by_name(&self, name: &str) -> Option<&Joint> {
        self.joints.iter().find(|j| j.name() == name)
    }

    pub fn joint_by_name_mut(&mut self, name: &str) -> Option<&mut Joint> {
        self.joints.iter_mut().find(|j| j.name() == name)
    }

    /// Pose of the end effector.
    ///
    /// Only the position is computed, the orientation of the returned pose is zero.
    pub fn forward_kinematics(&self) -> Result<Pose, ChainError> {
        if self.joints.is_empty() {
            return Err(ChainError::InvalidState);
        }

        let tip = self
            .joints
            .iter()
            .fold(Transform::identity(), |acc, j| acc * j.transform());

        Ok(Pose::from_position(tip.translation_part()))
    }

    /// Position of the far end of the link driven by the joint at `index`.
    ///
    /// The position of the last joint is the end effector position.
    ///
    /// # Panics
    /// - If `index` is outside the chain.
    pub fn joint_position(&self, index: usize) -> Vector3<f64> {
        assert!(
            index < self.joints.len(),
            "Joint index {} is outside a chain of {} joints",
            index,
            self.joints.len()
        );

        self.joints[..=index]
            .iter()
            .fold(Transform::identity(), |acc, j| acc * j.transform())
            .translation_part()
    }

    /// Positions of every joint, in chain order, not including the base origin.
    pub fn joint_positions(&self) -> Vec<Vector3<f64>> {
        let mut acc = Transform::identity();

        self.joints
            .iter()
            .map(|j| {
                acc = acc * j.transform();
                acc.translation_part()
            })
            .collect()
    }

    /// Matrix of link end points, `(n + 1) x 3`, with the base origin as the first row.
    pub fn position_map(&self) -> DMatrix<f64> {
        let positions = self.joint_positions();
        let mut map = DMatrix::zeros(positions.len() + 1, 3);

        for (i, p) in positions.iter().enumerate() {
            map[(i + 1, 0)] = p.x;
            map[(i + 1, 1)] = p.y;
            map[(i + 1, 2)] = p.z;
        }

        map
    }

    /// Return every joint to its neutral position.
    pub fn center_all_joints(&mut self) {
        for j in self.joints.iter_mut() {
            j.center();
        }
    }

    /// Rotate the joint at `index` by the given increment, clamped to its limits.
    ///
    /// # Panics
    /// - If `index` is outside the chain.
    pub fn apply_angle_delta(&mut self, index: usize, delta_rad: f64) {
        self.joints[index].rotate_by_rad(delta_rad);
    }

    /// Positions of every joint in degrees relative to their initial angles.
    pub fn positions_deg(&self) -> Vec<f64> {
        self.joints.iter().map(|j| j.position_deg()).collect()
    }

    /// Set every joint position (relative degrees), clamping into range.
    pub fn set_positions_deg(&mut self, positions_deg: &[f64]) -> Result<(), ChainError> {
        if positions_deg.len() != self.joints.len() {
            return Err(ChainError::PositionCountMismatch {
                expected: self.joints.len(),
                found: positions_deg.len(),
            });
        }

        for (j, p) in self.joints.iter_mut().zip(positions_deg) {
            j.set_position_deg(*p);
        }

        Ok(())
    }

    /// Absolute joint angles in degrees, wrapped into `[0, 360)`, keyed by joint name.
    pub fn angle_map_deg(&self) -> HashMap<String, f64> {
        self.joints
            .iter()
            .map(|j| (j.name().to_string(), wrap_360(j.theta_rad().to_degrees())))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// Three 100 mm links in the xy plane, stretched out along x.
    pub(crate) fn planar_chain() -> KinematicChain {
        let mut chain = KinematicChain::new();
        for name in &["shoulder", "elbow", "wrist"] {
            chain
                .add_joint(
                    Joint::new(name, 0.0, 0.0, 100.0, 0.0)
                        .with_limits_deg(-180.0, 180.0)
                        .with_velocity_limit_degs(100.0),
                )
                .unwrap();
        }
        chain
    }

    #[test]
    fn test_forward_kinematics() {
        let mut chain = planar_chain();
        let pose = chain.forward_kinematics().unwrap();
        assert!((pose.position_mm - Vector3::new(300.0, 0.0, 0.0)).norm() < 1e-9);

        // Deterministic
        assert_eq!(pose, chain.forward_kinematics().unwrap());

        chain.set_positions_deg(&[90.0, 0.0, 0.0]).unwrap();
        let pose = chain.forward_kinematics().unwrap();
        assert!((pose.position_mm - Vector3::new(0.0, 300.0, 0.0)).norm() < 1e-9);

        chain.set_positions_deg(&[0.0, 90.0, -90.0]).unwrap();
        assert!((chain.joint_position(1) - Vector3::new(100.0, 100.0, 0.0)).norm() < 1e-9);
        assert!((chain.joint_position(2) - Vector3::new(200.0, 100.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_empty_chain_has_no_pose() {
        assert!(matches!(
            KinematicChain::new().forward_kinematics(),
            Err(ChainError::InvalidState)
        ));
    }

    #[test]
    #[should_panic]
    fn test_joint_position_out_of_range() {
        planar_chain().joint_position(3);
    }

    #[test]
    fn test_duplicate_joint_rejected() {
        let mut chain = planar_chain();
        assert!(matches!(
            chain.add_joint(Joint::new("elbow", 0.0, 0.0, 1.0, 0.0)),
            Err(ChainError::DuplicateJoint(_))
        ));
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_position_map_origin_first() {
        let chain = planar_chain();
        let map = chain.position_map();

        assert_eq!(map.nrows(), 4);
        assert_eq!(map.ncols(), 3);
        assert_eq!(map.row(0).iter().copied().collect::<Vec<_>>(), vec![0.0; 3]);
        assert!((map[(3, 0)] - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_angle_map_wraps() {
        let mut chain = planar_chain();
        chain.set_positions_deg(&[-90.0, 0.0, 450.0]).unwrap();

        let angles = chain.angle_map_deg();
        assert!((angles["shoulder"] - 270.0).abs() < 1e-9);
        assert!((angles["elbow"] - 0.0).abs() < 1e-9);
        // Clamped to the 180 degree limit before wrapping
        assert!((angles["wrist"] - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_angle_delta_and_centering() {
        let mut chain = planar_chain();
        chain.apply_angle_delta(0, 10f64.to_radians());
        assert!((chain.joint(0).position_deg() - 10.0).abs() < 1e-9);

        chain.center_all_joints();
        assert_eq!(chain.positions_deg(), vec![0.0; 3]);

        assert!(matches!(
            chain.set_positions_deg(&[1.0]),
            Err(ChainError::PositionCountMismatch {
                expected: 3,
                found: 1
            })
        ));
    }
}
