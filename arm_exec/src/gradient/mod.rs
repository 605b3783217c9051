//! # Gradient solver
//!
//! Iterative Jacobian pseudo-inverse descent towards a goal position. The Jacobian is estimated
//! numerically by finite differences of the forward kinematics, so any chain can be solved
//! without knowing its structure.
//!
//! The solver has no knowledge of obstacles.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, trace};
use nalgebra::{DMatrix, DVector, Vector3};
use serde::{Deserialize, Serialize};

use crate::chain::KinematicChain;
use crate::geom::Pose;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Joint perturbation used to estimate the Jacobian.
///
/// Units: radians
const JACOBIAN_DELTA_RAD: f64 = 1e-6;

/// Singular values below this are treated as zero by the pseudo-inverse.
const PINV_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the gradient solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientParams {
    /// Fraction of the remaining error corrected on each iteration
    pub step: f64,

    /// Distance from the goal at which the solve has converged.
    ///
    /// Units: millimeters
    pub threshold_mm: f64,

    pub max_iterations: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for GradientParams {
    fn default() -> Self {
        Self {
            step: 0.5,
            threshold_mm: 2.0,
            max_iterations: 1000,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Move the chain's joints so the end effector reaches the goal position.
///
/// Returns `true` if the end effector got within the threshold of the goal. The chain is left
/// in whatever state the last iteration reached, joint limits always respected.
pub fn solve(chain: &mut KinematicChain, goal: &Pose, params: &GradientParams) -> bool {
    if chain.is_empty() {
        return false;
    }

    for iteration in 0..params.max_iterations {
        let current = match chain.forward_kinematics() {
            Ok(p) => p.position_mm,
            Err(_) => return false,
        };

        let error = goal.position_mm - current;

        if error.norm() < params.threshold_mm {
            debug!(
                "Gradient solve converged after {} iterations ({:.3} mm)",
                iteration,
                error.norm()
            );
            return true;
        }

        let jacobian = jacobian(chain, &current);

        let pinv = match jacobian.pseudo_inverse(PINV_EPSILON) {
            Ok(p) => p,
            Err(e) => {
                debug!("Cannot invert the Jacobian: {}", e);
                return false;
            }
        };

        let dtheta = pinv * DVector::from_column_slice((error * params.step).as_slice());

        trace!("Iteration {}: error {:.3} mm", iteration, error.norm());

        for (i, d) in dtheta.iter().enumerate() {
            chain.apply_angle_delta(i, *d);
        }
    }

    debug!(
        "Gradient solve did not converge within {} iterations",
        params.max_iterations
    );

    false
}

/// Estimate the 3 x n position Jacobian of the chain at its current state.
pub fn jacobian(chain: &KinematicChain, current: &Vector3<f64>) -> DMatrix<f64> {
    let mut jac = DMatrix::zeros(3, chain.len());
    let mut nudged = chain.clone();

    for i in 0..chain.len() {
        let theta = chain.joint(i).theta_rad();

        // Perturb away from the nearest limit so clamping doesn't flatten the difference
        nudged.apply_angle_delta(i, JACOBIAN_DELTA_RAD);
        let mut delta = nudged.joint(i).theta_rad() - theta;
        if delta.abs() < JACOBIAN_DELTA_RAD * 0.5 {
            nudged.apply_angle_delta(i, -2.0 * JACOBIAN_DELTA_RAD);
            delta = nudged.joint(i).theta_rad() - theta;
        }

        if delta.abs() > 0.0 {
            let moved = nudged.joint_position(chain.len() - 1);
            let column = (moved - current) / delta;
            for r in 0..3 {
                jac[(r, i)] = column[r];
            }
        }

        *nudged.joint_mut(i) = chain.joint(i).clone();
    }

    jac
}
