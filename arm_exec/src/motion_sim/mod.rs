//! # Motion simulator
//!
//! Estimates how the arm moves from its current state to a set of target joint positions when
//! every joint travels at its velocity limit. The timestep grows each iteration, so long moves
//! are covered in few steps while the start of the motion, where most collisions with nearby
//! items happen, is sampled finely.
//!
//! Every step rebuilds the links in the collision world. When a collision is found the
//! simulation stops and returns the last state that was free of collisions. A chain that does
//! not move at all is checked once where it stands.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::chain::{ChainError, KinematicChain};
use crate::collision::{Collision, CollisionWorld};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Joint movement below which a joint is considered stationary.
///
/// Units: degrees
const STATIONARY_EPSILON_DEG: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Simulator parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Length of the first timestep.
    ///
    /// Units: seconds
    pub first_step_s: f64,

    /// Amount each timestep is longer than the previous one.
    ///
    /// Units: seconds
    pub step_growth_s: f64,

    /// Maximum number of steps in a single simulation
    pub max_steps: usize,

    /// Radius of the capsules modelling the arm's links.
    ///
    /// Units: millimeters
    pub link_radius_mm: f64,
}

/// The simulator.
#[derive(Debug, Clone, Default)]
pub struct MotionSim {
    params: SimParams,
}

/// Result of a simulation.
#[derive(Debug, Clone)]
pub struct SimOutcome {
    /// Final chain state, the last collision free one if a collision occured
    pub chain: KinematicChain,

    /// Simulated duration of the motion.
    ///
    /// Units: seconds
    pub elapsed_s: f64,

    /// Number of steps in which at least one joint moved
    pub steps: usize,

    /// The collision which stopped the simulation, if any
    pub collision: Option<Collision>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            first_step_s: 0.1,
            step_growth_s: 0.2,
            max_steps: 1000,
            link_radius_mm: 10.0,
        }
    }
}

impl MotionSim {
    pub fn new(params: SimParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Simulate the chain moving to the target positions (relative degrees, one per joint).
    pub fn run(
        &self,
        chain: &KinematicChain,
        targets_deg: &[f64],
        world: &mut CollisionWorld,
    ) -> Result<SimOutcome, ChainError> {
        if targets_deg.len() != chain.len() {
            return Err(ChainError::PositionCountMismatch {
                expected: chain.len(),
                found: targets_deg.len(),
            });
        }

        let mut current = chain.clone();
        let mut last_free = chain.clone();
        let mut step_s = self.params.first_step_s;
        let mut elapsed_s = 0.0;
        let mut steps = 0;

        loop {
            if steps >= self.params.max_steps {
                warn!(
                    "Motion simulation stopped after {} steps without reaching the target",
                    steps
                );
                break;
            }

            if !Self::step(&mut current, targets_deg, step_s) {
                // A motion with no step has not checked the state it ends in
                if steps == 0 {
                    world.refresh_links(&current, self.params.link_radius_mm);

                    if let Some(collision) = world.evaluate() {
                        trace!(
                            "Stationary chain collides ({} with {})",
                            collision.item_a,
                            collision.item_b
                        );
                        return Ok(SimOutcome {
                            chain: last_free,
                            elapsed_s,
                            steps,
                            collision: Some(collision),
                        });
                    }
                }
                break;
            }

            steps += 1;
            elapsed_s += step_s;

            world.refresh_links(&current, self.params.link_radius_mm);

            if let Some(collision) = world.evaluate() {
                trace!(
                    "Simulated motion collides after {:.2} s ({} with {})",
                    elapsed_s,
                    collision.item_a,
                    collision.item_b
                );
                return Ok(SimOutcome {
                    chain: last_free,
                    elapsed_s,
                    steps,
                    collision: Some(collision),
                });
            }

            last_free = current.clone();
            step_s += self.params.step_growth_s;
        }

        Ok(SimOutcome {
            chain: last_free,
            elapsed_s,
            steps,
            collision: None,
        })
    }

    /// Move every joint towards its target by at most `step_s` times its velocity limit.
    ///
    /// Returns `true` if any joint moved.
    pub fn step(chain: &mut KinematicChain, targets_deg: &[f64], step_s: f64) -> bool {
        let mut moved = false;

        for (i, target) in targets_deg.iter().enumerate().take(chain.len()) {
            let joint = chain.joint_mut(i);
            let start = joint.position_deg();
            let max_delta = (step_s * joint.velocity_limit_degs()).abs();
            let delta = target - start;

            let increment = if delta.abs() <= max_delta {
                delta
            } else {
                max_delta.copysign(delta)
            };

            joint.set_position_deg(start + increment);

            if (joint.position_deg() - start).abs() > STATIONARY_EPSILON_DEG {
                moved = true;
            }
        }

        moved
    }
}
