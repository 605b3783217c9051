//! Fitness of joint positions for reaching a goal

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use util::maths::clamp;

use super::{FitnessModel, Score};
use crate::chain::{Joint, KinematicChain};
use crate::collision::CollisionWorld;
use crate::geom::Pose;
use crate::motion_sim::MotionSim;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of genome bits encoding each joint position.
pub const BITS_PER_JOINT: usize = 8;

/// Numerator of the fitness function.
pub const FITNESS_SCALE: f64 = 1000.0;

/// Lower bound of a candidate's move time.
///
/// Units: seconds
pub const MIN_MOVE_TIME_S: f64 = 0.1;

/// Distance below which the goal is considered hit exactly, bounds the fitness.
///
/// Units: millimeters
const MIN_DISTANCE_MM: f64 = 1e-9;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// What to do with a decoded joint position outside of the joint's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodePolicy {
    /// Use the joint's current position instead
    KeepCurrent,

    /// Use the nearest limit of the joint's range
    ClampToLimit,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Scores candidate joint positions by how close they bring the end effector to a goal.
///
/// Fitness is `|1000 / distance|`. The candidate's move time is reported alongside but does not
/// weight the fitness, nor does the goal orientation.
pub struct ArmFitness<'a> {
    chain: &'a KinematicChain,

    goal: Pose,

    policy: DecodePolicy,

    /// When set, candidates are scored at the end of a simulated motion instead of by forward
    /// kinematics of the target positions.
    simulation: Option<(&'a MotionSim, &'a CollisionWorld)>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for DecodePolicy {
    fn default() -> Self {
        DecodePolicy::KeepCurrent
    }
}

impl<'a> ArmFitness<'a> {
    pub fn new(chain: &'a KinematicChain, goal: Pose) -> Self {
        Self {
            chain,
            goal,
            policy: DecodePolicy::default(),
            simulation: None,
        }
    }

    pub fn with_policy(mut self, policy: DecodePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_simulation(mut self, sim: &'a MotionSim, world: &'a CollisionWorld) -> Self {
        self.simulation = Some((sim, world));
        self
    }

    /// End effector pose reached by moving to the given positions.
    fn end_pose(&self, decoded: &[f64]) -> Option<Pose> {
        match self.simulation {
            Some((sim, world)) => {
                let mut world = world.clone();
                sim.run(self.chain, decoded, &mut world)
                    .ok()
                    .and_then(|o| o.chain.forward_kinematics().ok())
            }
            None => {
                let mut chain = self.chain.clone();
                chain
                    .set_positions_deg(decoded)
                    .ok()
                    .and_then(|_| chain.forward_kinematics().ok())
            }
        }
    }
}

impl<'a> FitnessModel for ArmFitness<'a> {
    fn genome_len(&self) -> usize {
        self.chain.len() * BITS_PER_JOINT
    }

    fn decode(&self, genome: &[bool]) -> Vec<f64> {
        self.chain
            .joints()
            .iter()
            .enumerate()
            .map(|(i, joint)| {
                let start = (i * BITS_PER_JOINT).min(genome.len());
                let end = ((i + 1) * BITS_PER_JOINT).min(genome.len());
                decode_joint(joint, &genome[start..end], self.policy)
            })
            .collect()
    }

    fn score(&self, decoded: &[f64]) -> Score {
        let fitness = self
            .end_pose(decoded)
            .map(|p| fitness_for_distance(p.distance_to(&self.goal)))
            .unwrap_or(0.0);

        Score {
            fitness,
            move_time_s: move_time_s(self.chain, decoded).max(MIN_MOVE_TIME_S),
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Decode one joint's bits, bit `i` being worth `2^i` degrees, and apply the range policy.
pub fn decode_joint(joint: &Joint, bits: &[bool], policy: DecodePolicy) -> f64 {
    let value: f64 = bits
        .iter()
        .enumerate()
        .filter(|(_, b)| **b)
        .map(|(i, _)| (1u32 << i) as f64)
        .sum();

    if joint.in_range_deg(value) {
        return value;
    }

    match policy {
        DecodePolicy::KeepCurrent => joint.position_deg(),
        DecodePolicy::ClampToLimit => {
            let (min, max) = joint.range_deg();
            clamp(value, min, max)
        }
    }
}

/// Encode joint positions into a genome, rounding to whole degrees.
///
/// Returns `None` if any position cannot be represented.
pub fn encode_positions(positions_deg: &[f64]) -> Option<Vec<bool>> {
    let max = ((1u32 << BITS_PER_JOINT) - 1) as f64;
    let mut genome = Vec::with_capacity(positions_deg.len() * BITS_PER_JOINT);

    for p in positions_deg {
        let rounded = p.round();
        if !(0.0..=max).contains(&rounded) {
            return None;
        }

        let value = rounded as u32;
        genome.extend((0..BITS_PER_JOINT).map(|i| value & (1 << i) != 0));
    }

    Some(genome)
}

/// Time the slowest joint needs to move from its current position to its target.
///
/// Joints without a positive velocity limit cannot move and are not counted.
///
/// Units: seconds
pub fn move_time_s(chain: &KinematicChain, targets_deg: &[f64]) -> f64 {
    chain
        .joints()
        .iter()
        .zip(targets_deg)
        .filter(|(j, _)| j.velocity_limit_degs() > 0.0)
        .map(|(j, t)| (t - j.position_deg()).abs() / j.velocity_limit_degs())
        .fold(0.0, f64::max)
}

/// Fitness of an end effector at the given distance from the goal.
pub fn fitness_for_distance(distance_mm: f64) -> f64 {
    (FITNESS_SCALE / distance_mm.max(MIN_DISTANCE_MM)).abs()
}
