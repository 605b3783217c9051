//! # Genetic search module
//!
//! A generational optimiser over fixed-length bitstrings. The optimiser itself knows nothing
//! about arms: decoding a genome and scoring it is delegated to a [`FitnessModel`], of which
//! [`ArmFitness`] is the one used by the planner.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod algorithm;
mod arm_fitness;
mod chromosome;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use algorithm::*;
pub use arm_fitness::*;
pub use chromosome::*;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Decodes and scores genomes for the genetic algorithm.
pub trait FitnessModel {
    /// Number of bits in a genome.
    fn genome_len(&self) -> usize;

    /// Turn a genome into the values it represents.
    fn decode(&self, genome: &[bool]) -> Vec<f64>;

    /// Score a set of decoded values. Higher fitness is better and never negative.
    fn score(&self, decoded: &[f64]) -> Score;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Result of scoring a candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Score {
    pub fitness: f64,

    /// Time the slowest joint needs to reach the candidate.
    ///
    /// Units: seconds
    pub move_time_s: f64,
}
