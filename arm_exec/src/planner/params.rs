//! Parameters of the planner

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use comms_if::tc::ik::StrategyKind;

use crate::act_sched::PacerParams;
use crate::gen_search::DecodePolicy;
use crate::gradient::GradientParams;
use crate::motion_sim::SimParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Planner parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerParams {
    /// Strategy used to solve new targets
    pub strategy: StrategyKind,

    pub genetic: GeneticParams,

    pub gradient: GradientParams,

    pub sim: SimParams,

    pub pacer: PacerParams,
}

/// Parameters of the genetic strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticParams {
    /// Number of chromosomes in the pool
    pub pool_size: usize,

    /// Probability of flipping each bit of a child genome
    pub mutation_rate: f64,

    /// Probability of crossing two parents over rather than copying them
    pub recombination_rate: f64,

    /// Generations evolved per attempt
    pub generations: usize,

    /// Score candidates with the motion simulator rather than forward kinematics
    pub simulate: bool,

    /// Maximum number of attempts per solve
    pub retry_cap: usize,

    /// Seed of the random generator, a random seed is used if not given
    pub seed: Option<u64>,

    /// Per-axis angle step of a collision repair.
    ///
    /// Units: degrees
    pub repair_step_deg: f64,

    /// Distance from the goal within which no motion is needed.
    ///
    /// Units: millimeters
    pub goal_tolerance_mm: f64,

    /// Handling of decoded positions outside of a joint's range
    pub decode_policy: DecodePolicy,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for PlannerParams {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Gradient,
            genetic: GeneticParams::default(),
            gradient: GradientParams::default(),
            sim: SimParams::default(),
            pacer: PacerParams::default(),
        }
    }
}

impl Default for GeneticParams {
    fn default() -> Self {
        Self {
            pool_size: 200,
            mutation_rate: 0.01,
            recombination_rate: 0.7,
            generations: 300,
            simulate: false,
            retry_cap: 100,
            seed: None,
            repair_step_deg: 5.0,
            goal_tolerance_mm: 1.0,
            decode_policy: DecodePolicy::KeepCurrent,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_params_use_defaults() {
        let params: PlannerParams = util::params::from_str(
            r#"
            strategy = "Genetic"

            [genetic]
            pool_size = 50
            seed = 4

            [sim]
            link_radius_mm = 15.0
            "#,
        )
        .unwrap();

        assert_eq!(params.strategy, StrategyKind::Genetic);
        assert_eq!(params.genetic.pool_size, 50);
        assert_eq!(params.genetic.seed, Some(4));
        assert_eq!(params.genetic.generations, 300);
        assert_eq!(params.genetic.decode_policy, DecodePolicy::KeepCurrent);
        assert_eq!(params.sim.link_radius_mm, 15.0);
        assert_eq!(params.sim.first_step_s, 0.1);
        assert_eq!(params.pacer.poll_period_ms, 1);
    }
}
