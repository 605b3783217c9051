//! Genetic solve of a move request
//!
//! Each attempt evolves the pool, commits the fittest candidate through the motion simulator
//! and actuates it. A collision free commit ends the solve. A colliding one is locally repaired
//! and the repair committed and actuated in turn before the next attempt.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::time::{Duration, Instant};

use util::session;
use util::time::seconds_to_duration;

use super::{GeneticParams, Planner, PlannerError};
use crate::act_sched::{repair, Repair};
use crate::chain::{ActuatorMap, ArmHandle, KinematicChain};
use crate::collision::{Collision, CollisionWorld};
use crate::gen_search::{
    encode_positions, move_time_s, ArmFitness, GeneticAlgorithm, BITS_PER_JOINT, MIN_MOVE_TIME_S,
};
use crate::geom::Pose;
use crate::motion_sim::{MotionSim, SimOutcome};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Record of a genetic solve, saved into the session.
#[derive(Debug, Clone, Serialize)]
pub struct SolveReport {
    pub arm: String,

    pub goal: Pose,

    pub attempts: Vec<AttemptRecord>,

    pub outcome: SolveOutcome,

    /// Joint positions at the end of the solve.
    ///
    /// Units: degrees
    pub final_positions_deg: Vec<f64>,

    /// Distance from the end effector to the goal at the end of the solve.
    ///
    /// Units: millimeters
    pub final_distance_mm: Option<f64>,

    /// Units: seconds
    pub duration_s: f64,
}

/// One committed candidate.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    pub attempt: usize,

    pub source: CandidateSource,

    /// Units: degrees
    pub targets_deg: Vec<f64>,

    /// Fitness of a searched candidate
    pub fitness: Option<f64>,

    /// Units: seconds
    pub move_time_s: f64,

    /// Number of actuator commands issued
    pub commands: usize,

    /// Collision that stopped the simulated motion
    pub collision: Option<Collision>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CandidateSource {
    Search,
    Repair,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SolveOutcome {
    /// The end effector was already within tolerance of the goal
    AlreadyAtGoal,

    /// A searched candidate was committed without collision
    Reached,

    /// A collision not involving the arm blocked the motion
    Unresolvable { item_a: String, item_b: String },

    /// The attempt limit was hit
    Exhausted,

    /// The solve stopped with an error
    Failed(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SolveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SolveOutcome::AlreadyAtGoal | SolveOutcome::Reached)
    }
}

impl Planner {
    /// Solve a move with the genetic strategy, saving a report of the solve.
    pub(super) fn solve_genetic(
        &self,
        arm: &ArmHandle,
        goal: &Pose,
        params: &GeneticParams,
    ) -> Result<bool, PlannerError> {
        let start = Instant::now();

        let mut report = SolveReport {
            arm: arm.name().to_string(),
            goal: *goal,
            attempts: Vec::new(),
            outcome: SolveOutcome::Exhausted,
            final_positions_deg: Vec::new(),
            final_distance_mm: None,
            duration_s: 0.0,
        };

        let result = self.run_genetic(arm, goal, params, &mut report);

        report.outcome = match result {
            Ok(ref o) => o.clone(),
            Err(ref e) => SolveOutcome::Failed(e.to_string()),
        };
        if let Ok(chain) = arm.snapshot() {
            report.final_positions_deg = chain.positions_deg();
            report.final_distance_mm = chain.forward_kinematics().ok().map(|p| p.distance_to(goal));
        }
        report.duration_s = start.elapsed().as_secs_f64();

        session::save_with_timestamp("solves/solve.json", report.clone());
        *self.last_report.write()? = Some(report);

        result.map(|o| o.is_success())
    }

    fn run_genetic(
        &self,
        arm: &ArmHandle,
        goal: &Pose,
        params: &GeneticParams,
        report: &mut SolveReport,
    ) -> Result<SolveOutcome, PlannerError> {
        let initial = arm.snapshot()?;

        let distance = initial.forward_kinematics()?.distance_to(goal);
        if distance <= params.goal_tolerance_mm {
            debug!("Arm {} already within {:.3} mm of the goal", arm.name(), distance);
            return Ok(SolveOutcome::AlreadyAtGoal);
        }

        let sim = MotionSim::new(self.params.read()?.sim.clone());
        let world = self.world()?;
        let actuators = arm.actuators()?;

        let rng = match params.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let mut ga = GeneticAlgorithm::new(
            params.pool_size,
            initial.len() * BITS_PER_JOINT,
            params.recombination_rate,
            params.mutation_rate,
            rng,
        );
        if let Some(genome) = encode_positions(&initial.positions_deg()) {
            ga.seed(genome);
        }

        // Actuators are free to move on the first commit of a solve
        let mut settle = Duration::ZERO;

        for attempt in 1..=params.retry_cap {
            let chain = arm.snapshot()?;

            let best = {
                let model = ArmFitness::new(&chain, *goal).with_policy(params.decode_policy);
                let model = if params.simulate {
                    model.with_simulation(&sim, &world)
                } else {
                    model
                };

                match ga.do_generation(&model, params.generations) {
                    Some(b) => b,
                    None => {
                        warn!("The genetic pool is empty, nothing to search with");
                        return Ok(SolveOutcome::Exhausted);
                    }
                }
            };

            let (outcome, commands) =
                self.commit_and_actuate(arm, &sim, &world, &chain, &best.decoded, &actuators, settle)?;
            settle = seconds_to_duration(best.move_time_s);

            report.attempts.push(AttemptRecord {
                attempt,
                source: CandidateSource::Search,
                targets_deg: best.decoded.clone(),
                fitness: Some(best.fitness),
                move_time_s: best.move_time_s,
                commands,
                collision: outcome.collision.clone(),
            });

            let collision = match outcome.collision {
                Some(c) => c,
                None => {
                    debug!(
                        "Attempt {} committed without collision (fitness {:.3})",
                        attempt, best.fitness
                    );
                    return Ok(SolveOutcome::Reached);
                }
            };

            let positions = match repair(&outcome.chain, &collision, params.repair_step_deg) {
                Repair::Candidate(p) => p,
                Repair::Unresolvable => {
                    info!(
                        "Collision between {} and {} does not involve arm {}, giving up",
                        collision.item_a,
                        collision.item_b,
                        arm.name()
                    );
                    return Ok(SolveOutcome::Unresolvable {
                        item_a: collision.item_a,
                        item_b: collision.item_b,
                    });
                }
            };

            let chain = arm.snapshot()?;
            let repair_time_s = move_time_s(&chain, &positions).max(MIN_MOVE_TIME_S);

            let (outcome, commands) =
                self.commit_and_actuate(arm, &sim, &world, &chain, &positions, &actuators, settle)?;
            settle = seconds_to_duration(repair_time_s);

            report.attempts.push(AttemptRecord {
                attempt,
                source: CandidateSource::Repair,
                targets_deg: positions,
                fitness: None,
                move_time_s: repair_time_s,
                commands,
                collision: outcome.collision,
            });
        }

        warn!(
            "Arm {} found no collision free move in {} attempts",
            arm.name(),
            params.retry_cap
        );

        Ok(SolveOutcome::Exhausted)
    }

    /// Simulate the motion to the targets, commit the resulting state and command it.
    #[allow(clippy::too_many_arguments)]
    fn commit_and_actuate(
        &self,
        arm: &ArmHandle,
        sim: &MotionSim,
        world: &CollisionWorld,
        chain: &KinematicChain,
        targets_deg: &[f64],
        actuators: &ActuatorMap,
        settle: Duration,
    ) -> Result<(SimOutcome, usize), PlannerError> {
        let mut world = world.clone();
        let outcome = sim.run(chain, targets_deg, &mut world)?;

        arm.commit(outcome.chain.clone())?;

        let commands = self.pacer.dispatch(&outcome.chain, actuators, settle)?;

        Ok((outcome, commands))
    }
}
