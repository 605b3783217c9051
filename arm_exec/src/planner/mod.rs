//! # Planner
//!
//! The planner session holds every arm, the collision world and the solver configuration, and
//! carries out move requests against the active arm. It is shared between the request context
//! and the velocity tracking loop, so all of its state sits behind locks and every operation
//! takes `&self`.
//!
//! Solves on one arm are serialised by that arm's solve lock. The chain itself is only locked to
//! take snapshots and commit new states, never while waiting on actuators.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod genetic;
mod params;
mod telemetry;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info, warn};
use nalgebra::{DMatrix, Vector3};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use comms_if::eqpt::servo::Actuator;
use comms_if::tc::ik::StrategyKind;

use crate::act_sched::{Pacer, SchedError};
use crate::chain::{ArmHandle, ArmParams, ChainError, ChainRegistry, Joint, KinematicChain};
use crate::collision::{CollisionItem, CollisionWorld};
use crate::geom::{Pose, Transform};
use crate::gradient::{self, GradientParams};

pub use genetic::*;
pub use params::*;
pub use telemetry::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The planner session.
pub struct Planner {
    params: RwLock<PlannerParams>,

    registry: RwLock<ChainRegistry>,

    world: RwLock<CollisionWorld>,

    /// Transform applied to every incoming target
    input_transform: RwLock<Option<Transform>>,

    telemetry: Arc<dyn TelemetrySink>,

    pacer: Pacer,

    /// Report of the last genetic solve
    last_report: RwLock<Option<SolveReport>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A solving strategy together with its configuration.
#[derive(Debug, Clone)]
pub enum Strategy {
    Gradient(GradientParams),
    Genetic(GeneticParams),
}

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("No arm is active")]
    NoActiveChain,

    #[error("Chain error: {0}")]
    ChainError(ChainError),

    #[error("Actuation stopped: {0}")]
    SchedError(SchedError),

    #[error("A lock on the planner's state is poisoned")]
    PoisonError,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Strategy {
    pub fn from_params(params: &PlannerParams) -> Self {
        match params.strategy {
            StrategyKind::Gradient => Strategy::Gradient(params.gradient.clone()),
            StrategyKind::Genetic => Strategy::Genetic(params.genetic.clone()),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Gradient(_) => StrategyKind::Gradient,
            Strategy::Genetic(_) => StrategyKind::Genetic,
        }
    }
}

impl Planner {
    pub fn new(params: PlannerParams, telemetry: Arc<dyn TelemetrySink>) -> Self {
        let pacer = Pacer::new(&params.pacer);

        Self {
            params: RwLock::new(params),
            registry: RwLock::new(ChainRegistry::new()),
            world: RwLock::new(CollisionWorld::new()),
            input_transform: RwLock::new(None),
            telemetry,
            pacer,
            last_report: RwLock::new(None),
        }
    }

    // ---- ARMS ----

    /// Register a chain as a new arm, which becomes the active one.
    pub fn add_chain(&self, name: &str, chain: KinematicChain) -> Result<ArmHandle, PlannerError> {
        info!("Adding arm {} with {} joints", name, chain.len());
        Ok(self.registry.write()?.add(name, chain))
    }

    /// Build and register an arm from its parameters.
    pub fn add_arm(&self, params: &ArmParams) -> Result<ArmHandle, PlannerError> {
        let chain = params.build()?;
        self.add_chain(&params.name, chain)
    }

    /// Make the named arm active. Unknown names are logged and ignored.
    pub fn select_chain(&self, name: &str) -> Result<bool, PlannerError> {
        Ok(self.registry.write()?.select(name))
    }

    pub fn active_arm(&self) -> Result<ArmHandle, PlannerError> {
        self.registry
            .read()?
            .active()
            .ok_or(PlannerError::NoActiveChain)
    }

    pub fn arm(&self, name: &str) -> Result<Option<ArmHandle>, PlannerError> {
        Ok(self.registry.read()?.get(name))
    }

    /// Select the named arm and return the active arm, which is the previous one if the name is
    /// unknown.
    fn select_and_get(&self, name: &str) -> Result<ArmHandle, PlannerError> {
        self.select_chain(name)?;
        self.active_arm()
    }

    /// Append a joint to the active arm.
    pub fn add_joint(&self, joint: Joint) -> Result<(), PlannerError> {
        let arm = self.active_arm()?;
        let mut chain = arm.lock_chain()?;
        chain.add_joint(joint)?;
        Ok(())
    }

    /// Append a joint driven by the given actuator to the active arm.
    ///
    /// The joint's range is the actuator's input range about the initial angle, its position is
    /// the actuator's current angle and its velocity limit the actuator's.
    pub fn add_joint_with_actuator(
        &self,
        name: &str,
        d_mm: f64,
        theta_deg: f64,
        r_mm: f64,
        alpha_deg: f64,
        actuator: Arc<dyn Actuator>,
    ) -> Result<(), PlannerError> {
        let (min, max) = actuator.input_range_deg();

        let joint = Joint::new(name, d_mm, theta_deg, r_mm, alpha_deg)
            .with_limits_deg(min.min(max), min.max(max))
            .with_velocity_limit_degs(actuator.velocity_limit_degs())
            .with_actuator(actuator.name())
            .with_position_deg(actuator.current_angle_deg());

        let arm = self.active_arm()?;
        arm.lock_chain()?.add_joint(joint)?;
        arm.bind_actuator(actuator)?;

        Ok(())
    }

    /// Make an actuator available to the active arm.
    pub fn bind_actuator(&self, actuator: Arc<dyn Actuator>) -> Result<(), PlannerError> {
        self.active_arm()?.bind_actuator(actuator)?;
        Ok(())
    }

    /// Update the joint of the active arm driven by the named actuator to a reported position.
    pub fn on_actuator_event(&self, name: &str, position_deg: f64) -> Result<(), PlannerError> {
        let arm = self.active_arm()?;
        let mut chain = arm.lock_chain()?;

        let index = chain
            .joints()
            .iter()
            .position(|j| j.actuator() == Some(name) || j.name() == name);

        match index {
            Some(i) => {
                chain.joint_mut(i).set_position_deg(position_deg);
            }
            None => debug!("No joint of arm {} is driven by {}", arm.name(), name),
        }

        Ok(())
    }

    // ---- QUERIES ----

    /// End effector pose of the active arm.
    pub fn current_position(&self) -> Result<Pose, PlannerError> {
        let arm = self.active_arm()?;
        let pose = arm.lock_chain()?.forward_kinematics()?;
        Ok(pose)
    }

    /// End effector pose of the named arm, the zero pose if there is no such arm.
    pub fn current_position_of(&self, name: &str) -> Result<Pose, PlannerError> {
        match self.arm(name)? {
            Some(arm) => {
                let pose = arm.lock_chain()?.forward_kinematics()?;
                Ok(pose)
            }
            None => {
                info!("No arm named {}, reporting the zero pose", name);
                Ok(Pose::default())
            }
        }
    }

    /// Link end points of the active arm, `(n + 1) x 3` with the base origin first.
    pub fn joint_position_map(&self) -> Result<DMatrix<f64>, PlannerError> {
        let arm = self.active_arm()?;
        let map = arm.lock_chain()?.position_map();
        Ok(map)
    }

    pub fn joint_position_map_of(&self, name: &str) -> Result<DMatrix<f64>, PlannerError> {
        let arm = self.select_and_get(name)?;
        let map = arm.lock_chain()?.position_map();
        Ok(map)
    }

    /// Joint angles of the active arm in degrees, wrapped into `[0, 360)`.
    pub fn joint_angle_map(&self) -> Result<HashMap<String, f64>, PlannerError> {
        let arm = self.active_arm()?;
        let map = arm.lock_chain()?.angle_map_deg();
        Ok(map)
    }

    // ---- MOTION ----

    /// Move the active arm's end effector to the target.
    ///
    /// Returns `true` if the target was reached, in which case telemetry has been published.
    /// Failing to reach the target is not an error.
    pub fn move_to(&self, target: &Pose) -> Result<bool, PlannerError> {
        let arm = self.active_arm()?;
        self.move_arm(&arm, target)
    }

    /// Select the named arm then move it to the target.
    pub fn move_arm_to(&self, name: &str, target: &Pose) -> Result<bool, PlannerError> {
        let arm = self.select_and_get(name)?;
        self.move_arm(&arm, target)
    }

    /// Move to the first of a list of points, if there is one.
    pub fn on_points(&self, points: &[Pose]) -> Result<Option<bool>, PlannerError> {
        match points.first() {
            Some(p) => self.move_to(p).map(Some),
            None => Ok(None),
        }
    }

    fn move_arm(&self, arm: &ArmHandle, target: &Pose) -> Result<bool, PlannerError> {
        let goal = self.rotate_and_translate(target)?;
        let strategy = self.strategy()?;

        let _solving = arm.begin_solve()?;

        debug!(
            "Moving arm {} to {} with the {:?} strategy",
            arm.name(),
            goal,
            strategy.kind()
        );

        let success = match strategy {
            Strategy::Gradient(ref p) => self.solve_gradient(arm, &goal, p)?,
            Strategy::Genetic(ref p) => self.solve_genetic(arm, &goal, p)?,
        };

        if success {
            self.publish_arm_telemetry(arm)?;
        } else {
            info!("Arm {} did not reach {}", arm.name(), goal);
        }

        Ok(success)
    }

    fn solve_gradient(
        &self,
        arm: &ArmHandle,
        goal: &Pose,
        params: &GradientParams,
    ) -> Result<bool, PlannerError> {
        let mut chain = arm.snapshot()?;
        let success = gradient::solve(&mut chain, goal, params);
        arm.commit(chain.clone())?;

        if success {
            self.pacer
                .dispatch(&chain, &arm.actuators()?, Duration::ZERO)?;
        }

        Ok(success)
    }

    /// Return every joint of the active arm to its neutral position.
    pub fn center_all_joints(&self) -> Result<(), PlannerError> {
        let arm = self.active_arm()?;
        self.center_arm(&arm)
    }

    pub fn center_all_joints_of(&self, name: &str) -> Result<(), PlannerError> {
        let arm = self.select_and_get(name)?;
        self.center_arm(&arm)
    }

    fn center_arm(&self, arm: &ArmHandle) -> Result<(), PlannerError> {
        let _solving = arm.begin_solve()?;

        let chain = {
            let mut chain = arm.lock_chain()?;
            chain.center_all_joints();
            chain.clone()
        };

        self.pacer
            .dispatch(&chain, &arm.actuators()?, Duration::ZERO)?;
        self.publish_arm_telemetry(arm)
    }

    /// Interrupt any wait on actuators, stopping the solve it belongs to.
    pub fn interrupt_actuation(&self) {
        warn!("Interrupting actuation");
        self.pacer.interrupt();
    }

    /// Allow actuation again after an interrupt.
    pub fn resume_actuation(&self) {
        self.pacer.reset();
    }

    /// Report of the last genetic solve, if there was one.
    pub fn last_report(&self) -> Result<Option<SolveReport>, PlannerError> {
        Ok(self.last_report.read()?.clone())
    }

    // ---- TELEMETRY ----

    /// Publish the active arm's joint angles and positions.
    pub fn publish_telemetry(&self) -> Result<(), PlannerError> {
        let arm = self.active_arm()?;
        self.publish_arm_telemetry(&arm)
    }

    fn publish_arm_telemetry(&self, arm: &ArmHandle) -> Result<(), PlannerError> {
        let (angles_deg, positions_mm) = {
            let chain = arm.lock_chain()?;
            (chain.angle_map_deg(), chain.position_map())
        };

        self.telemetry.publish(Telemetry::JointAngles {
            arm: arm.name().to_string(),
            angles_deg,
        });
        self.telemetry.publish(Telemetry::JointPositions {
            arm: arm.name().to_string(),
            positions_mm,
        });

        Ok(())
    }

    pub(crate) fn publish(&self, tm: Telemetry) {
        self.telemetry.publish(tm);
    }

    // ---- INPUT TRANSFORM ----

    /// Set the transform applied to every target, translation in millimeters and angles in
    /// degrees.
    pub fn set_input_transform(
        &self,
        dx: f64,
        dy: f64,
        dz: f64,
        roll: f64,
        pitch: f64,
        yaw: f64,
    ) -> Result<(), PlannerError> {
        *self.input_transform.write()? = Some(Transform::input(dx, dy, dz, roll, pitch, yaw));
        Ok(())
    }

    pub fn clear_input_transform(&self) -> Result<(), PlannerError> {
        *self.input_transform.write()? = None;
        Ok(())
    }

    /// Apply the input transform, if any, to a target.
    ///
    /// The orientation of a transformed target is zeroed.
    pub fn rotate_and_translate(&self, target: &Pose) -> Result<Pose, PlannerError> {
        Ok(match *self.input_transform.read()? {
            Some(ref t) => t.transform_pose(target),
            None => *target,
        })
    }

    // ---- COLLISION WORLD ----

    /// Register a capsule obstacle, replacing any obstacle of the same name.
    pub fn add_obstacle(
        &self,
        name: &str,
        origin: Vector3<f64>,
        end: Vector3<f64>,
        radius_mm: f64,
    ) -> Result<(), PlannerError> {
        self.world
            .write()?
            .add_obstacle(CollisionItem::new(name, origin, end, radius_mm));
        Ok(())
    }

    /// Register a sphere obstacle at the origin.
    pub fn add_named_obstacle(&self, name: &str, radius_mm: f64) -> Result<(), PlannerError> {
        self.world
            .write()?
            .add_obstacle(CollisionItem::sphere_at_origin(name, radius_mm));
        Ok(())
    }

    pub fn clear_obstacles(&self) -> Result<(), PlannerError> {
        self.world.write()?.clear_obstacles();
        Ok(())
    }

    pub fn add_ignore_pair(&self, a: &str, b: &str) -> Result<(), PlannerError> {
        self.world.write()?.add_ignore_pair(a, b);
        Ok(())
    }

    /// Copy of the collision world.
    pub fn world(&self) -> Result<CollisionWorld, PlannerError> {
        Ok(self.world.read()?.clone())
    }

    // ---- CONFIGURATION ----

    pub fn params(&self) -> Result<PlannerParams, PlannerError> {
        Ok(self.params.read()?.clone())
    }

    pub fn strategy(&self) -> Result<Strategy, PlannerError> {
        Ok(Strategy::from_params(&*self.params.read()?))
    }

    pub fn set_strategy(&self, strategy: StrategyKind) -> Result<(), PlannerError> {
        self.params.write()?.strategy = strategy;
        Ok(())
    }

    pub fn set_pool_size(&self, size: usize) -> Result<(), PlannerError> {
        self.params.write()?.genetic.pool_size = size;
        Ok(())
    }

    pub fn set_mutation_rate(&self, rate: f64) -> Result<(), PlannerError> {
        self.params.write()?.genetic.mutation_rate = rate;
        Ok(())
    }

    pub fn set_recombination_rate(&self, rate: f64) -> Result<(), PlannerError> {
        self.params.write()?.genetic.recombination_rate = rate;
        Ok(())
    }

    pub fn set_generations(&self, generations: usize) -> Result<(), PlannerError> {
        self.params.write()?.genetic.generations = generations;
        Ok(())
    }

    pub fn set_compute_simulation(&self, enabled: bool) -> Result<(), PlannerError> {
        self.params.write()?.genetic.simulate = enabled;
        Ok(())
    }
}

impl From<ChainError> for PlannerError {
    fn from(e: ChainError) -> Self {
        match e {
            ChainError::Poisoned => PlannerError::PoisonError,
            e => PlannerError::ChainError(e),
        }
    }
}

impl From<SchedError> for PlannerError {
    fn from(e: SchedError) -> Self {
        PlannerError::SchedError(e)
    }
}

impl<G> From<PoisonError<G>> for PlannerError {
    fn from(_: PoisonError<G>) -> Self {
        PlannerError::PoisonError
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::chain::test::planar_chain;
    use crate::servo_sim::SimServo;
    use std::sync::mpsc::Receiver;

    fn genetic_params() -> PlannerParams {
        let mut params = PlannerParams::default();
        params.strategy = StrategyKind::Genetic;
        params.genetic.pool_size = 60;
        params.genetic.generations = 40;
        params.genetic.seed = Some(7);
        params
    }

    /// Planner with the planar arm, one simulated servo per joint.
    fn setup(params: PlannerParams) -> (Planner, Receiver<Telemetry>, Vec<Arc<SimServo>>) {
        let (sink, rx) = ChannelSink::new();
        let planner = Planner::new(params, Arc::new(sink));
        planner.add_chain("planar", planar_chain()).unwrap();

        let servos: Vec<Arc<SimServo>> = ["shoulder", "elbow", "wrist"]
            .iter()
            .map(|n| Arc::new(SimServo::new(n, 100.0, (-180.0, 180.0))))
            .collect();
        for s in servos.iter() {
            planner.bind_actuator(s.clone()).unwrap();
        }

        // The folded arm may touch itself, which is not what these tests are about
        planner.add_ignore_pair("shoulder", "wrist").unwrap();

        (planner, rx, servos)
    }

    fn reachable_goal() -> Pose {
        let mut chain = planar_chain();
        chain.set_positions_deg(&[30.0, 60.0, 90.0]).unwrap();
        chain.forward_kinematics().unwrap()
    }

    #[test]
    fn test_genetic_already_at_goal() {
        let (planner, rx, servos) = setup(genetic_params());

        let current = planner.current_position().unwrap();
        assert!(planner.move_to(&current).unwrap());

        // No commands, but telemetry still goes out
        assert!(servos.iter().all(|s| s.commands().is_empty()));
        assert!(matches!(rx.try_recv(), Ok(Telemetry::JointAngles { .. })));
        assert!(matches!(rx.try_recv(), Ok(Telemetry::JointPositions { .. })));

        let report = planner.last_report().unwrap().unwrap();
        assert_eq!(report.outcome, SolveOutcome::AlreadyAtGoal);
        assert!(report.attempts.is_empty());
    }

    #[test]
    fn test_genetic_moves_towards_goal() {
        let (planner, rx, servos) = setup(genetic_params());

        let goal = reachable_goal();
        let start_distance = planner.current_position().unwrap().distance_to(&goal);

        assert!(planner.move_to(&goal).unwrap());

        let end_distance = planner.current_position().unwrap().distance_to(&goal);
        assert!(end_distance < start_distance);

        let report = planner.last_report().unwrap().unwrap();
        assert_eq!(report.outcome, SolveOutcome::Reached);
        assert_eq!(report.attempts.len(), 1);
        assert_eq!(report.attempts[0].source, CandidateSource::Search);
        assert_eq!(report.attempts[0].commands, 3);

        // Every servo was commanded to the committed position
        let positions = planner.active_arm().unwrap().snapshot().unwrap().positions_deg();
        for (servo, pos) in servos.iter().zip(positions.iter()) {
            let cmds = servo.commands();
            assert_eq!(cmds.len(), 1);
            assert!((cmds[0].1 - pos).abs() < 1e-9);
        }

        assert!(matches!(rx.try_recv(), Ok(Telemetry::JointAngles { .. })));
    }

    #[test]
    fn test_genetic_unresolvable_collision() {
        let (planner, rx, _servos) = setup(genetic_params());

        // Two obstacles touching each other, far from the arm
        planner
            .add_obstacle(
                "table",
                Vector3::new(1000.0, 1000.0, -500.0),
                Vector3::new(1200.0, 1000.0, -500.0),
                50.0,
            )
            .unwrap();
        planner
            .add_obstacle(
                "post",
                Vector3::new(1100.0, 1000.0, -600.0),
                Vector3::new(1100.0, 1000.0, -400.0),
                10.0,
            )
            .unwrap();

        assert!(!planner.move_to(&reachable_goal()).unwrap());
        assert!(rx.try_recv().is_err());

        let report = planner.last_report().unwrap().unwrap();
        assert_eq!(
            report.outcome,
            SolveOutcome::Unresolvable {
                item_a: "table".into(),
                item_b: "post".into()
            }
        );

        // The motion stopped before its first step
        assert_eq!(report.final_positions_deg, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_genetic_no_attempts() {
        let mut params = genetic_params();
        params.genetic.retry_cap = 0;
        let (planner, _rx, servos) = setup(params);

        assert!(!planner.move_to(&reachable_goal()).unwrap());
        assert!(servos.iter().all(|s| s.commands().is_empty()));
        assert_eq!(
            planner.last_report().unwrap().unwrap().outcome,
            SolveOutcome::Exhausted
        );
    }

    /// Planar arm without actuators, each joint limited to the given range.
    fn limited_planner(params: PlannerParams, ranges_deg: &[(f64, f64)]) -> Planner {
        let mut chain = KinematicChain::new();
        for (name, range) in ["shoulder", "elbow", "wrist"].iter().zip(ranges_deg.iter()) {
            chain
                .add_joint(
                    Joint::new(name, 0.0, 0.0, 100.0, 0.0)
                        .with_limits_deg(range.0, range.1)
                        .with_velocity_limit_degs(100.0),
                )
                .unwrap();
        }

        let planner = Planner::new(params, Arc::new(LogSink));
        planner.add_chain("limited", chain).unwrap();
        planner.add_ignore_pair("shoulder", "wrist").unwrap();
        planner
    }

    /// Planner whose arm can only swing its shoulder, with a wall along the 25 degree ray.
    fn walled_planner(params: PlannerParams) -> (Planner, Receiver<Telemetry>) {
        let (sink, rx) = ChannelSink::new();
        let planner = Planner::new(params, Arc::new(sink));

        let mut chain = KinematicChain::new();
        for (name, range) in [("shoulder", 180.0), ("elbow", 0.0), ("wrist", 0.0)].iter() {
            chain
                .add_joint(
                    Joint::new(name, 0.0, 0.0, 100.0, 0.0)
                        .with_limits_deg(-range, *range)
                        .with_velocity_limit_degs(100.0),
                )
                .unwrap();
        }
        planner.add_chain("walled", chain).unwrap();

        planner
            .add_obstacle(
                "wall",
                Vector3::new(45.3, 21.1, 0.0),
                Vector3::new(317.2, 147.9, 0.0),
                5.0,
            )
            .unwrap();

        (planner, rx)
    }

    /// `true` if the active arm's committed state is free of collisions.
    fn committed_state_is_free(planner: &Planner) -> bool {
        let chain = planner.active_arm().unwrap().snapshot().unwrap();
        let mut world = planner.world().unwrap();
        world.refresh_links(&chain, planner.params().unwrap().sim.link_radius_mm);
        world.evaluate().is_none()
    }

    #[test]
    fn test_genetic_stuck_in_collision() {
        let mut params = genetic_params();
        params.genetic.retry_cap = 2;

        // Joints which cannot move at all, with the elbow link through a post
        let planner = limited_planner(params, &[(0.0, 0.0); 3]);
        planner
            .add_obstacle(
                "post",
                Vector3::new(150.0, -50.0, 0.0),
                Vector3::new(150.0, 50.0, 0.0),
                2.0,
            )
            .unwrap();

        assert!(!planner.move_to(&Pose::new(0.0, 300.0, 0.0)).unwrap());

        let report = planner.last_report().unwrap().unwrap();
        assert_eq!(report.outcome, SolveOutcome::Exhausted);
        assert_eq!(report.attempts.len(), 4);
        for attempt in report.attempts.iter() {
            let collision = attempt.collision.as_ref().unwrap();
            assert!(collision.involves("elbow") && collision.involves("post"));
        }
        assert_eq!(report.attempts[1].source, CandidateSource::Repair);
        assert_eq!(report.final_positions_deg, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_genetic_repairs_and_exhausts_against_wall() {
        let mut params = genetic_params();
        params.genetic.retry_cap = 2;
        let (planner, rx) = walled_planner(params);

        // The goal lies beyond the wall, every good candidate swings through it
        assert!(!planner.move_to(&Pose::new(0.0, 300.0, 0.0)).unwrap());
        assert!(rx.try_recv().is_err());

        let report = planner.last_report().unwrap().unwrap();
        assert_eq!(report.outcome, SolveOutcome::Exhausted);

        let sources: Vec<CandidateSource> = report.attempts.iter().map(|a| a.source).collect();
        assert_eq!(
            sources,
            vec![
                CandidateSource::Search,
                CandidateSource::Repair,
                CandidateSource::Search,
                CandidateSource::Repair
            ]
        );
        assert!(report.attempts[0].collision.as_ref().unwrap().involves("wall"));
        assert!(report.attempts[0].fitness.is_some());
        assert!(report.attempts[1].fitness.is_none());

        // Only collision free states were committed, on the near side of the wall
        assert!(committed_state_is_free(&planner));
        assert!(report.final_positions_deg[0] < 25.0);
    }

    #[test]
    fn test_genetic_simulated_search_against_wall() {
        let mut params = genetic_params();
        params.genetic.retry_cap = 2;
        params.genetic.simulate = true;
        let (planner, rx) = walled_planner(params);

        let success = planner.move_to(&Pose::new(0.0, 300.0, 0.0)).unwrap();

        let report = planner.last_report().unwrap().unwrap();
        assert_eq!(success, report.outcome.is_success());
        assert_eq!(success, rx.try_recv().is_ok());
        assert!(!report.attempts.is_empty());
        assert_eq!(report.attempts[0].source, CandidateSource::Search);

        assert!(committed_state_is_free(&planner));
        assert!(report.final_positions_deg[0] < 25.0);
    }

    #[test]
    fn test_genetic_empty_chain() {
        let planner = Planner::new(genetic_params(), Arc::new(LogSink));
        planner.add_chain("empty", KinematicChain::new()).unwrap();

        assert!(matches!(
            planner.move_to(&Pose::new(1.0, 0.0, 0.0)),
            Err(PlannerError::ChainError(ChainError::InvalidState))
        ));
    }

    #[test]
    fn test_gradient_move() {
        let (planner, rx, servos) = setup(PlannerParams::default());

        let goal = Pose::new(150.0, 150.0, 0.0);
        assert!(planner.move_to(&goal).unwrap());
        assert!(planner.current_position().unwrap().distance_to(&goal) <= 2.0);
        assert!(servos.iter().all(|s| s.commands().len() == 1));
        assert!(matches!(rx.try_recv(), Ok(Telemetry::JointAngles { .. })));
    }

    #[test]
    fn test_interrupted_actuation() {
        let (planner, _rx, _servos) = setup(PlannerParams::default());

        planner.interrupt_actuation();
        assert!(matches!(
            planner.move_to(&Pose::new(150.0, 150.0, 0.0)),
            Err(PlannerError::SchedError(SchedError::Interrupted(_)))
        ));

        planner.resume_actuation();
        assert!(planner.move_to(&Pose::new(150.0, 150.0, 0.0)).unwrap());
    }

    #[test]
    fn test_no_active_arm() {
        let planner = Planner::new(PlannerParams::default(), Arc::new(LogSink));
        assert!(matches!(
            planner.current_position(),
            Err(PlannerError::NoActiveChain)
        ));
        assert!(matches!(planner.on_points(&[]), Ok(None)));
    }

    #[test]
    fn test_select_and_query_arms() {
        let (planner, _rx, _servos) = setup(PlannerParams::default());
        planner.add_chain("other", KinematicChain::new()).unwrap();

        // Unknown names keep the active arm
        assert!(!planner.select_chain("missing").unwrap());
        assert_eq!(planner.active_arm().unwrap().name(), "other");

        assert_eq!(
            planner.current_position_of("missing").unwrap(),
            Pose::default()
        );

        let map = planner.joint_position_map_of("planar").unwrap();
        assert_eq!(planner.active_arm().unwrap().name(), "planar");
        assert_eq!(map.nrows(), 4);
        assert!((map[(3, 0)] - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_input_transform() {
        let planner = Planner::new(PlannerParams::default(), Arc::new(LogSink));

        planner
            .set_input_transform(100.0, 0.0, 0.0, 0.0, 0.0, 0.0)
            .unwrap();
        let p = planner
            .rotate_and_translate(&Pose::with_orientation(1.0, 2.0, 3.0, 10.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(p, Pose::new(101.0, 2.0, 3.0));

        planner.clear_input_transform().unwrap();
        let p = planner.rotate_and_translate(&Pose::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(p, Pose::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_joint_with_actuator_and_events() {
        let planner = Planner::new(PlannerParams::default(), Arc::new(LogSink));
        planner.add_chain("servo_arm", KinematicChain::new()).unwrap();

        let servo = Arc::new(SimServo::new("bicep_servo", 45.0, (180.0, 0.0)).with_angle_deg(45.0));
        planner
            .add_joint_with_actuator("bicep", 0.0, 0.0, 100.0, 0.0, servo)
            .unwrap();

        let chain = planner.active_arm().unwrap().snapshot().unwrap();
        let joint = chain.joint(0);
        let (min, max) = joint.range_deg();
        assert!(min.abs() < 1e-9 && (max - 180.0).abs() < 1e-9);
        assert!((joint.position_deg() - 45.0).abs() < 1e-9);
        assert_eq!(joint.velocity_limit_degs(), 45.0);
        assert_eq!(joint.actuator(), Some("bicep_servo"));

        planner.on_actuator_event("bicep_servo", 90.0).unwrap();
        let angles = planner.joint_angle_map().unwrap();
        assert!((angles["bicep"] - 90.0).abs() < 1e-9);

        // Unknown actuators are ignored
        planner.on_actuator_event("nothing", 10.0).unwrap();
    }

    #[test]
    fn test_center_all_joints() {
        let (planner, rx, servos) = setup(PlannerParams::default());
        planner
            .active_arm()
            .unwrap()
            .lock_chain()
            .unwrap()
            .set_positions_deg(&[10.0, 20.0, 30.0])
            .unwrap();

        planner.center_all_joints().unwrap();

        assert_eq!(
            planner.active_arm().unwrap().snapshot().unwrap().positions_deg(),
            vec![0.0, 0.0, 0.0]
        );
        assert!(servos.iter().all(|s| s.commands().len() == 1));
        assert!(matches!(rx.try_recv(), Ok(Telemetry::JointAngles { .. })));
    }

    #[test]
    fn test_configuration_setters() {
        let planner = Planner::new(PlannerParams::default(), Arc::new(LogSink));

        planner.set_strategy(StrategyKind::Genetic).unwrap();
        planner.set_pool_size(10).unwrap();
        planner.set_mutation_rate(0.2).unwrap();
        planner.set_recombination_rate(0.5).unwrap();
        planner.set_generations(5).unwrap();
        planner.set_compute_simulation(true).unwrap();

        match planner.strategy().unwrap() {
            Strategy::Genetic(p) => {
                assert_eq!(p.pool_size, 10);
                assert_eq!(p.mutation_rate, 0.2);
                assert_eq!(p.recombination_rate, 0.5);
                assert_eq!(p.generations, 5);
                assert!(p.simulate);
            }
            s => panic!("Unexpected strategy {:?}", s.kind()),
        }
    }
}
