//! # Arm library.
//!
//! Motion planning for serial robot arms: kinematic chains, a capsule collision world, genetic
//! and gradient inverse kinematics, motion simulation and paced actuation.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Actuator scheduling - paces commands to the actuators and repairs colliding states
pub mod act_sched;

/// Kinematic chains - DH joints, forward kinematics and the registry of arms
pub mod chain;

/// Collision world - capsule links and obstacles
pub mod collision;

/// Genetic search - the generic algorithm and the arm fitness model
pub mod gen_search;

/// Geometry primitives
pub mod geom;

/// Gradient strategy - pseudo-inverse Jacobian descent
pub mod gradient;

/// Motion simulator - time-stepped motion with collision checks
pub mod motion_sim;

/// Executable parameters
pub mod params;

/// Planner session - carries out move requests
pub mod planner;

/// Simulated servos
pub mod servo_sim;

/// Velocity tracking loop
pub mod tracking;
