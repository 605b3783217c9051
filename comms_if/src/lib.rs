//! # Communications interface crate.
//!
//! Provides the interfaces between the arm planner and the things around it: the telecommands
//! which drive it and the contract its actuators must meet.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod tc;

/// Equipment interfaces (actuators)
pub mod eqpt;
