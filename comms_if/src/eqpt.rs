//! # Equipment Interface
//!
//! This module defines the contracts which equipment driven by the planner has to meet.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod servo;
