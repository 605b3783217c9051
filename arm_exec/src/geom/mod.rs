//! # Geometry kernel
//!
//! Poses and homogeneous transforms used by the kinematic chain, the collision world and the
//! input transform.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod pose;
mod transform;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use pose::*;
pub use transform::*;
