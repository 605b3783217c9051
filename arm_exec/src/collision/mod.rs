//! # Collision world
//!
//! Links of the arm and external obstacles are all modelled as capsules, i.e. a line segment
//! swept by a radius. Two capsules collide when the shortest distance between their segments is
//! less than the sum of their radii.
//!
//! The world is rebuilt from the chain on every simulation step and holds no history between
//! evaluations.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod item;
mod segment;
mod world;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use item::*;
pub use segment::closest_points;
pub use world::*;
