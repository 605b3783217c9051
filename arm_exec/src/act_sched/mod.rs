//! # Actuation scheduler
//!
//! Commands joint positions to actuators no sooner than each actuator is expected to have
//! settled from its previous move, and proposes local repairs when a committed state collides.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod pacing;
mod repair;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use pacing::*;
pub use repair::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised while actuating.
#[derive(Debug, thiserror::Error)]
pub enum SchedError {
    #[error("Waiting for actuator {0} to settle was interrupted")]
    Interrupted(String),
}
