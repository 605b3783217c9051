//! Local collision repair
//!
//! A heuristic nudge of every joint away from a detected contact. It gives no guarantee of
//! leaving the collision, the planner simply retries with the repaired state.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;

use crate::chain::KinematicChain;
use crate::collision::Collision;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Outcome of attempting a repair.
#[derive(Debug, Clone, PartialEq)]
pub enum Repair {
    /// New joint positions (relative degrees) to try.
    Candidate(Vec<f64>),

    /// Neither side of the collision belongs to the chain.
    Unresolvable,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute repaired joint positions moving the chain away from the collision.
///
/// The controllable side is the first joint, in chain order, named in the collision. One
/// signed angle step is built by adding `step_deg` for every axis on which that joint's contact
/// point is at or beyond the other contact point, and subtracting it otherwise. The step is then
/// tried on every joint in turn: if it doesn't take the controllable joint further from the
/// other contact point it is undone and overcorrected, i.e. the joint is rotated by minus twice
/// the step.
pub fn repair(chain: &KinematicChain, collision: &Collision, step_deg: f64) -> Repair {
    let index = match chain
        .joints()
        .iter()
        .position(|j| collision.involves(j.name()))
    {
        Some(i) => i,
        None => return Repair::Unresolvable,
    };

    let (own, other) = match collision.sides(chain.joint(index).name()) {
        Some(s) => s,
        None => return Repair::Unresolvable,
    };

    let delta_deg: f64 = (0..3)
        .map(|axis| {
            if own[axis] >= other[axis] {
                step_deg
            } else {
                -step_deg
            }
        })
        .sum();

    debug!(
        "Repairing collision of {} with a {:+.1} deg step",
        chain.joint(index).name(),
        delta_deg
    );

    let mut work = chain.clone();
    let mut positions = Vec::with_capacity(work.len());

    for i in 0..work.len() {
        let before = (work.joint_position(index) - other).norm();

        work.apply_angle_delta(i, delta_deg.to_radians());

        let after = (work.joint_position(index) - other).norm();

        if after <= before {
            work.apply_angle_delta(i, (-2.0 * delta_deg).to_radians());
        }

        positions.push(work.joint(i).position_deg());
    }

    Repair::Candidate(positions)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::chain::Joint;
    use nalgebra::Vector3;

    fn collision(a: &str, b: &str, pa: [f64; 3], pb: [f64; 3]) -> Collision {
        Collision {
            item_a: a.into(),
            item_b: b.into(),
            point_a: Vector3::from(pa),
            point_b: Vector3::from(pb),
        }
    }

    fn single_link() -> KinematicChain {
        let mut chain = KinematicChain::new();
        chain
            .add_joint(Joint::new("j", 0.0, 0.0, 100.0, 0.0).with_limits_deg(-90.0, 90.0))
            .unwrap();
        chain
    }

    #[test]
    fn test_step_towards_contact_is_overcorrected() {
        // Obstacle just above the tip. The summed step is +5 degrees which lifts the tip towards
        // the obstacle, so the joint ends at -5 degrees instead.
        let chain = single_link();
        let c = collision("post", "j", [100.0, 10.0, 0.0], [100.0, 0.0, 0.0]);

        match repair(&chain, &c, 5.0) {
            Repair::Candidate(p) => {
                assert_eq!(p.len(), 1);
                assert!((p[0] + 5.0).abs() < 1e-9);
            }
            r => panic!("Unexpected repair {:?}", r),
        }
    }

    #[test]
    fn test_step_away_from_contact_is_kept() {
        // Obstacle below the tip, the summed step is +15 degrees and moves away from it
        let chain = single_link();
        let c = collision("j", "post", [100.0, 0.0, 0.0], [100.0, -10.0, 0.0]);

        match repair(&chain, &c, 5.0) {
            Repair::Candidate(p) => assert!((p[0] - 15.0).abs() < 1e-9),
            r => panic!("Unexpected repair {:?}", r),
        }
    }

    #[test]
    fn test_repair_respects_limits() {
        let mut chain = KinematicChain::new();
        chain
            .add_joint(
                Joint::new("j", 0.0, 0.0, 100.0, 0.0)
                    .with_limits_deg(-2.0, 2.0)
                    .with_position_deg(1.0),
            )
            .unwrap();
        let c = collision("j", "post", [100.0, 0.0, 0.0], [100.0, -10.0, 0.0]);

        match repair(&chain, &c, 5.0) {
            Repair::Candidate(p) => assert!((p[0] - 2.0).abs() < 1e-9),
            r => panic!("Unexpected repair {:?}", r),
        }
    }

    #[test]
    fn test_external_collision_unresolvable() {
        let chain = single_link();
        let c = collision("table", "post", [0.0; 3], [1.0, 0.0, 0.0]);
        assert_eq!(repair(&chain, &c, 5.0), Repair::Unresolvable);
    }
}
