//! # Arm Executable Parameters
//!
//! Everything the executable needs to set up a planner: solver tuning, the arms, the collision
//! world and the tracking loop.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::chain::ArmParams;
use crate::planner::{Planner, PlannerError, PlannerParams};
use crate::tracking::TrackingParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmExecParams {
    pub planner: PlannerParams,

    /// Arms to register, the last one is active
    pub arms: Vec<ArmParams>,

    pub obstacles: Vec<ObstacleParams>,

    /// Pairs of items allowed to intersect
    pub ignore: Vec<IgnoreParams>,

    pub input_transform: Option<InputTransformParams>,

    pub tracking: TrackingParams,
}

/// A static obstacle.
///
/// Without end points the obstacle is a sphere at the origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleParams {
    pub name: String,

    /// Units: millimeters
    pub origin: Option<[f64; 3]>,

    /// Units: millimeters
    pub end: Option<[f64; 3]>,

    /// Units: millimeters
    pub radius_mm: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnoreParams {
    pub a: String,
    pub b: String,
}

/// Transform applied to every target, translation in millimeters and angles in degrees.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputTransformParams {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl ArmExecParams {
    /// Register the arms, obstacles, ignore pairs and input transform with the planner.
    pub fn apply(&self, planner: &Planner) -> Result<(), PlannerError> {
        for arm in self.arms.iter() {
            planner.add_arm(arm)?;
        }

        for obstacle in self.obstacles.iter() {
            match (obstacle.origin, obstacle.end) {
                (Some(o), Some(e)) => planner.add_obstacle(
                    &obstacle.name,
                    Vector3::from(o),
                    Vector3::from(e),
                    obstacle.radius_mm,
                )?,
                (Some(o), None) => planner.add_obstacle(
                    &obstacle.name,
                    Vector3::from(o),
                    Vector3::from(o),
                    obstacle.radius_mm,
                )?,
                _ => planner.add_named_obstacle(&obstacle.name, obstacle.radius_mm)?,
            }
        }

        for pair in self.ignore.iter() {
            planner.add_ignore_pair(&pair.a, &pair.b)?;
        }

        if let Some(ref t) = self.input_transform {
            planner.set_input_transform(t.dx, t.dy, t.dz, t.roll, t.pitch, t.yaw)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::planner::LogSink;
    use comms_if::tc::ik::StrategyKind;
    use std::sync::Arc;

    const PARAMS: &str = r#"
        [planner]
        strategy = "Genetic"

        [planner.genetic]
        pool_size = 50

        [[arms]]
        name = "left"

        [[arms.joints]]
        name = "base"
        d_mm = 50.0
        theta_deg = 0.0
        r_mm = 0.0
        alpha_deg = 90.0

        [[arms.joints]]
        name = "upper"
        d_mm = 0.0
        theta_deg = 0.0
        r_mm = 150.0
        alpha_deg = 0.0
        min_deg = -90.0
        max_deg = 90.0
        actuator = "upper_servo"

        [[obstacles]]
        name = "table"
        origin = [0.0, 0.0, -20.0]
        end = [300.0, 0.0, -20.0]
        radius_mm = 10.0

        [[obstacles]]
        name = "ball"
        radius_mm = 5.0

        [[ignore]]
        a = "base"
        b = "table"

        [input_transform]
        dx = 10.0

        [tracking]
        period_ms = 100
    "#;

    #[test]
    fn test_parse_and_apply() {
        let params: ArmExecParams = util::params::from_str(PARAMS).unwrap();

        assert_eq!(params.planner.strategy, StrategyKind::Genetic);
        assert_eq!(params.planner.genetic.pool_size, 50);
        assert_eq!(params.planner.genetic.generations, 300);
        assert_eq!(params.tracking.period_ms, 100);
        assert_eq!(params.tracking.gain, 100.0);

        let planner = Planner::new(params.planner.clone(), Arc::new(LogSink));
        params.apply(&planner).unwrap();

        let arm = planner.active_arm().unwrap();
        assert_eq!(arm.name(), "left");
        assert_eq!(arm.snapshot().unwrap().len(), 2);

        let world = planner.world().unwrap();
        assert_eq!(world.obstacles().len(), 2);

        let p = planner
            .rotate_and_translate(&crate::geom::Pose::new(0.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(p.x(), 10.0);
    }

    #[test]
    fn test_empty_params() {
        let params: ArmExecParams = util::params::from_str("").unwrap();
        assert!(params.arms.is_empty());
        assert!(params.input_transform.is_none());
    }
}
