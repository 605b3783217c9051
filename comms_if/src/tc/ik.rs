//! # Inverse kinematics telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Strategy used to solve for the joint angles reaching a target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StrategyKind {
    /// Pseudo-inverse Jacobian gradient descent
    Gradient,

    /// Genetic search with simulated, collision-aware commits
    Genetic,
}

/// A command to the inverse kinematics planner.
///
/// Serialised adjacently tagged, i.e. `{"type": "MoveTo", "payload": {...}}`. Commands without
/// data need no payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum IkCmd {
    /// Move the end effector of the active arm to the given position.
    ///
    /// Positions share the length unit of the DH parameters (mm), angles are degrees.
    MoveTo {
        x: f64,
        y: f64,
        z: f64,
        #[serde(default)]
        roll: f64,
        #[serde(default)]
        pitch: f64,
        #[serde(default)]
        yaw: f64,
    },

    /// Select an arm and move it to the given position.
    MoveArmTo { arm: String, x: f64, y: f64, z: f64 },

    /// Make the named arm the active one.
    SelectArm { arm: String },

    /// Return every joint of an arm (the active one if not given) to its neutral position.
    CenterAllJoints {
        #[serde(default)]
        arm: Option<String>,
    },

    /// Register a static capsule obstacle.
    AddObstacle {
        name: String,
        origin: [f64; 3],
        end: [f64; 3],
        radius: f64,
    },

    /// Remove all static obstacles.
    ClearObstacles,

    /// Allow two named collision items to intersect.
    IgnorePair { a: String, b: String },

    SetStrategy { strategy: StrategyKind },

    SetPoolSize { size: usize },

    SetMutationRate { rate: f64 },

    SetRecombinationRate { rate: f64 },

    SetGenerations { generations: usize },

    SetComputeSimulation { enabled: bool },

    /// Set the transform applied to every target before solving. Angles in degrees.
    SetInputTransform {
        dx: f64,
        dy: f64,
        dz: f64,
        roll: f64,
        pitch: f64,
        yaw: f64,
    },

    ClearInputTransform,

    StartTracking,

    StopTracking,

    /// A raw input device event, for example a joystick axis or button.
    Input { id: String, value: f32 },

    /// Publish the current joint angles and positions.
    PublishTelemetry,
}
