//! # Telecommand processor module
//!
//! Executes telecommands against the planner and the tracking loop.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use log::{debug, info, warn};
use nalgebra::Vector3;

// Internal
use arm_lib::{geom::Pose, planner::Planner, tracking::TrackingLoop};
use comms_if::tc::{ik::IkCmd, Tc};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Failures are logged, a bad telecommand never stops the executable.
pub(crate) fn exec(planner: &Planner, tracking: &TrackingLoop, tc: &Tc) {
    let result = match tc {
        Tc::Ik(cmd) => exec_ik(planner, tracking, cmd),
        Tc::ServoEvent(e) => planner
            .on_actuator_event(&e.name, e.pos_deg)
            .wrap_err("Could not handle the servo event"),
    };

    if let Err(e) = result {
        warn!("Telecommand {:?} failed: {:?}", tc, e);
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn exec_ik(planner: &Planner, tracking: &TrackingLoop, cmd: &IkCmd) -> Result<()> {
    debug!("Executing {:?}", cmd);

    match cmd {
        IkCmd::MoveTo {
            x,
            y,
            z,
            roll,
            pitch,
            yaw,
        } => {
            let target = Pose::with_orientation(*x, *y, *z, *roll, *pitch, *yaw);
            let reached = planner.move_to(&target).wrap_err("Move failed")?;
            info!("Move to {} done, reached: {}", target, reached);
        }
        IkCmd::MoveArmTo { arm, x, y, z } => {
            let target = Pose::new(*x, *y, *z);
            let reached = planner
                .move_arm_to(arm, &target)
                .wrap_err("Move failed")?;
            info!("Move of {} to {} done, reached: {}", arm, target, reached);
        }
        IkCmd::SelectArm { arm } => {
            planner.select_chain(arm)?;
        }
        IkCmd::CenterAllJoints { arm } => match arm {
            Some(a) => planner.center_all_joints_of(a)?,
            None => planner.center_all_joints()?,
        },
        IkCmd::AddObstacle {
            name,
            origin,
            end,
            radius,
        } => planner.add_obstacle(name, Vector3::from(*origin), Vector3::from(*end), *radius)?,
        IkCmd::ClearObstacles => planner.clear_obstacles()?,
        IkCmd::IgnorePair { a, b } => planner.add_ignore_pair(a, b)?,
        IkCmd::SetStrategy { strategy } => planner.set_strategy(*strategy)?,
        IkCmd::SetPoolSize { size } => planner.set_pool_size(*size)?,
        IkCmd::SetMutationRate { rate } => planner.set_mutation_rate(*rate)?,
        IkCmd::SetRecombinationRate { rate } => planner.set_recombination_rate(*rate)?,
        IkCmd::SetGenerations { generations } => planner.set_generations(*generations)?,
        IkCmd::SetComputeSimulation { enabled } => planner.set_compute_simulation(*enabled)?,
        IkCmd::SetInputTransform {
            dx,
            dy,
            dz,
            roll,
            pitch,
            yaw,
        } => planner.set_input_transform(*dx, *dy, *dz, *roll, *pitch, *yaw)?,
        IkCmd::ClearInputTransform => planner.clear_input_transform()?,
        IkCmd::StartTracking => {
            tracking.start()?;
        }
        IkCmd::StopTracking => tracking.stop()?,
        IkCmd::Input { id, value } => tracking.on_input(id, *value)?,
        IkCmd::PublishTelemetry => planner.publish_telemetry()?,
    }

    Ok(())
}
