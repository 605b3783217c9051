//! # Arm Executable
//!
//! Runs a telecommand script against the arm planner, with every joint driven by a simulated
//! servo. Arms, obstacles and solver tuning are loaded from `arm_exec.toml`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Telecommand processing.
mod tc_processor;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info};
use std::{env, sync::Arc, thread, time::Duration};

// Internal
use arm_lib::{
    params::ArmExecParams,
    planner::{LogSink, Planner},
    servo_sim::SimServo,
    tracking::TrackingLoop,
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Period at which the script is polled for pending telecommands.
const CYCLE_PERIOD: Duration = Duration::from_millis(10);

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("arm_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Arm Planning Executable\n");
    info!(
        "Software root: {:?}",
        host::get_sw_root().wrap_err("Failed to get the software root")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: ArmExecParams =
        util::params::load("arm_exec.toml").wrap_err("Could not load arm_exec params")?;

    info!("Parameters loaded");

    // ---- INITIALISE TC SOURCE ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    if args.len() != 2 {
        return Err(eyre!(
            "Expected the path to a script as the only argument, found {} arguments",
            args.len() - 1
        ));
    }

    info!("Loading script from \"{}\"", &args[1]);

    let mut si = ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} TCs\n",
        si.get_duration(),
        si.get_num_tcs()
    );

    // ---- INITIALISE PLANNER ----

    let planner = Arc::new(Planner::new(params.planner.clone(), Arc::new(LogSink)));

    params
        .apply(&planner)
        .wrap_err("Failed to set up the planner")?;

    bind_sim_servos(&planner, &params).wrap_err("Failed to bind the simulated servos")?;

    let tracking = TrackingLoop::new(planner.clone(), params.tracking.clone());

    info!("Planner initialised with {} arms", params.arms.len());

    // ---- MAIN LOOP ----

    loop {
        match si.get_pending_tcs() {
            PendingTcs::None => (),
            PendingTcs::Some(tc_vec) => {
                for tc in tc_vec.iter() {
                    tc_processor::exec(&planner, &tracking, tc);
                }
            }
            // Exit if end of script reached
            PendingTcs::EndOfScript => {
                info!("End of TC script reached, stopping");
                break;
            }
        }

        thread::sleep(CYCLE_PERIOD);
    }

    // ---- SHUTDOWN ----

    tracking.stop().wrap_err("Failed to stop tracking")?;

    info!("End of execution");

    session.exit();

    Ok(())
}

/// Bind a simulated servo to every joint of every arm.
///
/// Servos start at the joint's position and share its velocity limit and range. The last arm in
/// the parameters is left active.
fn bind_sim_servos(planner: &Planner, params: &ArmExecParams) -> Result<(), Report> {
    for arm_params in params.arms.iter() {
        let arm = planner
            .arm(&arm_params.name)?
            .ok_or_else(|| eyre!("Arm {} was not registered", arm_params.name))?;

        let chain = arm.snapshot()?;

        for joint in chain.joints() {
            let name = joint.actuator().unwrap_or_else(|| joint.name());
            let servo = SimServo::new(name, joint.velocity_limit_degs(), joint.range_deg())
                .with_angle_deg(joint.position_deg());

            arm.bind_actuator(Arc::new(servo))?;
        }

        debug!("Bound {} simulated servos to {}", chain.len(), arm.name());
    }

    Ok(())
}
