//! Main robot-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Telecommand processing and handling
//!         - Manoeuvre processing:
//!             - Pending cancellations
//!             - Sensor read, filtering, control and actuator demands
//!         - Routine sequencing
//!         - Claw control processing
//!         - Archiving
//!         - Simulation step
//!
//! # Modules
//!
//! All cyclic modules (e.g. `claw_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::{eyre, WrapErr}, Report};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::Instant;

// Internal
use robot_lib::{
    cycle::proc_cycle,
    data_store::DataStore,
    params::RobotExecParams,
    sim::{SimHandle, SimParams, SimWorld},
};
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("robot_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Info, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Robot Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: RobotExecParams = util::params::load("robot_exec.toml")
        .wrap_err("Could not load exec params")?;

    let sim_params: SimParams = util::params::load("sim.toml")
        .wrap_err("Could not load sim params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE TC SOURCE ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    if args.len() != 2 {
        return Err(eyre!(
            "Expected one argument (the path to a TC script), found {}",
            args.len() - 1
        ));
    }

    info!("Loading script from \"{}\"", &args[1]);

    // Load the script interpreter
    let mut si = ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

    // Display some info
    info!(
        "Loaded script lasts {:.02} s and contains {} TCs\n",
        si.get_duration(),
        si.get_num_tcs()
    );

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::new(
        exec_params.cycle_period_s,
        exec_params.overrun_warn_period_cycles,
    );

    // ---- INITIALISE MODULES ----

    ds.acq_params = util::params::load("acq.toml")
        .wrap_err("Could not load acquisition params")?;
    info!("Acquisition params loaded");

    ds.claw_ctrl.init("claw_ctrl.toml", &session)
        .wrap_err("Failed to initialise ClawCtrl")?;
    info!("ClawCtrl init complete");

    let mut arch_tick = if exec_params.archive_tick_reports {
        Archiver::from_path(&session, "tick_report.csv")
            .wrap_err("Failed to create the tick report archive")?
    } else {
        Archiver::default()
    };

    info!("Module initialisation complete\n");

    // ---- INITIALISE EQUIPMENT ----

    let sim = SimHandle::new(SimWorld::new(sim_params));
    let mut eqpt = sim.eqpt();

    info!("Simulated equipment initialised");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let run_start = chrono::Utc::now();

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start();

        // ---- TELECOMMANDS ----

        let tcs = match si.get_pending_tcs(ds.sim_time_s) {
            PendingTcs::None => vec![],
            PendingTcs::Some(tc_vec) => tc_vec,
            // Exit if end of script reached
            PendingTcs::EndOfScript => {
                info!("End of TC script reached, stopping");
                break;
            }
        };

        // ---- CYCLE PROCESSING ----

        proc_cycle(&mut ds, &mut eqpt, &tcs);

        if ds.is_1_hz_cycle {
            info!(
                "Heading {:.01} deg, range {:.01} in, {} active manoeuvres, indication {:?}",
                ds.heading_deg,
                ds.snapshot.lidar_range_in,
                ds.mnvr_mgr.num_active(),
                ds.claw_ctrl_output.indication
            );
        }

        // ---- WRITE ARCHIVES ----

        if arch_tick.is_active() {
            if let Err(e) = arch_tick.serialise(ds.tick_report) {
                warn!("Could not archive the tick report: {}", e);
            }
        }

        // ---- SIMULATION ----

        sim.step(ds.cycle_period_s);

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        if let Some(d) = ds.cycle_end(cycle_dur) {
            thread::sleep(d);
        }
    }

    // ---- SHUTDOWN ----

    let run_duration_s = util::time::duration_to_seconds(chrono::Utc::now() - run_start);

    info!(
        "End of execution after {} cycles ({:.02?} s), {} overruns",
        ds.num_cycles,
        run_duration_s,
        ds.num_cycle_overruns
    );

    Ok(())
}
