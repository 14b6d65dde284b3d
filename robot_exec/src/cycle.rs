//! # Control cycle
//!
//! [`proc_cycle`] performs all processing for one cycle of the executable, in a fixed order:
//!
//! 1. Telecommands
//! 2. Manoeuvres, starting with any pending cancellations
//! 3. Routine sequencing
//! 4. Sensor snapshot and claw control
//! 5. Indicator and haptic outputs
//!
//! Nothing in the cycle blocks.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::Tc;
use log::{info, warn};
use serde::Serialize;
use util::module::State;

use crate::{
    claw_ctrl::{self, ClawCtrl, Indication},
    data_store::DataStore,
    eqpt::Eqpt,
    tc_processor,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Summary of one cycle, archived by the executable.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub cycle: u64,
    pub time_s: f64,
    pub disabled: bool,
    pub heading_deg: f64,
    pub lidar_range_in: f64,
    pub ultrasonic_range_in: f64,
    pub vision_offset_px: f64,
    pub vision_in_range: bool,
    pub vision_recent: bool,
    pub num_active_mnvrs: usize,
    pub routine_running: bool,
    pub indication: Indication,
    pub led_r: u8,
    pub led_g: u8,
    pub led_b: u8,
    pub rumble: f64,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Process one cycle.
pub fn proc_cycle(ds: &mut DataStore, eqpt: &mut Eqpt, tcs: &[Tc]) {
    // ---- TELECOMMAND PROCESSING ----

    for tc in tcs {
        tc_processor::exec(ds, eqpt, tc);
    }

    // ---- MANOEUVRE PROCESSING ----

    ds.mnvr_mgr.step(eqpt);

    // ---- ROUTINE SEQUENCING ----

    let mut routine_finished = false;

    if let Some(routine) = ds.get_cube.as_mut() {
        if let Err(e) = routine.step(&mut ds.mnvr_mgr, eqpt) {
            warn!("GetCube could not start the next stage, cancelling: {}", e);
            routine.cancel(&mut ds.mnvr_mgr);
        }

        if routine.is_finished(&ds.mnvr_mgr) {
            info!("GetCube finished: {:?}", routine.report(&ds.mnvr_mgr));
            routine_finished = true;
        }
    }

    if routine_finished {
        ds.last_get_cube = ds.get_cube.take();
    }

    ds.mnvr_events = ds.mnvr_mgr.drain_events();

    // ---- CLAW CONTROL ----

    ds.snapshot = eqpt.snapshot();
    ds.heading_deg = eqpt.heading.heading_deg();

    ds.claw_ctrl_input = claw_ctrl::InputData {
        snapshot: ds.snapshot,
        disabled: ds.disabled,
    };

    match ds.claw_ctrl.proc(&ds.claw_ctrl_input) {
        Ok((o, r)) => {
            ds.claw_ctrl_output = o;
            ds.claw_ctrl_status_rpt = r;
        }
        Err(e) => warn!("Error during ClawCtrl processing: {}", e),
    }

    ClawCtrl::write_outputs(
        &ds.claw_ctrl_output,
        eqpt.indicator.as_mut(),
        eqpt.haptic.as_mut(),
    );

    // ---- REPORT ----

    ds.tick_report = TickReport {
        cycle: ds.num_cycles as u64,
        time_s: ds.sim_time_s,
        disabled: ds.disabled,
        heading_deg: ds.heading_deg,
        lidar_range_in: ds.snapshot.lidar_range_in,
        ultrasonic_range_in: ds.snapshot.ultrasonic_range_in,
        vision_offset_px: ds.snapshot.vision_offset_px,
        vision_in_range: ds.snapshot.vision_in_range,
        vision_recent: ds.snapshot.vision_recent,
        num_active_mnvrs: ds.mnvr_mgr.num_active(),
        routine_running: ds.get_cube.is_some(),
        indication: ds.claw_ctrl_output.indication,
        led_r: ds.claw_ctrl_output.led.r,
        led_g: ds.claw_ctrl_output.led.g,
        led_b: ds.claw_ctrl_output.led.b,
        rumble: ds.claw_ctrl_output.rumble,
    };
}
