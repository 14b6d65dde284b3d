//! # Telecommand processor module
//!
//! The telecommand processor handles various TCs coming from any source.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{debug, info, warn};

// Internal
use crate::{
    acq::{DriveToRange, ManeuverKind, RecallError, RotateToHeading, RotateToTarget},
    approach::GetCube,
    data_store::DataStore,
    eqpt::Eqpt,
    mnvr_mgr::Mnvr,
};
use comms_if::{
    eqpt::ActId,
    tc::{
        acq::{AcqCmd, RecallMethod},
        Tc,
    },
};

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to send commands to different modules.
pub fn exec(ds: &mut DataStore, eqpt: &mut Eqpt, tc: &Tc) {
    match serde_json::to_string(tc) {
        Ok(s) => debug!("Recieved TC: {}", s),
        Err(_) => debug!("Recieved TC: {:?}", tc),
    }

    // Handle different Tcs
    match tc {
        Tc::Enable => ds.enable(),
        Tc::Disable => ds.disable(),
        Tc::Claw(state) => {
            // Direct commands always win over manoeuvres
            ds.mnvr_mgr.preempt(ActId::Claw, eqpt);
            ds.claw_ctrl.set_claw_state(*state, eqpt.claw.as_mut());
        }
        Tc::Acq(cmd) => exec_acq(ds, eqpt, *cmd),
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn exec_acq(ds: &mut DataStore, eqpt: &mut Eqpt, cmd: AcqCmd) {
    if ds.disabled && cmd != AcqCmd::Abort {
        warn!("Robot is disabled, rejecting {:?}", cmd);
        return;
    }

    let mnvr = match cmd {
        AcqCmd::RotateToTarget => Mnvr::RotateToTarget(RotateToTarget::new(&ds.acq_params)),
        AcqCmd::DriveToRange { target_range_in } => {
            Mnvr::DriveToRange(DriveToRange::new(&ds.acq_params, target_range_in))
        }
        AcqCmd::RecallRotation { method } => match recall_rotation(ds, method) {
            Ok(m) => Mnvr::RotateToHeading(m),
            Err(e) => {
                warn!("Cannot recall a rotation: {}", e);
                return;
            }
        },
        AcqCmd::GetCube => {
            start_get_cube(ds, eqpt);
            return;
        }
        AcqCmd::Abort => {
            info!("Abort requested");
            ds.abort();
            return;
        }
    };

    // A single manoeuvre replaces any running routine
    ds.cancel_routine();

    if let Err(e) = ds.mnvr_mgr.start(mnvr, eqpt) {
        warn!("Could not start {:?}: {}", cmd, e);
    }
}

/// Build a rotation to the heading captured by the most recent rotation.
fn recall_rotation(ds: &DataStore, method: RecallMethod) -> Result<RotateToHeading, RecallError> {
    match ds.mnvr_mgr.registry().latest(ManeuverKind::Rotation) {
        Some((id, record)) => {
            info!("Recalling rotation {} with {:?}", id, method);
            RotateToHeading::from_recall(&ds.acq_params, record, method)
        }
        None => Err(RecallError::NotAvailable),
    }
}

/// Start a new GetCube routine, cancelling the current one.
fn start_get_cube(ds: &mut DataStore, eqpt: &mut Eqpt) {
    ds.cancel_routine();

    let claw_params = match ds.claw_ctrl.params() {
        Some(p) => p.clone(),
        None => {
            warn!("ClawCtrl is not initialised, cannot start GetCube");
            return;
        }
    };

    match GetCube::start(&mut ds.mnvr_mgr, eqpt, &ds.acq_params, &claw_params) {
        Ok(routine) => ds.get_cube = Some(routine),
        Err(e) => warn!("Could not start GetCube: {}", e),
    }
}
