//! # Approach routines
//!
//! Routines are sequences of manoeuvres started through the [`MnvrMgr`]. [`GetCube`] is the full
//! autonomous pickup:
//!
//! 1. Start [`RotateToTarget`] to face the cube, and at the same time start a [`UseClaw`] grab.
//! 2. Once the rotation has finished, settled or interrupted, start [`DriveToRange`] to close the
//!    distance.
//! 3. The routine is settled once both the drive and the grab have finished.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::claw::ClawState;
use log::info;
use serde::Serialize;

use crate::{
    acq::{AcqError, AcqParams, DriveToRange, RotateToTarget},
    claw_ctrl::{self, UseClaw},
    eqpt::Eqpt,
    mnvr_mgr::{Mnvr, MnvrId, MnvrMgr, MnvrStatus},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Align, approach and grab the cube.
#[derive(Debug, Clone)]
pub struct GetCube {
    acq_params: AcqParams,

    rotate: MnvrId,
    grab: MnvrId,
    drive: Option<MnvrId>,

    cancelled: bool,
}

/// Status of each stage of a [`GetCube`] routine.
///
/// Flat so it can be archived directly.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct GetCubeReport {
    pub rotate: MnvrStatus,
    pub grab: MnvrStatus,
    pub drive: MnvrStatus,
    pub cancelled: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GetCube {
    /// Start the routine, launching the rotation and the grab.
    pub fn start(
        mgr: &mut MnvrMgr,
        eqpt: &mut Eqpt,
        acq_params: &AcqParams,
        claw_params: &claw_ctrl::Params,
    ) -> Result<Self, AcqError> {
        let rotate = mgr.start(Mnvr::RotateToTarget(RotateToTarget::new(acq_params)), eqpt)?;
        let grab = mgr.start(Mnvr::UseClaw(UseClaw::new(claw_params, ClawState::Grab)), eqpt)?;

        info!("GetCube started: rotate {}, grab {}", rotate, grab);

        Ok(Self {
            acq_params: acq_params.clone(),
            rotate,
            grab,
            drive: None,
            cancelled: false,
        })
    }

    /// Sequence the routine's stages, called once per cycle after the manager has stepped.
    pub fn step(&mut self, mgr: &mut MnvrMgr, eqpt: &mut Eqpt) -> Result<(), AcqError> {
        if self.cancelled || self.drive.is_some() {
            return Ok(());
        }

        if mgr.is_terminal(self.rotate) {
            let drive = mgr.start(
                Mnvr::DriveToRange(DriveToRange::with_default_range(&self.acq_params)),
                eqpt,
            )?;
            info!("GetCube: rotation finished, drive {} started", drive);

            self.drive = Some(drive);
        }

        Ok(())
    }

    /// Cancel every stage of the routine, no further stages will be started.
    ///
    /// The cancellations are processed by the manager's next step.
    pub fn cancel(&mut self, mgr: &mut MnvrMgr) {
        info!("GetCube cancelled");

        mgr.cancel(self.rotate);
        mgr.cancel(self.grab);
        if let Some(drive) = self.drive {
            mgr.cancel(drive);
        }

        self.cancelled = true;
    }

    /// True once the drive and the grab have both finished.
    pub fn is_settled(&self, mgr: &MnvrMgr) -> bool {
        let drive_done = match self.drive {
            Some(d) => mgr.is_terminal(d),
            None => false,
        };

        drive_done && mgr.is_terminal(self.grab)
    }

    /// True once no stage of the routine is running or will be started.
    pub fn is_finished(&self, mgr: &MnvrMgr) -> bool {
        let stages_done = mgr.is_terminal(self.rotate)
            && mgr.is_terminal(self.grab)
            && self.drive.map(|d| mgr.is_terminal(d)).unwrap_or(true);

        self.is_settled(mgr) || (self.cancelled && stages_done)
    }

    /// The manoeuvre whose recall value is the heading facing the cube.
    pub fn angle_originator(&self) -> MnvrId {
        self.rotate
    }

    /// The manoeuvre whose recall value is the final range to the cube, once it has started.
    pub fn distance_originator(&self) -> Option<MnvrId> {
        self.drive
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn report(&self, mgr: &MnvrMgr) -> GetCubeReport {
        let status = |id: Option<MnvrId>| {
            id.and_then(|i| mgr.status(i)).unwrap_or(MnvrStatus::Idle)
        };

        GetCubeReport {
            rotate: status(Some(self.rotate)),
            grab: status(Some(self.grab)),
            drive: status(self.drive),
            cancelled: self.cancelled,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::acq::ManeuverKind;
    use crate::sim::{SimHandle, SimParams, SimWorld};
    use comms_if::eqpt::ActId;

    const DT_S: f64 = 0.02;

    struct Fixture {
        sim: SimHandle,
        eqpt: Eqpt,
        mgr: MnvrMgr,
        acq_params: AcqParams,
        claw_params: claw_ctrl::Params,
    }

    fn fixture() -> Fixture {
        let sim_params: SimParams =
            util::params::from_str(include_str!("../../../params/sim.toml")).unwrap();
        let sim = SimHandle::new(SimWorld::new(sim_params));
        let eqpt = sim.eqpt();

        Fixture {
            sim,
            eqpt,
            mgr: MnvrMgr::new(DT_S),
            acq_params: util::params::from_str(include_str!("../../../params/acq.toml"))
                .unwrap(),
            claw_params: util::params::from_str(include_str!("../../../params/claw_ctrl.toml"))
                .unwrap(),
        }
    }

    /// Step the manager, the routine and the world once.
    fn cycle(f: &mut Fixture, routine: &mut GetCube) {
        f.mgr.step(&mut f.eqpt);
        routine.step(&mut f.mgr, &mut f.eqpt).unwrap();
        f.sim.step(DT_S);
    }

    #[test]
    fn test_get_cube() {
        let mut f = fixture();
        let mut routine =
            GetCube::start(&mut f.mgr, &mut f.eqpt, &f.acq_params, &f.claw_params).unwrap();

        // Rotation and grab run together, the drive waits
        assert_eq!(f.mgr.owner(ActId::Drive), Some(routine.angle_originator()));
        assert_eq!(f.sim.world().claw_speed(), 1.0);
        assert_eq!(routine.distance_originator(), None);
        assert_eq!(routine.report(&f.mgr).drive, MnvrStatus::Idle);

        let mut ticks = 0;
        while !routine.is_settled(&f.mgr) {
            // Drive only starts once the rotation is finished
            if routine.distance_originator().is_some() {
                assert!(f.mgr.is_terminal(routine.angle_originator()));
            }

            cycle(&mut f, &mut routine);

            ticks += 1;
            assert!(ticks < 1000, "GetCube did not settle");
        }

        assert!(routine.is_finished(&f.mgr));

        let report = routine.report(&f.mgr);
        assert_eq!(report.rotate, MnvrStatus::Settled);
        assert_eq!(report.drive, MnvrStatus::Settled);
        assert_eq!(report.grab, MnvrStatus::Settled);

        // Heading faces the cube, and the cube is held
        let bearing = f.sim.world().params().target_bearing_deg;
        let heading = f.mgr.recall(routine.angle_originator()).unwrap();
        assert!((heading - bearing).abs() < 2.0);

        let drive = routine.distance_originator().unwrap();
        assert_eq!(f.mgr.recall_record(drive).unwrap().kind(), ManeuverKind::Distance);
        assert!(f.mgr.recall(drive).unwrap() <= 9.0);

        assert!(f.sim.world().range_in() <= f.claw_params.holding_range_in);
        assert_eq!(f.sim.world().claw_speed(), 0.0);
    }

    #[test]
    fn test_cancel_stops_sequence() {
        let mut f = fixture();
        let mut routine =
            GetCube::start(&mut f.mgr, &mut f.eqpt, &f.acq_params, &f.claw_params).unwrap();

        for _ in 0..3 {
            cycle(&mut f, &mut routine);
        }

        routine.cancel(&mut f.mgr);
        assert!(!routine.is_finished(&f.mgr));

        for _ in 0..3 {
            cycle(&mut f, &mut routine);
        }

        let report = routine.report(&f.mgr);
        assert_eq!(report.rotate, MnvrStatus::Interrupted);
        assert_eq!(report.grab, MnvrStatus::Interrupted);
        assert_eq!(report.drive, MnvrStatus::Idle);
        assert!(report.cancelled);

        // Interrupted rotation still has a heading to recall
        assert!(f.mgr.recall(routine.angle_originator()).is_some());
        assert!(routine.is_finished(&f.mgr));
        assert!(!routine.is_settled(&f.mgr));
        assert_eq!(f.mgr.num_active(), 0);
    }

    #[test]
    fn test_preempted_rotation_starts_drive() {
        let mut f = fixture();
        let mut routine =
            GetCube::start(&mut f.mgr, &mut f.eqpt, &f.acq_params, &f.claw_params).unwrap();
        cycle(&mut f, &mut routine);

        // Something else takes the drive, the routine carries on with the next stage
        f.mgr.cancel(routine.angle_originator());
        cycle(&mut f, &mut routine);

        assert_eq!(f.mgr.status(routine.angle_originator()), Some(MnvrStatus::Interrupted));
        assert!(routine.distance_originator().is_some());
    }
}
