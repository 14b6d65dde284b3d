//! # Manoeuvre manager module
//!
//! The [`MnvrMgr`] runs every active manoeuvre once per cycle and arbitrates access to the
//! robot's actuators. Each actuator is owned by at most one manoeuvre. Starting a manoeuvre that
//! needs an owned actuator interrupts the current owner first, so the owner's stop and capture
//! always happens before the new manoeuvre is initialised. There's no waiting on an actuator.
//!
//! Cancellation requests are queued and processed at the start of the next manager step, through
//! the same finalise path as a manoeuvre which settles, so a finished manoeuvre always has its
//! recall value captured.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::{HashMap, VecDeque};
use std::fmt;

use log::{info, warn};
use serde::Serialize;
use util::logger::LogThrottle;

use crate::{
    acq::{
        AcqError, DriveToRange, RecallRecord, RecallRegistry, Recallable, RotateToHeading,
        RotateToTarget,
    },
    claw_ctrl::UseClaw,
    eqpt::Eqpt,
};
use comms_if::eqpt::ActId;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of cycles between repeated warnings for a manoeuvre which keeps failing to step.
const STEP_ERROR_WARN_PERIOD_CYCLES: u64 = 50;

/// Number of finished manoeuvres whose status and recall record are kept.
///
/// Older ones are forgotten, and report a status of `None`.
pub const FINISHED_HISTORY_LEN: usize = 256;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Handle to a manoeuvre started by the manager.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MnvrId(pub u64);

/// Manoeuvre manager
pub struct MnvrMgr {
    /// Period of one cycle, used by time based manoeuvres.
    cycle_period_s: f64,

    /// ID given to the next manoeuvre to be started.
    next_id: u64,

    /// Manoeuvres which have been started but haven't finished, in start order.
    active: Vec<ActiveMnvr>,

    /// Current owner of each actuator.
    owners: HashMap<ActId, MnvrId>,

    /// Status of every active manoeuvre and of the most recently finished ones.
    statuses: HashMap<MnvrId, MnvrStatus>,

    /// Finished manoeuvres in the order they finished, oldest first.
    finished: VecDeque<MnvrId>,

    /// Cancellations to process at the start of the next step.
    pending_cancels: Vec<MnvrId>,

    /// Recall records of all finished manoeuvres.
    registry: RecallRegistry,

    /// Lifecycle events since the last drain.
    events: Vec<MnvrEvent>,
}

struct ActiveMnvr {
    id: MnvrId,
    mnvr: Mnvr,
    error_throttle: LogThrottle,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A manoeuvre which can be run by the manager.
#[derive(Debug, Clone)]
pub enum Mnvr {
    RotateToTarget(RotateToTarget),
    DriveToRange(DriveToRange),
    RotateToHeading(RotateToHeading),
    UseClaw(UseClaw),
}

/// Lifecycle status of a manoeuvre.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum MnvrStatus {
    /// Not yet started
    Idle,

    /// Being stepped every cycle
    Running,

    /// Reached its target
    Settled,

    /// Cancelled, or preempted by another manoeuvre
    Interrupted,
}

/// Lifecycle events emitted by the manager.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum MnvrEvent {
    /// The manoeuvre was initialised and is now running
    Started(MnvrId),

    /// The manoeuvre was finalised with the given terminal status
    Finalised(MnvrId, MnvrStatus),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl fmt::Display for MnvrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl MnvrStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MnvrStatus::Settled | MnvrStatus::Interrupted)
    }
}

impl Mnvr {
    /// The actuators this manoeuvre needs exclusive use of.
    pub fn requires(&self) -> &'static [ActId] {
        match self {
            Mnvr::RotateToTarget(_) | Mnvr::DriveToRange(_) | Mnvr::RotateToHeading(_) => {
                &[ActId::Drive]
            }
            Mnvr::UseClaw(_) => &[ActId::Claw],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mnvr::RotateToTarget(_) => "RotateToTarget",
            Mnvr::DriveToRange(_) => "DriveToRange",
            Mnvr::RotateToHeading(_) => "RotateToHeading",
            Mnvr::UseClaw(_) => "UseClaw",
        }
    }

    /// The manoeuvre's recall record.
    ///
    /// `UseClaw` has no meaningful terminal value so returns `None`.
    pub fn recall_record(&self) -> Option<RecallRecord> {
        match self {
            Mnvr::RotateToTarget(m) => Some(*m.recall_record()),
            Mnvr::DriveToRange(m) => Some(*m.recall_record()),
            Mnvr::RotateToHeading(m) => Some(*m.recall_record()),
            Mnvr::UseClaw(_) => None,
        }
    }

    fn init(&mut self, eqpt: &mut Eqpt) -> Result<(), AcqError> {
        match self {
            Mnvr::RotateToTarget(m) => m.init(),
            Mnvr::DriveToRange(m) => m.init(),
            Mnvr::RotateToHeading(m) => m.init(),
            Mnvr::UseClaw(m) => {
                m.init(eqpt.claw.as_mut());
                Ok(())
            }
        }
    }

    fn step(&mut self, eqpt: &mut Eqpt, dt_s: f64) -> Result<(), AcqError> {
        match self {
            Mnvr::RotateToTarget(m) => m.step(eqpt.vision.as_ref(), eqpt.drive.as_mut()),
            Mnvr::DriveToRange(m) => m.step(eqpt.lidar.as_ref(), eqpt.drive.as_mut()),
            Mnvr::RotateToHeading(m) => m.step(eqpt.heading.as_ref(), eqpt.drive.as_mut()),
            Mnvr::UseClaw(m) => {
                m.step(eqpt.claw.as_mut(), eqpt.lidar.as_ref(), dt_s);
                Ok(())
            }
        }
    }

    fn is_settled(&self) -> bool {
        match self {
            Mnvr::RotateToTarget(m) => m.is_settled(),
            Mnvr::DriveToRange(m) => m.is_settled(),
            Mnvr::RotateToHeading(m) => m.is_settled(),
            Mnvr::UseClaw(m) => m.is_settled(),
        }
    }

    fn finalise(&mut self, eqpt: &mut Eqpt) {
        match self {
            Mnvr::RotateToTarget(m) => m.finalise(eqpt.drive.as_mut(), eqpt.heading.as_ref()),
            Mnvr::DriveToRange(m) => m.finalise(eqpt.drive.as_mut(), eqpt.lidar.as_ref()),
            Mnvr::RotateToHeading(m) => m.finalise(eqpt.drive.as_mut(), eqpt.heading.as_ref()),
            Mnvr::UseClaw(m) => m.finalise(eqpt.claw.as_mut()),
        }
    }
}

impl MnvrMgr {
    pub fn new(cycle_period_s: f64) -> Self {
        Self {
            cycle_period_s,
            next_id: 0,
            active: Vec::new(),
            owners: HashMap::new(),
            statuses: HashMap::new(),
            finished: VecDeque::new(),
            pending_cancels: Vec::new(),
            registry: RecallRegistry::new(),
            events: Vec::new(),
        }
    }

    /// Start a new manoeuvre.
    ///
    /// Any manoeuvre owning an actuator the new one needs is interrupted and finalised before the
    /// new manoeuvre is initialised. If initialisation fails the new manoeuvre is dropped and the
    /// error returned.
    pub fn start(&mut self, mut mnvr: Mnvr, eqpt: &mut Eqpt) -> Result<MnvrId, AcqError> {
        // Preempt current owners
        for act in mnvr.requires() {
            if let Some(owner) = self.owners.get(act).copied() {
                info!("{} preempts {} for the {:?} actuator", mnvr.name(), owner, act);
                self.finalise(owner, MnvrStatus::Interrupted, eqpt);
            }
        }

        mnvr.init(eqpt)?;

        let id = MnvrId(self.next_id);
        self.next_id += 1;

        for act in mnvr.requires() {
            self.owners.insert(*act, id);
        }

        info!("{} {} started", mnvr.name(), id);

        self.statuses.insert(id, MnvrStatus::Running);
        self.events.push(MnvrEvent::Started(id));
        self.active.push(ActiveMnvr {
            id,
            mnvr,
            error_throttle: LogThrottle::new(STEP_ERROR_WARN_PERIOD_CYCLES),
        });

        Ok(id)
    }

    /// Request that a manoeuvre is cancelled at the start of the next step.
    pub fn cancel(&mut self, id: MnvrId) {
        if !self.pending_cancels.contains(&id) {
            self.pending_cancels.push(id);
        }
    }

    /// Request that all currently active manoeuvres are cancelled at the start of the next step.
    ///
    /// Manoeuvres started after this call aren't affected.
    pub fn cancel_all(&mut self) {
        let ids: Vec<MnvrId> = self.active.iter().map(|a| a.id).collect();
        for id in ids {
            self.cancel(id);
        }
    }

    /// Immediately interrupt the owner of an actuator, returning the interrupted manoeuvre.
    ///
    /// Used when an operator takes direct control of an actuator.
    pub fn preempt(&mut self, act: ActId, eqpt: &mut Eqpt) -> Option<MnvrId> {
        let owner = self.owners.get(&act).copied()?;

        info!("Direct command preempts {} for the {:?} actuator", owner, act);
        self.finalise(owner, MnvrStatus::Interrupted, eqpt);

        Some(owner)
    }

    /// Process pending cancellations and step all active manoeuvres.
    pub fn step(&mut self, eqpt: &mut Eqpt) {
        // ---- CANCELLATIONS ----

        let cancels: Vec<MnvrId> = self.pending_cancels.drain(..).collect();

        for id in cancels {
            self.finalise(id, MnvrStatus::Interrupted, eqpt);
        }

        // ---- MANOEUVRE PROCESSING ----

        let dt_s = self.cycle_period_s;
        let mut settled = Vec::new();

        for active in self.active.iter_mut() {
            match active.mnvr.step(eqpt, dt_s) {
                Ok(()) => active.error_throttle.reset(),
                Err(e) => {
                    if active.error_throttle.ready() {
                        warn!("Error stepping {} {}: {}", active.mnvr.name(), active.id, e);
                    }
                }
            }

            if active.mnvr.is_settled() {
                settled.push(active.id);
            }
        }

        for id in settled {
            self.finalise(id, MnvrStatus::Settled, eqpt);
        }
    }

    /// Status of a manoeuvre, `None` if the ID was never returned by `start`.
    pub fn status(&self, id: MnvrId) -> Option<MnvrStatus> {
        self.statuses.get(&id).copied()
    }

    pub fn is_terminal(&self, id: MnvrId) -> bool {
        self.status(id).map(|s| s.is_terminal()).unwrap_or(false)
    }

    /// The recalled value of a finished manoeuvre.
    pub fn recall(&self, id: MnvrId) -> Option<f64> {
        self.registry.get(id).and_then(|r| r.value())
    }

    pub fn recall_record(&self, id: MnvrId) -> Option<&RecallRecord> {
        self.registry.get(id)
    }

    pub fn registry(&self) -> &RecallRegistry {
        &self.registry
    }

    /// The manoeuvre which currently owns an actuator.
    pub fn owner(&self, act: ActId) -> Option<MnvrId> {
        self.owners.get(&act).copied()
    }

    pub fn num_active(&self) -> usize {
        self.active.len()
    }

    /// Get the lifecycle events which have occured since the last call.
    pub fn drain_events(&mut self) -> Vec<MnvrEvent> {
        self.events.drain(..).collect()
    }

    /// Finalise an active manoeuvre, releasing its actuators and storing its recall record.
    ///
    /// Does nothing if the manoeuvre isn't active.
    fn finalise(&mut self, id: MnvrId, end: MnvrStatus, eqpt: &mut Eqpt) {
        let index = match self.active.iter().position(|a| a.id == id) {
            Some(i) => i,
            None => return,
        };

        let mut active = self.active.remove(index);
        active.mnvr.finalise(eqpt);

        self.owners.retain(|_, owner| *owner != id);

        if let Some(record) = active.mnvr.recall_record() {
            self.registry.insert(id, record);
        }

        info!(
            "{} {} finished ({:?}), recall: {:?}",
            active.mnvr.name(),
            id,
            end,
            self.recall(id)
        );

        self.statuses.insert(id, end);
        self.events.push(MnvrEvent::Finalised(id, end));

        self.finished.push_back(id);
        while self.finished.len() > FINISHED_HISTORY_LEN {
            if let Some(old) = self.finished.pop_front() {
                self.statuses.remove(&old);
                self.registry.remove(old);
            }
        }
    }
}
