//! # Data Store

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::time::Duration;

use comms_if::eqpt::sens::SensorSnapshot;
use log::{info, warn};
use util::logger::LogThrottle;

use crate::{
    acq::AcqParams,
    approach::GetCube,
    claw_ctrl::{self, ClawCtrl},
    cycle::TickReport,
    mnvr_mgr::{MnvrEvent, MnvrMgr},
};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Global data store for the executable.
pub struct DataStore {
    // Cycle management
    /// Target period of one cycle
    pub cycle_period_s: f64,

    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Simulated time at the start of this cycle, the number of cycles executed times the period
    pub sim_time_s: f64,

    // Operating mode
    /// If true no manoeuvres may be started and the claw indicator is off.
    pub disabled: bool,

    // Acquisition
    pub acq_params: AcqParams,
    pub mnvr_mgr: MnvrMgr,
    pub mnvr_events: Vec<MnvrEvent>,

    /// The running GetCube routine
    pub get_cube: Option<GetCube>,

    /// The most recently finished GetCube routine
    pub last_get_cube: Option<GetCube>,

    // ClawCtrl
    pub claw_ctrl: ClawCtrl,
    pub claw_ctrl_input: claw_ctrl::InputData,
    pub claw_ctrl_output: claw_ctrl::OutputData,
    pub claw_ctrl_status_rpt: claw_ctrl::StatusReport,

    // Sensors
    pub snapshot: SensorSnapshot,
    pub heading_deg: f64,

    /// Summary of this cycle
    pub tick_report: TickReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Total number of cycle overruns
    pub num_cycle_overruns: u64,

    overrun_throttle: LogThrottle,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DataStore {
    /// Create a new data store, the robot starts disabled.
    pub fn new(cycle_period_s: f64, overrun_warn_period_cycles: u64) -> Self {
        Self {
            cycle_period_s,
            num_cycles: 0,
            is_1_hz_cycle: false,
            sim_time_s: 0.0,
            disabled: true,
            acq_params: AcqParams::default(),
            mnvr_mgr: MnvrMgr::new(cycle_period_s),
            mnvr_events: Vec::new(),
            get_cube: None,
            last_get_cube: None,
            claw_ctrl: ClawCtrl::default(),
            claw_ctrl_input: claw_ctrl::InputData::default(),
            claw_ctrl_output: claw_ctrl::OutputData::default(),
            claw_ctrl_status_rpt: claw_ctrl::StatusReport::default(),
            snapshot: SensorSnapshot::default(),
            heading_deg: 0.0,
            tick_report: TickReport::default(),
            num_consec_cycle_overruns: 0,
            num_cycle_overruns: 0,
            overrun_throttle: LogThrottle::new(overrun_warn_period_cycles),
        }
    }

    /// Enter the disabled mode, cancelling everything which is running.
    pub fn disable(&mut self) {
        if !self.disabled {
            info!("Robot disabled");
        }
        self.disabled = true;
        self.abort();
    }

    pub fn enable(&mut self) {
        if self.disabled {
            info!("Robot enabled");
        }
        self.disabled = false;
    }

    /// Cancel any running routine, and all manoeuvres.
    pub fn abort(&mut self) {
        self.cancel_routine();
        self.mnvr_mgr.cancel_all();
    }

    /// Cancel the running routine, if there is one.
    pub fn cancel_routine(&mut self) {
        if let Some(mut routine) = self.get_cube.take() {
            routine.cancel(&mut self.mnvr_mgr);
            self.last_get_cube = Some(routine);
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self) {
        let cycle_frequency_hz = (1.0 / self.cycle_period_s).round().max(1.0) as u128;

        self.is_1_hz_cycle = self.num_cycles % cycle_frequency_hz == 0;

        self.claw_ctrl_input = claw_ctrl::InputData::default();
        self.claw_ctrl_output = claw_ctrl::OutputData::default();
        self.claw_ctrl_status_rpt = claw_ctrl::StatusReport::default();
        self.mnvr_events.clear();

        self.sim_time_s = self.num_cycles as f64 * self.cycle_period_s;
    }

    /// Perform actions required at the end of a cycle.
    ///
    /// Monitors for cycle overruns, returning the time to sleep until the next cycle is due, or
    /// `None` if the cycle overran.
    pub fn cycle_end(&mut self, cycle_dur: Duration) -> Option<Duration> {
        self.num_cycles += 1;

        match Duration::from_secs_f64(self.cycle_period_s).checked_sub(cycle_dur) {
            Some(d) => {
                self.num_consec_cycle_overruns = 0;
                self.overrun_throttle.reset();
                Some(d)
            }
            None => {
                self.num_consec_cycle_overruns += 1;
                self.num_cycle_overruns += 1;

                if self.overrun_throttle.ready() {
                    warn!(
                        "Cycle overran by {:.06} s ({} consecutive)",
                        cycle_dur.as_secs_f64() - self.cycle_period_s,
                        self.num_consec_cycle_overruns
                    );
                }

                None
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cycle_end() {
        let mut ds = DataStore::new(0.02, 10);

        let sleep = ds.cycle_end(Duration::from_millis(5)).unwrap();
        assert_eq!(sleep, Duration::from_millis(15));
        assert_eq!(ds.num_cycles, 1);

        assert_eq!(ds.cycle_end(Duration::from_millis(25)), None);
        assert_eq!(ds.cycle_end(Duration::from_millis(30)), None);
        assert_eq!(ds.num_consec_cycle_overruns, 2);

        assert!(ds.cycle_end(Duration::from_millis(1)).is_some());
        assert_eq!(ds.num_consec_cycle_overruns, 0);
        assert_eq!(ds.num_cycle_overruns, 2);
        assert_eq!(ds.num_cycles, 4);
    }

    #[test]
    fn test_cycle_start() {
        let mut ds = DataStore::new(0.02, 10);

        ds.cycle_start();
        assert!(ds.is_1_hz_cycle);

        ds.num_cycles = 25;
        ds.cycle_start();
        assert!(!ds.is_1_hz_cycle);

        ds.num_cycles = 100;
        ds.cycle_start();
        assert!(ds.is_1_hz_cycle);
    }

    #[test]
    fn test_sim_time_ignores_overruns() {
        let mut ds = DataStore::new(0.02, 10);

        ds.cycle_start();
        assert_eq!(ds.sim_time_s, 0.0);

        // Every cycle advances simulated time by one period, however long it took
        for dur_ms in &[5, 45, 120, 5] {
            ds.cycle_end(Duration::from_millis(*dur_ms));
            ds.cycle_start();
        }

        assert_eq!(ds.num_cycles, 4);
        assert!((ds.sim_time_s - 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_modes() {
        let mut ds = DataStore::new(0.02, 10);
        assert!(ds.disabled);

        ds.enable();
        assert!(!ds.disabled);

        ds.disable();
        assert!(ds.disabled);
    }
}
