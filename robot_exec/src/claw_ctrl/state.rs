//! Implementations for the ClawCtrl state structure

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{info, warn};
use serde::Serialize;

// Internal
use super::{ClawCtrlError, Params};
use crate::eqpt::{ClawMotor, HapticSink, IndicatorSink};
use comms_if::eqpt::{
    claw::{ClawState, LedColour},
    sens::SensorSnapshot,
};
use util::{
    archive::Archiver,
    module::State,
    params,
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Claw control module state
#[derive(Default)]
pub struct ClawCtrl {
    params: Option<Params>,

    /// The last state directly commanded to the claw
    claw_state: Option<ClawState>,

    /// True while the claw is ejecting at full speed
    ejecting: bool,

    report: StatusReport,
    arch_report: Archiver,
}

/// Input data to claw control.
#[derive(Debug, Default, Copy, Clone)]
pub struct InputData {
    pub snapshot: SensorSnapshot,

    /// True if the robot is disabled
    pub disabled: bool,
}

/// Indicator and haptic outputs derived from the sensors.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize)]
pub struct OutputData {
    pub led: LedColour,

    /// Haptic intensity between 0 and 1
    pub rumble: f64,

    pub indication: Indication,
}

/// Status report for claw control processing.
///
/// Flat so it can be archived directly.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub indication: Indication,
    pub ejecting: bool,
    pub claw_speed: f64,
    pub led_r: u8,
    pub led_g: u8,
    pub led_b: u8,
    pub rumble: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The condition shown on the claw indicator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Indication {
    Disabled,
    Holding,
    FineAligned,
    CoarseAligned,
    None,
}

impl Default for Indication {
    fn default() -> Self {
        Indication::None
    }
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl State for ClawCtrl {
    type InitData = &'static str;
    type InitError = ClawCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = ClawCtrlError;

    /// Initialise the ClawCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters
        self.params = Some(params::load(init_data).map_err(ClawCtrlError::ParamLoadError)?);

        // Initialise the archive
        self.arch_report = Archiver::from_path(session, "claw_ctrl/status_report.csv")
            .map_err(ClawCtrlError::ArchiveInitError)?;

        Ok(())
    }

    /// Derive the claw outputs for this cycle.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let params = self.params.as_ref().ok_or(ClawCtrlError::NotInitialised)?;

        let output = derive_output(params, &input_data.snapshot, input_data.disabled);

        self.report = StatusReport {
            indication: output.indication,
            ejecting: self.ejecting,
            claw_speed: self.claw_state.map(|s| s.speed()).unwrap_or(0.0),
            led_r: output.led.r,
            led_g: output.led.g,
            led_b: output.led.b,
            rumble: output.rumble,
        };

        if self.arch_report.is_active() {
            if let Err(e) = self.arch_report.serialise(self.report) {
                warn!("Could not archive the ClawCtrl status report: {}", e);
            }
        }

        Ok((output, self.report))
    }
}

impl ClawCtrl {
    /// Create an initialised ClawCtrl which doesn't archive.
    pub fn with_params(params: Params) -> Self {
        Self {
            params: Some(params),
            ..Default::default()
        }
    }

    /// Directly set the state of the claw intake.
    ///
    /// This may be called at any time, the caller is responsible for taking the claw away from
    /// any manoeuvre using it.
    pub fn set_claw_state(&mut self, state: ClawState, motor: &mut dyn ClawMotor) {
        info!("Claw state set to {:?}", state);

        motor.set_speed(state.speed());

        self.claw_state = Some(state);
        self.ejecting = state == ClawState::Eject;
    }

    /// Write derived outputs to the indicator and haptic sinks.
    pub fn write_outputs(
        output: &OutputData,
        indicator: &mut dyn IndicatorSink,
        haptic: &mut dyn HapticSink,
    ) {
        indicator.set_colour(output.led);
        haptic.set_intensity(output.rumble);
    }

    pub fn claw_state(&self) -> Option<ClawState> {
        self.claw_state
    }

    pub fn is_ejecting(&self) -> bool {
        self.ejecting
    }

    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    pub fn report(&self) -> &StatusReport {
        &self.report
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Derive the indicator and haptic outputs from a sensor snapshot.
///
/// The first matching condition wins:
/// 1. Disabled - off
/// 2. Holding an object - holding colour, no rumble
/// 3. Target finely aligned - fine colour, range rumble
/// 4. Target in coarse range - coarse colour, range rumble
/// 5. Otherwise - off
pub fn derive_output(params: &Params, snapshot: &SensorSnapshot, disabled: bool) -> OutputData {
    let (led, rumble, indication) = if disabled {
        (LedColour::OFF, 0.0, Indication::Disabled)
    } else if snapshot.lidar_range_in <= params.holding_range_in {
        (LedColour::HOLDING, 0.0, Indication::Holding)
    } else if snapshot.vision_offset_px.abs() <= params.fine_align_px {
        (LedColour::FINE_ALIGNED, snapshot.lidar_rumble, Indication::FineAligned)
    } else if snapshot.vision_in_range {
        (LedColour::COARSE_ALIGNED, snapshot.lidar_rumble, Indication::CoarseAligned)
    } else {
        (LedColour::OFF, 0.0, Indication::None)
    };

    OutputData {
        led,
        rumble: rumble.max(0.0).min(1.0),
        indication,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn params() -> Params {
        Params {
            holding_range_in: 6.0,
            fine_align_px: 20.0,
            grab_timeout_s: 5.0,
        }
    }

    fn snapshot(range_in: f64, offset_px: f64, in_range: bool) -> SensorSnapshot {
        SensorSnapshot {
            lidar_range_in: range_in,
            lidar_rumble: 0.4,
            vision_offset_px: offset_px,
            vision_in_range: in_range,
            vision_recent: true,
            ultrasonic_range_in: range_in,
        }
    }

    #[derive(Default)]
    struct Motor(f64);

    impl ClawMotor for Motor {
        fn set_speed(&mut self, speed: f64) {
            self.0 = speed;
        }
    }

    #[test]
    fn test_holding_priority() {
        let params = params();

        for offset in [-300.0, -20.0, 0.0, 5.0, 150.0].iter() {
            for in_range in [true, false].iter() {
                let out = derive_output(&params, &snapshot(5.0, *offset, *in_range), false);
                assert_eq!(out.led, LedColour::HOLDING);
                assert_eq!(out.rumble, 0.0);
                assert_eq!(out.indication, Indication::Holding);
            }
        }
    }

    #[test]
    fn test_priority_order() {
        let params = params();

        // Disabled beats everything
        let out = derive_output(&params, &snapshot(5.0, 0.0, true), true);
        assert_eq!(out.led, LedColour::OFF);
        assert_eq!(out.rumble, 0.0);
        assert_eq!(out.indication, Indication::Disabled);

        // Fine alignment, including the boundary
        let out = derive_output(&params, &snapshot(20.0, -20.0, true), false);
        assert_eq!(out.led, LedColour::FINE_ALIGNED);
        assert_eq!(out.rumble, 0.4);

        // Coarse alignment
        let out = derive_output(&params, &snapshot(20.0, 60.0, true), false);
        assert_eq!(out.led, LedColour::COARSE_ALIGNED);
        assert_eq!(out.rumble, 0.4);

        // Nothing
        let out = derive_output(&params, &snapshot(20.0, 60.0, false), false);
        assert_eq!(out.led, LedColour::OFF);
        assert_eq!(out.rumble, 0.0);
        assert_eq!(out.indication, Indication::None);
    }

    #[test]
    fn test_proc() {
        let mut claw_ctrl = ClawCtrl::default();
        assert!(matches!(
            claw_ctrl.proc(&InputData::default()),
            Err(ClawCtrlError::NotInitialised)
        ));

        let mut claw_ctrl = ClawCtrl::with_params(params());
        let (out, report) = claw_ctrl
            .proc(&InputData {
                snapshot: snapshot(4.0, 0.0, true),
                disabled: false,
            })
            .unwrap();

        assert_eq!(out.indication, Indication::Holding);
        assert_eq!(report.indication, Indication::Holding);
        assert_eq!((report.led_r, report.led_g, report.led_b), (0, 255, 0));
    }

    #[test]
    fn test_set_claw_state() {
        let mut claw_ctrl = ClawCtrl::with_params(params());
        let mut motor = Motor::default();

        claw_ctrl.set_claw_state(ClawState::Eject, &mut motor);
        assert_eq!(motor.0, -1.0);
        assert!(claw_ctrl.is_ejecting());

        claw_ctrl.set_claw_state(ClawState::SlowEject, &mut motor);
        assert_eq!(motor.0, -0.4);
        assert!(!claw_ctrl.is_ejecting());

        claw_ctrl.set_claw_state(ClawState::Grab, &mut motor);
        assert_eq!(motor.0, 1.0);

        claw_ctrl.set_claw_state(ClawState::Stop, &mut motor);
        assert_eq!(motor.0, 0.0);
        assert_eq!(claw_ctrl.claw_state(), Some(ClawState::Stop));
    }
}
