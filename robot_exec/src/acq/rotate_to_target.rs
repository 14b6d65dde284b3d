//! # Rotate to target manoeuvre

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::sens::VisionReading;
use log::{debug, warn};
use util::logger::LogThrottle;

use super::{
    controllers::ControllerConfig, AcqError, AcqParams, FeedbackLoop, ManeuverKind,
    RecallRecord, Recallable, RotateToTargetParams,
};
use crate::eqpt::{DriveActuator, HeadingSensor, VisionSensor};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Turn on the spot until the vision target is in the centre of the image.
///
/// The final gyro heading is captured for recall.
#[derive(Debug, Clone)]
pub struct RotateToTarget {
    params: RotateToTargetParams,
    fb: FeedbackLoop,
    record: RecallRecord,
    stale_throttle: LogThrottle,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RotateToTarget {
    pub fn new(params: &AcqParams) -> Self {
        Self {
            params: params.rotate_to_target.clone(),
            fb: FeedbackLoop::new(params.rotate_to_target.filter_window),
            record: RecallRecord::new(ManeuverKind::Rotation),
            stale_throttle: LogThrottle::new(params.stale_warn_period_cycles),
        }
    }

    /// Reset the loop and the recall record, and size the controller's input range from the
    /// camera geometry.
    pub fn init(&mut self) -> Result<(), AcqError> {
        self.record = RecallRecord::new(ManeuverKind::Rotation);

        let half_width_px = self.params.camera_width_px / 2.0;

        let config = ControllerConfig {
            input_min: -half_width_px,
            input_max: half_width_px,
            continuous: true,
            ..self.params.ctrl
        };

        self.fb.start(config, 0.0)?;
        self.stale_throttle.reset();

        Ok(())
    }

    /// Perform one cycle of the manoeuvre.
    ///
    /// A stale vision reading is not added to the filter and doesn't count towards settling.
    pub fn step(
        &mut self,
        vision: &dyn VisionSensor,
        drive: &mut dyn DriveActuator,
    ) -> Result<(), AcqError> {
        let stale = match target_offset(vision.reading()) {
            Ok(offset_px) => {
                self.fb.observe(offset_px);
                false
            }
            Err(AcqError::StaleSensor) => true,
            Err(e) => return Err(e),
        };

        let shaped = self.fb.step()?;

        // The camera is mounted so that a positive demand moves the target right in the image
        drive.set_rotation(-shaped);

        if stale {
            self.fb.suppress_settle();

            if self.stale_throttle.ready() {
                warn!("RotateToTarget: vision reading is stale, settling suppressed");
            }
        } else {
            self.stale_throttle.reset();
        }

        debug!("RotateToTarget: {:?}", self.fb.last_report());

        Ok(())
    }

    pub fn is_settled(&self) -> bool {
        self.fb.is_settled()
    }

    /// Stop the drive and capture the heading.
    pub fn finalise(&mut self, drive: &mut dyn DriveActuator, heading: &dyn HeadingSensor) {
        drive.stop();
        self.record.capture(heading.heading_deg());
    }

    pub fn feedback(&self) -> &FeedbackLoop {
        &self.fb
    }
}

impl Recallable for RotateToTarget {
    fn recall_record(&self) -> &RecallRecord {
        &self.record
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Get the target offset from a reading, if the reading is fresh.
fn target_offset(reading: VisionReading) -> Result<f64, AcqError> {
    if reading.is_recent {
        Ok(reading.offset_px)
    } else {
        Err(AcqError::StaleSensor)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct ScriptedVision(RefCell<VecDeque<VisionReading>>);

    impl VisionSensor for ScriptedVision {
        fn reading(&self) -> VisionReading {
            self.0.borrow_mut().pop_front().unwrap()
        }
    }

    #[derive(Default)]
    struct RecordingDrive {
        rotation: f64,
        stops: u32,
    }

    impl DriveActuator for RecordingDrive {
        fn set_rotation(&mut self, rotation: f64) {
            self.rotation = rotation;
        }
        fn set_forward(&mut self, _: f64) {}
        fn stop(&mut self) {
            self.rotation = 0.0;
            self.stops += 1;
        }
    }

    struct FixedHeading(f64);

    impl HeadingSensor for FixedHeading {
        fn heading_deg(&self) -> f64 {
            self.0
        }
    }

    fn params() -> AcqParams {
        util::params::from_str(include_str!("../../../params/acq.toml")).unwrap()
    }

    fn vision(offsets: &[f64]) -> ScriptedVision {
        ScriptedVision(RefCell::new(
            offsets
                .iter()
                .map(|o| VisionReading {
                    offset_px: *o,
                    in_range: false,
                    is_recent: true,
                })
                .collect(),
        ))
    }

    #[test]
    fn test_settles_on_seventh_tick() {
        let mut params = params();
        params.rotate_to_target.camera_width_px = 640.0;
        params.rotate_to_target.filter_window = 5;
        params.rotate_to_target.ctrl.on_target_tolerance = 5.0;

        // Raw offsets chosen so the filtered values are [40, 20, 8, 4, 4, 4, 4]
        let vision = vision(&[40.0, 0.0, -16.0, -8.0, 4.0, 40.0, 0.0]);
        let mut drive = RecordingDrive::default();

        let mut mnvr = RotateToTarget::new(&params);
        mnvr.init().unwrap();

        let filtered = [40.0, 20.0, 8.0, 4.0, 4.0, 4.0, 4.0];
        for (i, f) in filtered.iter().enumerate() {
            mnvr.step(&vision, &mut drive).unwrap();

            let tick = i + 1;
            assert_eq!(mnvr.feedback().last_report().filtered, *f);
            assert_eq!(mnvr.is_settled(), tick == 7, "tick {}", tick);
        }

        // On target so no demand
        assert_eq!(drive.rotation, 0.0);
    }

    #[test]
    fn test_demand_direction() {
        let params = params();
        let vision = vision(&[100.0, -100.0]);
        let mut drive = RecordingDrive::default();

        let mut mnvr = RotateToTarget::new(&params);
        mnvr.init().unwrap();

        // Target to the right, turn right
        mnvr.step(&vision, &mut drive).unwrap();
        assert!(drive.rotation > 0.0);

        // Filtered offset is now zero, which is on target
        mnvr.step(&vision, &mut drive).unwrap();
        assert_eq!(drive.rotation, 0.0);
    }

    #[test]
    fn test_stale_suppresses_settle() {
        let params = params();
        let fresh = VisionReading {
            offset_px: 1.0,
            in_range: true,
            is_recent: true,
        };
        let stale = VisionReading {
            is_recent: false,
            ..fresh
        };
        let vision = ScriptedVision(RefCell::new(
            vec![fresh, fresh, fresh, stale, fresh, fresh, fresh, fresh].into(),
        ));
        let mut drive = RecordingDrive::default();

        let mut mnvr = RotateToTarget::new(&params);
        mnvr.init().unwrap();

        for _ in 0..4 {
            mnvr.step(&vision, &mut drive).unwrap();
            assert!(!mnvr.is_settled());
        }
        assert_eq!(mnvr.feedback().controller().on_target_count(), 0);

        for _ in 0..3 {
            mnvr.step(&vision, &mut drive).unwrap();
            assert!(!mnvr.is_settled());
        }
        mnvr.step(&vision, &mut drive).unwrap();
        assert!(mnvr.is_settled());
    }

    #[test]
    fn test_recall_after_finalise() {
        let params = params();
        let mut drive = RecordingDrive::default();

        let mut mnvr = RotateToTarget::new(&params);
        assert_eq!(mnvr.kind(), ManeuverKind::Rotation);
        assert_eq!(mnvr.recall(), None);

        mnvr.init().unwrap();
        assert_eq!(mnvr.recall(), None);

        mnvr.finalise(&mut drive, &FixedHeading(123.0));
        assert_eq!(mnvr.recall(), Some(123.0));
        assert_eq!(drive.stops, 1);

        // Running again forgets the previous value until the next finalise
        mnvr.init().unwrap();
        assert_eq!(mnvr.recall(), None);

        mnvr.finalise(&mut drive, &FixedHeading(45.0));
        assert_eq!(mnvr.recall(), Some(45.0));
    }
}
