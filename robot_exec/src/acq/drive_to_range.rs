//! # Drive to range manoeuvre

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;

use super::{
    controllers::ControllerConfig, AcqError, AcqParams, DriveToRangeParams, FeedbackLoop,
    ManeuverKind, RecallRecord, Recallable,
};
use crate::eqpt::{DriveActuator, RangeSensor};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Drive forwards or backwards until the time of flight range to the target reaches the target
/// range.
///
/// The final range is captured for recall.
#[derive(Debug, Clone)]
pub struct DriveToRange {
    params: DriveToRangeParams,
    target_range_in: f64,
    fb: FeedbackLoop,
    record: RecallRecord,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveToRange {
    pub fn new(params: &AcqParams, target_range_in: f64) -> Self {
        Self {
            params: params.drive_to_range.clone(),
            target_range_in,
            fb: FeedbackLoop::new(params.drive_to_range.filter_window),
            record: RecallRecord::new(ManeuverKind::Distance),
        }
    }

    /// Create a drive to the default target range.
    pub fn with_default_range(params: &AcqParams) -> Self {
        Self::new(params, params.drive_to_range.default_target_range_in)
    }

    pub fn init(&mut self) -> Result<(), AcqError> {
        self.record = RecallRecord::new(ManeuverKind::Distance);

        let config = ControllerConfig {
            continuous: false,
            ..self.params.ctrl
        };

        self.fb.start(config, self.target_range_in)
    }

    pub fn step(
        &mut self,
        lidar: &dyn RangeSensor,
        drive: &mut dyn DriveActuator,
    ) -> Result<(), AcqError> {
        self.fb.observe(lidar.range_in());

        let shaped = self.fb.step()?;

        // Being too far away gives a negative error, so invert to drive forwards
        drive.set_forward(-shaped);

        debug!("DriveToRange: {:?}", self.fb.last_report());

        Ok(())
    }

    pub fn is_settled(&self) -> bool {
        self.fb.is_settled()
    }

    /// Stop the drive and capture the range.
    pub fn finalise(&mut self, drive: &mut dyn DriveActuator, lidar: &dyn RangeSensor) {
        drive.stop();
        self.record.capture(lidar.range_in());
    }

    pub fn target_range_in(&self) -> f64 {
        self.target_range_in
    }

    pub fn feedback(&self) -> &FeedbackLoop {
        &self.fb
    }
}

impl Recallable for DriveToRange {
    fn recall_record(&self) -> &RecallRecord {
        &self.record
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Track {
        range_in: f64,
        forward: f64,
    }

    impl RangeSensor for Track {
        fn range_in(&self) -> f64 {
            self.range_in
        }
    }

    impl DriveActuator for Track {
        fn set_rotation(&mut self, _: f64) {}
        fn set_forward(&mut self, forward: f64) {
            self.forward = forward;
        }
        fn stop(&mut self) {
            self.forward = 0.0;
        }
    }

    struct FixedRange(f64);

    impl RangeSensor for FixedRange {
        fn range_in(&self) -> f64 {
            self.0
        }
    }

    fn params() -> AcqParams {
        util::params::from_str(include_str!("../../../params/acq.toml")).unwrap()
    }

    #[test]
    fn test_closes_distance() {
        let params = params();
        let mut mnvr = DriveToRange::new(&params, 8.0);
        mnvr.init().unwrap();

        let mut track = Track {
            range_in: 36.0,
            forward: 0.0,
        };

        let mut settled = false;
        for _ in 0..500 {
            let sensor = FixedRange(track.range_in);
            mnvr.step(&sensor, &mut track).unwrap();

            // Simple plant, 60 in/s at full demand over a 20 ms cycle
            track.range_in -= track.forward * 60.0 * 0.02;

            if mnvr.is_settled() {
                settled = true;
                break;
            }
        }

        assert!(settled);
        assert!((track.range_in - 8.0).abs() <= 1.5);

        mnvr.finalise(&mut track, &FixedRange(8.2));
        assert_eq!(track.forward, 0.0);
        assert_eq!(mnvr.recall(), Some(8.2));
        assert_eq!(mnvr.kind(), ManeuverKind::Distance);

        // A second run starts without a value
        mnvr.init().unwrap();
        assert_eq!(mnvr.recall(), None);
    }

    #[test]
    fn test_backs_off_when_too_close() {
        let params = params();
        let mut mnvr = DriveToRange::with_default_range(&params);
        assert_eq!(mnvr.target_range_in(), 8.0);
        mnvr.init().unwrap();

        let mut track = Track {
            range_in: 2.0,
            forward: 0.0,
        };
        let sensor = FixedRange(2.0);
        mnvr.step(&sensor, &mut track).unwrap();

        assert!(track.forward < 0.0);
    }
}
