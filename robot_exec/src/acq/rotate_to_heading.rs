//! # Rotate to heading manoeuvre

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::acq::RecallMethod;
use log::debug;
use util::maths::rem_euclid;

use super::{
    controllers::ControllerConfig, AcqError, AcqParams, FeedbackLoop, ManeuverKind,
    RecallError, RecallRecord, Recallable, RotateToHeadingParams,
};
use crate::eqpt::{DriveActuator, HeadingSensor};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Width of the heading domain.
const FULL_TURN_DEG: f64 = 360.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Turn on the spot to an absolute gyro heading, taking the shortest direction.
///
/// The final heading is captured for recall.
#[derive(Debug, Clone)]
pub struct RotateToHeading {
    params: RotateToHeadingParams,
    target_heading_deg: f64,
    fb: FeedbackLoop,
    record: RecallRecord,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RotateToHeading {
    pub fn new(params: &AcqParams, target_heading_deg: f64) -> Self {
        Self {
            params: params.rotate_to_heading.clone(),
            target_heading_deg,
            fb: FeedbackLoop::new(params.rotate_to_heading.filter_window),
            record: RecallRecord::new(ManeuverKind::Rotation),
        }
    }

    /// Create a rotation whose target heading is recalled from a previous rotation.
    pub fn from_recall(
        params: &AcqParams,
        record: &RecallRecord,
        method: RecallMethod,
    ) -> Result<Self, RecallError> {
        let target_heading_deg = record.apply(ManeuverKind::Rotation, method)?;

        Ok(Self::new(params, target_heading_deg))
    }

    pub fn init(&mut self) -> Result<(), AcqError> {
        self.record = RecallRecord::new(ManeuverKind::Rotation);

        let config = ControllerConfig {
            input_min: 0.0,
            input_max: FULL_TURN_DEG,
            continuous: true,
            ..self.params.ctrl
        };

        self.fb
            .start(config, rem_euclid(self.target_heading_deg, FULL_TURN_DEG))
    }

    pub fn step(
        &mut self,
        heading: &dyn HeadingSensor,
        drive: &mut dyn DriveActuator,
    ) -> Result<(), AcqError> {
        self.fb
            .observe(rem_euclid(heading.heading_deg(), FULL_TURN_DEG));

        let shaped = self.fb.step()?;
        drive.set_rotation(shaped);

        debug!("RotateToHeading: {:?}", self.fb.last_report());

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

    pub fn target_heading_deg(&self) -> f64 {
        self.target_heading_deg
    }
}

impl Recallable for RotateToHeading {
    fn recall_record(&self) -> &RecallRecord {
        &self.record
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Turntable {
        heading_deg: f64,
        rotation: f64,
    }

    impl HeadingSensor for Turntable {
        fn heading_deg(&self) -> f64 {
            self.heading_deg
        }
    }

    impl DriveActuator for Turntable {
        fn set_rotation(&mut self, rotation: f64) {
            self.rotation = rotation;
        }
        fn set_forward(&mut self, _: f64) {}
        fn stop(&mut self) {
            self.rotation = 0.0;
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

    /// Run the manoeuvre against a 90 deg/s turntable, returning the final heading.
    fn run(mnvr: &mut RotateToHeading, start_deg: f64) -> f64 {
        let mut table = Turntable {
            heading_deg: start_deg,
            rotation: 0.0,
        };

        mnvr.init().unwrap();

        for _ in 0..1000 {
            let sensor = FixedHeading(table.heading_deg);
            mnvr.step(&sensor, &mut table).unwrap();
            table.heading_deg += table.rotation * 90.0 * 0.02;

            if mnvr.is_settled() {
                let sensor = FixedHeading(table.heading_deg);
                mnvr.finalise(&mut table, &sensor);
                return table.heading_deg;
            }
        }

        panic!("RotateToHeading did not settle");
    }

    #[test]
    fn test_reverse_recall() {
        let params = params();

        let mut record = RecallRecord::new(ManeuverKind::Rotation);
        record.capture(30.0);

        let mut mnvr = RotateToHeading::from_recall(&params, &record, RecallMethod::Reverse)
            .unwrap();
        assert_eq!(mnvr.target_heading_deg(), -30.0);

        // Should turn left through zero rather than right the long way round
        let end = run(&mut mnvr, 30.0);
        assert!((end - -30.0).abs() <= 2.0, "ended at {}", end);
        assert!(mnvr.recall().is_some());
    }

    #[test]
    fn test_repeat_recall() {
        let params = params();

        let mut record = RecallRecord::new(ManeuverKind::Rotation);
        record.capture(45.0);

        let mut mnvr = RotateToHeading::from_recall(&params, &record, RecallMethod::Repeat)
            .unwrap();
        let end = run(&mut mnvr, 0.0);
        assert!((end - 45.0).abs() <= 2.0, "ended at {}", end);
    }

    #[test]
    fn test_recall_errors() {
        let params = params();

        let empty = RecallRecord::new(ManeuverKind::Rotation);
        assert!(matches!(
            RotateToHeading::from_recall(&params, &empty, RecallMethod::Repeat),
            Err(RecallError::NotAvailable)
        ));

        let mut distance = RecallRecord::new(ManeuverKind::Distance);
        distance.capture(8.0);
        assert!(matches!(
            RotateToHeading::from_recall(&params, &distance, RecallMethod::Repeat),
            Err(RecallError::KindMismatch { .. })
        ));
    }
}
