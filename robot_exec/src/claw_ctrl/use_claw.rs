//! # Use claw manoeuvre

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::claw::ClawState;
use log::{debug, warn};

use super::Params;
use crate::eqpt::{ClawMotor, RangeSensor};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Run the claw intake in a given state.
///
/// A grab finishes once an object is held, any other state runs until the timeout. This
/// manoeuvre has no recall value.
#[derive(Debug, Clone)]
pub struct UseClaw {
    state: ClawState,
    holding_range_in: f64,
    timeout_s: f64,
    elapsed_s: f64,
    holding: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl UseClaw {
    pub fn new(params: &Params, state: ClawState) -> Self {
        Self {
            state,
            holding_range_in: params.holding_range_in,
            timeout_s: params.grab_timeout_s,
            elapsed_s: 0.0,
            holding: false,
        }
    }

    pub fn init(&mut self, claw: &mut dyn ClawMotor) {
        self.elapsed_s = 0.0;
        self.holding = false;

        claw.set_speed(self.state.speed());
    }

    pub fn step(&mut self, claw: &mut dyn ClawMotor, lidar: &dyn RangeSensor, dt_s: f64) {
        claw.set_speed(self.state.speed());

        self.elapsed_s += dt_s;

        if self.state == ClawState::Grab && lidar.range_in() <= self.holding_range_in {
            debug!("UseClaw: object held after {:.02} s", self.elapsed_s);
            self.holding = true;
        }

        if self.timed_out() && !self.holding && self.state == ClawState::Grab {
            warn!("UseClaw: grab timed out after {:.02} s", self.elapsed_s);
        }
    }

    pub fn is_settled(&self) -> bool {
        self.holding || self.timed_out()
    }

    /// Stop the intake.
    pub fn finalise(&mut self, claw: &mut dyn ClawMotor) {
        claw.set_speed(0.0);
    }

    pub fn timed_out(&self) -> bool {
        self.elapsed_s >= self.timeout_s
    }

    pub fn is_holding(&self) -> bool {
        self.holding
    }

    pub fn state(&self) -> ClawState {
        self.state
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Default)]
    struct Motor(f64);

    impl ClawMotor for Motor {
        fn set_speed(&mut self, speed: f64) {
            self.0 = speed;
        }
    }

    struct FixedRange(f64);

    impl RangeSensor for FixedRange {
        fn range_in(&self) -> f64 {
            self.0
        }
    }

    fn params() -> Params {
        Params {
            holding_range_in: 6.0,
            fine_align_px: 20.0,
            grab_timeout_s: 1.0,
        }
    }

    #[test]
    fn test_grab_until_held() {
        let mut motor = Motor::default();
        let mut mnvr = UseClaw::new(&params(), ClawState::Grab);

        mnvr.init(&mut motor);
        assert_eq!(motor.0, 1.0);

        mnvr.step(&mut motor, &FixedRange(10.0), 0.02);
        assert!(!mnvr.is_settled());

        mnvr.step(&mut motor, &FixedRange(6.0), 0.02);
        assert!(mnvr.is_settled());
        assert!(mnvr.is_holding());

        mnvr.finalise(&mut motor);
        assert_eq!(motor.0, 0.0);
    }

    #[test]
    fn test_timeout() {
        let mut motor = Motor::default();
        let mut mnvr = UseClaw::new(&params(), ClawState::SlowEject);

        mnvr.init(&mut motor);
        assert_eq!(motor.0, -0.4);

        // Ejecting never counts as holding
        for _ in 0..49 {
            mnvr.step(&mut motor, &FixedRange(2.0), 0.02);
            assert!(!mnvr.is_settled());
        }
        mnvr.step(&mut motor, &FixedRange(2.0), 0.02);
        mnvr.step(&mut motor, &FixedRange(2.0), 0.02);
        assert!(mnvr.is_settled());
        assert!(!mnvr.is_holding());
    }
}
