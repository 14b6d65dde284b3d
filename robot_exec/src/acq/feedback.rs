//! # Feedback loop
//!
//! Combines a [`MovingAverage`] filter and a [`PidController`] into the measurement to demand
//! chain shared by all acquisition manoeuvres.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;

use super::{
    controllers::{shape_output, ControllerConfig, ControllerOutput, PidController},
    filter::MovingAverage,
    AcqError,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A filtered, shaped feedback loop.
#[derive(Debug, Clone)]
pub struct FeedbackLoop {
    filter: MovingAverage,
    ctrl: PidController,
    min_effective_output: f64,
    last: LoopReport,
}

/// Values from the most recent step of a [`FeedbackLoop`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize)]
pub struct LoopReport {
    pub filtered: f64,
    pub error: f64,
    pub raw: f64,
    pub shaped: f64,
    pub on_target: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FeedbackLoop {
    pub fn new(filter_window: usize) -> Self {
        Self {
            filter: MovingAverage::new(filter_window),
            ctrl: PidController::new(),
            min_effective_output: 0.0,
            last: LoopReport::default(),
        }
    }

    /// Prepare the loop for a new manoeuvre.
    ///
    /// Clears the filter, applies the config to the controller and sets the target.
    pub fn start(&mut self, config: ControllerConfig, setpoint: f64) -> Result<(), AcqError> {
        self.filter.reset();
        self.ctrl.configure(config)?;
        self.ctrl.set_setpoint(setpoint);
        self.min_effective_output = config.min_effective_output;
        self.last = LoopReport::default();

        Ok(())
    }

    /// Add a new raw measurement to the filter.
    pub fn observe(&mut self, raw: f64) {
        self.filter.observe(raw);
    }

    /// Step the controller on the current filtered value, returning the shaped demand.
    pub fn step(&mut self) -> Result<f64, AcqError> {
        let filtered = self.filter.value();
        let ControllerOutput {
            error,
            raw,
            on_target,
        } = self.ctrl.step(filtered)?;
        let shaped = shape_output(raw, on_target, self.min_effective_output);

        self.last = LoopReport {
            filtered,
            error,
            raw,
            shaped,
            on_target,
        };

        Ok(shaped)
    }

    /// Prevent the current measurement from counting towards settling.
    pub fn suppress_settle(&mut self) {
        self.ctrl.clear_on_target();
    }

    pub fn is_settled(&self) -> bool {
        self.ctrl.is_settled()
    }

    pub fn last_report(&self) -> &LoopReport {
        &self.last
    }

    pub fn controller(&self) -> &PidController {
        &self.ctrl
    }
}
