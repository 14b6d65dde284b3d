//! # Feedback controllers module
//!
//! This module provides the PID controller used by the acquisition manoeuvres, along with the
//! output shaping applied by each manoeuvre to the controller's demand.
//!
//! The controller runs at the fixed cycle rate, so the integral and derivative terms are
//! accumulated per cycle rather than per second.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::AcqError;
use util::maths;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of consecutive on-target cycles which must be exceeded before the controller is
/// settled.
pub const ON_TARGET_THRESHOLD: u32 = 3;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Configuration of a [`PidController`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// Lowest expected measurement
    pub input_min: f64,

    /// Highest expected measurement
    pub input_max: f64,

    /// Lowest allowed output
    pub output_min: f64,

    /// Highest allowed output
    pub output_max: f64,

    /// If true the input range wraps around, so errors are taken along the shortest path.
    pub continuous: bool,

    /// Largest absolute error which is considered on target.
    pub on_target_tolerance: f64,

    /// Smallest absolute demand which still moves the actuator.
    pub min_effective_output: f64,
}

/// A PID controller
#[derive(Debug, Default, Clone, Serialize)]
pub struct PidController {
    /// The active configuration, `None` until configured
    config: Option<ControllerConfig>,

    /// Target value of the measurement
    setpoint: Option<f64>,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,

    /// Number of consecutive on-target cycles, saturating at `ON_TARGET_THRESHOLD + 1`
    on_target_count: u32,
}

/// Result of a single controller step.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize)]
pub struct ControllerOutput {
    /// Error after any continuous folding
    pub error: f64,

    /// Clamped PID output, before shaping
    pub raw: f64,

    /// True if the error is within the on-target tolerance
    pub on_target: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ControllerConfig {
    /// Check that the ranges and tolerances in the config are usable.
    pub fn validate(&self) -> Result<(), AcqError> {
        let values = [
            self.k_p,
            self.k_i,
            self.k_d,
            self.input_min,
            self.input_max,
            self.output_min,
            self.output_max,
            self.on_target_tolerance,
            self.min_effective_output,
        ];

        if values.iter().any(|v| !v.is_finite()) {
            return Err(AcqError::InvalidConfig("all values must be finite"));
        }
        if self.input_min >= self.input_max {
            return Err(AcqError::InvalidConfig("input_min must be less than input_max"));
        }
        if self.output_min >= self.output_max {
            return Err(AcqError::InvalidConfig("output_min must be less than output_max"));
        }
        if self.on_target_tolerance < 0.0 {
            return Err(AcqError::InvalidConfig("on_target_tolerance must not be negative"));
        }
        if self.min_effective_output < 0.0 {
            return Err(AcqError::InvalidConfig("min_effective_output must not be negative"));
        }

        Ok(())
    }
}

impl PidController {
    /// Create a new unconfigured controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration of the controller, which also resets its state.
    pub fn configure(&mut self, config: ControllerConfig) -> Result<(), AcqError> {
        config.validate()?;

        self.config = Some(config);
        self.reset();

        Ok(())
    }

    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = Some(setpoint);
    }

    /// Clear the accumulated state of the controller, keeping the configuration and setpoint.
    pub fn reset(&mut self) {
        self.prev_error = None;
        self.integral = 0.0;
        self.on_target_count = 0;
    }

    /// Restart the on-target debounce, used when the current measurement can't be trusted.
    pub fn clear_on_target(&mut self) {
        self.on_target_count = 0;
    }

    /// Step the controller with the given measurement.
    pub fn step(&mut self, measured: f64) -> Result<ControllerOutput, AcqError> {
        let config = self.config.ok_or(AcqError::NotConfigured)?;
        let setpoint = self.setpoint.ok_or(AcqError::NotConfigured)?;

        // Calculate the error, taking the shortest path on a continuous input
        let mut error = setpoint - measured;
        if config.continuous {
            error = maths::fold_continuous(error, config.input_min, config.input_max);
        }

        // Accumulate the integral term
        self.integral += error;

        // Calculate the derivative, on the first step there's no previous error so we assume no
        // derivative rather than producing a spike.
        let deriv = match self.prev_error {
            Some(e) => error - e,
            None => 0.0,
        };

        // Calculate the output
        let out = config.k_p * error + config.k_i * self.integral + config.k_d * deriv;
        let raw = maths::clamp(&out, &config.output_min, &config.output_max);

        // Remember the previous error
        self.prev_error = Some(error);

        // Debounce the on-target condition
        let on_target = error.abs() <= config.on_target_tolerance;
        if on_target {
            self.on_target_count = (self.on_target_count + 1).min(ON_TARGET_THRESHOLD + 1);
        } else {
            self.on_target_count = 0;
        }

        Ok(ControllerOutput {
            error,
            raw,
            on_target,
        })
    }

    /// True once the error has been on target for more than `ON_TARGET_THRESHOLD` steps.
    pub fn is_settled(&self) -> bool {
        self.on_target_count > ON_TARGET_THRESHOLD
    }

    pub fn on_target_count(&self) -> u32 {
        self.on_target_count
    }

    pub fn config(&self) -> Option<&ControllerConfig> {
        self.config.as_ref()
    }

    pub fn setpoint(&self) -> Option<f64> {
        self.setpoint
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Shape a raw controller output for the actuator.
///
/// On target the output is zeroed, otherwise any non-zero demand smaller than
/// `min_effective_output` is raised to that magnitude so the actuator overcomes its deadband.
pub fn shape_output(raw: f64, on_target: bool, min_effective_output: f64) -> f64 {
    if on_target {
        0.0
    } else if raw != 0.0 && raw.abs() < min_effective_output {
        min_effective_output.copysign(raw)
    } else {
        raw
    }
}
