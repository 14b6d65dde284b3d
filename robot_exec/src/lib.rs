//! # Robot library.
//!
//! This library allows other crates in the workspace, and the benchmarks, to access items defined
//! inside the robot crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Acquisition module - closed loop manoeuvres which bring the robot onto a target
pub mod acq;

/// Approach routines - multi stage autonomous behaviours built from manoeuvres
pub mod approach;

/// Claw control module - claw indicator, haptic feedback and intake control
pub mod claw_ctrl;

/// Control cycle - processing performed once per cycle
pub mod cycle;

/// Global data store
pub mod data_store;

/// Equipment interfaces - sensor and actuator traits
pub mod eqpt;

/// Manoeuvre manager - actuator ownership, preemption and recall
pub mod mnvr_mgr;

/// Executable parameters
pub mod params;

/// Kinematic simulation - stand-in equipment for running without hardware
pub mod sim;

/// Telecommand processor - executes TCs from any source
pub mod tc_processor;
