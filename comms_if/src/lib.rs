//! # Communications interface crate.
//!
//! Provides the interface types shared between the robot executable, its equipment and the
//! telecommand sources.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod tc;

/// Data definitions for equipment (sensors, actuators and indicators)
pub mod eqpt;
