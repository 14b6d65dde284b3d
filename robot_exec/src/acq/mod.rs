//! # Acquisition module
//!
//! Closed loop manoeuvres which bring the robot onto a target:
//!
//! - [`RotateToTarget`] - turn until the vision target is centred in the camera image.
//! - [`DriveToRange`] - drive until the time of flight range reaches a target distance.
//! - [`RotateToHeading`] - turn to an absolute gyro heading, usually one recalled from an earlier
//!   rotation.
//!
//! Each manoeuvre feeds its sensor through a [`FeedbackLoop`] once per cycle and, when finished,
//! captures its final measurement in a [`RecallRecord`].

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod controllers;
mod drive_to_range;
pub mod feedback;
pub mod filter;
mod params;
pub mod recall;
mod rotate_to_heading;
mod rotate_to_target;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use self::{
    drive_to_range::DriveToRange,
    feedback::FeedbackLoop,
    params::{AcqParams, DriveToRangeParams, RotateToHeadingParams, RotateToTargetParams},
    recall::{ManeuverKind, RecallError, RecallRecord, RecallRegistry, Recallable},
    rotate_to_heading::RotateToHeading,
    rotate_to_target::RotateToTarget,
};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur in the acquisition manoeuvres.
#[derive(Debug, thiserror::Error)]
pub enum AcqError {
    #[error("The controller was stepped before being configured and given a setpoint")]
    NotConfigured,

    #[error("Invalid controller config: {0}")]
    InvalidConfig(&'static str),

    #[error("The sensor reading has not been refreshed since the last cycle")]
    StaleSensor,
}
