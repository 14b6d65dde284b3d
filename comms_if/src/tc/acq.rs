//! # Acquisition Telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command that can be performed by the acquisition system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcqCmd {
    /// Turn to centre the vision target.
    RotateToTarget,

    /// Drive until the time of flight range reaches the given distance.
    DriveToRange { target_range_in: f64 },

    /// Run the full approach: align, close the distance and grab in parallel.
    GetCube,

    /// Turn using the heading captured by the most recent rotation manoeuvre.
    RecallRotation { method: RecallMethod },

    /// Cancel all running manoeuvres and routines.
    Abort,
}

/// How a recalled value is reused by a later manoeuvre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecallMethod {
    /// Use the negated value, undoing the recalled manoeuvre.
    Reverse,

    /// Use the value as it was recorded.
    Repeat,
}
