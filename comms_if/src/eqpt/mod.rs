//! # Equipment Interface
//!
//! This module defines the data exchanged between the control software and the equipment drivers.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod claw;
pub mod sens;

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

/// IDs of the physical actuators which can be owned by a manoeuvre.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum ActId {
    /// The drive train (both sides, rotation and forward demands)
    Drive,

    /// The claw intake motors (leader and follower)
    Claw,
}
