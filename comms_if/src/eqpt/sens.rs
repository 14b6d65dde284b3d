//! # Sensor Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single reading from the vision sensor.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq)]
pub struct VisionReading {
    /// Horizontal offset of the largest target from the centre of the image.
    ///
    /// Positive to the right of centre.
    ///
    /// Units: pixels
    pub offset_px: f64,

    /// True if the target is close enough to be picked up automatically.
    pub in_range: bool,

    /// True if this reading was refreshed since the last cycle.
    pub is_recent: bool,
}

/// Snapshot of all sensors read at the start of a cycle.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq)]
pub struct SensorSnapshot {
    /// Time of flight distance to the object in front of the claw.
    ///
    /// Units: inches
    pub lidar_range_in: f64,

    /// Operator feedback intensity derived from the time of flight distance, between 0 and 1.
    pub lidar_rumble: f64,

    /// Horizontal offset of the target from the image centre.
    ///
    /// Units: pixels
    pub vision_offset_px: f64,

    /// The vision sensor reports the target within automatic pickup range.
    pub vision_in_range: bool,

    /// The vision reading was refreshed since the last cycle.
    pub vision_recent: bool,

    /// Acoustic distance to the object in front of the claw.
    ///
    /// Units: inches
    pub ultrasonic_range_in: f64,
}
