//! # Claw Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Colour of the claw indicator LEDs.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct LedColour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Direct states of the claw intake.
///
/// Each state maps to a fixed signed speed of the intake motors, positive pulling an object in.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClawState {
    Grab,
    Eject,
    Stop,
    SlowEject,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LedColour {
    /// All LEDs off
    pub const OFF: LedColour = LedColour::new(0, 0, 0);

    /// An object is held in the claw
    pub const HOLDING: LedColour = LedColour::new(0, 255, 0);

    /// The target is centred in the vision sensor's view
    pub const FINE_ALIGNED: LedColour = LedColour::new(255, 0, 255);

    /// The target is within range of an automatic pickup
    pub const COARSE_ALIGNED: LedColour = LedColour::new(255, 161, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Get the PWM duty cycles of the `[r, g, b]` LED channels, each between 0 and 1.
    pub fn duty_cycles(&self) -> [f64; 3] {
        [
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        ]
    }

    pub fn is_off(&self) -> bool {
        *self == Self::OFF
    }
}

impl ClawState {
    /// The normalised intake speed associated with this state.
    pub fn speed(&self) -> f64 {
        match self {
            ClawState::Grab => 1.0,
            ClawState::Eject => -1.0,
            ClawState::Stop => 0.0,
            ClawState::SlowEject => -0.4,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_claw_state_speeds() {
        assert_eq!(ClawState::Grab.speed(), 1.0);
        assert_eq!(ClawState::Eject.speed(), -1.0);
        assert_eq!(ClawState::Stop.speed(), 0.0);
        assert_eq!(ClawState::SlowEject.speed(), -0.4);
    }

    #[test]
    fn test_duty_cycles() {
        assert_eq!(LedColour::HOLDING.duty_cycles(), [0.0, 1.0, 0.0]);
        assert_eq!(LedColour::OFF.duty_cycles(), [0.0, 0.0, 0.0]);
        assert!(LedColour::OFF.is_off());
        assert!(!LedColour::COARSE_ALIGNED.is_off());
    }
}
