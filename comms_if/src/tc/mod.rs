//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications interface. Telecommands
//! are the instructions sent to the robot by the operator, either live or from a script.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod acq;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal
use crate::eqpt::claw::ClawState;
use self::acq::AcqCmd;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand.
///
/// In JSON form the variant is given by the `type` field and any data by the `payload` field, for
/// example `{"type": "CLAW", "payload": "GRAB"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tc {
    /// Leave the disabled mode, allowing actuators to move.
    Enable,

    /// Enter the disabled mode, cancelling all running manoeuvres.
    Disable,

    /// Directly set the state of the claw, overriding any manoeuvre using it.
    Claw(ClawState),

    /// Command the acquisition system.
    Acq(AcqCmd),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use super::acq::RecallMethod;

    #[test]
    fn test_parse_unit_tcs() {
        assert_eq!(Tc::from_json(r#"{"type": "ENABLE"}"#).unwrap(), Tc::Enable);
        assert_eq!(Tc::from_json(r#"{"type": "DISABLE"}"#).unwrap(), Tc::Disable);
    }

    #[test]
    fn test_parse_payload_tcs() {
        assert_eq!(
            Tc::from_json(r#"{"type": "CLAW", "payload": "SLOW_EJECT"}"#).unwrap(),
            Tc::Claw(ClawState::SlowEject)
        );
        assert_eq!(
            Tc::from_json(r#"{"type": "ACQ", "payload": "GET_CUBE"}"#).unwrap(),
            Tc::Acq(AcqCmd::GetCube)
        );
        assert_eq!(
            Tc::from_json(
                r#"{"type": "ACQ", "payload": {"DRIVE_TO_RANGE": {"target_range_in": 8.0}}}"#
            )
            .unwrap(),
            Tc::Acq(AcqCmd::DriveToRange { target_range_in: 8.0 })
        );
        assert_eq!(
            Tc::from_json(
                r#"{"type": "ACQ", "payload": {"RECALL_ROTATION": {"method": "REVERSE"}}}"#
            )
            .unwrap(),
            Tc::Acq(AcqCmd::RecallRotation { method: RecallMethod::Reverse })
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Tc::from_json("not json").is_err());
        assert!(Tc::from_json(r#"{"type": "FLY"}"#).is_err());
        assert!(Tc::from_json(r#"{"type": "CLAW"}"#).is_err());
    }
}
