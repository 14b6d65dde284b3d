//! Parameters structure for claw control

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for claw control.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Params {
    /// An object closer than this to the time of flight sensor is held by the claw.
    ///
    /// Units: inches
    pub holding_range_in: f64,

    /// Largest target offset which is considered finely aligned.
    ///
    /// Units: pixels
    pub fine_align_px: f64,

    /// Time after which a `UseClaw` manoeuvre gives up.
    ///
    /// Units: seconds
    pub grab_timeout_s: f64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_params_file() {
        let params: Params = util::params::from_str(
            include_str!("../../../params/claw_ctrl.toml")
        ).unwrap();

        assert_eq!(params.holding_range_in, 6.0);
        assert_eq!(params.fine_align_px, 20.0);
        assert!(params.grab_timeout_s > 0.0);
    }
}
