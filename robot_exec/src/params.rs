//! # Robot Executable Parameters
//!
//! This module provide parameters for the robot executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotExecParams {
    /// Target period of one cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Number of cycles between repeated warnings about consecutive cycle overruns.
    pub overrun_warn_period_cycles: u64,

    /// If true a report of every cycle is written to the session archive.
    pub archive_tick_reports: bool,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_params_file() {
        let params: RobotExecParams = util::params::from_str(
            include_str!("../../params/robot_exec.toml")
        ).unwrap();

        assert_eq!(params.cycle_period_s, 0.02);
        assert!(params.overrun_warn_period_cycles > 0);
    }
}
