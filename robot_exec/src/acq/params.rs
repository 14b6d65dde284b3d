//! Parameters structure for the acquisition manoeuvres

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::controllers::ControllerConfig;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the acquisition manoeuvres.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AcqParams {
    /// Number of cycles between repeated warnings about stale sensor readings.
    pub stale_warn_period_cycles: u64,

    pub rotate_to_target: RotateToTargetParams,

    pub drive_to_range: DriveToRangeParams,

    pub rotate_to_heading: RotateToHeadingParams,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RotateToTargetParams {
    /// Horizontal resolution of the vision camera.
    ///
    /// The controller's input range is set to half of this either side of the image centre, the
    /// values in `ctrl` are overwritten.
    ///
    /// Units: pixels
    pub camera_width_px: f64,

    /// Number of samples in the offset filter.
    pub filter_window: usize,

    pub ctrl: ControllerConfig,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DriveToRangeParams {
    /// Range used when a drive is started without a target, for example by a routine.
    ///
    /// Units: inches
    pub default_target_range_in: f64,

    /// Number of samples in the range filter.
    pub filter_window: usize,

    pub ctrl: ControllerConfig,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RotateToHeadingParams {
    /// Number of samples in the heading filter.
    ///
    /// Headings are averaged without unwrapping, so this should be kept at 1 unless the turn never
    /// crosses north.
    pub filter_window: usize,

    /// The input range is always set to [0, 360) and made continuous.
    pub ctrl: ControllerConfig,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_params_file() {
        let params: AcqParams = util::params::from_str(
            include_str!("../../../params/acq.toml")
        ).unwrap();

        params.rotate_to_target.ctrl.validate().unwrap();
        params.drive_to_range.ctrl.validate().unwrap();
        params.rotate_to_heading.ctrl.validate().unwrap();

        assert!(params.rotate_to_target.camera_width_px > 0.0);
        assert!(params.drive_to_range.default_target_range_in > 0.0);
    }
}
