//! # Claw control module
//!
//! Claw control derives the claw's indicator colour and the operator's haptic feedback from the
//! sensors each cycle, and provides direct control of the claw intake. The [`UseClaw`] manoeuvre
//! runs the intake autonomously as part of a routine.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
mod state;
mod use_claw;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use params::Params;
pub use state::*;
pub use use_claw::UseClaw;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur in claw control.
#[derive(Debug, thiserror::Error)]
pub enum ClawCtrlError {
    #[error("Failed to load the claw control parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Failed to create the claw control archive: {0}")]
    ArchiveInitError(util::archive::ArchiveError),

    #[error("Claw control was processed before being initialised")]
    NotInitialised,
}
