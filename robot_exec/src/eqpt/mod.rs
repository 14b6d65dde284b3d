//! # Equipment interfaces
//!
//! The control core never talks to hardware directly. Each sensor and actuator it needs is
//! described by a trait in this module, and the executable injects concrete implementations
//! through the [`Eqpt`] bundle. Manoeuvres are only ever handed the specific handles they use.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{
    claw::LedColour,
    sens::{SensorSnapshot, VisionReading},
};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Vision sensor tracking the largest target in view.
pub trait VisionSensor {
    /// Get the latest reading from the sensor.
    fn reading(&self) -> VisionReading;
}

/// A distance sensor, either the time of flight lidar or the ultrasonic sensor.
pub trait RangeSensor {
    /// Distance to the nearest object in front of the sensor.
    ///
    /// Units: inches
    fn range_in(&self) -> f64;

    /// Operator feedback intensity derived from the range, between 0 and 1.
    fn rumble(&self) -> f64 {
        0.0
    }
}

/// Absolute heading sensor (gyro).
pub trait HeadingSensor {
    /// Accumulated heading, positive when turning right.
    ///
    /// Units: degrees
    fn heading_deg(&self) -> f64;
}

/// The drive train.
pub trait DriveActuator {
    /// Set the normalised rotation demand, positive turning right.
    fn set_rotation(&mut self, rotation: f64);

    /// Set the normalised forward demand, positive driving forwards.
    fn set_forward(&mut self, forward: f64);

    /// Zero all drive demands.
    fn stop(&mut self);
}

/// The claw intake motors.
pub trait ClawMotor {
    /// Set the normalised intake speed, positive pulling an object in.
    fn set_speed(&mut self, speed: f64);
}

/// Indicator LEDs on the claw.
pub trait IndicatorSink {
    fn set_colour(&mut self, colour: LedColour);
}

/// Operator haptic feedback.
pub trait HapticSink {
    /// Set the intensity, between 0 and 1.
    fn set_intensity(&mut self, intensity: f64);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Bundle of all equipment handles used by the executable.
pub struct Eqpt {
    pub vision: Box<dyn VisionSensor>,
    pub lidar: Box<dyn RangeSensor>,
    pub ultrasonic: Box<dyn RangeSensor>,
    pub heading: Box<dyn HeadingSensor>,
    pub drive: Box<dyn DriveActuator>,
    pub claw: Box<dyn ClawMotor>,
    pub indicator: Box<dyn IndicatorSink>,
    pub haptic: Box<dyn HapticSink>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Eqpt {
    /// Read all sensors into a snapshot.
    pub fn snapshot(&self) -> SensorSnapshot {
        let vision = self.vision.reading();

        SensorSnapshot {
            lidar_range_in: self.lidar.range_in(),
            lidar_rumble: self.lidar.rumble(),
            vision_offset_px: vision.offset_px,
            vision_in_range: vision.in_range,
            vision_recent: vision.is_recent,
            ultrasonic_range_in: self.ultrasonic.range_in(),
        }
    }
}
