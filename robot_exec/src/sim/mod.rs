//! # Kinematic simulation
//!
//! A minimal stand-in for the robot's equipment, used to close the control loop when running the
//! executable without hardware, and in tests and benchmarks. The robot turns and drives at a rate
//! proportional to its demands, and a single target (the cube) sits at a fixed bearing and a
//! range which closes as the robot drives forwards or the running intake pulls it in.
//!
//! This isn't a physics simulation. Range does not depend on heading and there's no sensor noise.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

use serde::{Deserialize, Serialize};

use comms_if::eqpt::{claw::LedColour, sens::VisionReading};
use util::maths::{clamp, fold_continuous, lin_map};

use crate::eqpt::{
    ClawMotor, DriveActuator, Eqpt, HapticSink, HeadingSensor, IndicatorSink, RangeSensor,
    VisionSensor,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the simulated world.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SimParams {
    /// Turn rate at a rotation demand of 1.
    ///
    /// Units: degrees/second
    pub turn_rate_dps: f64,

    /// Drive speed at a forward demand of 1.
    ///
    /// Units: inches/second
    pub drive_speed_ips: f64,

    /// Units: pixels
    pub camera_width_px: f64,

    /// Horizontal field of view of the camera.
    ///
    /// Units: degrees
    pub camera_fov_deg: f64,

    /// The vision sensor reports the target in range when closer than this.
    ///
    /// Units: inches
    pub coarse_range_in: f64,

    /// Units: degrees
    pub initial_heading_deg: f64,

    /// Absolute bearing of the target from the robot.
    ///
    /// Units: degrees
    pub target_bearing_deg: f64,

    /// Units: inches
    pub initial_range_in: f64,

    /// A running intake pulls in a target closer than this.
    ///
    /// Units: inches
    pub intake_range_in: f64,

    /// Rate at which the intake pulls in the target at full speed.
    ///
    /// Units: inches/second
    pub intake_rate_ips: f64,

    /// Closest the target can get to the range sensor.
    ///
    /// Units: inches
    pub min_range_in: f64,

    /// Range at which haptic feedback starts, rising to full at `min_range_in`.
    ///
    /// Units: inches
    pub rumble_range_in: f64,
}

/// State of the simulated world.
#[derive(Debug, Clone)]
pub struct SimWorld {
    params: SimParams,

    heading_deg: f64,
    range_in: f64,

    rotation: f64,
    forward: f64,
    claw_speed: f64,

    led: LedColour,
    haptic: f64,
}

/// Shared handle to a [`SimWorld`], implementing all equipment traits.
#[derive(Debug, Clone)]
pub struct SimHandle(Rc<RefCell<SimWorld>>);

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimWorld {
    pub fn new(params: SimParams) -> Self {
        Self {
            heading_deg: params.initial_heading_deg,
            range_in: params.initial_range_in,
            rotation: 0.0,
            forward: 0.0,
            claw_speed: 0.0,
            led: LedColour::OFF,
            haptic: 0.0,
            params,
        }
    }

    /// Advance the world by `dt_s` seconds using the current demands.
    pub fn step(&mut self, dt_s: f64) {
        self.heading_deg += self.rotation * self.params.turn_rate_dps * dt_s;
        self.range_in -= self.forward * self.params.drive_speed_ips * dt_s;

        if self.claw_speed > 0.0 && self.range_in <= self.params.intake_range_in {
            self.range_in -= self.claw_speed * self.params.intake_rate_ips * dt_s;
        }

        self.range_in = self.range_in.max(self.params.min_range_in);
    }

    /// Bearing of the target relative to the robot's heading, positive to the right.
    ///
    /// Units: degrees
    pub fn relative_bearing_deg(&self) -> f64 {
        fold_continuous(
            self.params.target_bearing_deg - self.heading_deg,
            -180.0,
            180.0,
        )
    }

    pub fn vision_reading(&self) -> VisionReading {
        let half_width_px = self.params.camera_width_px / 2.0;
        let rel_deg = self.relative_bearing_deg();

        let offset_px = clamp(
            &(rel_deg * self.params.camera_width_px / self.params.camera_fov_deg),
            &-half_width_px,
            &half_width_px,
        );
        let in_view = rel_deg.abs() <= self.params.camera_fov_deg / 2.0;

        VisionReading {
            offset_px,
            in_range: in_view && self.range_in <= self.params.coarse_range_in,
            is_recent: true,
        }
    }

    pub fn rumble(&self) -> f64 {
        let rumble = lin_map(
            (self.params.rumble_range_in, self.params.min_range_in),
            (0.0, 1.0),
            self.range_in,
        );

        clamp(&rumble, &0.0, &1.0)
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn heading_deg(&self) -> f64 {
        self.heading_deg
    }

    pub fn range_in(&self) -> f64 {
        self.range_in
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn forward(&self) -> f64 {
        self.forward
    }

    pub fn claw_speed(&self) -> f64 {
        self.claw_speed
    }

    pub fn led(&self) -> LedColour {
        self.led
    }

    pub fn haptic(&self) -> f64 {
        self.haptic
    }
}

impl SimHandle {
    pub fn new(world: SimWorld) -> Self {
        Self(Rc::new(RefCell::new(world)))
    }

    /// Build an equipment bundle where every handle refers to this world.
    pub fn eqpt(&self) -> Eqpt {
        Eqpt {
            vision: Box::new(self.clone()),
            lidar: Box::new(self.clone()),
            ultrasonic: Box::new(self.clone()),
            heading: Box::new(self.clone()),
            drive: Box::new(self.clone()),
            claw: Box::new(self.clone()),
            indicator: Box::new(self.clone()),
            haptic: Box::new(self.clone()),
        }
    }

    pub fn step(&self, dt_s: f64) {
        self.0.borrow_mut().step(dt_s);
    }

    pub fn world(&self) -> Ref<'_, SimWorld> {
        self.0.borrow()
    }

    pub fn world_mut(&self) -> RefMut<'_, SimWorld> {
        self.0.borrow_mut()
    }
}

impl VisionSensor for SimHandle {
    fn reading(&self) -> VisionReading {
        self.0.borrow().vision_reading()
    }
}

impl RangeSensor for SimHandle {
    fn range_in(&self) -> f64 {
        self.0.borrow().range_in
    }

    fn rumble(&self) -> f64 {
        self.0.borrow().rumble()
    }
}

impl HeadingSensor for SimHandle {
    fn heading_deg(&self) -> f64 {
        self.0.borrow().heading_deg
    }
}

impl DriveActuator for SimHandle {
    fn set_rotation(&mut self, rotation: f64) {
        self.0.borrow_mut().rotation = clamp(&rotation, &-1.0, &1.0);
    }

    fn set_forward(&mut self, forward: f64) {
        self.0.borrow_mut().forward = clamp(&forward, &-1.0, &1.0);
    }

    fn stop(&mut self) {
        let mut world = self.0.borrow_mut();
        world.rotation = 0.0;
        world.forward = 0.0;
    }
}

impl ClawMotor for SimHandle {
    fn set_speed(&mut self, speed: f64) {
        self.0.borrow_mut().claw_speed = clamp(&speed, &-1.0, &1.0);
    }
}

impl IndicatorSink for SimHandle {
    fn set_colour(&mut self, colour: LedColour) {
        self.0.borrow_mut().led = colour;
    }
}

impl HapticSink for SimHandle {
    fn set_intensity(&mut self, intensity: f64) {
        self.0.borrow_mut().haptic = intensity;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn params() -> SimParams {
        util::params::from_str(include_str!("../../../params/sim.toml")).unwrap()
    }

    #[test]
    fn test_vision_geometry() {
        let mut world = SimWorld::new(params());
        world.heading_deg = 0.0;

        // 30 deg right, 320 px over 75 deg
        let reading = world.vision_reading();
        assert!((reading.offset_px - 128.0).abs() < 1e-9);
        assert!(!reading.in_range);

        // Target behind the robot saturates the offset
        world.heading_deg = 200.0;
        let reading = world.vision_reading();
        assert_eq!(reading.offset_px, -160.0);
        assert!(!reading.in_range);

        world.heading_deg = 30.0;
        world.range_in = 10.0;
        let reading = world.vision_reading();
        assert_eq!(reading.offset_px, 0.0);
        assert!(reading.in_range);
    }

    #[test]
    fn test_kinematics() {
        let sim = SimHandle::new(SimWorld::new(params()));
        let mut eqpt = sim.eqpt();

        eqpt.drive.set_rotation(0.5);
        eqpt.drive.set_forward(1.0);
        sim.step(0.1);

        assert!((eqpt.heading.heading_deg() - 4.5).abs() < 1e-9);
        assert!((eqpt.lidar.range_in() - 30.0).abs() < 1e-9);

        eqpt.drive.stop();
        sim.step(0.1);
        assert!((eqpt.lidar.range_in() - 30.0).abs() < 1e-9);

        // Intake only pulls in close targets
        eqpt.claw.set_speed(1.0);
        sim.step(1.0);
        assert!((eqpt.lidar.range_in() - 30.0).abs() < 1e-9);

        sim.world_mut().range_in = 9.0;
        sim.step(1.0);
        assert!((eqpt.lidar.range_in() - 6.0).abs() < 1e-9);

        // Never closer than the minimum
        sim.step(10.0);
        assert_eq!(eqpt.lidar.range_in(), 4.0);
        assert_eq!(eqpt.lidar.rumble(), 1.0);
    }

    #[test]
    fn test_outputs() {
        let sim = SimHandle::new(SimWorld::new(params()));
        let mut eqpt = sim.eqpt();

        eqpt.indicator.set_colour(LedColour::HOLDING);
        eqpt.haptic.set_intensity(0.25);

        assert_eq!(sim.world().led(), LedColour::HOLDING);
        assert_eq!(sim.world().haptic(), 0.25);
    }
}
