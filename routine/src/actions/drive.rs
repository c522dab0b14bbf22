//! Drive-base actions: issue one target, then wait for the base to settle.

use std::collections::BTreeSet;

use tracing::warn;

use crate::actions::{Action, fmt_num};
use crate::core::types::{Crossing, Resource};
use crate::io::hardware::Robot;

fn drive_only() -> BTreeSet<Resource> {
    BTreeSet::from([Resource::DriveBase])
}

fn stop_interrupted(robot: &mut dyn Robot, name: &str, reason: &str) {
    robot.drive().stop();
    warn!(action = %name, reason, "drive action interrupted");
}

/// Encoder drive of a fixed distance. A zero distance settles on the first step.
#[derive(Debug, Clone)]
pub struct DriveDistance {
    speed: f64,
    distance: f64,
    on_target: bool,
}

impl DriveDistance {
    pub fn new(speed: f64, distance: f64) -> Self {
        Self {
            speed,
            distance,
            on_target: false,
        }
    }
}

impl Action for DriveDistance {
    fn name(&self) -> String {
        format!(
            "DriveDistance({}, {})",
            fmt_num(self.speed),
            fmt_num(self.distance)
        )
    }

    fn requirements(&self) -> BTreeSet<Resource> {
        drive_only()
    }

    fn initialize(&mut self, robot: &mut dyn Robot) {
        self.on_target = false;
        robot.drive().drive_distance(self.speed, self.distance);
    }

    fn step(&mut self, robot: &mut dyn Robot) {
        self.on_target = robot.drive().on_target();
    }

    fn is_finished(&self) -> bool {
        self.on_target
    }

    fn end(&mut self, robot: &mut dyn Robot) {
        robot.drive().stop();
    }

    fn interrupted(&mut self, robot: &mut dyn Robot, reason: &str) {
        stop_interrupted(robot, &self.name(), reason);
    }
}

/// Relative in-place turn.
#[derive(Debug, Clone)]
pub struct Turn {
    degrees: f64,
    on_target: bool,
}

impl Turn {
    pub fn new(degrees: f64) -> Self {
        Self {
            degrees,
            on_target: false,
        }
    }
}

impl Action for Turn {
    fn name(&self) -> String {
        format!("Turn({}°)", fmt_num(self.degrees))
    }

    fn requirements(&self) -> BTreeSet<Resource> {
        drive_only()
    }

    fn initialize(&mut self, robot: &mut dyn Robot) {
        self.on_target = false;
        robot.drive().turn(self.degrees);
    }

    fn step(&mut self, robot: &mut dyn Robot) {
        self.on_target = robot.drive().on_target();
    }

    fn is_finished(&self) -> bool {
        self.on_target
    }

    fn end(&mut self, robot: &mut dyn Robot) {
        robot.drive().stop();
    }

    fn interrupted(&mut self, robot: &mut dyn Robot, reason: &str) {
        stop_interrupted(robot, &self.name(), reason);
    }
}

/// Crossing of one field defense.
///
/// The physical strategy for each defense belongs to the drive base; this
/// action only starts it and waits for it to report done.
#[derive(Debug, Clone)]
pub struct CrossDefense {
    crossing: Crossing,
    crossed: bool,
}

impl CrossDefense {
    pub fn new(crossing: Crossing) -> Self {
        Self {
            crossing,
            crossed: false,
        }
    }
}

impl Action for CrossDefense {
    fn name(&self) -> String {
        format!("Cross({})", self.crossing)
    }

    fn requirements(&self) -> BTreeSet<Resource> {
        drive_only()
    }

    fn initialize(&mut self, robot: &mut dyn Robot) {
        self.crossed = false;
        robot.drive().cross(self.crossing);
    }

    fn step(&mut self, robot: &mut dyn Robot) {
        self.crossed = robot.drive().on_target();
    }

    fn is_finished(&self) -> bool {
        self.crossed
    }

    fn end(&mut self, robot: &mut dyn Robot) {
        robot.drive().stop();
    }

    fn interrupted(&mut self, robot: &mut dyn Robot, reason: &str) {
        stop_interrupted(robot, &self.name(), reason);
    }
}
