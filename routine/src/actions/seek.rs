//! Target-seeking high-goal shot.

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::actions::{Action, AutoShoot};
use crate::core::types::Resource;
use crate::io::hardware::Robot;

/// Heading error (degrees) considered aligned with the goal.
pub const AIM_TOLERANCE_DEGREES: f64 = 2.0;

/// Spin-up plus feed time once aligned.
pub const HIGH_GOAL_SHOT_SECS: f64 = 2.0;

/// Time allowed to find and align with a target before giving up.
pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
enum Phase {
    Idle,
    Seeking { deadline: u64, turning: bool },
    Firing(AutoShoot),
    Done,
}

/// Turn toward the vision target until aligned, then fire a timed shot.
///
/// If no aligned target is found within [`SEARCH_TIMEOUT`] the action finishes
/// without firing.
#[derive(Debug, Clone)]
pub struct FindTarget {
    search_timeout: Duration,
    shot_secs: f64,
    phase: Phase,
}

impl Default for FindTarget {
    fn default() -> Self {
        Self::new(SEARCH_TIMEOUT, HIGH_GOAL_SHOT_SECS)
    }
}

impl FindTarget {
    pub fn new(search_timeout: Duration, shot_secs: f64) -> Self {
        Self {
            search_timeout,
            shot_secs,
            phase: Phase::Idle,
        }
    }

    /// True once the embedded shot has started.
    pub fn fired(&self) -> bool {
        matches!(self.phase, Phase::Firing(_))
    }

    fn seek(&self, robot: &mut dyn Robot, deadline: u64, turning: bool) -> Phase {
        if robot.now_micros() >= deadline {
            warn!(action = "FindTarget", "no target found before timeout");
            return Phase::Done;
        }
        if turning && !robot.drive().on_target() {
            return Phase::Seeking { deadline, turning };
        }

        match robot.targeting().target_offset() {
            Some(offset) if offset.abs() <= AIM_TOLERANCE_DEGREES => {
                robot.drive().stop();
                info!(offset, "target aligned, firing");
                let mut shot = AutoShoot::new(self.shot_secs);
                shot.initialize(robot);
                Phase::Firing(shot)
            }
            Some(offset) => {
                debug!(offset, "turning toward target");
                robot.drive().turn(offset);
                Phase::Seeking {
                    deadline,
                    turning: true,
                }
            }
            None => Phase::Seeking {
                deadline,
                turning: false,
            },
        }
    }
}

impl Action for FindTarget {
    fn name(&self) -> String {
        "FindTarget".to_string()
    }

    fn requirements(&self) -> BTreeSet<Resource> {
        BTreeSet::from([
            Resource::DriveBase,
            Resource::ShooterWheels,
            Resource::Feeder,
        ])
    }

    fn initialize(&mut self, robot: &mut dyn Robot) {
        let shooter = robot.shooter();
        shooter.set_wheels(0.0);
        shooter.set_feeder(false);
        let timeout = u64::try_from(self.search_timeout.as_micros()).unwrap_or(u64::MAX);
        self.phase = Phase::Seeking {
            deadline: robot.now_micros().saturating_add(timeout),
            turning: false,
        };
    }

    fn step(&mut self, robot: &mut dyn Robot) {
        if let Phase::Seeking { deadline, turning } = self.phase {
            self.phase = self.seek(robot, deadline, turning);
        }
        if let Phase::Firing(shot) = &mut self.phase {
            shot.step(robot);
            if shot.is_finished() {
                shot.end(robot);
                self.phase = Phase::Done;
            }
        }
    }

    fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    fn end(&mut self, robot: &mut dyn Robot) {
        let shooter = robot.shooter();
        shooter.set_wheels(0.0);
        shooter.set_feeder(false);
        robot.drive().stop();
    }

    fn interrupted(&mut self, robot: &mut dyn Robot, reason: &str) {
        if let Phase::Firing(shot) = &mut self.phase {
            shot.interrupted(robot, reason);
        } else {
            let shooter = robot.shooter();
            shooter.set_wheels(0.0);
            shooter.set_feeder(false);
        }
        robot.drive().stop();
        self.phase = Phase::Done;
        warn!(action = %self.name(), reason, "target seeking interrupted");
    }
}
