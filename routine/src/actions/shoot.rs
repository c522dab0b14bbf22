//! Time-windowed fire action.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::actions::{Action, ONE_SECOND_MICROS, fmt_num};
use crate::core::types::Resource;
use crate::io::hardware::Robot;

/// Spin the shooter wheels for `run_secs`, feeding the ball during the last second.
///
/// When the run is one second or shorter the feed window covers the whole run.
/// A zero-second run still cycles through its lifecycle and finishes on its
/// first step.
#[derive(Debug, Clone)]
pub struct AutoShoot {
    run_micros: u64,
    ending_time: u64,
    current_time: Option<u64>,
}

impl AutoShoot {
    pub fn new(run_secs: f64) -> Self {
        let run_micros = if run_secs.is_finite() && run_secs > 0.0 {
            (run_secs * ONE_SECOND_MICROS as f64).round() as u64
        } else {
            0
        };
        Self {
            run_micros,
            ending_time: 0,
            current_time: None,
        }
    }

    pub fn run_micros(&self) -> u64 {
        self.run_micros
    }

    fn in_feed_window(&self, now: u64) -> bool {
        now >= self.ending_time.saturating_sub(ONE_SECOND_MICROS)
    }

    fn rest(robot: &mut dyn Robot) {
        let shooter = robot.shooter();
        shooter.set_wheels(0.0);
        shooter.set_feeder(false);
    }
}

impl Action for AutoShoot {
    fn name(&self) -> String {
        let secs = self.run_micros as f64 / ONE_SECOND_MICROS as f64;
        format!("AutoShoot({}s)", fmt_num(secs))
    }

    fn requirements(&self) -> BTreeSet<Resource> {
        BTreeSet::from([Resource::ShooterWheels, Resource::Feeder])
    }

    fn initialize(&mut self, robot: &mut dyn Robot) {
        robot.shooter().set_wheels(0.0);
        self.ending_time = robot.now_micros().saturating_add(self.run_micros);
        self.current_time = None;
        debug!(ending_time = self.ending_time, "auto shoot armed");
    }

    fn step(&mut self, robot: &mut dyn Robot) {
        robot.shooter().set_wheels(1.0);
        let now = robot.now_micros();
        self.current_time = Some(now);
        let feed = self.in_feed_window(now);
        robot.shooter().set_feeder(feed);
    }

    fn is_finished(&self) -> bool {
        self.current_time.is_some_and(|now| now >= self.ending_time)
    }

    fn end(&mut self, robot: &mut dyn Robot) {
        Self::rest(robot);
    }

    fn interrupted(&mut self, robot: &mut dyn Robot, reason: &str) {
        Self::rest(robot);
        warn!(action = %self.name(), reason, "shooter was interrupted");
    }
}
