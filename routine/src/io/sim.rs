//! Deterministic simulated robot with a recording actuator sink.
//!
//! Every actuator command is appended to an in-memory log stamped with the
//! simulated clock. Drive and pivot targets settle after a fixed number of
//! ticks; zero-magnitude drive targets settle immediately.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::types::{Crossing, ShooterPosition};
use crate::io::hardware::{DriveBase, Robot, Shooter, Targeting};

/// Simulation knobs (`[sim]` table of `routine.toml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Control-loop period.
    pub tick_period_ms: u64,
    /// Ticks for a drive, turn, crossing, or pivot command to settle.
    pub settle_ticks: u32,
    /// Upper bound on ticks before the run is abandoned. The default covers the
    /// 15 s autonomous period at the default 20 ms tick.
    pub max_ticks: u64,
    /// Initial vision heading error; `None` means no target is visible.
    pub target_offset_degrees: Option<f64>,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            tick_period_ms: 20,
            settle_ticks: 10,
            max_ticks: 750,
            target_offset_degrees: None,
        }
    }
}

/// A single command observed by the simulated actuators.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ActuatorCommand {
    DriveDistance { speed: f64, distance: f64 },
    Turn { degrees: f64 },
    Cross { crossing: Crossing },
    DriveStop,
    Wheels { output: f64 },
    Feeder { engaged: bool },
    MovePivot { position: ShooterPosition },
    HoldPivot,
}

impl fmt::Display for ActuatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActuatorCommand::DriveDistance { speed, distance } => {
                write!(f, "drive {distance} at {speed}")
            }
            ActuatorCommand::Turn { degrees } => write!(f, "turn {degrees}°"),
            ActuatorCommand::Cross { crossing } => write!(f, "cross {crossing}"),
            ActuatorCommand::DriveStop => f.write_str("drive stop"),
            ActuatorCommand::Wheels { output } => write!(f, "wheels {output}"),
            ActuatorCommand::Feeder { engaged: true } => f.write_str("feeder engaged"),
            ActuatorCommand::Feeder { engaged: false } => f.write_str("feeder released"),
            ActuatorCommand::MovePivot { position } => write!(f, "pivot to {position}"),
            ActuatorCommand::HoldPivot => f.write_str("pivot hold"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggedCommand {
    pub at_micros: u64,
    #[serde(flatten)]
    pub command: ActuatorCommand,
}

#[derive(Debug, Clone)]
pub struct SimRobot {
    now_micros: u64,
    tick: Duration,
    settle_ticks: u32,
    drive_remaining: u32,
    pending_turn: f64,
    pivot: ShooterPosition,
    pivot_target: Option<(ShooterPosition, u32)>,
    target_offset: Option<f64>,
    log: Vec<LoggedCommand>,
}

impl SimRobot {
    pub fn new(settings: &SimSettings) -> Self {
        Self {
            now_micros: 0,
            tick: Duration::from_millis(settings.tick_period_ms),
            settle_ticks: settings.settle_ticks,
            drive_remaining: 0,
            pending_turn: 0.0,
            pivot: ShooterPosition::Highest,
            pivot_target: None,
            target_offset: settings.target_offset_degrees,
            log: Vec::new(),
        }
    }

    /// Advance the clock by one control-loop period and settle pending motion.
    pub fn advance(&mut self) {
        self.advance_by(self.tick);
    }

    /// Advance the clock by `elapsed`, counting it as a single tick of motion.
    pub fn advance_by(&mut self, elapsed: Duration) {
        let elapsed = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.now_micros = self.now_micros.saturating_add(elapsed);

        if self.drive_remaining > 0 {
            self.drive_remaining -= 1;
            if self.drive_remaining == 0 {
                self.apply_turn();
            }
        }

        if let Some((target, remaining)) = self.pivot_target {
            if remaining <= 1 {
                self.pivot = target;
                self.pivot_target = None;
            } else {
                self.pivot_target = Some((target, remaining - 1));
            }
        }
    }

    pub fn log(&self) -> &[LoggedCommand] {
        &self.log
    }

    /// Commands only, without timestamps.
    pub fn commands(&self) -> Vec<ActuatorCommand> {
        self.log.iter().map(|entry| entry.command.clone()).collect()
    }

    pub fn pivot(&self) -> ShooterPosition {
        self.pivot
    }

    pub fn set_target_offset(&mut self, offset: Option<f64>) {
        self.target_offset = offset;
    }

    fn record(&mut self, command: ActuatorCommand) {
        trace!(at_micros = self.now_micros, ?command, "actuator command");
        self.log.push(LoggedCommand {
            at_micros: self.now_micros,
            command,
        });
    }

    fn start_motion(&mut self, magnitude: f64) {
        self.drive_remaining = if magnitude == 0.0 {
            0
        } else {
            self.settle_ticks
        };
        if self.drive_remaining == 0 {
            self.apply_turn();
        }
    }

    fn apply_turn(&mut self) {
        if let Some(offset) = self.target_offset.as_mut() {
            *offset -= self.pending_turn;
        }
        self.pending_turn = 0.0;
    }
}

impl DriveBase for SimRobot {
    fn drive_distance(&mut self, speed: f64, distance: f64) {
        self.record(ActuatorCommand::DriveDistance { speed, distance });
        self.pending_turn = 0.0;
        self.start_motion(distance);
    }

    fn turn(&mut self, degrees: f64) {
        self.record(ActuatorCommand::Turn { degrees });
        self.pending_turn = degrees;
        self.start_motion(degrees);
    }

    fn cross(&mut self, crossing: Crossing) {
        self.record(ActuatorCommand::Cross { crossing });
        self.pending_turn = 0.0;
        self.start_motion(1.0);
    }

    fn on_target(&self) -> bool {
        self.drive_remaining == 0
    }

    fn stop(&mut self) {
        self.record(ActuatorCommand::DriveStop);
        self.drive_remaining = 0;
        self.pending_turn = 0.0;
    }
}

impl Shooter for SimRobot {
    fn set_wheels(&mut self, output: f64) {
        self.record(ActuatorCommand::Wheels { output });
    }

    fn set_feeder(&mut self, engaged: bool) {
        self.record(ActuatorCommand::Feeder { engaged });
    }

    fn move_pivot(&mut self, position: ShooterPosition) {
        self.record(ActuatorCommand::MovePivot { position });
        if self.pivot == position {
            self.pivot_target = None;
        } else {
            self.pivot_target = Some((position, self.settle_ticks));
        }
    }

    fn pivot_at(&self, position: ShooterPosition) -> bool {
        self.pivot == position
    }

    fn hold_pivot(&mut self) {
        self.record(ActuatorCommand::HoldPivot);
        self.pivot_target = None;
    }
}

impl Targeting for SimRobot {
    fn target_offset(&self) -> Option<f64> {
        self.target_offset
    }
}

impl Robot for SimRobot {
    fn now_micros(&self) -> u64 {
        self.now_micros
    }

    fn drive(&mut self) -> &mut dyn DriveBase {
        self
    }

    fn shooter(&mut self) -> &mut dyn Shooter {
        self
    }

    fn targeting(&self) -> &dyn Targeting {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(settle_ticks: u32) -> SimSettings {
        SimSettings {
            settle_ticks,
            ..SimSettings::default()
        }
    }

    #[test]
    fn drive_settles_after_configured_ticks() {
        let mut robot = SimRobot::new(&settings(2));
        robot.drive_distance(0.5, 3.0);
        assert!(!robot.on_target());
        robot.advance();
        assert!(!robot.on_target());
        robot.advance();
        assert!(robot.on_target());
        assert_eq!(robot.now_micros(), 40_000);
    }

    #[test]
    fn zero_distance_is_on_target_immediately() {
        let mut robot = SimRobot::new(&settings(5));
        robot.drive_distance(0.5, 0.0);
        assert!(robot.on_target());
    }

    #[test]
    fn settled_turn_reduces_target_offset() {
        let mut robot = SimRobot::new(&SimSettings {
            settle_ticks: 1,
            target_offset_degrees: Some(12.0),
            ..SimSettings::default()
        });
        robot.turn(10.0);
        assert_eq!(robot.target_offset(), Some(12.0));
        robot.advance();
        assert_eq!(robot.target_offset(), Some(2.0));
    }

    #[test]
    fn pivot_reaches_target_and_starts_highest() {
        let mut robot = SimRobot::new(&settings(1));
        assert!(robot.pivot_at(ShooterPosition::Highest));
        robot.move_pivot(ShooterPosition::Lowest);
        assert!(!robot.pivot_at(ShooterPosition::Lowest));
        robot.advance();
        assert_eq!(robot.pivot(), ShooterPosition::Lowest);
    }

    #[test]
    fn commands_are_logged_with_timestamps() {
        let mut robot = SimRobot::new(&settings(1));
        robot.set_wheels(1.0);
        robot.advance();
        robot.set_feeder(true);
        assert_eq!(
            robot.log(),
            &[
                LoggedCommand {
                    at_micros: 0,
                    command: ActuatorCommand::Wheels { output: 1.0 },
                },
                LoggedCommand {
                    at_micros: 20_000,
                    command: ActuatorCommand::Feeder { engaged: true },
                },
            ]
        );
    }
}
