//! Atomic actions: the leaves of a routine plan.
//!
//! Every action follows the same cooperative lifecycle. The caller (the plan
//! runtime or the [`Scheduler`](crate::scheduler::Scheduler)) drives it through
//! a [`Tracked`] slot, which guarantees that `initialize` runs once, `step`
//! only runs while the action is live, and exactly one of `end` or
//! `interrupted` is delivered.

use std::collections::BTreeSet;
use std::fmt::Debug;

use crate::core::types::Resource;
use crate::io::hardware::Robot;
use crate::plan::Outline;

mod drive;
mod lifecycle;
mod pivot;
mod seek;
mod shoot;

pub use drive::{CrossDefense, DriveDistance, Turn};
pub use lifecycle::Tracked;
pub use pivot::RotateShooter;
pub use seek::FindTarget;
pub use shoot::AutoShoot;

/// One microsecond-clock second.
pub const ONE_SECOND_MICROS: u64 = 1_000_000;

/// A single schedulable unit of robot behavior.
///
/// Parameters are fixed at construction; only progress state changes, and only
/// through these callbacks. Implementations must return promptly from every
/// call: an action waits by staying unfinished across ticks.
pub trait Action: Debug {
    /// Human-readable identity for diagnostics.
    fn name(&self) -> String;

    /// Actuators this action exclusively commands while live.
    fn requirements(&self) -> BTreeSet<Resource>;

    /// One-time setup before the first `step`.
    fn initialize(&mut self, robot: &mut dyn Robot);

    /// Called once per tick while running.
    fn step(&mut self, robot: &mut dyn Robot);

    /// Queried after each `step`. Must not have side effects.
    fn is_finished(&self) -> bool;

    /// Normal completion. Leave actuators in a resting state.
    fn end(&mut self, robot: &mut dyn Robot);

    /// Cancellation before completion. Leave actuators safe and report `reason`.
    fn interrupted(&mut self, robot: &mut dyn Robot, reason: &str);

    /// Structural description used by plan outlines.
    fn outline(&self) -> Outline {
        Outline::Leaf { name: self.name() }
    }
}

/// Format a number the way action identities print it (`3.638`, `-30`, `0`).
pub(crate) fn fmt_num(value: f64) -> String {
    if value == 0.0 {
        // Avoid "-0".
        return "0".to_string();
    }
    format!("{value}")
}
