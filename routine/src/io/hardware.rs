//! Capability interfaces for the hardware the routine commands.
//!
//! The host owns the real subsystems and lends them to the active action for
//! the duration of a single lifecycle call through [`Robot`]. Actions never
//! hold actuator handles between calls, so exclusive ownership is decided by
//! the scheduler rather than by shared mutable state.

use crate::core::types::{Crossing, ShooterPosition};

/// Drive base commands. Distance and heading control loops live behind this trait.
pub trait DriveBase {
    /// Start an encoder drive of `distance` at `speed`.
    fn drive_distance(&mut self, speed: f64, distance: f64);
    /// Start a relative in-place turn.
    fn turn(&mut self, degrees: f64);
    /// Start the crossing routine for a field defense.
    fn cross(&mut self, crossing: Crossing);
    /// True once the most recent drive, turn, or crossing command has settled.
    fn on_target(&self) -> bool;
    /// Stop the motors and drop the current target.
    fn stop(&mut self);
}

/// Shooter and grabber commands.
pub trait Shooter {
    /// Flywheel output in `[0, 1]`.
    fn set_wheels(&mut self, output: f64);
    /// Engage or release the feeder servo that pushes the ball into the wheels.
    fn set_feeder(&mut self, engaged: bool);
    /// Start moving the pivot to a named position.
    fn move_pivot(&mut self, position: ShooterPosition);
    fn pivot_at(&self, position: ShooterPosition) -> bool;
    /// Stop the pivot motor wherever it is.
    fn hold_pivot(&mut self);
}

/// Vision target feedback.
pub trait Targeting {
    /// Heading error to the goal in degrees, or `None` when no target is visible.
    fn target_offset(&self) -> Option<f64>;
}

/// Everything an action may touch during one lifecycle call.
pub trait Robot {
    /// Monotonic hardware time in microseconds since an arbitrary epoch.
    fn now_micros(&self) -> u64;
    fn drive(&mut self) -> &mut dyn DriveBase;
    fn shooter(&mut self) -> &mut dyn Shooter;
    fn targeting(&self) -> &dyn Targeting;
}
