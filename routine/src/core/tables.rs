//! Total lookup tables keyed by defense position.
//!
//! Each table picks exactly one value per input. Positions without an entry,
//! including anything outside `1..=5`, resolve to the documented default.

use crate::core::mission::crossing_for_code;
use crate::core::types::{Crossing, ShooterPosition};

/// Slot that always holds the low bar.
pub const LOW_BAR_POSITION: i32 = 1;

/// Speed used for every encoder drive step.
pub const DEFAULT_DRIVE_SPEED: f64 = 0.5;

/// Run time of the low-goal fire action, in seconds.
pub const LOW_GOAL_SHOT_SECS: f64 = 1.0;

/// Pick the crossing strategy. Slot 1 is always the low bar.
pub fn crossing(position: i32, defense: &str) -> Crossing {
    if position == LOW_BAR_POSITION {
        return Crossing::LowBar;
    }
    crossing_for_code(defense)
}

/// Distance to drive after crossing to reach the turn spot.
pub fn turn_spot_distance(position: i32) -> f64 {
    match position {
        2 => 3.046,
        5 => 3.690,
        _ => 0.0,
    }
}

/// Relative heading change (degrees) that points the robot at the goal.
pub fn aim_angle(low_score: bool, position: i32) -> f64 {
    if low_score {
        match position {
            2 => 60.0,
            3 => -30.0,
            4 => 30.0,
            5 => -60.0,
            _ => 0.0,
        }
    } else {
        match position {
            2 => 60.0,
            3 => 22.0,
            4 => -8.0,
            5 => -60.0,
            _ => 0.0,
        }
    }
}

/// Extra drive-then-turn needed to line up with the low goal from the middle slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowGoalApproach {
    pub distance: f64,
    pub angle: f64,
}

pub fn low_goal_approach(low_score: bool, position: i32) -> Option<LowGoalApproach> {
    if !low_score {
        return None;
    }
    match position {
        3 => Some(LowGoalApproach {
            distance: 3.638,
            angle: 90.0,
        }),
        4 => Some(LowGoalApproach {
            distance: 4.192,
            angle: -90.0,
        }),
        _ => None,
    }
}

/// Which fire action ends the routine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shot {
    /// Seek the vision target, then fire.
    SeekAndFire,
    /// Time-windowed fire for the given number of seconds.
    Timed(f64),
}

/// Shooter pose plus the final fire action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotSetup {
    pub pivot: ShooterPosition,
    pub shot: Shot,
}

pub fn shot_setup(will_shoot: bool, low_score: bool) -> ShotSetup {
    match (will_shoot, low_score) {
        (true, false) => ShotSetup {
            pivot: ShooterPosition::DefaultShooting,
            shot: Shot::SeekAndFire,
        },
        (true, true) => ShotSetup {
            pivot: ShooterPosition::Lowest,
            shot: Shot::Timed(LOW_GOAL_SHOT_SECS),
        },
        (false, _) => ShotSetup {
            pivot: ShooterPosition::Highest,
            shot: Shot::Timed(0.0),
        },
    }
}
