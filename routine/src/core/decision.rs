//! Mission parameters resolved into the concrete values of a routine.
//!
//! Every decision here is total: unknown defense codes and out-of-table
//! positions resolve to defaults rather than errors.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::mission::MissionParams;
use crate::core::tables::{
    self, DEFAULT_DRIVE_SPEED, LowGoalApproach, ShotSetup, aim_angle, low_goal_approach,
    shot_setup, turn_spot_distance,
};
use crate::core::types::Crossing;

/// Knobs that shape plan assembly but are not mission parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanOptions {
    /// Whether the routine waits for its parallel branches before finishing.
    pub await_parallel_branches: bool,
    /// Speed for every drive-distance step.
    pub drive_speed: f64,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            await_parallel_branches: true,
            drive_speed: DEFAULT_DRIVE_SPEED,
        }
    }
}

/// Every value the composer needs, decided up front.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineBlueprint {
    pub crossing: Crossing,
    pub wait: Duration,
    pub turn_spot_distance: f64,
    pub aim_angle: f64,
    pub approach: Option<LowGoalApproach>,
    pub shot: ShotSetup,
}

pub fn decide(params: &MissionParams) -> RoutineBlueprint {
    RoutineBlueprint {
        crossing: tables::crossing(params.position, &params.defense),
        wait: params.wait(),
        turn_spot_distance: turn_spot_distance(params.position),
        aim_angle: aim_angle(params.low_score, params.position),
        approach: low_goal_approach(params.low_score, params.position),
        shot: shot_setup(params.will_shoot, params.low_score),
    }
}
