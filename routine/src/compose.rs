//! Routine composer: mission parameters in, executable plan tree out.
//!
//! Composition is pure. It constructs actions but never runs them, so the same
//! parameters always yield the same [`Outline`](crate::plan::Outline).

use tracing::debug;

use crate::actions::{AutoShoot, CrossDefense, DriveDistance, FindTarget, RotateShooter, Turn};
use crate::core::decision::{PlanOptions, decide};
use crate::core::invariants::PlanError;
use crate::core::mission::MissionParams;
use crate::core::tables::Shot;
use crate::plan::{PlanNode, Sequence};

/// Compose the routine with default [`PlanOptions`].
pub fn compose_routine(params: &MissionParams) -> Result<PlanNode, PlanError> {
    compose_routine_with(params, &PlanOptions::default())
}

/// Compose the routine for `params`.
///
/// The plan is: cross (after the mission wait), then, alongside the rest of the
/// routine, drive to the turn spot and move the shooter; turn to aim; for a
/// low goal from slot 3 or 4 drive and turn once more; finally fire.
///
/// Fails only if the assembled branches would share an actuator.
pub fn compose_routine_with(
    params: &MissionParams,
    options: &PlanOptions,
) -> Result<PlanNode, PlanError> {
    let blueprint = decide(params);
    debug!(?blueprint, "composing routine");

    let mut builder = Sequence::builder()
        .await_parallel_branches(options.await_parallel_branches)
        .then_after(
            blueprint.wait,
            PlanNode::leaf(CrossDefense::new(blueprint.crossing)),
        )
        .alongside(PlanNode::leaf(DriveDistance::new(
            options.drive_speed,
            blueprint.turn_spot_distance,
        )))
        .alongside(PlanNode::leaf(RotateShooter::new(blueprint.shot.pivot)))
        .then(PlanNode::leaf(Turn::new(blueprint.aim_angle)));

    if let Some(approach) = blueprint.approach {
        builder = builder
            .then(PlanNode::leaf(DriveDistance::new(
                options.drive_speed,
                approach.distance,
            )))
            .then(PlanNode::leaf(Turn::new(approach.angle)));
    }

    let fire = match blueprint.shot.shot {
        Shot::SeekAndFire => PlanNode::leaf(FindTarget::default()),
        Shot::Timed(secs) => PlanNode::leaf(AutoShoot::new(secs)),
    };

    Ok(builder.then(fire).build()?.into())
}
