//! Shooter pivot positioning.

use std::collections::BTreeSet;

use tracing::warn;

use crate::actions::Action;
use crate::core::types::{Resource, ShooterPosition};
use crate::io::hardware::Robot;

/// Move the shooter pivot to a named position.
#[derive(Debug, Clone)]
pub struct RotateShooter {
    target: ShooterPosition,
    arrived: bool,
}

impl RotateShooter {
    pub fn new(target: ShooterPosition) -> Self {
        Self {
            target,
            arrived: false,
        }
    }
}

impl Action for RotateShooter {
    fn name(&self) -> String {
        format!("RotateShooter({})", self.target)
    }

    fn requirements(&self) -> BTreeSet<Resource> {
        BTreeSet::from([Resource::ShooterPivot])
    }

    fn initialize(&mut self, robot: &mut dyn Robot) {
        self.arrived = false;
        robot.shooter().move_pivot(self.target);
    }

    fn step(&mut self, robot: &mut dyn Robot) {
        self.arrived = robot.shooter().pivot_at(self.target);
    }

    fn is_finished(&self) -> bool {
        self.arrived
    }

    fn end(&mut self, robot: &mut dyn Robot) {
        robot.shooter().hold_pivot();
    }

    fn interrupted(&mut self, robot: &mut dyn Robot, reason: &str) {
        robot.shooter().hold_pivot();
        warn!(action = %self.name(), reason, "pivot move interrupted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::sim::ActuatorCommand;
    use crate::test_support::sim_robot;

    #[test]
    fn already_at_target_finishes_on_first_step() {
        let mut robot = sim_robot();
        let mut rotate = RotateShooter::new(ShooterPosition::Highest);
        rotate.initialize(&mut robot);
        rotate.step(&mut robot);
        assert!(rotate.is_finished());
        rotate.end(&mut robot);
        assert_eq!(
            robot.commands(),
            vec![
                ActuatorCommand::MovePivot {
                    position: ShooterPosition::Highest
                },
                ActuatorCommand::HoldPivot,
            ]
        );
    }

    #[test]
    fn waits_until_pivot_arrives() {
        let mut robot = sim_robot();
        let mut rotate = RotateShooter::new(ShooterPosition::Lowest);
        rotate.initialize(&mut robot);
        rotate.step(&mut robot);
        assert!(!rotate.is_finished());
        while robot.pivot() != ShooterPosition::Lowest {
            robot.advance();
        }
        rotate.step(&mut robot);
        assert!(rotate.is_finished());
        assert_eq!(rotate.name(), "RotateShooter(lowest)");
    }
}
