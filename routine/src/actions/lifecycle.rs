//! Lifecycle enforcement for a single action slot.

use std::collections::BTreeSet;

use tracing::debug;

use crate::actions::Action;
use crate::core::types::{ActionState, Resource};
use crate::io::hardware::Robot;
use crate::plan::Outline;

/// An action together with its lifecycle state.
///
/// Callbacks that would violate `Created → Initialized → Running →
/// Finished | Interrupted` are dropped instead of forwarded.
#[derive(Debug)]
pub struct Tracked {
    action: Box<dyn Action>,
    state: ActionState,
}

impl Tracked {
    pub fn new(action: Box<dyn Action>) -> Self {
        Self {
            action,
            state: ActionState::Created,
        }
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    pub fn name(&self) -> String {
        self.action.name()
    }

    pub fn requirements(&self) -> BTreeSet<Resource> {
        self.action.requirements()
    }

    pub fn outline(&self) -> Outline {
        self.action.outline()
    }

    /// Run `initialize` if the action has never been started.
    pub fn start(&mut self, robot: &mut dyn Robot) -> bool {
        if self.state != ActionState::Created {
            debug!(action = %self.action.name(), state = ?self.state, "start ignored");
            return false;
        }
        debug!(action = %self.action.name(), "initialize");
        self.action.initialize(robot);
        self.state = ActionState::Initialized;
        true
    }

    /// Step a live action once, then finish it if it reports completion.
    ///
    /// Returns the state after the tick.
    pub fn tick(&mut self, robot: &mut dyn Robot) -> ActionState {
        if !self.state.is_active() {
            return self.state;
        }
        self.state = ActionState::Running;
        self.action.step(robot);
        if self.action.is_finished() {
            self.action.end(robot);
            self.state = ActionState::Finished;
            debug!(action = %self.action.name(), "finished");
        }
        self.state
    }

    /// Deliver `interrupted` if the action is live.
    ///
    /// Returns false when there was nothing to cancel (never started, or
    /// already terminal).
    pub fn cancel(&mut self, robot: &mut dyn Robot, reason: &str) -> bool {
        if !self.state.is_active() {
            return false;
        }
        self.action.interrupted(robot, reason);
        self.state = ActionState::Interrupted;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Probe, sim_robot};

    #[test]
    fn full_lifecycle_calls_each_callback_in_order() {
        let mut robot = sim_robot();
        let (probe, log) = Probe::finishing_after("p", 2);
        let mut slot = Tracked::new(Box::new(probe));

        assert!(slot.start(&mut robot));
        assert_eq!(slot.state(), ActionState::Initialized);
        assert_eq!(slot.tick(&mut robot), ActionState::Running);
        assert_eq!(slot.tick(&mut robot), ActionState::Finished);
        assert_eq!(slot.tick(&mut robot), ActionState::Finished);

        let log = log.borrow();
        assert_eq!(log.initialized, 1);
        assert_eq!(log.steps, 2);
        assert_eq!(log.ended, 1);
        assert_eq!(log.interrupted, 0);
    }

    #[test]
    fn start_is_only_honored_once() {
        let mut robot = sim_robot();
        let (probe, log) = Probe::finishing_after("p", 5);
        let mut slot = Tracked::new(Box::new(probe));
        assert!(slot.start(&mut robot));
        assert!(!slot.start(&mut robot));
        assert_eq!(log.borrow().initialized, 1);
    }

    #[test]
    fn cancel_delivers_interrupted_once_and_stops_stepping() {
        let mut robot = sim_robot();
        let (probe, log) = Probe::finishing_after("p", 5);
        let mut slot = Tracked::new(Box::new(probe));
        slot.start(&mut robot);
        slot.tick(&mut robot);

        assert!(slot.cancel(&mut robot, "test"));
        assert!(!slot.cancel(&mut robot, "again"));
        assert_eq!(slot.tick(&mut robot), ActionState::Interrupted);

        let log = log.borrow();
        assert_eq!(log.steps, 1);
        assert_eq!(log.interrupted, 1);
        assert_eq!(log.ended, 0);
        assert_eq!(log.reasons, vec!["test".to_string()]);
    }

    #[test]
    fn cancel_before_start_is_a_no_op() {
        let mut robot = sim_robot();
        let (probe, log) = Probe::finishing_after("p", 1);
        let mut slot = Tracked::new(Box::new(probe));
        assert!(!slot.cancel(&mut robot, "never ran"));
        assert_eq!(slot.state(), ActionState::Created);
        assert_eq!(log.borrow().interrupted, 0);
    }
}
