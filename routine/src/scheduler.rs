//! Cooperative, tick-driven scheduler.
//!
//! The host calls [`Scheduler::run_once`] once per control-loop period. Each
//! scheduled action owns its required actuators while live; scheduling an
//! action that needs an actuator already in use preempts the current owner.

use std::collections::BTreeSet;

use tracing::{debug, info, instrument, warn};

use crate::actions::{Action, Tracked};
use crate::core::types::Resource;
use crate::io::hardware::Robot;

/// Why [`Scheduler::run_until_idle`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every scheduled action reached a terminal state.
    Complete { ticks: u64 },
    /// The tick budget ran out; whatever was still live has been interrupted.
    TickLimit { ticks: u64 },
}

impl RunOutcome {
    pub fn ticks(self) -> u64 {
        match self {
            RunOutcome::Complete { ticks } | RunOutcome::TickLimit { ticks } => ticks,
        }
    }
}

#[derive(Debug, Default)]
pub struct Scheduler {
    slots: Vec<Tracked>,
    ticks: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_idle(&self) -> bool {
        self.slots.is_empty()
    }

    /// Names of the live actions, in scheduling order.
    pub fn running(&self) -> Vec<String> {
        self.slots.iter().map(Tracked::name).collect()
    }

    /// Actuators currently owned by live actions.
    pub fn claimed(&self) -> BTreeSet<Resource> {
        self.slots
            .iter()
            .flat_map(Tracked::requirements)
            .collect()
    }

    /// Initialize `action` and take ownership of its actuators.
    ///
    /// Live actions that share an actuator with it are interrupted first.
    pub fn schedule(&mut self, robot: &mut dyn Robot, action: Box<dyn Action>) {
        let mut slot = Tracked::new(action);
        let name = slot.name();
        let wanted = slot.requirements();
        let reason = format!("preempted by {name}");

        for running in &mut self.slots {
            if !running.requirements().is_disjoint(&wanted) {
                running.cancel(robot, &reason);
            }
        }
        self.slots.retain(|running| !running.state().is_terminal());

        info!(action = %name, "scheduled");
        slot.start(robot);
        self.slots.push(slot);
    }

    /// Step every live action once and drop the ones that reached a terminal state.
    ///
    /// Returns the number of actions still live.
    pub fn run_once(&mut self, robot: &mut dyn Robot) -> usize {
        self.ticks += 1;
        for slot in &mut self.slots {
            slot.tick(robot);
        }
        self.slots.retain(|slot| {
            let terminal = slot.state().is_terminal();
            if terminal {
                debug!(action = %slot.name(), state = ?slot.state(), "released");
            }
            !terminal
        });
        self.slots.len()
    }

    /// Interrupt the live action called `name`. Returns false if none matched.
    pub fn cancel(&mut self, robot: &mut dyn Robot, name: &str, reason: &str) -> bool {
        let Some(index) = self.slots.iter().position(|slot| slot.name() == name) else {
            return false;
        };
        let mut slot = self.slots.remove(index);
        slot.cancel(robot, reason)
    }

    /// Interrupt every live action. Returns how many were interrupted.
    pub fn cancel_all(&mut self, robot: &mut dyn Robot, reason: &str) -> usize {
        let mut cancelled = 0;
        for mut slot in self.slots.drain(..) {
            if slot.cancel(robot, reason) {
                cancelled += 1;
            }
        }
        cancelled
    }

    /// Tick until idle or until `max_ticks` ticks have run.
    ///
    /// `after_tick` runs after every tick; hosts use it to advance their clock.
    /// On reaching the limit all live actions are interrupted.
    #[instrument(skip_all, fields(max_ticks = max_ticks))]
    pub fn run_until_idle<R: Robot>(
        &mut self,
        robot: &mut R,
        max_ticks: u64,
        mut after_tick: impl FnMut(&mut R),
    ) -> RunOutcome {
        let start = self.ticks;
        while !self.is_idle() {
            let ran = self.ticks - start;
            if ran >= max_ticks {
                let cancelled = self.cancel_all(robot, "tick limit reached");
                warn!(ticks = ran, cancelled, "tick limit reached");
                return RunOutcome::TickLimit { ticks: ran };
            }
            self.run_once(robot);
            after_tick(&mut *robot);
        }
        let ticks = self.ticks - start;
        info!(ticks, "scheduler idle");
        RunOutcome::Complete { ticks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Probe, sim_robot};

    #[test]
    fn finished_actions_are_released() {
        let mut robot = sim_robot();
        let mut scheduler = Scheduler::new();
        let (probe, log) = Probe::finishing_after("p", 2);
        scheduler.schedule(&mut robot, Box::new(probe.requiring(&[Resource::Feeder])));
        assert_eq!(scheduler.claimed(), BTreeSet::from([Resource::Feeder]));

        assert_eq!(scheduler.run_once(&mut robot), 1);
        assert_eq!(scheduler.run_once(&mut robot), 0);
        assert!(scheduler.is_idle());
        assert!(scheduler.claimed().is_empty());
        assert_eq!(log.borrow().ended, 1);
    }

    #[test]
    fn conflicting_schedule_preempts_current_owner() {
        let mut robot = sim_robot();
        let mut scheduler = Scheduler::new();
        let (first, first_log) = Probe::finishing_after("first", 10);
        let (other, other_log) = Probe::finishing_after("other", 10);
        let (second, _) = Probe::finishing_after("second", 10);
        scheduler.schedule(&mut robot, Box::new(first.requiring(&[Resource::DriveBase])));
        scheduler.schedule(&mut robot, Box::new(other.requiring(&[Resource::ShooterPivot])));
        scheduler.run_once(&mut robot);

        scheduler.schedule(&mut robot, Box::new(second.requiring(&[Resource::DriveBase])));

        let first_log = first_log.borrow();
        assert_eq!(first_log.interrupted, 1);
        assert_eq!(first_log.reasons, vec!["preempted by second".to_string()]);
        assert_eq!(other_log.borrow().interrupted, 0);
        assert_eq!(scheduler.running(), vec!["other", "second"]);
    }

    #[test]
    fn cancel_by_name_interrupts_once() {
        let mut robot = sim_robot();
        let mut scheduler = Scheduler::new();
        let (probe, log) = Probe::finishing_after("p", 10);
        scheduler.schedule(&mut robot, Box::new(probe));
        scheduler.run_once(&mut robot);

        assert!(scheduler.cancel(&mut robot, "p", "operator"));
        assert!(!scheduler.cancel(&mut robot, "p", "operator"));
        scheduler.run_once(&mut robot);

        let log = log.borrow();
        assert_eq!(log.interrupted, 1);
        assert_eq!(log.steps, 1);
        assert_eq!(log.ended, 0);
    }

    #[test]
    fn run_until_idle_reports_ticks() {
        let mut robot = sim_robot();
        let mut scheduler = Scheduler::new();
        let (probe, _) = Probe::finishing_after("p", 4);
        scheduler.schedule(&mut robot, Box::new(probe));

        let outcome = scheduler.run_until_idle(&mut robot, 100, |robot| robot.advance());
        assert_eq!(outcome, RunOutcome::Complete { ticks: 4 });
        assert_eq!(robot.now_micros(), 80_000);
    }

    #[test]
    fn tick_limit_interrupts_live_actions() {
        let mut robot = sim_robot();
        let mut scheduler = Scheduler::new();
        let (probe, log) = Probe::finishing_after("slow", 100);
        scheduler.schedule(&mut robot, Box::new(probe));

        let outcome = scheduler.run_until_idle(&mut robot, 5, |robot| robot.advance());
        assert_eq!(outcome, RunOutcome::TickLimit { ticks: 5 });
        assert_eq!(outcome.ticks(), 5);
        assert!(scheduler.is_idle());
        let log = log.borrow();
        assert_eq!(log.steps, 5);
        assert_eq!(log.reasons, vec!["tick limit reached".to_string()]);
    }
}
