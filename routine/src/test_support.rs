//! Test-only helpers: a scripted probe action and a fast simulated robot.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::actions::{Action, Tracked};
use crate::core::types::{ActionState, Resource};
use crate::io::hardware::Robot;
use crate::io::sim::{SimRobot, SimSettings};

/// Ticks a simulated drive or pivot command takes to settle in tests.
pub const TEST_SETTLE_TICKS: u32 = 3;

/// Simulated robot with a 20 ms tick and short settle times.
pub fn sim_robot() -> SimRobot {
    SimRobot::new(&SimSettings {
        settle_ticks: TEST_SETTLE_TICKS,
        ..SimSettings::default()
    })
}

/// Callback counts observed by a [`Probe`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProbeLog {
    pub initialized: u32,
    pub steps: u32,
    pub ended: u32,
    pub interrupted: u32,
    pub reasons: Vec<String>,
}

/// Ordered `name:callback` events shared between several probes.
pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// Action that finishes after a fixed number of steps and records every callback.
#[derive(Debug)]
pub struct Probe {
    name: String,
    finish_after: u32,
    steps_taken: u32,
    requirements: BTreeSet<Resource>,
    log: Rc<RefCell<ProbeLog>>,
    journal: Option<Journal>,
}

impl Probe {
    pub fn finishing_after(name: &str, steps: u32) -> (Self, Rc<RefCell<ProbeLog>>) {
        let log = Rc::new(RefCell::new(ProbeLog::default()));
        let probe = Self {
            name: name.to_string(),
            finish_after: steps,
            steps_taken: 0,
            requirements: BTreeSet::new(),
            log: Rc::clone(&log),
            journal: None,
        };
        (probe, log)
    }

    pub fn requiring(mut self, resources: &[Resource]) -> Self {
        self.requirements = resources.iter().copied().collect();
        self
    }

    pub fn journaled(mut self, journal: &Journal) -> Self {
        self.journal = Some(Rc::clone(journal));
        self
    }

    fn note(&self, event: &str) {
        if let Some(journal) = &self.journal {
            journal.borrow_mut().push(format!("{}:{}", self.name, event));
        }
    }
}

impl Action for Probe {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn requirements(&self) -> BTreeSet<Resource> {
        self.requirements.clone()
    }

    fn initialize(&mut self, _robot: &mut dyn Robot) {
        self.log.borrow_mut().initialized += 1;
        self.note("initialize");
    }

    fn step(&mut self, _robot: &mut dyn Robot) {
        self.steps_taken += 1;
        self.log.borrow_mut().steps += 1;
        self.note("step");
    }

    fn is_finished(&self) -> bool {
        self.steps_taken >= self.finish_after
    }

    fn end(&mut self, _robot: &mut dyn Robot) {
        self.log.borrow_mut().ended += 1;
        self.note("end");
    }

    fn interrupted(&mut self, _robot: &mut dyn Robot, reason: &str) {
        let mut log = self.log.borrow_mut();
        log.interrupted += 1;
        log.reasons.push(reason.to_string());
        drop(log);
        self.note("interrupted");
    }
}

/// Start `slot`, then tick and advance the robot until it is terminal.
///
/// Returns the number of ticks taken, or `max_ticks` if it never finished.
pub fn run_slot(slot: &mut Tracked, robot: &mut SimRobot, max_ticks: u64) -> u64 {
    slot.start(robot);
    for tick in 1..=max_ticks {
        if slot.tick(robot) == ActionState::Finished {
            return tick;
        }
        robot.advance();
    }
    max_ticks
}
