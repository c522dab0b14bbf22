//! Branch sets that run alongside a sequence.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::actions::{Action, Tracked};
use crate::core::invariants::{PlanError, check_disjoint};
use crate::core::types::{ActionState, Resource};
use crate::io::hardware::Robot;
use crate::plan::{Outline, PlanNode};

/// Branches that start together and run independently.
///
/// Branches must claim disjoint resources. The set is finished once every
/// branch has reached a terminal state.
#[derive(Debug)]
pub struct ParallelBranchSet {
    branches: Vec<Tracked>,
    started: bool,
}

impl ParallelBranchSet {
    pub fn new(branches: Vec<PlanNode>) -> Result<Self, PlanError> {
        let set = Self::unchecked(branches);
        check_disjoint(&set.claims())?;
        Ok(set)
    }

    pub(crate) fn unchecked(branches: Vec<PlanNode>) -> Self {
        Self {
            branches: branches
                .into_iter()
                .map(|node| Tracked::new(Box::new(node)))
                .collect(),
            started: false,
        }
    }

    pub(crate) fn push(&mut self, node: PlanNode) {
        self.branches.push(Tracked::new(Box::new(node)));
    }

    /// Identity and requirements of every branch.
    pub(crate) fn claims(&self) -> Vec<(String, BTreeSet<Resource>)> {
        self.branches
            .iter()
            .map(|branch| (branch.name(), branch.requirements()))
            .collect()
    }

    pub(crate) fn branch_outlines(&self) -> Vec<Outline> {
        self.branches.iter().map(Tracked::outline).collect()
    }

    pub fn states(&self) -> Vec<ActionState> {
        self.branches.iter().map(Tracked::state).collect()
    }

    pub(crate) fn is_started(&self) -> bool {
        self.started
    }

    pub(crate) fn start(&mut self, robot: &mut dyn Robot) {
        if self.started {
            return;
        }
        self.started = true;
        for branch in &mut self.branches {
            branch.start(robot);
        }
    }

    pub(crate) fn tick(&mut self, robot: &mut dyn Robot) {
        for branch in &mut self.branches {
            branch.tick(robot);
        }
    }

    pub(crate) fn all_terminal(&self) -> bool {
        self.branches.iter().all(|branch| branch.state().is_terminal())
    }

    /// Resources held by branches that are still live.
    pub(crate) fn live_requirements(&self) -> BTreeSet<Resource> {
        self.branches
            .iter()
            .filter(|branch| branch.state().is_active())
            .flat_map(|branch| branch.requirements())
            .collect()
    }

    /// Interrupt every live branch. Returns how many were interrupted.
    pub(crate) fn cancel(&mut self, robot: &mut dyn Robot, reason: &str) -> usize {
        let mut cancelled = 0;
        for branch in &mut self.branches {
            if branch.cancel(robot, reason) {
                cancelled += 1;
            }
        }
        cancelled
    }
}

impl Action for ParallelBranchSet {
    fn name(&self) -> String {
        "Parallel".to_string()
    }

    fn requirements(&self) -> BTreeSet<Resource> {
        self.branches
            .iter()
            .flat_map(|branch| branch.requirements())
            .collect()
    }

    fn initialize(&mut self, robot: &mut dyn Robot) {
        debug!(branches = self.branches.len(), "starting parallel branches");
        self.start(robot);
    }

    fn step(&mut self, robot: &mut dyn Robot) {
        self.tick(robot);
    }

    fn is_finished(&self) -> bool {
        self.all_terminal()
    }

    fn end(&mut self, _robot: &mut dyn Robot) {}

    fn interrupted(&mut self, robot: &mut dyn Robot, reason: &str) {
        let cancelled = self.cancel(robot, reason);
        warn!(action = %self.name(), reason, cancelled, "parallel branches interrupted");
    }

    fn outline(&self) -> Outline {
        Outline::Parallel {
            branches: self.branch_outlines(),
        }
    }
}
