//! Sequential composition with start delays and attached parallel branches.

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::{debug, warn};

use crate::actions::{Action, Tracked};
use crate::core::invariants::{PlanError, check_disjoint};
use crate::core::types::Resource;
use crate::io::hardware::Robot;
use crate::plan::{Outline, OutlineEntry, ParallelBranchSet, PlanNode};

#[derive(Debug)]
enum Entry {
    Step { delay: Duration, node: Tracked },
    Branches(ParallelBranchSet),
}

/// Ordered steps, each run to completion before the next starts.
///
/// Branch sets attached between steps start as soon as the sequence reaches
/// them and are not awaited by the following steps. Before a step starts,
/// any live branch that shares an actuator with it is awaited first.
#[derive(Debug)]
pub struct Sequence {
    entries: Vec<Entry>,
    await_parallel_branches: bool,
    cursor: usize,
    started_at: u64,
    finished: bool,
}

/// Builder for [`Sequence`]; `build` checks resource disjointness.
#[derive(Debug)]
pub struct SequenceBuilder {
    entries: Vec<Entry>,
    await_parallel_branches: bool,
}

impl Default for SequenceBuilder {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            await_parallel_branches: true,
        }
    }
}

impl SequenceBuilder {
    /// Whether the sequence waits for its branches before finishing.
    ///
    /// When false, branches still live after the last step are interrupted.
    pub fn await_parallel_branches(mut self, await_branches: bool) -> Self {
        self.await_parallel_branches = await_branches;
        self
    }

    pub fn then(self, node: impl Into<PlanNode>) -> Self {
        self.then_after(Duration::ZERO, node)
    }

    /// Append a step that may not start before `delay` has elapsed since the
    /// sequence itself started.
    pub fn then_after(mut self, delay: Duration, node: impl Into<PlanNode>) -> Self {
        self.entries.push(Entry::Step {
            delay,
            node: Tracked::new(Box::new(node.into())),
        });
        self
    }

    /// Attach a parallel branch at the current position.
    ///
    /// Consecutive branches join the same set and start on the same tick.
    pub fn alongside(mut self, node: impl Into<PlanNode>) -> Self {
        if let Some(Entry::Branches(set)) = self.entries.last_mut() {
            set.push(node.into());
        } else {
            self.entries
                .push(Entry::Branches(ParallelBranchSet::unchecked(vec![
                    node.into(),
                ])));
        }
        self
    }

    pub fn build(self) -> Result<Sequence, PlanError> {
        let claims: Vec<_> = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Branches(set) => Some(set.claims()),
                Entry::Step { .. } => None,
            })
            .flatten()
            .collect();
        check_disjoint(&claims)?;

        Ok(Sequence {
            entries: self.entries,
            await_parallel_branches: self.await_parallel_branches,
            cursor: 0,
            started_at: 0,
            finished: false,
        })
    }
}

impl Sequence {
    pub fn builder() -> SequenceBuilder {
        SequenceBuilder::default()
    }

    pub fn awaits_parallel_branches(&self) -> bool {
        self.await_parallel_branches
    }

    fn live_branch_requirements(&self) -> BTreeSet<Resource> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Branches(set) => Some(set.live_requirements()),
                Entry::Step { .. } => None,
            })
            .flatten()
            .collect()
    }

    fn branches_settled(&self) -> bool {
        self.entries.iter().all(|entry| match entry {
            Entry::Branches(set) => !set.is_started() || set.all_terminal(),
            Entry::Step { .. } => true,
        })
    }

    fn tick_started_branches(&mut self, robot: &mut dyn Robot) {
        for entry in &mut self.entries {
            if let Entry::Branches(set) = entry {
                if set.is_started() {
                    set.tick(robot);
                }
            }
        }
    }

    /// Move through positions until one has to wait for a later tick.
    fn advance(&mut self, robot: &mut dyn Robot) {
        while self.cursor < self.entries.len() {
            let live_branches = self.live_branch_requirements();
            let started_at = self.started_at;
            match &mut self.entries[self.cursor] {
                Entry::Branches(set) => {
                    set.start(robot);
                    set.tick(robot);
                }
                Entry::Step { delay, node } => {
                    if !node.state().is_terminal() {
                        if !node.state().is_active() {
                            let delay_micros =
                                u64::try_from(delay.as_micros()).unwrap_or(u64::MAX);
                            let ready_at = started_at.saturating_add(delay_micros);
                            if robot.now_micros() < ready_at {
                                return;
                            }
                            if !live_branches.is_disjoint(&node.requirements()) {
                                debug!(
                                    action = %node.name(),
                                    "waiting for parallel branch to release resources"
                                );
                                return;
                            }
                            node.start(robot);
                        }
                        if !node.tick(robot).is_terminal() {
                            return;
                        }
                    }
                }
            }
            self.cursor += 1;
        }
    }
}

impl Action for Sequence {
    fn name(&self) -> String {
        "Sequence".to_string()
    }

    fn requirements(&self) -> BTreeSet<Resource> {
        self.entries
            .iter()
            .flat_map(|entry| match entry {
                Entry::Step { node, .. } => node.requirements(),
                Entry::Branches(set) => set.requirements(),
            })
            .collect()
    }

    fn initialize(&mut self, robot: &mut dyn Robot) {
        self.started_at = robot.now_micros();
        self.cursor = 0;
        self.finished = false;
        debug!(entries = self.entries.len(), "sequence started");
    }

    fn step(&mut self, robot: &mut dyn Robot) {
        self.tick_started_branches(robot);
        self.advance(robot);

        if self.cursor < self.entries.len() {
            return;
        }
        if self.await_parallel_branches {
            self.finished = self.branches_settled();
            return;
        }
        for entry in &mut self.entries {
            if let Entry::Branches(set) = entry {
                set.cancel(robot, "sequence finished");
            }
        }
        self.finished = true;
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn end(&mut self, _robot: &mut dyn Robot) {
        debug!("sequence finished");
    }

    fn interrupted(&mut self, robot: &mut dyn Robot, reason: &str) {
        let mut cancelled = 0;
        for entry in &mut self.entries {
            let hit = match entry {
                Entry::Step { node, .. } => usize::from(node.cancel(robot, reason)),
                Entry::Branches(set) => set.cancel(robot, reason),
            };
            cancelled += hit;
        }
        warn!(
            action = %self.name(),
            reason,
            cancelled,
            position = self.cursor,
            "sequence interrupted"
        );
    }

    fn outline(&self) -> Outline {
        Outline::Sequence {
            entries: self
                .entries
                .iter()
                .map(|entry| match entry {
                    Entry::Step { delay, node } => OutlineEntry::Step {
                        delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        node: node.outline(),
                    },
                    Entry::Branches(set) => OutlineEntry::Branches {
                        branches: set.branch_outlines(),
                    },
                })
                .collect(),
        }
    }
}
