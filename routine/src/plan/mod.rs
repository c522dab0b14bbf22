//! Executable plan trees built from atomic actions.
//!
//! A [`PlanNode`] is either a leaf action, a [`Sequence`], or a
//! [`ParallelBranchSet`]. Composite nodes satisfy the same [`Action`] contract
//! as leaves, so the scheduler drives a whole routine as a single action.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use serde::Serialize;

use crate::actions::Action;
use crate::core::types::Resource;
use crate::io::hardware::Robot;

mod parallel;
mod sequence;

pub use parallel::ParallelBranchSet;
pub use sequence::{Sequence, SequenceBuilder};

#[derive(Debug)]
pub enum PlanNode {
    Leaf(Box<dyn Action>),
    Sequence(Sequence),
    Parallel(ParallelBranchSet),
}

impl PlanNode {
    pub fn leaf(action: impl Action + 'static) -> Self {
        PlanNode::Leaf(Box::new(action))
    }
}

impl From<Sequence> for PlanNode {
    fn from(sequence: Sequence) -> Self {
        PlanNode::Sequence(sequence)
    }
}

impl From<ParallelBranchSet> for PlanNode {
    fn from(set: ParallelBranchSet) -> Self {
        PlanNode::Parallel(set)
    }
}

impl From<Box<dyn Action>> for PlanNode {
    fn from(action: Box<dyn Action>) -> Self {
        PlanNode::Leaf(action)
    }
}

impl PlanNode {
    fn inner(&self) -> &dyn Action {
        match self {
            PlanNode::Leaf(action) => action.as_ref(),
            PlanNode::Sequence(sequence) => sequence,
            PlanNode::Parallel(set) => set,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Action {
        match self {
            PlanNode::Leaf(action) => action.as_mut(),
            PlanNode::Sequence(sequence) => sequence,
            PlanNode::Parallel(set) => set,
        }
    }
}

impl Action for PlanNode {
    fn name(&self) -> String {
        self.inner().name()
    }

    fn requirements(&self) -> BTreeSet<Resource> {
        self.inner().requirements()
    }

    fn initialize(&mut self, robot: &mut dyn Robot) {
        self.inner_mut().initialize(robot);
    }

    fn step(&mut self, robot: &mut dyn Robot) {
        self.inner_mut().step(robot);
    }

    fn is_finished(&self) -> bool {
        self.inner().is_finished()
    }

    fn end(&mut self, robot: &mut dyn Robot) {
        self.inner_mut().end(robot);
    }

    fn interrupted(&mut self, robot: &mut dyn Robot, reason: &str) {
        self.inner_mut().interrupted(robot, reason);
    }

    fn outline(&self) -> Outline {
        self.inner().outline()
    }
}

/// Structural description of a plan, stable across runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outline {
    Leaf { name: String },
    Sequence { entries: Vec<OutlineEntry> },
    Parallel { branches: Vec<Outline> },
}

/// One position of a sequence outline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "attach", rename_all = "snake_case")]
pub enum OutlineEntry {
    /// Runs to completion before the next position starts.
    Step { delay_ms: u64, node: Outline },
    /// Starts here and runs alongside the following steps.
    Branches { branches: Vec<Outline> },
}

impl Outline {
    pub fn leaf(name: impl Into<String>) -> Self {
        Outline::Leaf { name: name.into() }
    }

    /// Render as indented text, one line per node.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        match self {
            Outline::Leaf { name } => {
                let _ = writeln!(out, "{indent}{name}");
            }
            Outline::Sequence { entries } => {
                let _ = writeln!(out, "{indent}Sequence");
                for entry in entries {
                    match entry {
                        OutlineEntry::Step { delay_ms, node } => {
                            if *delay_ms > 0 {
                                let _ = writeln!(out, "{indent}  after {delay_ms}ms:");
                                node.render_into(out, depth + 2);
                            } else {
                                node.render_into(out, depth + 1);
                            }
                        }
                        OutlineEntry::Branches { branches } => {
                            let _ = writeln!(out, "{indent}  alongside:");
                            for branch in branches {
                                branch.render_into(out, depth + 2);
                            }
                        }
                    }
                }
            }
            Outline::Parallel { branches } => {
                let _ = writeln!(out, "{indent}Parallel");
                for branch in branches {
                    branch.render_into(out, depth + 1);
                }
            }
        }
    }
}
