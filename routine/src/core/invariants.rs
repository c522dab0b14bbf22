//! Plan invariants checked at construction time.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::types::Resource;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// Two branches that may run at the same time both claim an actuator.
    #[error("'{first}' and '{second}' both require the {resource} while running in parallel")]
    ResourceConflict {
        first: String,
        second: String,
        resource: Resource,
    },
}

/// Check that concurrently live units claim pairwise-disjoint resources.
///
/// `units` pairs each unit's identity with its requirements. The first
/// conflicting pair in input order is reported.
pub fn check_disjoint(units: &[(String, BTreeSet<Resource>)]) -> Result<(), PlanError> {
    for (index, (first, first_reqs)) in units.iter().enumerate() {
        for (second, second_reqs) in &units[index + 1..] {
            if let Some(resource) = first_reqs.intersection(second_reqs).next() {
                return Err(PlanError::ResourceConflict {
                    first: first.clone(),
                    second: second.clone(),
                    resource: *resource,
                });
            }
        }
    }
    Ok(())
}
