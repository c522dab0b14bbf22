//! Autonomous routine composer and cooperative action runtime.
//!
//! Mission parameters are turned into a tree of atomic actions which a
//! tick-driven scheduler steps until the routine completes. The crate keeps a
//! strict separation:
//!
//! - **[`core`]**: Pure, deterministic decisions (lookup tables, mission
//!   parameters, resource invariants). No actuator access.
//! - **[`io`]**: Capability traits for the robot hardware, a simulated robot
//!   that records every command, and the TOML config file.
//!
//! [`actions`] and [`plan`] define the action lifecycle and how actions
//! compose; [`compose`] builds the routine and [`scheduler`] runs it.

pub mod actions;
pub mod compose;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod plan;
pub mod scheduler;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
