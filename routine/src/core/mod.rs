//! Deterministic, pure logic shared by the routine runtime.
//!
//! Core modules are free of actuator I/O. They operate on in-memory values and
//! return deterministic outputs suitable for tests.

pub mod decision;
pub mod invariants;
pub mod mission;
pub mod tables;
pub mod types;
