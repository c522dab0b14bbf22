//! Stable exit codes for routine CLI commands.

/// Command succeeded, or the simulated routine ran to completion.
pub const OK: i32 = 0;
/// Invalid config, arguments, or plan.
pub const INVALID: i32 = 1;
/// `routine simulate` hit the tick limit before the routine finished.
pub const TICK_LIMIT: i32 = 2;
