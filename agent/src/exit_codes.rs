//! Stable exit codes for agent CLI commands.

/// The run completed, or the command succeeded.
pub const OK: i32 = 0;
/// Invalid configuration, a capability failure, or any other error.
pub const ERROR: i32 = 1;
/// The run stopped at a stage with no defined transition.
pub const POLICY_GAP: i32 = 2;
/// The step budget ran out before a terminal decision.
pub const BUDGET_EXHAUSTED: i32 = 3;
