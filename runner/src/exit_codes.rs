//! Stable exit codes for `maze-runner` commands.

/// Maze solved (and, for `run`, submitted and accepted).
pub const OK: i32 = 0;
/// Bad config, usage, or unreadable input.
pub const INVALID: i32 = 1;
/// Fetching the maze or probing its cells failed.
pub const INIT_FAILED: i32 = 2;
/// No path from start to goal.
pub const UNSOLVED: i32 = 3;
/// Submission failed or the oracle rejected the path.
pub const SUBMIT_FAILED: i32 = 4;
