//! Maze path-finder driven by a remote cell-validity oracle.
//!
//! A run fetches a maze, learns every cell's validity from the oracle, solves
//! the board locally with a memoized depth-first search, and submits the path.
//! The code is split the same way:
//!
//! - **[`core`]**: Pure, deterministic logic (board model, solver, path checks).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config file, HTTP oracle, retries).
//!   The transport is a trait so tests can script the oracle.
//!
//! Orchestration modules ([`init`], [`submit`], [`attempt`]) combine the two
//! into the commands the binary exposes.

pub mod attempt;
pub mod core;
pub mod exit_codes;
pub mod init;
pub mod io;
pub mod logging;
pub mod submit;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
