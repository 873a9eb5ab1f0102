//! Deterministic, pure logic for board modelling and search.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod board;
pub mod memo;
pub mod path;
pub mod render;
pub mod solver;
