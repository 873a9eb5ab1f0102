//! Reachability verdicts cached per coordinate for one solve.

use std::collections::HashMap;

use crate::core::board::Coordinate;

/// Coordinate -> "leads to the goal" cache.
///
/// Entries are keyed by coordinate only, not by the path that reached it, so a
/// `false` records "no route to the goal avoiding the cells on the path at the
/// time it was written".
#[derive(Debug, Clone, Default)]
pub struct PathMemo {
    verdicts: HashMap<Coordinate, bool>,
}

impl PathMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, cell: Coordinate) -> bool {
        self.verdicts.contains_key(&cell)
    }

    pub fn get(&self, cell: Coordinate) -> Option<bool> {
        self.verdicts.get(&cell).copied()
    }

    pub fn set(&mut self, cell: Coordinate, reaches_goal: bool) {
        self.verdicts.insert(cell, reaches_goal);
    }

    pub fn remove(&mut self, cell: Coordinate) -> Option<bool> {
        self.verdicts.remove(&cell)
    }

    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }
}
