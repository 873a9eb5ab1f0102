//! Depth-first backtracking search from the start corner to the goal corner.
//!
//! The search keeps three pieces of state for one solve: the ordered solution
//! path, the set of cells on that path (cycle detection), and a [`PathMemo`]
//! of cells already known to lead, or not lead, to the goal. Neighbours are
//! tried in [`Direction::SEARCH_ORDER`] (down, right, up, left), so the path
//! found is the first one in that priority order, not the shortest.
//!
//! The recursion runs on an explicit frame stack so board size does not bound
//! the native call stack. Visiting order and memo writes are the same as the
//! recursive formulation: a cell is memoized `false` when all its neighbours
//! fail, and every cell below the start on a successful chain is memoized
//! `true`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::board::{Board, Coordinate, Direction};
use crate::core::memo::PathMemo;

/// How a memoized neighbour verdict is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoPolicy {
    /// Return the memoized verdict for the current cell without trying the
    /// remaining neighbours.
    ///
    /// A memo entry is keyed by coordinate only, so a `false` written under
    /// one path-so-far can reject a cell that is reachable under another.
    /// This can miss existing paths on some boards.
    #[default]
    ShortCircuit,
    /// Skip a neighbour memoized `false` and keep trying the others. Complete:
    /// finds a path whenever one exists.
    SkipFailed,
}

/// Counters for one solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Cells pushed as search frames (goal excluded).
    pub expanded: usize,
    /// Neighbour lookups answered by the memo.
    pub memo_hits: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub found: bool,
    /// Start-to-goal cells when `found`, empty otherwise.
    pub path: Vec<Coordinate>,
    pub stats: SearchStats,
}

/// Search `board` from its start to its goal with a fresh memo and path.
pub fn solve(board: &Board, policy: MemoPolicy) -> Solution {
    let mut search = Search::new(board, policy);
    let found = search.run();
    debug!(
        found,
        path_len = search.path.len(),
        expanded = search.stats.expanded,
        memo_hits = search.stats.memo_hits,
        memo_entries = search.memo.len(),
        ?policy,
        "search finished"
    );
    Solution {
        found,
        path: search.path,
        stats: search.stats,
    }
}

struct Frame {
    cell: Coordinate,
    /// Index into `Direction::SEARCH_ORDER` of the next neighbour to try.
    next: usize,
}

impl Frame {
    fn new(cell: Coordinate) -> Self {
        Self { cell, next: 0 }
    }
}

enum Entry {
    /// Blocked, off the board, or already on the path.
    Rejected,
    Goal,
    Expanded,
}

struct Search<'a> {
    board: &'a Board,
    policy: MemoPolicy,
    goal: Coordinate,
    on_path: HashSet<Coordinate>,
    path: Vec<Coordinate>,
    memo: PathMemo,
    stats: SearchStats,
}

impl<'a> Search<'a> {
    fn new(board: &'a Board, policy: MemoPolicy) -> Self {
        Self {
            board,
            policy,
            goal: board.goal(),
            on_path: HashSet::new(),
            path: Vec::new(),
            memo: PathMemo::new(),
            stats: SearchStats::default(),
        }
    }

    fn run(&mut self) -> bool {
        let start = self.board.start();
        let mut stack = match self.enter(start) {
            Entry::Rejected => return false,
            Entry::Goal => return true,
            Entry::Expanded => vec![Frame::new(start)],
        };

        while let Some(frame) = stack.last_mut() {
            let cell = frame.cell;
            let Some(&direction) = Direction::SEARCH_ORDER.get(frame.next) else {
                // Every neighbour failed.
                stack.pop();
                self.memo.set(cell, false);
                self.leave(cell);
                continue;
            };
            frame.next += 1;

            // Off the top/left edge: same as an out-of-bounds rejection.
            let Some(candidate) = cell.step(direction) else {
                continue;
            };

            if let Some(reaches_goal) = self.memo.get(candidate) {
                self.stats.memo_hits += 1;
                if reaches_goal {
                    self.commit(&stack);
                    return true;
                }
                if self.policy == MemoPolicy::ShortCircuit {
                    stack.pop();
                    self.leave(cell);
                }
                continue;
            }

            match self.enter(candidate) {
                Entry::Rejected => {}
                Entry::Goal => {
                    self.memo.set(candidate, true);
                    self.commit(&stack);
                    return true;
                }
                Entry::Expanded => stack.push(Frame::new(candidate)),
            }
        }
        false
    }

    fn enter(&mut self, cell: Coordinate) -> Entry {
        if !self.board.is_open(cell) || self.on_path.contains(&cell) {
            return Entry::Rejected;
        }
        self.on_path.insert(cell);
        self.path.push(cell);
        if cell == self.goal {
            return Entry::Goal;
        }
        self.stats.expanded += 1;
        Entry::Expanded
    }

    fn leave(&mut self, cell: Coordinate) {
        self.on_path.remove(&cell);
        self.path.pop();
    }

    /// Record `true` for every frame whose parent saw it succeed.
    fn commit(&mut self, stack: &[Frame]) {
        for frame in stack.iter().skip(1) {
            self.memo.set(frame.cell, true);
        }
    }
}
