//! Board model: maze dimensions, session id, and per-cell validity.
//!
//! A board is created once from the oracle's maze descriptor with every cell
//! blocked, filled in cell-by-cell by the initializer, and read-only after
//! that. Coordinates are `(row, col)`; the oracle calls them `x` and `y`.

use std::fmt;

use anyhow::{Result, bail, ensure};
use serde::{Deserialize, Serialize};

/// Largest board the runner will allocate and probe, one request per cell.
pub const MAX_CELLS: usize = 1 << 24;

/// Maze metadata returned by `POST /maze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeDescriptor {
    pub width: usize,
    pub height: usize,
    pub id: String,
}

impl MazeDescriptor {
    /// Reject descriptors that cannot describe a board with a start and a goal.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.width > 0, "maze width must be > 0");
        ensure!(self.height > 0, "maze height must be > 0");
        let cells = self.width.checked_mul(self.height);
        ensure!(
            cells.is_some_and(|cells| cells <= MAX_CELLS),
            "maze dimensions {}x{} exceed {} cells",
            self.width,
            self.height,
            MAX_CELLS
        );
        ensure!(!self.id.trim().is_empty(), "maze id must be non-empty");
        Ok(())
    }
}

/// Grid position. Hashes as the `(row, col)` pair, so `(1,23)` and `(12,3)`
/// are distinct keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(rename = "x")]
    pub row: usize,
    #[serde(rename = "y")]
    pub col: usize,
}

impl Coordinate {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Neighbour one step in `direction`, or `None` if it would fall off the
    /// top or left edge. Bottom/right bounds are the board's concern.
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (row, col) = match direction {
            Direction::Down => (self.row.checked_add(1)?, self.col),
            Direction::Right => (self.row, self.col.checked_add(1)?),
            Direction::Up => (self.row.checked_sub(1)?, self.col),
            Direction::Left => (self.row, self.col.checked_sub(1)?),
        };
        Some(Self { row, col })
    }

    /// True if `other` is exactly one 4-directional step away.
    pub fn is_adjacent(self, other: Self) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Down,
    Right,
    Up,
    Left,
}

impl Direction {
    /// Neighbour priority used by the solver.
    pub const SEARCH_ORDER: [Direction; 4] = [
        Direction::Down,
        Direction::Right,
        Direction::Up,
        Direction::Left,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    maze_id: String,
    /// Row-major, `height * width` entries.
    open: Vec<bool>,
}

impl Board {
    /// Allocate a board for `descriptor` with every cell blocked.
    pub fn new(descriptor: &MazeDescriptor) -> Result<Self> {
        descriptor.validate()?;
        Ok(Self {
            width: descriptor.width,
            height: descriptor.height,
            maze_id: descriptor.id.clone(),
            open: vec![false; descriptor.width * descriptor.height],
        })
    }

    /// Parse a text board: one line per row, `#` blocked, `.` or `*` open.
    ///
    /// Blank lines are ignored; all rows must have the same width.
    pub fn parse(maze_id: &str, text: &str) -> Result<Self> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let Some(first) = rows.first() else {
            bail!("board text has no rows");
        };
        let width = first.chars().count();
        let mut board = Self::new(&MazeDescriptor {
            width,
            height: rows.len(),
            id: maze_id.to_string(),
        })?;

        for (row, line) in rows.iter().enumerate() {
            let cells = line.chars().count();
            ensure!(
                cells == width,
                "row {} has {} cells, expected {}",
                row,
                cells,
                width
            );
            for (col, ch) in line.chars().enumerate() {
                let open = match ch {
                    '.' | '*' => true,
                    '#' => false,
                    other => bail!("row {row} col {col}: unexpected cell '{other}'"),
                };
                board.set_open(Coordinate::new(row, col), open)?;
            }
        }
        Ok(board)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn maze_id(&self) -> &str {
        &self.maze_id
    }

    pub fn start(&self) -> Coordinate {
        Coordinate::new(0, 0)
    }

    pub fn goal(&self) -> Coordinate {
        Coordinate::new(self.height - 1, self.width - 1)
    }

    pub fn contains(&self, cell: Coordinate) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    /// True if `cell` is on the board and may be stepped on.
    pub fn is_open(&self, cell: Coordinate) -> bool {
        self.index(cell).is_some_and(|idx| self.open[idx])
    }

    pub fn set_open(&mut self, cell: Coordinate, open: bool) -> Result<()> {
        let Some(idx) = self.index(cell) else {
            bail!("cell {} outside {}x{} board", cell, self.height, self.width);
        };
        self.open[idx] = open;
        Ok(())
    }

    pub fn open_cells(&self) -> usize {
        self.open.iter().filter(|open| **open).count()
    }

    /// Every coordinate in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..self.height)
            .flat_map(move |row| (0..self.width).map(move |col| Coordinate::new(row, col)))
    }

    fn index(&self, cell: Coordinate) -> Option<usize> {
        self.contains(cell).then(|| cell.row * self.width + cell.col)
    }
}
