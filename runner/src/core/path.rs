//! Structural checks for a start-to-goal path.

use std::collections::HashSet;

use crate::core::board::{Board, Coordinate};

/// Report every way `path` fails to be a simple 4-directional walk over open
/// cells from the board's start to its goal.
///
/// An empty result means the path is well formed.
pub fn path_violations(board: &Board, path: &[Coordinate]) -> Vec<String> {
    let mut errors = Vec::new();
    let (Some(first), Some(last)) = (path.first(), path.last()) else {
        errors.push("path is empty".to_string());
        return errors;
    };

    if *first != board.start() {
        errors.push(format!("path starts at {} instead of {}", first, board.start()));
    }
    if *last != board.goal() {
        errors.push(format!("path ends at {} instead of {}", last, board.goal()));
    }

    let mut seen = HashSet::new();
    for (idx, cell) in path.iter().enumerate() {
        if !board.contains(*cell) {
            errors.push(format!("step {}: {} is off the board", idx, cell));
        } else if !board.is_open(*cell) {
            errors.push(format!("step {}: {} is blocked", idx, cell));
        }
        if !seen.insert(*cell) {
            errors.push(format!("step {}: {} repeats an earlier cell", idx, cell));
        }
    }

    for (idx, pair) in path.windows(2).enumerate() {
        if !pair[0].is_adjacent(pair[1]) {
            errors.push(format!(
                "step {}: {} -> {} is not a single move",
                idx + 1,
                pair[0],
                pair[1]
            ));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::parse("test", "..#\n...\n#..").expect("board")
    }

    fn cells(pairs: &[(usize, usize)]) -> Vec<Coordinate> {
        pairs
            .iter()
            .map(|&(row, col)| Coordinate::new(row, col))
            .collect()
    }

    #[test]
    fn accepts_simple_walk() {
        let path = cells(&[(0, 0), (0, 1), (1, 1), (1, 2), (2, 2)]);
        assert!(path_violations(&board(), &path).is_empty());
    }

    #[test]
    fn reports_each_problem() {
        let path = cells(&[(0, 1), (0, 2), (1, 1), (0, 1), (2, 2)]);
        let errors = path_violations(&board(), &path);
        assert!(errors.iter().any(|err| err.contains("starts at (0,1)")));
        assert!(errors.iter().any(|err| err.contains("(0,2) is blocked")));
        assert!(errors.iter().any(|err| err.contains("repeats")));
        assert!(errors.iter().any(|err| err.contains("not a single move")));
    }

    #[test]
    fn empty_path_is_a_violation() {
        assert_eq!(path_violations(&board(), &[]), vec!["path is empty"]);
    }
}
