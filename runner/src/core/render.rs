//! Text rendering of a board with an optional path overlay.

use std::collections::HashSet;

use crate::core::board::{Board, Coordinate};

/// Render `board` one row per line: `#` blocked, `.` open, `*` on `path`.
///
/// The output parses back with [`Board::parse`].
pub fn render(board: &Board, path: &[Coordinate]) -> String {
    let on_path: HashSet<Coordinate> = path.iter().copied().collect();
    let mut out = String::with_capacity((board.width() + 1) * board.height());
    for row in 0..board.height() {
        for col in 0..board.width() {
            let cell = Coordinate::new(row, col);
            let ch = if on_path.contains(&cell) {
                '*'
            } else if board.is_open(cell) {
                '.'
            } else {
                '#'
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_path_cells() {
        let board = Board::parse("m", "..\n#.").expect("board");
        let path = [
            Coordinate::new(0, 0),
            Coordinate::new(0, 1),
            Coordinate::new(1, 1),
        ];
        assert_eq!(render(&board, &path), "**\n#*\n");
        assert_eq!(render(&board, &[]), "..\n#.\n");
    }

    #[test]
    fn rendered_board_parses_back() {
        let board = Board::parse("m", ".#.\n...\n").expect("board");
        let reparsed = Board::parse("m", &render(&board, &[])).expect("reparse");
        assert_eq!(reparsed, board);
    }
}
