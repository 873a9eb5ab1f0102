//! Board initialization: probe every cell of a fresh maze once.

use tracing::{info, instrument};

use crate::core::board::{Board, MazeDescriptor};
use crate::io::oracle::{OracleClient, OracleError};
use crate::io::transport::{RequestKind, Transport};

/// Allocate a board for `descriptor` and fill it by asking the oracle about
/// each cell in row-major order, one request at a time.
///
/// A cell answered with 403 stays blocked. Any other failure aborts the whole
/// board: a partially probed board is never returned.
#[instrument(skip_all, fields(maze_id = %descriptor.id, width = descriptor.width, height = descriptor.height))]
pub fn initialize_board<T: Transport>(
    client: &OracleClient<T>,
    descriptor: &MazeDescriptor,
) -> Result<Board, OracleError> {
    let mut board = Board::new(descriptor).map_err(|err| OracleError::Malformed {
        kind: RequestKind::CreateMaze,
        reason: format!("{err:#}"),
    })?;

    let cells: Vec<_> = board.cells().collect();
    for cell in cells {
        let open = client.check_cell(&descriptor.id, cell.row, cell.col)?;
        if open {
            board
                .set_open(cell, true)
                .map_err(|err| OracleError::Malformed {
                    kind: RequestKind::CheckCell,
                    reason: format!("{err:#}"),
                })?;
        }
    }

    info!(open_cells = board.open_cells(), "board initialized");
    Ok(board)
}
