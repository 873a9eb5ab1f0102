//! One maze attempt: fetch, initialize, solve, submit.

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::core::board::Coordinate;
use crate::core::solver::{MemoPolicy, solve};
use crate::init::initialize_board;
use crate::io::oracle::{OracleClient, OracleError, SubmitVerdict};
use crate::io::transport::Transport;
use crate::submit::submit;

#[derive(Debug, Error)]
pub enum AttemptError {
    /// Fetching the maze or probing its cells failed.
    #[error("maze failed to initialize: {0}")]
    Init(#[source] OracleError),
    /// The solution was found but could not be delivered.
    #[error("maze solved but not submitted: {0}")]
    Submit(#[source] OracleError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Submitted {
        path: Vec<Coordinate>,
        response: String,
    },
    /// The oracle answered 403 to the submission.
    Rejected { path: Vec<Coordinate> },
    /// No path from start to goal; nothing was submitted.
    Unsolvable,
}

/// Run the full lifecycle once against `client`.
#[instrument(skip_all, fields(policy = ?policy))]
pub fn run_attempt<T: Transport>(
    client: &OracleClient<T>,
    policy: MemoPolicy,
) -> Result<AttemptOutcome, AttemptError> {
    let descriptor = client.fetch_maze().map_err(AttemptError::Init)?;
    let board = initialize_board(client, &descriptor).map_err(AttemptError::Init)?;

    let solution = solve(&board, policy);
    if !solution.found {
        warn!(
            maze_id = board.maze_id(),
            expanded = solution.stats.expanded,
            "no path from start to goal"
        );
        return Ok(AttemptOutcome::Unsolvable);
    }
    info!(
        path_len = solution.path.len(),
        memo_hits = solution.stats.memo_hits,
        "maze solved"
    );

    let verdict = submit(client, &board, &solution.path).map_err(AttemptError::Submit)?;
    Ok(match verdict {
        SubmitVerdict::Accepted(response) => AttemptOutcome::Submitted {
            path: solution.path,
            response,
        },
        SubmitVerdict::Rejected => AttemptOutcome::Rejected {
            path: solution.path,
        },
    })
}
