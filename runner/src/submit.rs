//! Submission of a solved path.

use tracing::warn;

use crate::core::board::{Board, Coordinate};
use crate::core::path::path_violations;
use crate::io::oracle::{OracleClient, OracleError, SubmitVerdict};
use crate::io::transport::Transport;

/// Submit `path` for `board`'s maze exactly as given, start and goal included.
///
/// Structural problems are logged, not fixed; the oracle has the final word.
pub fn submit<T: Transport>(
    client: &OracleClient<T>,
    board: &Board,
    path: &[Coordinate],
) -> Result<SubmitVerdict, OracleError> {
    let violations = path_violations(board, path);
    if !violations.is_empty() {
        warn!(
            maze_id = board.maze_id(),
            violations = %violations.join("; "),
            "submitting a path that does not look valid"
        );
    }
    client.submit_solution(board.maze_id(), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::transport::RequestKind;
    use crate::test_support::{Fault, FakeOracle, instant_client};

    #[test]
    fn submits_path_unchanged() {
        let fake = FakeOracle::from_text("m", "..\n#.").expect("fake");
        let board = fake.board().clone();
        let client = instant_client(fake);
        let path = vec![
            Coordinate::new(0, 0),
            Coordinate::new(0, 1),
            Coordinate::new(1, 1),
        ];

        let verdict = submit(&client, &board, &path).expect("submit");
        assert_eq!(verdict, SubmitVerdict::Accepted("maze solved".to_string()));
        assert_eq!(client.transport().submitted(), Some(path));
    }

    #[test]
    fn invalid_path_is_still_sent() {
        let fake = FakeOracle::from_text("m", "..\n#.").expect("fake");
        fake.inject(RequestKind::Solve, Fault::Status(403));
        let board = fake.board().clone();
        let client = instant_client(fake);
        let path = vec![Coordinate::new(0, 0), Coordinate::new(1, 1)];

        let verdict = submit(&client, &board, &path).expect("submit");
        assert_eq!(verdict, SubmitVerdict::Rejected);
        assert_eq!(client.transport().submitted(), None);
        assert_eq!(client.transport().count(RequestKind::Solve), 1);
    }

    #[test]
    fn exhausted_retries_surface_as_error() {
        let fake = FakeOracle::from_text("m", ".").expect("fake");
        for _ in 0..5 {
            fake.inject(RequestKind::Solve, Fault::Disconnect);
        }
        let board = fake.board().clone();
        let client = instant_client(fake);

        let err = submit(&client, &board, &[Coordinate::new(0, 0)]).unwrap_err();
        assert!(matches!(err, OracleError::Exhausted { attempts: 5, .. }));
    }
}
