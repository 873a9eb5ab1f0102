//! Oracle client: fetch a maze, probe cells, submit a solution.
//!
//! Each operation classifies responses (see [`ResponseClass`]) and feeds them
//! to the shared retry driver with its own policy:
//!
//! | operation       | 2xx        | 403            | 503      | other / no status |
//! |-----------------|------------|----------------|----------|-------------------|
//! | fetch maze      | descriptor | `Unauthorized` | backoff  | backoff           |
//! | check cell      | `true`     | `false`        | re-issue | `Transient`       |
//! | submit solution | `Accepted` | `Rejected`     | re-issue | backoff           |
//!
//! Cell checks are issued `width * height` times, so they never back off.

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::core::board::{Coordinate, MazeDescriptor};
use crate::io::config::MazeRunnerConfig;
use crate::io::retry::{RetryPolicy, Step, drive};
use crate::io::transport::{OracleRequest, OracleResponse, RequestKind, Transport};

#[derive(Debug, Error)]
pub enum OracleError {
    /// 403 on an operation where it is fatal. Never retried.
    #[error("{kind}: oracle answered 403 forbidden")]
    Unauthorized { kind: RequestKind },
    /// Failure that is not retried for this operation.
    #[error("{kind}: {reason}")]
    Transient { kind: RequestKind, reason: String },
    /// 503 persisted past the re-issue cap.
    #[error("{kind}: oracle still busy after {reissues} immediate re-issues")]
    Overloaded { kind: RequestKind, reissues: u32 },
    /// Bounded retry budget consumed; the oracle is treated as unreachable.
    #[error("{kind}: oracle unreachable after {attempts} attempts (last: {last})")]
    Exhausted {
        kind: RequestKind,
        attempts: u32,
        last: String,
    },
    /// A 2xx response whose body does not describe a usable maze.
    #[error("{kind}: malformed response: {reason}")]
    Malformed { kind: RequestKind, reason: String },
}

/// How a response status is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    Success,
    Forbidden,
    Busy,
    Transient,
}

impl ResponseClass {
    pub fn of(status: u16) -> Self {
        match status {
            200..=299 => ResponseClass::Success,
            403 => ResponseClass::Forbidden,
            503 => ResponseClass::Busy,
            _ => ResponseClass::Transient,
        }
    }
}

/// Outcome of a submission the oracle answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitVerdict {
    /// 2xx, with the oracle's response body.
    Accepted(String),
    /// 403: the oracle refused the solution.
    Rejected,
}

pub struct OracleClient<T> {
    transport: T,
    policy: RetryPolicy,
    reissue_limit: u32,
}

impl<T: Transport> OracleClient<T> {
    pub fn new(transport: T, policy: RetryPolicy, reissue_limit: u32) -> Self {
        Self {
            transport,
            policy,
            reissue_limit,
        }
    }

    pub fn from_config(transport: T, cfg: &MazeRunnerConfig) -> Self {
        Self::new(
            transport,
            cfg.retry.policy(),
            cfg.oracle.overload_reissue_limit,
        )
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Create a maze session and return its descriptor.
    #[instrument(skip_all)]
    pub fn fetch_maze(&self) -> Result<MazeDescriptor, OracleError> {
        let kind = RequestKind::CreateMaze;
        let descriptor = drive(kind, &self.policy, self.reissue_limit, || {
            match self.transport.send(&OracleRequest::CreateMaze) {
                Err(err) => Ok(Step::Backoff(format!("{err:#}"))),
                Ok(response) => match ResponseClass::of(response.status) {
                    ResponseClass::Success => parse_descriptor(&response).map(Step::Done),
                    ResponseClass::Forbidden => Err(OracleError::Unauthorized { kind }),
                    ResponseClass::Busy | ResponseClass::Transient => {
                        Ok(Step::Backoff(status_reason(&response)))
                    }
                },
            }
        })?;
        info!(
            maze_id = %descriptor.id,
            width = descriptor.width,
            height = descriptor.height,
            "maze fetched"
        );
        Ok(descriptor)
    }

    /// Ask whether `(row, col)` may be stepped on. A 403 means "no", not an error.
    pub fn check_cell(&self, maze_id: &str, row: usize, col: usize) -> Result<bool, OracleError> {
        let kind = RequestKind::CheckCell;
        let request = OracleRequest::CheckCell { maze_id, row, col };
        let open = drive(kind, &self.policy, self.reissue_limit, || {
            let response = self
                .transport
                .send(&request)
                .map_err(|err| OracleError::Transient {
                    kind,
                    reason: format!("{err:#}"),
                })?;
            match ResponseClass::of(response.status) {
                ResponseClass::Success => Ok(Step::Done(true)),
                ResponseClass::Forbidden => Ok(Step::Done(false)),
                ResponseClass::Busy => Ok(Step::Reissue(status_reason(&response))),
                ResponseClass::Transient => Err(OracleError::Transient {
                    kind,
                    reason: status_reason(&response),
                }),
            }
        })?;
        debug!(row, col, open, "cell checked");
        Ok(open)
    }

    /// Post `path` as the solution for `maze_id`.
    #[instrument(skip_all, fields(maze_id = %maze_id, path_len = path.len()))]
    pub fn submit_solution(
        &self,
        maze_id: &str,
        path: &[Coordinate],
    ) -> Result<SubmitVerdict, OracleError> {
        let request = OracleRequest::Solve { maze_id, path };
        let verdict = drive(RequestKind::Solve, &self.policy, self.reissue_limit, || {
            match self.transport.send(&request) {
                Err(err) => Ok(Step::Backoff(format!("{err:#}"))),
                Ok(response) => Ok(match ResponseClass::of(response.status) {
                    ResponseClass::Success => Step::Done(SubmitVerdict::Accepted(response.body)),
                    ResponseClass::Forbidden => Step::Done(SubmitVerdict::Rejected),
                    ResponseClass::Busy => Step::Reissue(status_reason(&response)),
                    ResponseClass::Transient => Step::Backoff(status_reason(&response)),
                }),
            }
        })?;
        info!(?verdict, "solution submitted");
        Ok(verdict)
    }
}

fn parse_descriptor(response: &OracleResponse) -> Result<MazeDescriptor, OracleError> {
    let malformed = |reason: String| OracleError::Malformed {
        kind: RequestKind::CreateMaze,
        reason,
    };
    let descriptor: MazeDescriptor =
        serde_json::from_str(&response.body).map_err(|err| malformed(err.to_string()))?;
    descriptor
        .validate()
        .map_err(|err| malformed(format!("{err:#}")))?;
    Ok(descriptor)
}

fn status_reason(response: &OracleResponse) -> String {
    let body = response.body.trim();
    if body.is_empty() {
        format!("status {}", response.status)
    } else {
        format!("status {}: {}", response.status, truncate(body, 200))
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::board::Board;
    use crate::test_support::{Fault, FakeOracle, instant_client};

    fn oracle(text: &str) -> FakeOracle {
        FakeOracle::new(Board::parse("maze-1", text).expect("board"))
    }

    #[test]
    fn classifies_statuses() {
        assert_eq!(ResponseClass::of(200), ResponseClass::Success);
        assert_eq!(ResponseClass::of(204), ResponseClass::Success);
        assert_eq!(ResponseClass::of(403), ResponseClass::Forbidden);
        assert_eq!(ResponseClass::of(503), ResponseClass::Busy);
        assert_eq!(ResponseClass::of(500), ResponseClass::Transient);
        assert_eq!(ResponseClass::of(404), ResponseClass::Transient);
    }

    #[test]
    fn fetch_maze_returns_descriptor() {
        let client = instant_client(oracle("..\n.."));
        let descriptor = client.fetch_maze().expect("fetch");
        assert_eq!(
            descriptor,
            MazeDescriptor {
                width: 2,
                height: 2,
                id: "maze-1".to_string(),
            }
        );
    }

    #[test]
    fn fetch_maze_forbidden_is_not_retried() {
        let fake = oracle("..");
        fake.inject(RequestKind::CreateMaze, Fault::Status(403));
        let client = instant_client(fake);

        let err = client.fetch_maze().unwrap_err();
        assert!(matches!(err, OracleError::Unauthorized { .. }));
        assert_eq!(client.transport().count(RequestKind::CreateMaze), 1);
    }

    #[test]
    fn fetch_maze_retries_transient_then_succeeds() {
        let fake = oracle("..");
        fake.inject(RequestKind::CreateMaze, Fault::Status(500));
        fake.inject(RequestKind::CreateMaze, Fault::Disconnect);
        fake.inject(RequestKind::CreateMaze, Fault::Status(503));
        let client = instant_client(fake);

        client.fetch_maze().expect("fetch");
        assert_eq!(client.transport().count(RequestKind::CreateMaze), 4);
    }

    #[test]
    fn fetch_maze_gives_up_after_five_attempts() {
        let fake = oracle("..");
        for _ in 0..5 {
            fake.inject(RequestKind::CreateMaze, Fault::Status(502));
        }
        let client = instant_client(fake);

        let err = client.fetch_maze().unwrap_err();
        assert!(matches!(err, OracleError::Exhausted { attempts: 5, .. }));
        assert!(err.to_string().contains("unreachable"));
        assert_eq!(client.transport().count(RequestKind::CreateMaze), 5);
    }

    #[test]
    fn fetch_maze_rejects_malformed_descriptor() {
        let fake = oracle("..");
        fake.inject(
            RequestKind::CreateMaze,
            Fault::Respond(200, r#"{"width":0,"height":3,"id":"m"}"#.to_string()),
        );
        let client = instant_client(fake);

        let err = client.fetch_maze().unwrap_err();
        assert!(matches!(err, OracleError::Malformed { .. }));
        assert_eq!(client.transport().count(RequestKind::CreateMaze), 1);
    }

    #[test]
    fn fetch_maze_rejects_oversized_descriptor() {
        let fake = oracle("..");
        fake.inject(
            RequestKind::CreateMaze,
            Fault::Respond(
                200,
                r#"{"width":4294967296,"height":4294967295,"id":"m"}"#.to_string(),
            ),
        );
        let client = instant_client(fake);

        let err = client.fetch_maze().unwrap_err();
        assert!(matches!(err, OracleError::Malformed { .. }));
        assert!(err.to_string().contains("exceed"));
        assert_eq!(client.transport().count(RequestKind::CreateMaze), 1);
    }

    #[test]
    fn check_cell_reissues_on_busy_without_error() {
        let fake = oracle("..");
        fake.inject(RequestKind::CheckCell, Fault::Status(503));
        fake.inject(RequestKind::CheckCell, Fault::Status(503));
        let client = instant_client(fake);

        assert!(client.check_cell("maze-1", 0, 1).expect("check"));
        assert_eq!(client.transport().count(RequestKind::CheckCell), 3);
    }

    #[test]
    fn check_cell_forbidden_means_blocked() {
        let client = instant_client(oracle(".#"));
        assert!(!client.check_cell("maze-1", 0, 1).expect("check"));
        assert!(client.check_cell("maze-1", 0, 0).expect("check"));
    }

    #[test]
    fn check_cell_other_failures_propagate_immediately() {
        let fake = oracle("..");
        fake.inject(RequestKind::CheckCell, Fault::Status(500));
        let client = instant_client(fake);

        let err = client.check_cell("maze-1", 0, 0).unwrap_err();
        assert!(matches!(err, OracleError::Transient { .. }));
        assert_eq!(client.transport().count(RequestKind::CheckCell), 1);

        client.transport().inject(RequestKind::CheckCell, Fault::Disconnect);
        let err = client.check_cell("maze-1", 0, 0).unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn submit_solution_handles_each_response_class() {
        let fake = oracle("..");
        fake.inject(RequestKind::Solve, Fault::Status(500));
        fake.inject(RequestKind::Solve, Fault::Status(503));
        let client = instant_client(fake);
        let path = [Coordinate::new(0, 0), Coordinate::new(0, 1)];

        let verdict = client.submit_solution("maze-1", &path).expect("submit");
        assert!(matches!(verdict, SubmitVerdict::Accepted(_)));
        assert_eq!(client.transport().count(RequestKind::Solve), 3);
        assert_eq!(client.transport().submitted(), Some(path.to_vec()));

        client
            .transport()
            .inject(RequestKind::Solve, Fault::Status(403));
        let verdict = client.submit_solution("maze-1", &path).expect("submit");
        assert_eq!(verdict, SubmitVerdict::Rejected);
    }

    #[test]
    fn status_reason_truncates_long_bodies() {
        let response = OracleResponse::new(500, "x".repeat(500));
        let reason = status_reason(&response);
        assert_eq!(reason.len(), "status 500: ".len() + 200);
        assert_eq!(status_reason(&OracleResponse::new(502, " ")), "status 502");
    }
}
