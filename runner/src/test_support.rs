//! Test-only oracle fake and client helpers.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tempfile::TempDir;

use crate::core::board::{Board, Coordinate, MazeDescriptor};
use crate::core::path::path_violations;
use crate::io::config::{MazeRunnerConfig, write_config};
use crate::io::oracle::OracleClient;
use crate::io::retry::RetryPolicy;
use crate::io::transport::{OracleRequest, OracleResponse, RequestKind, Transport};

/// Scripted misbehaviour for the next request of a given kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Answer with this status and an empty body.
    Status(u16),
    /// Answer with this status and body.
    Respond(u16, String),
    /// Fail without a status, like a dropped connection.
    Disconnect,
}

/// In-memory oracle backed by a known board.
///
/// Without faults it answers like a healthy oracle: the board's descriptor,
/// 200/403 per cell, and 200 for a well-formed solution (400 otherwise).
/// Injected faults are consumed first-in first-out per request kind.
pub struct FakeOracle {
    board: Board,
    faults: RefCell<VecDeque<(RequestKind, Fault)>>,
    requests: RefCell<Vec<RequestKind>>,
    checked: RefCell<Vec<Coordinate>>,
    submitted: RefCell<Option<Vec<Coordinate>>>,
}

impl FakeOracle {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            faults: RefCell::new(VecDeque::new()),
            requests: RefCell::new(Vec::new()),
            checked: RefCell::new(Vec::new()),
            submitted: RefCell::new(None),
        }
    }

    /// Parse `text` with [`Board::parse`] and serve it as maze `maze_id`.
    pub fn from_text(maze_id: &str, text: &str) -> Result<Self> {
        Ok(Self::new(Board::parse(maze_id, text)?))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn inject(&self, kind: RequestKind, fault: Fault) {
        self.faults.borrow_mut().push_back((kind, fault));
    }

    /// Requests of `kind` received so far, faulted ones included.
    pub fn count(&self, kind: RequestKind) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|seen| **seen == kind)
            .count()
    }

    /// Cells answered from the board, in request order.
    pub fn checked_cells(&self) -> Vec<Coordinate> {
        self.checked.borrow().clone()
    }

    /// The last path that reached the solve handler.
    pub fn submitted(&self) -> Option<Vec<Coordinate>> {
        self.submitted.borrow().clone()
    }

    fn take_fault(&self, kind: RequestKind) -> Option<Fault> {
        let mut faults = self.faults.borrow_mut();
        let idx = faults.iter().position(|(pending, _)| *pending == kind)?;
        faults.remove(idx).map(|(_, fault)| fault)
    }
}

impl Transport for FakeOracle {
    fn send(&self, request: &OracleRequest<'_>) -> Result<OracleResponse> {
        let kind = request.kind();
        self.requests.borrow_mut().push(kind);
        if let Some(fault) = self.take_fault(kind) {
            return match fault {
                Fault::Status(status) => Ok(OracleResponse::new(status, "")),
                Fault::Respond(status, body) => Ok(OracleResponse::new(status, body)),
                Fault::Disconnect => Err(anyhow!("connection reset by fake oracle")),
            };
        }

        match *request {
            OracleRequest::CreateMaze => {
                let descriptor = MazeDescriptor {
                    width: self.board.width(),
                    height: self.board.height(),
                    id: self.board.maze_id().to_string(),
                };
                Ok(OracleResponse::new(200, serde_json::to_string(&descriptor)?))
            }
            OracleRequest::CheckCell { maze_id, .. } | OracleRequest::Solve { maze_id, .. }
                if maze_id != self.board.maze_id() =>
            {
                Ok(OracleResponse::new(404, format!("unknown maze {maze_id}")))
            }
            OracleRequest::CheckCell { row, col, .. } => {
                let cell = Coordinate::new(row, col);
                self.checked.borrow_mut().push(cell);
                let status = if self.board.is_open(cell) { 200 } else { 403 };
                Ok(OracleResponse::new(status, ""))
            }
            OracleRequest::Solve { path, .. } => {
                *self.submitted.borrow_mut() = Some(path.to_vec());
                let violations = path_violations(&self.board, path);
                if violations.is_empty() {
                    Ok(OracleResponse::new(200, "maze solved"))
                } else {
                    Ok(OracleResponse::new(400, violations.join("; ")))
                }
            }
        }
    }
}

/// Retry policy with the production budget and no sleeping.
pub fn instant_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 5,
        initial_backoff: Duration::ZERO,
        backoff_factor: 2,
        max_backoff: Duration::ZERO,
    }
}

pub fn instant_client<T: Transport>(transport: T) -> OracleClient<T> {
    OracleClient::new(transport, instant_policy(), 100)
}

/// Default config with zero backoff, pointed at `base_url`.
pub fn instant_config(base_url: &str) -> MazeRunnerConfig {
    let mut cfg = MazeRunnerConfig::default();
    cfg.oracle.base_url = base_url.to_string();
    cfg.oracle.request_timeout_secs = 2;
    cfg.retry.initial_backoff_ms = 0;
    cfg.retry.max_backoff_ms = 0;
    cfg
}

/// Write `cfg` into a fresh temp dir; keep the `TempDir` alive while in use.
pub fn config_file(cfg: &MazeRunnerConfig) -> Result<(TempDir, PathBuf)> {
    let temp = tempfile::tempdir()?;
    let path = temp.path().join("maze-runner.toml");
    write_config(&path, cfg)?;
    Ok((temp, path))
}
