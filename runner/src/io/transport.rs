//! Wire-level access to the maze oracle.
//!
//! The [`Transport`] trait decouples the retry/classification logic in
//! [`crate::io::oracle`] from HTTP. Tests use a board-backed fake that answers
//! without a network.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::{debug, instrument};

use crate::core::board::Coordinate;

/// One remote call.
#[derive(Debug, Clone, Copy)]
pub enum OracleRequest<'a> {
    /// `POST /maze`
    CreateMaze,
    /// `GET /maze/{id}/check?x={row}&y={col}`
    CheckCell {
        maze_id: &'a str,
        row: usize,
        col: usize,
    },
    /// `POST /maze/{id}/solve` with the path as a JSON array of `{x,y}`.
    Solve {
        maze_id: &'a str,
        path: &'a [Coordinate],
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    CreateMaze,
    CheckCell,
    Solve,
}

impl OracleRequest<'_> {
    pub fn kind(&self) -> RequestKind {
        match self {
            OracleRequest::CreateMaze => RequestKind::CreateMaze,
            OracleRequest::CheckCell { .. } => RequestKind::CheckCell,
            OracleRequest::Solve { .. } => RequestKind::Solve,
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RequestKind::CreateMaze => "fetch maze",
            RequestKind::CheckCell => "check cell",
            RequestKind::Solve => "submit solution",
        };
        f.write_str(label)
    }
}

/// Status and body of a completed HTTP exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleResponse {
    pub status: u16,
    pub body: String,
}

impl OracleResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Abstraction over oracle backends.
pub trait Transport {
    /// Issue `request` once. `Err` means no status was obtained (connect
    /// failure, timeout, unreadable body); non-2xx statuses are `Ok`.
    fn send(&self, request: &OracleRequest<'_>) -> Result<OracleResponse>;
}

/// Transport that talks HTTP to the oracle with a blocking `reqwest` client.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    #[instrument(skip_all, fields(kind = %request.kind()))]
    fn send(&self, request: &OracleRequest<'_>) -> Result<OracleResponse> {
        let builder = match *request {
            OracleRequest::CreateMaze => self.client.post(format!("{}/maze", self.base_url)),
            OracleRequest::CheckCell { maze_id, row, col } => self
                .client
                .get(format!("{}/maze/{}/check", self.base_url, maze_id))
                .query(&[("x", row), ("y", col)]),
            OracleRequest::Solve { maze_id, path } => self
                .client
                .post(format!("{}/maze/{}/solve", self.base_url, maze_id))
                .json(path),
        };

        let response = builder
            .send()
            .with_context(|| format!("send {} request", request.kind()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .with_context(|| format!("read {} response body", request.kind()))?;
        debug!(status, body_len = body.len(), "oracle responded");
        Ok(OracleResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_kind_labels_are_stable() {
        let path = [Coordinate::new(0, 0)];
        let requests = [
            OracleRequest::CreateMaze,
            OracleRequest::CheckCell {
                maze_id: "m",
                row: 1,
                col: 2,
            },
            OracleRequest::Solve {
                maze_id: "m",
                path: &path,
            },
        ];
        let labels: Vec<String> = requests
            .iter()
            .map(|request| request.kind().to_string())
            .collect();
        assert_eq!(labels, vec!["fetch maze", "check cell", "submit solution"]);
    }

    #[test]
    fn http_transport_trims_trailing_slash() {
        let transport =
            HttpTransport::new("http://127.0.0.1:9/", Duration::from_secs(1)).expect("transport");
        assert_eq!(transport.base_url(), "http://127.0.0.1:9");
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        // Nothing listens on the loopback discard port.
        let transport =
            HttpTransport::new("http://127.0.0.1:9", Duration::from_secs(2)).expect("transport");
        let err = transport.send(&OracleRequest::CreateMaze).unwrap_err();
        assert!(format!("{err:#}").contains("send fetch maze request"));
    }
}
