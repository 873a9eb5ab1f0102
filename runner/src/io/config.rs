//! Maze runner configuration stored as TOML (default `maze-runner.toml`).

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::solver::MemoPolicy;
use crate::io::retry::RetryPolicy;

pub const DEFAULT_CONFIG_PATH: &str = "maze-runner.toml";

/// Maze runner configuration (TOML).
///
/// Missing fields default to the values the oracle protocol expects: five
/// attempts with exponential backoff for fetch/submit, immediate re-issue on
/// 503 up to a safety cap.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MazeRunnerConfig {
    pub oracle: OracleConfig,
    pub retry: RetryConfig,
    pub solver: SolverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OracleConfig {
    /// Base URL of the maze oracle, without a trailing `/maze`.
    pub base_url: String,

    /// Per-request timeout handed to the HTTP transport.
    pub request_timeout_secs: u64,

    /// Total immediate re-issues after 503 responses allowed per call before
    /// the call fails as overloaded.
    pub overload_reissue_limit: u32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maze.coda.io".to_string(),
            request_timeout_secs: 30,
            overload_reissue_limit: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts for `fetch_maze` and `submit_solution` on transient failures.
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub backoff_factor: u32,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 1_000,
            backoff_factor: 2,
            max_backoff_ms: 30_000,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            backoff_factor: self.backoff_factor,
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SolverConfig {
    pub memo_policy: MemoPolicy,
}

impl MazeRunnerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.oracle.base_url.trim().is_empty() {
            return Err(anyhow!("oracle.base_url must be non-empty"));
        }
        if self.oracle.request_timeout_secs == 0 {
            return Err(anyhow!("oracle.request_timeout_secs must be > 0"));
        }
        if self.retry.max_attempts == 0 {
            return Err(anyhow!("retry.max_attempts must be > 0"));
        }
        if self.retry.backoff_factor == 0 {
            return Err(anyhow!("retry.backoff_factor must be > 0"));
        }
        if self.retry.max_backoff_ms < self.retry.initial_backoff_ms {
            return Err(anyhow!(
                "retry.max_backoff_ms must be >= retry.initial_backoff_ms"
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle.request_timeout_secs)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `MazeRunnerConfig::default()`.
pub fn load_config(path: &Path) -> Result<MazeRunnerConfig> {
    if !path.exists() {
        let cfg = MazeRunnerConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: MazeRunnerConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &MazeRunnerConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
