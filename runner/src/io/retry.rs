//! Retry driver shared by the oracle operations.
//!
//! Two retry shapes are supported and may mix within one call:
//!
//! - **Backoff**: bounded by [`RetryPolicy::max_attempts`], sleeping an
//!   exponentially growing delay between attempts.
//! - **Reissue**: immediate repeat of the same request with no delay, not
//!   counted against the bounded budget, capped by a separate reissue limit.

use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::io::oracle::OracleError;
use crate::io::transport::RequestKind;

/// Bounded exponential backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub backoff_factor: u32,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Delay to wait after the `failures`-th failed attempt (1-based):
    /// `initial * factor^(failures - 1)`, clamped to `max_backoff`.
    pub fn backoff_for(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1);
        let multiplier = self.backoff_factor.saturating_pow(exponent);
        self.initial_backoff
            .saturating_mul(multiplier)
            .min(self.max_backoff)
    }
}

/// Outcome of one attempt inside [`drive`].
#[derive(Debug)]
pub enum Step<T> {
    Done(T),
    /// Transient failure: retry after backoff if budget remains.
    Backoff(String),
    /// Overload: re-issue immediately.
    Reissue(String),
}

/// Run `attempt` until it yields [`Step::Done`] or fails terminally.
///
/// Errors returned by `attempt` are terminal and propagate unchanged.
pub fn drive<T>(
    kind: RequestKind,
    policy: &RetryPolicy,
    reissue_limit: u32,
    mut attempt: impl FnMut() -> Result<Step<T>, OracleError>,
) -> Result<T, OracleError> {
    let mut failures = 0u32;
    let mut reissues = 0u32;
    loop {
        match attempt()? {
            Step::Done(value) => return Ok(value),
            Step::Reissue(reason) => {
                if reissues >= reissue_limit {
                    warn!(%kind, reissues, %reason, "oracle still overloaded, giving up");
                    return Err(OracleError::Overloaded {
                        kind,
                        reissues,
                    });
                }
                reissues += 1;
                debug!(%kind, reissues, %reason, "oracle busy, re-issuing");
            }
            Step::Backoff(reason) => {
                failures += 1;
                if failures >= policy.max_attempts {
                    warn!(%kind, attempts = failures, %reason, "retry budget exhausted");
                    return Err(OracleError::Exhausted {
                        kind,
                        attempts: failures,
                        last: reason,
                    });
                }
                let delay = policy.backoff_for(failures);
                warn!(
                    %kind,
                    attempt = failures,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    %reason,
                    "transient oracle failure, backing off"
                );
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::ZERO,
            backoff_factor: 2,
            max_backoff: Duration::ZERO,
        }
    }

    #[test]
    fn backoff_grows_exponentially_and_clamps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            backoff_factor: 2,
            max_backoff: Duration::from_millis(500),
        };
        let delays: Vec<u128> = (1..=5)
            .map(|failures| policy.backoff_for(failures).as_millis())
            .collect();
        assert_eq!(delays, vec![100, 200, 400, 500, 500]);
    }

    #[test]
    fn backoff_budget_counts_every_attempt() {
        let mut calls = 0;
        let err = drive::<()>(RequestKind::CreateMaze, &instant_policy(5), 0, || {
            calls += 1;
            Ok(Step::Backoff(format!("status 500 (call {calls})")))
        })
        .unwrap_err();
        assert_eq!(calls, 5);
        match err {
            OracleError::Exhausted { attempts, last, .. } => {
                assert_eq!(attempts, 5);
                assert_eq!(last, "status 500 (call 5)");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reissues_do_not_consume_backoff_budget() {
        let mut calls = 0;
        let value = drive(RequestKind::Solve, &instant_policy(2), 10, || {
            calls += 1;
            Ok(match calls {
                1 => Step::Backoff("status 500".to_string()),
                2..=4 => Step::Reissue("status 503".to_string()),
                _ => Step::Done(calls),
            })
        })
        .expect("drive");
        assert_eq!(value, 5);
    }

    #[test]
    fn reissue_limit_caps_busy_loop() {
        let mut calls = 0;
        let err = drive::<()>(RequestKind::CheckCell, &instant_policy(1), 3, || {
            calls += 1;
            Ok(Step::Reissue("status 503".to_string()))
        })
        .unwrap_err();
        assert_eq!(calls, 4);
        assert!(matches!(err, OracleError::Overloaded { reissues: 3, .. }));
    }

    #[test]
    fn reissue_limit_counts_busy_answers_across_backoffs() {
        let mut calls = 0;
        let err = drive::<()>(RequestKind::Solve, &instant_policy(5), 1, || {
            calls += 1;
            Ok(match calls {
                2 => Step::Backoff("status 500".to_string()),
                _ => Step::Reissue("status 503".to_string()),
            })
        })
        .unwrap_err();
        assert_eq!(calls, 3);
        assert!(matches!(err, OracleError::Overloaded { reissues: 1, .. }));
    }

    #[test]
    fn attempt_errors_are_terminal() {
        let mut calls = 0;
        let err = drive::<()>(RequestKind::CreateMaze, &instant_policy(5), 5, || {
            calls += 1;
            Err(OracleError::Unauthorized {
                kind: RequestKind::CreateMaze,
            })
        })
        .unwrap_err();
        assert_eq!(calls, 1);
        assert!(matches!(err, OracleError::Unauthorized { .. }));
    }
}
