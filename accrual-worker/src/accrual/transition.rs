//! Resolution state machine
//!
//! One authority round trip yields one [`Transition`]. Keeping this a pure
//! function of (policy, attempt, outcome) lets every branch be tested without
//! clocks, storage or HTTP.

use std::fmt;
use std::time::Duration;

use accrual_client::{AccrualResponse, ClientResult};
use http::StatusCode;
use shared::AccrualDecision;

use super::error::ResolveError;

/// Attempt budget and linear backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total authority calls allowed for one resolution (at least 1)
    pub max_retries: u32,
    /// Backoff base; the sleep after attempt `n` is `retry_interval * n`
    pub retry_interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, retry_interval: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            retry_interval,
        }
    }

    /// Sleep after failed attempt `attempt` (1-based), saturating at `Duration::MAX`
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.retry_interval
            .checked_mul(attempt)
            .unwrap_or(Duration::MAX)
    }

    pub fn has_attempts_left(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Total sleep of a resolution that fails on every attempt
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_retries)
            .map(|attempt| self.backoff(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// No HTTP response at all
    Transport,
    /// 204: the authority does not know the order yet
    NotRegistered,
}

impl fmt::Display for RetryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryReason::Transport => write!(f, "transport"),
            RetryReason::NotRegistered => write!(f, "not_registered"),
        }
    }
}

/// What to do after one authority round trip
#[derive(Debug)]
pub enum Transition {
    /// Sleep `delay`, then call again
    Retry { delay: Duration, reason: RetryReason },
    /// Rate limited: sleep `delay`, then give the order back to the next cycle
    Throttle { delay: Duration },
    /// Valid decision for this order
    Decide(AccrualDecision),
    /// Stop with a permanent error
    Fail(ResolveError),
}

/// Classify the outcome of attempt `attempt` (1-based) for `order_number`
pub fn next_transition(
    policy: &RetryPolicy,
    order_number: &str,
    attempt: u32,
    outcome: ClientResult<AccrualResponse>,
) -> Transition {
    let response = match outcome {
        Ok(response) => response,
        Err(source) if policy.has_attempts_left(attempt) => {
            tracing::debug!(order_number = %order_number, attempt, error = %source, "Authority unreachable");
            return Transition::Retry {
                delay: policy.backoff(attempt),
                reason: RetryReason::Transport,
            };
        }
        Err(source) => {
            return Transition::Fail(ResolveError::Transport {
                order_number: order_number.to_string(),
                attempts: attempt,
                source,
            });
        }
    };

    match response.status {
        StatusCode::TOO_MANY_REQUESTS => Transition::Throttle {
            delay: response
                .retry_after()
                .unwrap_or_else(|| policy.backoff(attempt)),
        },
        StatusCode::NO_CONTENT if policy.has_attempts_left(attempt) => Transition::Retry {
            delay: policy.backoff(attempt),
            reason: RetryReason::NotRegistered,
        },
        StatusCode::NO_CONTENT => Transition::Fail(ResolveError::NotFound {
            order_number: order_number.to_string(),
            attempts: attempt,
        }),
        StatusCode::OK => match response.decision() {
            Ok(decision) if decision.order == order_number => Transition::Decide(decision),
            Ok(decision) => Transition::Fail(ResolveError::OrderMismatch {
                expected: order_number.to_string(),
                actual: decision.order,
            }),
            Err(source) => Transition::Fail(ResolveError::Decode {
                order_number: order_number.to_string(),
                source,
            }),
        },
        other => Transition::Fail(ResolveError::UnexpectedStatus {
            order_number: order_number.to_string(),
            status: other.as_u16(),
        }),
    }
}
