//! Retry policy for throttled requests.

use std::time::Duration;

use super::outcome::ApiOutcome;

/// Bounded retry-on-429 policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per logical request, including the first.
    pub max_attempts: u32,
    /// Delay used when a 429 carries no `Retry-After` header.
    pub default_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            default_delay: Duration::from_secs(1),
        }
    }
}

/// What to do after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { delay: Duration },
    Stop,
}

impl RetryPolicy {
    /// Decide whether attempt number `attempt` (1-based) should be retried.
    ///
    /// Only throttling is retried. Everything else, including upstream 5xx,
    /// stops immediately and is surfaced to the caller.
    pub fn decide(&self, attempt: u32, outcome: &ApiOutcome) -> RetryDecision {
        match outcome {
            ApiOutcome::RateLimited { retry_after_secs } if attempt < self.max_attempts => {
                RetryDecision::Retry {
                    delay: retry_after_secs
                        .map(Duration::from_secs)
                        .unwrap_or(self.default_delay),
                }
            }
            _ => RetryDecision::Stop,
        }
    }
}
