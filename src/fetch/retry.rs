//! Reusable retry policy with exponential backoff
//!
//! Any component that retries does so through a [`RetryPolicy`]; the
//! crawler, prober, and boundary scanner deliberately use
//! [`RetryPolicy::none`] (single attempt, best-effort), while the feed
//! download path uses a multi-attempt policy.

use rand::Rng;
use std::time::Duration;

/// Coarse failure classes for retry decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Network-level failure or 5xx: worth retrying
    Transient,
    /// HTTP 429: worth retrying after a longer pause
    RateLimited,
    /// 4xx and everything else: retrying cannot help
    Permanent,
}

/// Classifies an HTTP status code for retry purposes
///
/// Transport failures (no status at all) classify as [`FailureType::Transient`].
pub fn classify_status(status: Option<u16>) -> FailureType {
    match status {
        None => FailureType::Transient,
        Some(429) => FailureType::RateLimited,
        Some(s) if s >= 500 => FailureType::Transient,
        Some(_) => FailureType::Permanent,
    }
}

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for `delay`, then try again
    Retry { delay: Duration },
    /// Give up; `reason` feeds the failure record
    Stop { reason: &'static str },
}

/// Bounded retry with exponential backoff and jitter
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    /// Three attempts with 1s/2s backoff, the behavior the feed downloader
    /// has always had.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy with explicit attempt and delay bounds
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// A single-attempt policy: every failure is final
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// A policy with a custom attempt count and the default delays
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Returns the configured maximum attempt count
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decides whether a failed attempt should be retried
    ///
    /// `attempt` is 1-based: the first failure passes `attempt = 1`.
    pub fn should_retry(&self, failure: FailureType, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::Stop {
                reason: "attempts exhausted",
            };
        }

        match failure {
            FailureType::Permanent => RetryDecision::Stop {
                reason: "permanent failure",
            },
            FailureType::Transient => RetryDecision::Retry {
                delay: self.backoff_delay(attempt),
            },
            FailureType::RateLimited => RetryDecision::Retry {
                // Double the usual backoff so the target gets room to cool off
                delay: (self.backoff_delay(attempt) * 2).min(self.max_delay),
            },
        }
    }

    /// Exponential backoff for the given 1-based attempt, with up to 25%
    /// additive jitter to avoid synchronized retries across workers
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let base = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(exp))
            .min(self.max_delay);

        let jitter_cap = (base.as_millis() as u64) / 4;
        if jitter_cap == 0 {
            return base;
        }
        base + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_cap))
    }
}
