//! Retry policy for lock-guarded updates.

use cachext_core::{
    Error, Result, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_FREQUENCY, DEFAULT_SLEEP_UNIT_MS,
};
use std::ops::Range;
use std::time::Duration;

/// Default backoff step between retry rounds (20ms)
const DEFAULT_SLEEP_UNIT: Duration = Duration::from_millis(DEFAULT_SLEEP_UNIT_MS);

/// Stepped backoff with a periodic seed attempt
///
/// Attempts are grouped in rounds of `retry_frequency`. Every attempt in round
/// `r` sleeps `sleep_unit * r` before the next one, so the first round probes
/// without sleeping. The last attempt of each round is a seed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    retry_frequency: u32,
    sleep_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_frequency: DEFAULT_RETRY_FREQUENCY,
            sleep_unit: DEFAULT_SLEEP_UNIT,
        }
    }
}

impl RetryPolicy {
    /// Create a policy, rejecting a zero attempt budget or cadence
    pub fn new(max_attempts: u32, retry_frequency: u32, sleep_unit: Duration) -> Result<Self> {
        if max_attempts < 1 {
            return Err(Error::configuration("max_attempts must be at least 1"));
        }
        if retry_frequency < 1 {
            return Err(Error::configuration("retry_frequency must be at least 1"));
        }
        Ok(Self {
            max_attempts,
            retry_frequency,
            sleep_unit,
        })
    }

    /// Create a policy for tests and tight loops: no sleeping at all
    pub fn without_backoff(max_attempts: u32, retry_frequency: u32) -> Result<Self> {
        Self::new(max_attempts, retry_frequency, Duration::ZERO)
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn retry_frequency(&self) -> u32 {
        self.retry_frequency
    }

    #[must_use]
    pub fn sleep_unit(&self) -> Duration {
        self.sleep_unit
    }

    /// Attempt indices the updater iterates over
    #[must_use]
    pub fn attempts(&self) -> Range<u32> {
        0..self.max_attempts
    }

    /// Retry round an attempt belongs to
    #[must_use]
    pub fn round(&self, attempt: u32) -> u32 {
        attempt / self.retry_frequency
    }

    /// Pause after a failed `attempt`
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.sleep_unit.saturating_mul(self.round(attempt))
    }

    /// Whether a failed `attempt` should be followed by a seed write
    #[must_use]
    pub fn should_seed(&self, attempt: u32) -> bool {
        (attempt + 1) % self.retry_frequency == 0
    }

    /// Upper bound on how long a whole update may take when every lock
    /// acquisition waits the full `timeout`
    #[must_use]
    pub fn worst_case_wait(&self, timeout: Duration) -> Duration {
        self.attempts().fold(Duration::ZERO, |total, attempt| {
            total
                .saturating_add(timeout)
                .saturating_add(self.backoff(attempt))
        })
    }
}
