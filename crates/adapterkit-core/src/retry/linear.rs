//! Linear backoff with a delay ceiling.

use super::strategy::BackoffStrategy;
use std::time::Duration;

/// Linear backoff strategy.
///
/// The delay after attempt `n` is `step * n`, capped at `max_delay`.
/// With the defaults (1s step, 2s cap) the waits are 1s, 2s, 2s, ...
///
/// # Examples
///
/// ```rust
/// use adapterkit_core::retry::{BackoffStrategy, LinearBackoff};
/// use std::time::Duration;
///
/// // Default configuration (max_attempts=1, step=1s, max_delay=2s)
/// let backoff = LinearBackoff::default();
/// assert_eq!(backoff.max_attempts(), 1);
/// assert_eq!(backoff.next_delay(1), None);
///
/// let backoff = backoff.with_max_attempts(3);
/// assert_eq!(backoff.next_delay(1), Some(Duration::from_secs(1)));
/// assert_eq!(backoff.next_delay(2), Some(Duration::from_secs(2)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearBackoff {
    max_attempts: u32,
    step: Duration,
    max_delay: Duration,
}

impl LinearBackoff {
    /// Create a new builder for configuring linear backoff.
    pub fn builder() -> LinearBackoffBuilder {
        LinearBackoffBuilder::default()
    }

    /// Copy of this strategy with a different attempt budget.
    ///
    /// A budget of 0 is treated as 1: every operation is tried at least once.
    pub fn with_max_attempts(&self, max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..self.clone()
        }
    }

    /// Delay added per failed attempt.
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Upper bound for a single delay.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }
}

impl Default for LinearBackoff {
    /// Defaults:
    /// - `max_attempts`: 1 (no retries)
    /// - `step`: 1s
    /// - `max_delay`: 2s
    fn default() -> Self {
        Self {
            max_attempts: 1,
            step: Duration::from_secs(1),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl BackoffStrategy for LinearBackoff {
    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if !self.has_remaining(attempt) {
            return None;
        }
        Some(self.step.saturating_mul(attempt).min(self.max_delay))
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

/// Builder for configuring `LinearBackoff`.
#[derive(Debug, Default)]
pub struct LinearBackoffBuilder {
    max_attempts: Option<u32>,
    step: Option<Duration>,
    max_delay: Option<Duration>,
}

impl LinearBackoffBuilder {
    /// Set the total number of attempts (clamped to at least 1).
    ///
    /// Default: 1
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts.max(1));
        self
    }

    /// Set the delay added per failed attempt.
    ///
    /// Default: 1s
    pub fn step(mut self, step: Duration) -> Self {
        self.step = Some(step);
        self
    }

    /// Set the ceiling for a single delay.
    ///
    /// Default: 2s
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Build the `LinearBackoff` instance.
    ///
    /// Uses default values for any unset parameters.
    pub fn build(self) -> LinearBackoff {
        let defaults = LinearBackoff::default();
        LinearBackoff {
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            step: self.step.unwrap_or(defaults.step),
            max_delay: self.max_delay.unwrap_or(defaults.max_delay),
        }
    }
}
