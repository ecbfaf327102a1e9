//! Retry policy for HTTP transport
//!
//! This module wraps the linear backoff from `adapterkit-core` with HTTP
//! defaults and the rules for which transport failures deserve another try.

use crate::error::TransportError;
use std::time::Duration;
pub use adapterkit_core::retry::{BackoffStrategy, LinearBackoff, LinearBackoffBuilder};

/// HTTP-specific retry policy.
///
/// # Default Configuration
///
/// - `max_attempts`: 1 (callers widen it per request)
/// - `step`: 1s
/// - `max_delay`: 2s
///
/// so the wait after attempt `n` is `min(2, n)` seconds.
///
/// Only transport failures are ever retried. A response that carries a
/// status code, even 500, ends the attempt loop: the remote service gave a
/// considered answer and repeating a non-idempotent request could duplicate
/// its side effects.
///
/// # Examples
///
/// ```rust
/// use adapterkit_transport::http::RetryPolicy;
/// use adapterkit_core::retry::BackoffStrategy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default().with_attempts(3);
/// assert_eq!(policy.calculate_delay(1), Duration::from_secs(1));
/// assert_eq!(policy.calculate_delay(2), Duration::from_secs(2));
/// assert_eq!(policy.next_delay(3), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    inner: LinearBackoff,
}

impl RetryPolicy {
    /// Create a new builder for configuring HTTP retry policy.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// Copy of this policy allowing `attempts` attempts in total (at least 1).
    pub fn with_attempts(&self, attempts: u32) -> Self {
        Self {
            inner: self.inner.with_max_attempts(attempts),
        }
    }

    /// Check if a transport error should be retried.
    ///
    /// Retryable:
    /// - Connection errors (refused, reset, DNS)
    /// - Timeouts
    /// - Redirect limit exceeded (no final status was obtained)
    /// - Other send/receive failures and I/O errors
    ///
    /// Non-retryable, because the request never left the client and the
    /// next attempt would fail the same way:
    /// - Invalid requests (unsupported method, malformed URL)
    pub fn is_retryable(error: &TransportError) -> bool {
        match error {
            TransportError::Connection(_) => true,
            TransportError::Timeout(_) => true,
            TransportError::Redirect(_) => true,
            TransportError::Http(_) => true,
            TransportError::Io(_) => true,

            TransportError::InvalidRequest(_) => false,
        }
    }

    /// Get the underlying LinearBackoff instance.
    pub fn inner(&self) -> &LinearBackoff {
        &self.inner
    }

    /// Delay after `attempt` failed, ignoring the attempt budget.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        self.inner
            .step()
            .saturating_mul(attempt)
            .min(self.inner.max_delay())
    }
}

impl BackoffStrategy for RetryPolicy {
    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        self.inner.next_delay(attempt)
    }

    fn max_attempts(&self) -> u32 {
        self.inner.max_attempts()
    }
}

/// Builder for HTTP retry policies.
#[derive(Debug, Default)]
pub struct RetryPolicyBuilder {
    inner: LinearBackoffBuilder,
}

impl RetryPolicyBuilder {
    /// Set the total number of attempts.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.inner = self.inner.max_attempts(max_attempts);
        self
    }

    /// Set the delay added per failed attempt.
    pub fn step(mut self, step: Duration) -> Self {
        self.inner = self.inner.step(step);
        self
    }

    /// Set the ceiling for a single delay.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.inner = self.inner.max_delay(delay);
        self
    }

    /// Build the retry policy.
    pub fn build(self) -> RetryPolicy {
        RetryPolicy {
            inner: self.inner.build(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.next_delay(1), None);
    }

    #[test]
    fn test_retry_policy_builder() {
        let policy = RetryPolicy::builder()
            .max_attempts(5)
            .step(Duration::from_millis(100))
            .max_delay(Duration::from_millis(300))
            .build();

        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.next_delay(2), Some(Duration::from_millis(200)));
        assert_eq!(policy.next_delay(4), Some(Duration::from_millis(300)));
    }

    #[test]
    fn test_is_retryable() {
        // Retryable errors
        assert!(RetryPolicy::is_retryable(&TransportError::Timeout(
            "elapsed".to_string()
        )));
        assert!(RetryPolicy::is_retryable(&TransportError::Connection(
            "connection reset".to_string()
        )));
        assert!(RetryPolicy::is_retryable(&TransportError::Io(
            std::io::Error::other("io error")
        )));
        assert!(RetryPolicy::is_retryable(&TransportError::Redirect(
            "loop".to_string()
        )));

        // Non-retryable errors
        assert!(!RetryPolicy::is_retryable(&TransportError::InvalidRequest(
            "bad url".to_string()
        )));
    }

    #[test]
    fn test_with_attempts_widens_budget() {
        let policy = RetryPolicy::default().with_attempts(3);
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.next_delay(1), Some(Duration::from_secs(1)));
        assert_eq!(policy.next_delay(2), Some(Duration::from_secs(2)));
        assert_eq!(policy.next_delay(3), None);

        assert_eq!(RetryPolicy::default().with_attempts(0).max_attempts(), 1);
    }

    #[test]
    fn test_calculate_delay_linear_and_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.calculate_delay(1), Duration::from_secs(1));
        assert_eq!(policy.calculate_delay(2), Duration::from_secs(2));
        assert_eq!(policy.calculate_delay(7), Duration::from_secs(2));
    }
}
