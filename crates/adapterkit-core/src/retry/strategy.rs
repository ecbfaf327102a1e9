//! The retry strategy abstraction.

use std::time::Duration;

/// A strategy for retrying failed operations with backoff.
///
/// Implementations decide how many attempts an operation gets in total and
/// how long to wait after each failed attempt. The retry loop itself lives
/// with the caller, because only the caller knows which failures are worth
/// another attempt (an HTTP transport retries connection resets but never a
/// response that carried a status code).
///
/// # Attempt numbering
///
/// Attempts are numbered from 1. `next_delay(n)` is asked after attempt `n`
/// failed and before attempt `n + 1` starts.
///
/// # Examples
///
/// ```rust
/// use adapterkit_core::retry::{BackoffStrategy, LinearBackoff};
/// use std::time::Duration;
///
/// fn run<S: BackoffStrategy>(strategy: &S, mut op: impl FnMut() -> Result<u32, String>) -> Result<u32, String> {
///     let mut attempt = 1;
///     loop {
///         match op() {
///             Ok(value) => return Ok(value),
///             Err(err) => match strategy.next_delay(attempt) {
///                 Some(_delay) => attempt += 1, // sleep(_delay) in real code
///                 None => return Err(err),
///             },
///         }
///     }
/// }
///
/// let strategy = LinearBackoff::builder().max_attempts(3).build();
/// let mut calls = 0;
/// let result = run(&strategy, || {
///     calls += 1;
///     if calls < 3 { Err("flaky".to_string()) } else { Ok(42) }
/// });
/// assert_eq!(result, Ok(42));
/// assert_eq!(calls, 3);
/// ```
pub trait BackoffStrategy: Send + Sync {
    /// Calculate the delay before the next attempt.
    ///
    /// # Parameters
    /// - `attempt`: The number of the attempt that just failed (1-indexed)
    ///
    /// # Returns
    /// - `Some(Duration)`: Wait this long, then try again
    /// - `None`: The attempt budget is spent, give up
    fn next_delay(&self, attempt: u32) -> Option<Duration>;

    /// Total number of attempts, including the first one. Always at least 1.
    fn max_attempts(&self) -> u32;

    /// Whether another attempt is allowed after `attempt` failed.
    fn has_remaining(&self, attempt: u32) -> bool {
        attempt < self.max_attempts()
    }
}
