//! Bounded retry with exponential backoff
//!
//! Decoupled from any particular operation: the controller wraps its sink write in
//! [`RetryPolicy::run`], but anything returning a `Result` can be retried.

use std::fmt::Display;
use std::time::Duration;

use tracing::warn;

/// Retry schedule: up to `max_attempts` tries, sleeping `base_delay * 2^i` after
/// failed attempt `i` whenever another attempt remains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

/// Final failure after every attempt was used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryError<E> {
    /// Attempts made, always equal to the policy's `max_attempts`
    pub attempts: u32,
    /// Error of the last attempt
    pub last: E,
}

impl RetryPolicy {
    /// A `max_attempts` of zero is treated as a single attempt
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Wait inserted after failed attempt `attempt` (zero-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        2_u32
            .checked_pow(attempt)
            .map_or(Duration::MAX, |factor| self.base_delay.saturating_mul(factor))
    }

    /// Run `op` until it succeeds or the attempt budget is spent
    ///
    /// `op` receives the zero-based attempt number.
    ///
    /// # Errors
    /// Returns the last error together with the number of attempts made.
    pub fn run<T, E, F>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        E: Display,
        F: FnMut(u32) -> Result<T, E>,
    {
        let mut attempt = 0;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let made = attempt + 1;
                    if made >= self.max_attempts {
                        warn!(attempts = made, error = %err, "giving up after final attempt");
                        return Err(RetryError {
                            attempts: made,
                            last: err,
                        });
                    }

                    let delay = self.delay_after(attempt);
                    warn!(
                        attempt = made,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis(),
                        error = %err,
                        "attempt failed, backing off"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(200))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100));
        assert_eq!(policy.delay_after(0), Duration::from_millis(100));
        assert_eq!(policy.delay_after(1), Duration::from_millis(200));
        assert_eq!(policy.delay_after(2), Duration::from_millis(400));
        assert_eq!(policy.delay_after(3), Duration::from_millis(800));
    }

    #[test]
    fn test_delay_saturates() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1));
        assert_eq!(policy.delay_after(200), Duration::MAX);
    }

    #[test]
    fn test_first_success_skips_retries() {
        let mut calls = 0;
        let result: Result<u32, RetryError<String>> = RetryPolicy::default().run(|attempt| {
            calls += 1;
            Ok(attempt)
        });
        assert_eq!(result, Ok(0));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_succeeds_after_failures() {
        let policy = RetryPolicy::new(4, Duration::from_millis(1));
        let start = Instant::now();
        let result = policy.run(|attempt| {
            if attempt < 2 {
                Err(format!("attempt {attempt} failed"))
            } else {
                Ok("written")
            }
        });
        assert_eq!(result, Ok("written"));
        // Slept 1ms after attempt 0 and 2ms after attempt 1
        assert!(start.elapsed() >= Duration::from_millis(3));
    }

    #[test]
    fn test_exhaustion_returns_last_error() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let mut calls = 0;
        let result: Result<(), _> = policy.run(|attempt| {
            calls += 1;
            Err(format!("failure {attempt}"))
        });
        assert_eq!(
            result,
            Err(RetryError {
                attempts: 3,
                last: "failure 2".to_string()
            })
        );
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_zero_attempts_means_one() {
        let policy = RetryPolicy::new(0, Duration::from_secs(60));
        assert_eq!(policy.max_attempts(), 1);
        let result: Result<(), _> = policy.run(|_| Err("down"));
        assert_eq!(result.unwrap_err().attempts, 1);
    }
}
