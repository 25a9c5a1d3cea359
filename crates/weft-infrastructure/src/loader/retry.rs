//! Bounded retry with fixed or exponential back-off.

use std::fmt;
use std::time::Duration;

/// Attempts made per entry before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// Pause before every attempt after the first.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(70);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Fixed(Duration),
    /// Doubles from `base` on every retry, never exceeding `max`.
    Exponential { base: Duration, max: Duration },
}

/// How often, and how patiently, a failing operation is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
}

/// Returned when every attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

impl<E: fmt::Display> fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed after {} attempts: {}", self.attempts, self.last_error)
    }
}

impl RetryPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::Fixed(delay),
        }
    }

    pub fn exponential(base: Duration, max: Duration) -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::Exponential { base, max },
        }
    }

    /// Sets the attempt budget; at least one attempt is always made.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Pause before the 1-based `attempt`. The first attempt never waits.
    pub fn delay_before(&self, attempt: u32) -> Option<Duration> {
        if attempt <= 1 {
            return None;
        }
        match self.backoff {
            Backoff::Fixed(delay) => Some(delay),
            Backoff::Exponential { base, max } => {
                let exponent = (attempt - 2).min(31);
                Some(base.saturating_mul(1u32 << exponent).min(max))
            }
        }
    }

    /// Runs `op` until it succeeds or the attempt budget is spent.
    ///
    /// `op` receives the 1-based attempt number. Every attempt boundary yields
    /// to the scheduler so sibling tasks can make progress.
    pub async fn run<T, E, F>(&self, mut op: F) -> Result<T, RetryExhausted<E>>
    where
        F: FnMut(u32) -> Result<T, E>,
        E: fmt::Display,
    {
        let mut attempt = 1;
        loop {
            if let Some(delay) = self.delay_before(attempt) {
                tokio::time::sleep(delay).await;
            }

            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.max_attempts => {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_error: e,
                    });
                }
                Err(e) => {
                    tracing::warn!(attempt, max_attempts = self.max_attempts, error = %e, "Attempt failed, retrying");
                }
            }

            tokio::task::yield_now().await;
            attempt += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_RETRY_DELAY)
    }
}
