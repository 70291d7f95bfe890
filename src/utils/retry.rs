use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

// ============================================================================
// Bounded Exponential Backoff
// ============================================================================
//
// Used for best-effort side effects such as saving finished orders. A caller
// gets a `RetryOutcome` back instead of an error so it can decide how to
// record the loss; nothing here propagates failure upward.
//
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let millis = (self.initial_delay.as_millis() as f64 * factor) as u64;
        Duration::from_millis(millis).min(self.max_delay)
    }
}

/// Errors that can tell whether another attempt could succeed
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

#[derive(Debug, PartialEq)]
pub enum RetryOutcome<T, E> {
    Succeeded { value: T, attempts: u32 },
    /// Every attempt failed with a retryable error
    Exhausted { error: E, attempts: u32 },
    /// A non-retryable error stopped the loop early
    Aborted { error: E, attempts: u32 },
}

impl<T, E> RetryOutcome<T, E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Succeeded { attempts, .. }
            | RetryOutcome::Exhausted { attempts, .. }
            | RetryOutcome::Aborted { attempts, .. } => *attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RetryOutcome::Succeeded { .. })
    }
}

/// Run `operation` until it succeeds, hits a non-retryable error, or the
/// policy runs out of attempts
pub async fn retry_with_backoff<F, Fut, T, E>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display + Retryable,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(operation = operation_name, attempt = attempt, "Succeeded after retry");
                }
                return RetryOutcome::Succeeded { value, attempts: attempt };
            }
            Err(error) if !error.is_retryable() => {
                tracing::error!(operation = operation_name, error = %error, "Permanent failure, not retrying");
                return RetryOutcome::Aborted { error, attempts: attempt };
            }
            Err(error) if attempt >= max_attempts => {
                tracing::error!(
                    operation = operation_name,
                    attempt = attempt,
                    error = %error,
                    "Giving up after all attempts"
                );
                return RetryOutcome::Exhausted { error, attempts: attempt };
            }
            Err(error) => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    operation = operation_name,
                    attempt = attempt,
                    error = %error,
                    delay_ms = delay.as_millis() as u64,
                    "Attempt failed, retrying"
                );
                sleep(delay).await;
            }
        }
    }
}
