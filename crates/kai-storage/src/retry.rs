//! Bounded retry for store writes.
//!
//! Writes that fail with a transient error are retried on a constant
//! schedule until the attempt budget runs out. Other errors surface at once.

use std::time::Duration;

use backoff::backoff::{Backoff, Constant};
use kai_types::RetrySettings;
use tracing::{debug, error, warn};

use crate::error::StorageError;

/// Fixed attempt budget with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Run `f`, retrying transient failures.
    ///
    /// On exhaustion returns [`StorageError::RetriesExhausted`] carrying the
    /// attempt count and the last error.
    pub fn execute<T, F>(&self, op: &str, mut f: F) -> Result<T, StorageError>
    where
        F: FnMut() -> Result<T, StorageError>,
    {
        let mut backoff = Constant::new(self.delay);
        let mut attempts = 0;

        loop {
            attempts += 1;
            match f() {
                Ok(value) => {
                    if attempts > 1 {
                        debug!(op, attempts, "Store operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_transient() => {
                    if attempts >= self.max_attempts {
                        error!(op, attempts, error = %e, "Max retries exceeded");
                        return Err(StorageError::RetriesExhausted {
                            op: op.to_string(),
                            attempts,
                            source: Box::new(e),
                        });
                    }
                    if let Some(pause) = backoff.next_backoff() {
                        warn!(
                            op,
                            attempt = attempts,
                            error = %e,
                            retry_in_ms = pause.as_millis() as u64,
                            "Store operation failed, retrying"
                        );
                        std::thread::sleep(pause);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetrySettings::default().into()
    }
}

impl From<RetrySettings> for RetryPolicy {
    fn from(settings: RetrySettings) -> Self {
        Self::new(settings.max_attempts, Duration::from_millis(settings.delay_ms))
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self::new(settings.max_attempts, Duration::from_millis(settings.delay_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors_exhaust_budget() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let mut calls = 0;
        let result: Result<(), _> = policy.execute("insert", || {
            calls += 1;
            Err(StorageError::Unavailable("busy".to_string()))
        });

        assert_eq!(calls, 3);
        match result {
            Err(StorageError::RetriesExhausted { op, attempts, source }) => {
                assert_eq!(op, "insert");
                assert_eq!(attempts, 3);
                assert!(matches!(*source, StorageError::Unavailable(_)));
            }
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_recovers_after_transient_failure() {
        let policy = RetryPolicy::new(5, Duration::ZERO);
        let mut calls = 0;
        let result = policy.execute("insert", || {
            calls += 1;
            if calls < 3 {
                Err(StorageError::Unavailable("busy".to_string()))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_permanent_errors_are_not_retried() {
        let policy = RetryPolicy::new(5, Duration::ZERO);
        let mut calls = 0;
        let result: Result<(), _> = policy.execute("delete", || {
            calls += 1;
            Err(StorageError::InvalidInput("bad".to_string()))
        });
        assert_eq!(calls, 1);
        assert!(matches!(result, Err(StorageError::InvalidInput(_))));
    }

    #[test]
    fn test_policy_from_settings() {
        let policy = RetryPolicy::from(&RetrySettings {
            max_attempts: 0,
            delay_ms: 20,
        });
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.delay, Duration::from_millis(20));
        assert_eq!(RetryPolicy::default().max_attempts, 10);
    }
}
