//! Retry policy for the structured-response contract.

use std::num::NonZeroU32;
use std::time::Duration;

/// Raised only when a retry cap is configured and every attempt was invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{label}: no valid model reply after {attempts} attempts")]
pub struct RetryExhaustedError {
    pub label: String,
    pub attempts: u32,
}

/// How invalid model replies are retried.
///
/// The default retries forever with no delay: the model is assumed to comply
/// eventually for a given prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts allowed, `None` for unbounded.
    pub max_attempts: Option<NonZeroU32>,
    /// Fixed pause before each re-invocation.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn capped(max_attempts: u32) -> Self {
        Self {
            max_attempts: NonZeroU32::new(max_attempts),
            backoff: Duration::ZERO,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Whether another attempt is allowed after `attempts` invalid ones.
    pub fn allows_another(&self, attempts: u32) -> bool {
        match self.max_attempts {
            Some(max) => attempts < max.get(),
            None => true,
        }
    }
}

/// Attempt count after one more model call; saturates instead of wrapping.
pub fn next_attempt(attempts: u32) -> u32 {
    attempts.saturating_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_always_allows_another() {
        let policy = RetryPolicy::unbounded();
        assert!(policy.allows_another(0));
        assert!(policy.allows_another(u32::MAX));
    }

    #[test]
    fn capped_stops_at_max() {
        let policy = RetryPolicy::capped(3);
        assert!(policy.allows_another(2));
        assert!(!policy.allows_another(3));
    }

    #[test]
    fn attempt_count_saturates_at_max() {
        assert_eq!(next_attempt(0), 1);
        assert_eq!(next_attempt(u32::MAX), u32::MAX);
        assert!(RetryPolicy::unbounded().allows_another(next_attempt(u32::MAX)));
        assert!(!RetryPolicy::capped(u32::MAX).allows_another(next_attempt(u32::MAX)));
    }

    #[test]
    fn zero_cap_means_unbounded() {
        assert_eq!(RetryPolicy::capped(0), RetryPolicy::unbounded());
    }
}
