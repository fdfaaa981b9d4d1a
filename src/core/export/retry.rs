//! Retry policy
//!
//! One bounded retry cycle within a tier: attempt counter against a
//! configured maximum, exponential backoff between attempts. Each tier
//! (streaming, buffered upload) runs its own independent cycle.

use std::time::Duration;

/// Bounded exponential-backoff retry policy
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum attempts per tier
    pub max_attempts: u32,

    /// Exponential base in seconds; the delay after attempt `n` is
    /// `backoff_base_secs ^ n`
    pub backoff_base_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base_secs: 2,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with explicit bounds
    pub fn new(max_attempts: u32, backoff_base_secs: u64) -> Self {
        Self {
            max_attempts,
            backoff_base_secs,
        }
    }

    /// Delay before the attempt after `attempt` (1-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        Duration::from_secs(self.backoff_base_secs.saturating_pow(attempt))
    }

    /// Sleep out the backoff for a failed attempt
    pub async fn wait(&self, attempt: u32) {
        let delay = self.delay(attempt);
        tracing::info!(attempt, delay_secs = delay.as_secs(), "Backing off before retry");
        tokio::time::sleep(delay).await;
    }

    /// Validate policy bounds
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("retries must be at least 1".to_string());
        }
        if self.backoff_base_secs == 0 {
            return Err("backoff_base_secs must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_default_policy_bounds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff_base_secs, 2);
    }

    #[test_case(1, 2; "first retry waits two seconds")]
    #[test_case(2, 4; "second retry waits four seconds")]
    #[test_case(3, 8; "third retry waits eight seconds")]
    fn test_exponential_delay(attempt: u32, expected_secs: u64) {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(attempt), Duration::from_secs(expected_secs));
    }

    #[test]
    fn test_delay_saturates_instead_of_overflowing() {
        let policy = RetryPolicy {
            max_attempts: 100,
            backoff_base_secs: 10,
        };
        // Must not panic
        let _ = policy.delay(99);
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let policy = RetryPolicy {
            max_attempts: 0,
            backoff_base_secs: 2,
        };
        assert!(policy.validate().is_err());
    }
}
