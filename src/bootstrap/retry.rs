//! Bounded retry with capped exponential backoff.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;

// ============================================================================
// Defaults
// ============================================================================

fn default_max_attempts() -> u32 {
    10
}

fn default_initial_delay_ms() -> u64 {
    100
}

fn default_max_delay_ms() -> u64 {
    2_000
}

fn default_factor() -> u32 {
    2
}

// ============================================================================
// RetryPolicy
// ============================================================================

/// Attempt budget and backoff schedule for the metadata probe.
///
/// The delay before attempt `n + 1` is `initial * factor^(n - 1)`, capped at
/// `max_delay`. The attempt budget doubles as the overall timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay after the first failed attempt.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Upper bound for any single delay.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Growth factor between consecutive delays.
    #[serde(default = "default_factor")]
    pub factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            factor: default_factor(),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with explicit values.
    #[inline]
    #[must_use]
    pub const fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay_ms: initial_delay.as_millis() as u64,
            max_delay_ms: max_delay.as_millis() as u64,
            factor: 2,
        }
    }

    /// Sets the attempt budget.
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the growth factor.
    #[inline]
    #[must_use]
    pub fn with_factor(mut self, factor: u32) -> Self {
        self.factor = factor;
        self
    }

    /// Returns the attempt budget, never less than one.
    #[inline]
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Returns the delay to wait after failed attempt `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let multiplier = u64::from(self.factor.max(1)).saturating_pow(exponent);
        let delay = self.initial_delay_ms.saturating_mul(multiplier);
        Duration::from_millis(delay.min(self.max_delay_ms))
    }

    /// Validates the policy.
    ///
    /// # Errors
    ///
    /// Returns error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("Retry policy needs at least one attempt".to_string());
        }
        if self.max_delay_ms < self.initial_delay_ms {
            return Err("Maximum retry delay is below the initial delay".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
