//! Bridge timeouts and behaviour switches.
//!
//! Every wait in the bridge has a deadline taken from here. Values are
//! plain milliseconds so the options can be loaded from a config file.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use devtools_bridge::BridgeOptions;
//!
//! let options = BridgeOptions::new()
//!     .with_ready_timeout(Duration::from_secs(10))
//!     .with_evaluate_timeout(Duration::from_secs(2))
//!     .without_blank_navigate();
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;

use crate::bootstrap::RetryPolicy;

// ============================================================================
// Defaults
// ============================================================================

fn default_ready_timeout_ms() -> u64 {
    30_000
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_evaluate_timeout_ms() -> u64 {
    5_000
}

fn default_script_timeout_ms() -> u64 {
    5_000
}

fn default_allow_blank_navigate() -> bool {
    true
}

fn default_blank_url() -> String {
    "about:blank".to_string()
}

// ============================================================================
// BridgeOptions
// ============================================================================

/// Deadlines and defaults used by the bootstrap and correlation steps.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BridgeOptions {
    /// Deadline for the host readiness wait.
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,

    /// Per-attempt deadline for `GET /json/version`, also bounding the
    /// remote page listing.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Per-page deadline for the correlation probe.
    #[serde(default = "default_evaluate_timeout_ms")]
    pub evaluate_timeout_ms: u64,

    /// Deadline for each script run or navigation inside a host window.
    #[serde(default = "default_script_timeout_ms")]
    pub script_timeout_ms: u64,

    /// Retry schedule for the metadata probe.
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Navigate empty windows to [`blank_url`](Self::blank_url) before correlating.
    #[serde(default = "default_allow_blank_navigate")]
    pub allow_blank_navigate: bool,

    /// Location used for the blank navigation.
    #[serde(default = "default_blank_url")]
    pub blank_url: String,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            ready_timeout_ms: default_ready_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            evaluate_timeout_ms: default_evaluate_timeout_ms(),
            script_timeout_ms: default_script_timeout_ms(),
            retry: RetryPolicy::default(),
            allow_blank_navigate: default_allow_blank_navigate(),
            blank_url: default_blank_url(),
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl BridgeOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the readiness deadline.
    #[inline]
    #[must_use]
    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Sets the per-attempt HTTP deadline.
    #[inline]
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Sets the per-page probe deadline.
    #[inline]
    #[must_use]
    pub fn with_evaluate_timeout(mut self, timeout: Duration) -> Self {
        self.evaluate_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Sets the host window script deadline.
    #[inline]
    #[must_use]
    pub fn with_script_timeout(mut self, timeout: Duration) -> Self {
        self.script_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Sets the metadata retry schedule.
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fails correlation of empty windows instead of navigating them.
    #[inline]
    #[must_use]
    pub fn without_blank_navigate(mut self) -> Self {
        self.allow_blank_navigate = false;
        self
    }

    /// Sets the location used for blank navigation.
    #[inline]
    #[must_use]
    pub fn with_blank_url(mut self, url: impl Into<String>) -> Self {
        self.blank_url = url.into();
        self
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl BridgeOptions {
    /// Readiness deadline.
    #[inline]
    #[must_use]
    pub const fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    /// Per-attempt HTTP deadline.
    #[inline]
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Per-page probe deadline.
    #[inline]
    #[must_use]
    pub const fn evaluate_timeout(&self) -> Duration {
        Duration::from_millis(self.evaluate_timeout_ms)
    }

    /// Host window script deadline.
    #[inline]
    #[must_use]
    pub const fn script_timeout(&self) -> Duration {
        Duration::from_millis(self.script_timeout_ms)
    }

    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        let deadlines = [
            ("ready_timeout_ms", self.ready_timeout_ms),
            ("request_timeout_ms", self.request_timeout_ms),
            ("evaluate_timeout_ms", self.evaluate_timeout_ms),
            ("script_timeout_ms", self.script_timeout_ms),
        ];
        if let Some((name, _)) = deadlines.iter().find(|(_, value)| *value == 0) {
            return Err(format!("{name} must be greater than zero"));
        }
        if self.blank_url.trim().is_empty() {
            return Err("blank_url must not be empty".to_string());
        }
        self.retry.validate()
    }
}

// ============================================================================
// Tests
// ============================================================================
