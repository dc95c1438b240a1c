//! Builder pattern for bridge configuration.
//!
//! Provides a fluent API for configuring and creating [`Bridge`] instances.
//!
//! # Example
//!
//! ```no_run
//! use devtools_bridge::{Bridge, BridgeOptions, CdpAutomation};
//!
//! # fn example() -> devtools_bridge::Result<()> {
//! let bridge = Bridge::builder()
//!     .automation(CdpAutomation::new())
//!     .options(BridgeOptions::new().without_blank_navigate())
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::automation::Automation;
use crate::error::{Error, Result};

use super::core::Bridge;
use super::options::BridgeOptions;

// ============================================================================
// BridgeBuilder
// ============================================================================

/// Builder for configuring a [`Bridge`] instance.
///
/// Use [`Bridge::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct BridgeBuilder {
    /// Automation controller.
    automation: Option<Arc<dyn Automation>>,
    /// Timeouts and behaviour switches.
    options: BridgeOptions,
}

impl fmt::Debug for BridgeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeBuilder")
            .field("automation", &self.automation.is_some())
            .field("options", &self.options)
            .finish()
    }
}

// ============================================================================
// BridgeBuilder Implementation
// ============================================================================

impl BridgeBuilder {
    /// Creates a new builder with default options and no automation.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the automation controller.
    #[inline]
    #[must_use]
    pub fn automation(mut self, automation: impl Automation + 'static) -> Self {
        self.automation = Some(Arc::new(automation));
        self
    }

    /// Sets an already shared automation controller.
    #[inline]
    #[must_use]
    pub fn automation_arc(mut self, automation: Arc<dyn Automation>) -> Self {
        self.automation = Some(automation);
        self
    }

    /// Replaces the options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: BridgeOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the bridge with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingArgument`] if no automation controller was set
    /// - [`Error::Config`] if the options are invalid
    pub fn build(self) -> Result<Bridge> {
        let automation = self
            .automation
            .ok_or_else(|| Error::missing_argument("automation"))?;

        self.options.validate().map_err(Error::config)?;

        Bridge::new(automation, self.options)
    }
}

// ============================================================================
// Tests
// ============================================================================
