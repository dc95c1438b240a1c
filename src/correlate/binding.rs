//! Marker binding scripts.
//!
//! The marker is a global whose name embeds the correlation token, so two
//! correlations can never touch the same global, even against one window.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

use crate::identifiers::CorrelationToken;

// ============================================================================
// Constants
// ============================================================================

/// Prefix of every marker global.
pub const BINDING_PREFIX: &str = "__devtools_bridge_";

// ============================================================================
// MarkerBinding
// ============================================================================

/// A per-correlation global holding the token value.
#[derive(Debug, Clone)]
pub struct MarkerBinding {
    /// Global name, `__devtools_bridge_<token>`.
    name: String,
    /// Token written into the global.
    token: CorrelationToken,
}

impl MarkerBinding {
    /// Creates the binding for `token`.
    #[must_use]
    pub fn new(token: CorrelationToken) -> Self {
        Self {
            name: format!("{BINDING_PREFIX}{}", token.simple()),
            token,
        }
    }

    /// Returns the global name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the token.
    #[inline]
    #[must_use]
    pub fn token(&self) -> CorrelationToken {
        self.token
    }

    /// Script that defines the global in a window.
    #[must_use]
    pub fn install_script(&self) -> String {
        format!(
            "globalThis[{}] = {};",
            json_string(&self.name),
            json_string(&self.token.value())
        )
    }

    /// Expression that reads the global in a page.
    #[must_use]
    pub fn probe_expression(&self) -> String {
        format!("globalThis[{}]", json_string(&self.name))
    }

    /// Script that removes the global from a window.
    #[must_use]
    pub fn remove_script(&self) -> String {
        format!("delete globalThis[{}];", json_string(&self.name))
    }

    /// Returns `true` if a probe result carries this binding's token.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        value.as_str() == Some(self.token.value().as_str())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Escapes a string for safe use in JavaScript.
fn json_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}

// ============================================================================
// Tests
// ============================================================================
