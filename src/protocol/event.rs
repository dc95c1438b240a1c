//! Event message types.
//!
//! Events are notifications pushed by the remote end without a request id.
//! The bridge only interprets the `Target` discovery events; everything else
//! surfaces as [`ParsedEvent::Unknown`].
//!
//! # Event Types
//!
//! | Domain | Events |
//! |--------|--------|
//! | `Target` | `targetCreated`, `targetInfoChanged`, `targetDestroyed` |

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::identifiers::{CdpSessionId, TargetId};

// ============================================================================
// Constants
// ============================================================================

/// Target type of a top-level page.
pub const PAGE_TARGET_TYPE: &str = "page";

// ============================================================================
// Event
// ============================================================================

/// An event notification from the remote end.
///
/// # Format
///
/// ```json
/// {
///   "method": "Domain.eventName",
///   "params": { ... },
///   "sessionId": "optional"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Event name in `Domain.eventName` format.
    pub method: String,

    /// Event-specific data.
    #[serde(default)]
    pub params: Value,

    /// Session the event was raised in.
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<CdpSessionId>,
}

impl Event {
    /// Returns the domain name from the method.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let event = Event { method: "Target.targetCreated".into(), .. };
    /// assert_eq!(event.domain(), "Target");
    /// ```
    #[inline]
    #[must_use]
    pub fn domain(&self) -> &str {
        self.method.split('.').next().unwrap_or_default()
    }

    /// Returns the event name from the method.
    #[inline]
    #[must_use]
    pub fn event_name(&self) -> &str {
        self.method.split('.').nth(1).unwrap_or_default()
    }

    /// Parses the event into a typed variant.
    #[must_use]
    pub fn parse(&self) -> ParsedEvent {
        match self.method.as_str() {
            "Target.targetCreated" => match self.target_info() {
                Some(info) => ParsedEvent::TargetCreated(info),
                None => self.unknown(),
            },

            "Target.targetInfoChanged" => match self.target_info() {
                Some(info) => ParsedEvent::TargetInfoChanged(info),
                None => self.unknown(),
            },

            "Target.targetDestroyed" => match self.params.get("targetId").and_then(Value::as_str) {
                Some(id) => ParsedEvent::TargetDestroyed {
                    target_id: TargetId::new(id),
                },
                None => self.unknown(),
            },

            _ => self.unknown(),
        }
    }

    /// Extracts `params.targetInfo`.
    fn target_info(&self) -> Option<TargetInfo> {
        self.params
            .get("targetInfo")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
    }

    fn unknown(&self) -> ParsedEvent {
        ParsedEvent::Unknown {
            method: self.method.clone(),
            params: self.params.clone(),
        }
    }
}

// ============================================================================
// TargetInfo
// ============================================================================

/// Description of a debuggable target.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TargetInfo {
    /// Target identifier.
    #[serde(rename = "targetId")]
    pub target_id: TargetId,

    /// Target type (`page`, `service_worker`, ...).
    #[serde(rename = "type")]
    pub target_type: String,

    /// Document title.
    #[serde(default)]
    pub title: String,

    /// Current URL.
    #[serde(default)]
    pub url: String,

    /// Whether a client is attached.
    #[serde(default)]
    pub attached: bool,
}

impl TargetInfo {
    /// Returns `true` for top-level page targets.
    #[inline]
    #[must_use]
    pub fn is_page(&self) -> bool {
        self.target_type == PAGE_TARGET_TYPE
    }
}

// ============================================================================
// ParsedEvent
// ============================================================================

/// Parsed event types for type-safe handling.
#[derive(Debug, Clone)]
pub enum ParsedEvent {
    /// A target appeared.
    TargetCreated(TargetInfo),

    /// A target navigated or changed title.
    TargetInfoChanged(TargetInfo),

    /// A target went away.
    TargetDestroyed {
        /// Destroyed target.
        target_id: TargetId,
    },

    /// Unknown event type.
    Unknown {
        /// Event method.
        method: String,
        /// Event params.
        params: Value,
    },
}

// ============================================================================
// Tests
// ============================================================================
