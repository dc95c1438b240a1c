//! DevTools protocol message types.
//!
//! This module defines the JSON messages exchanged with the host's DevTools
//! endpoint.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Local → Remote | Command request |
//! | `Response` | Remote → Local | Command response |
//! | `Event` | Remote → Local | Target notification |
//!
//! # Command Naming
//!
//! Commands follow `Domain.method` format:
//!
//! - `Target.getTargets`
//! - `Target.attachToTarget`
//! - `Runtime.evaluate`

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;

// ============================================================================
// Submodules
// ============================================================================

/// Command definitions organized by domain.
pub mod command;

/// Event message types.
pub mod event;

/// Request and Response message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{Command, EmulationCommand, RuntimeCommand, TargetCommand};
pub use event::{Event, PAGE_TARGET_TYPE, ParsedEvent, TargetInfo};
pub use request::{ErrorBody, Request, Response};

// ============================================================================
// Incoming
// ============================================================================

/// Any message read from the remote end.
///
/// Responses carry an `id`; events never do.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Incoming {
    /// Reply to a request.
    Response(Response),
    /// Unsolicited notification.
    Event(Event),
}

// ============================================================================
// Tests
// ============================================================================
