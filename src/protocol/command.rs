//! Command definitions organized by domain.
//!
//! Commands follow the DevTools `Domain.method` format. Only the commands the
//! bridge issues are modelled.
//!
//! # Command Domains
//!
//! | Domain | Commands |
//! |--------|----------|
//! | `Target` | Discovery, enumeration, attach |
//! | `Runtime` | Expression evaluation |
//! | `Emulation` | Viewport override |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::identifiers::TargetId;

// ============================================================================
// Command Wrapper
// ============================================================================

/// All protocol commands organized by domain.
///
/// This enum wraps domain-specific command enums for unified serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    /// Target domain commands.
    Target(TargetCommand),
    /// Runtime domain commands.
    Runtime(RuntimeCommand),
    /// Emulation domain commands.
    Emulation(EmulationCommand),
}

impl Command {
    /// Returns the `Domain.method` name of the command.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::Target(TargetCommand::SetDiscoverTargets { .. }) => "Target.setDiscoverTargets",
            Self::Target(TargetCommand::GetTargets) => "Target.getTargets",
            Self::Target(TargetCommand::AttachToTarget { .. }) => "Target.attachToTarget",
            Self::Runtime(RuntimeCommand::Evaluate { .. }) => "Runtime.evaluate",
            Self::Emulation(EmulationCommand::SetDeviceMetricsOverride { .. }) => {
                "Emulation.setDeviceMetricsOverride"
            }
        }
    }
}

// ============================================================================
// Target Commands
// ============================================================================

/// Target domain commands for page discovery and sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum TargetCommand {
    /// Enable or disable `Target.targetCreated` / `targetInfoChanged` / `targetDestroyed` events.
    #[serde(rename = "Target.setDiscoverTargets")]
    SetDiscoverTargets {
        /// Whether to discover targets.
        discover: bool,
    },

    /// List all targets.
    #[serde(rename = "Target.getTargets")]
    GetTargets,

    /// Attach to a target.
    #[serde(rename = "Target.attachToTarget")]
    AttachToTarget {
        /// Target to attach to.
        #[serde(rename = "targetId")]
        target_id: TargetId,
        /// Use flat session mode (commands carry `sessionId`).
        flatten: bool,
    },
}

// ============================================================================
// Runtime Commands
// ============================================================================

/// Runtime domain commands for script evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum RuntimeCommand {
    /// Evaluate an expression in the page's main world.
    #[serde(rename = "Runtime.evaluate")]
    Evaluate {
        /// Expression to evaluate.
        expression: String,
        /// Return the result serialized as JSON.
        #[serde(rename = "returnByValue")]
        return_by_value: bool,
        /// Await a returned promise.
        #[serde(rename = "awaitPromise")]
        await_promise: bool,
    },
}

// ============================================================================
// Emulation Commands
// ============================================================================

/// Emulation domain commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum EmulationCommand {
    /// Override the page viewport.
    #[serde(rename = "Emulation.setDeviceMetricsOverride")]
    SetDeviceMetricsOverride {
        /// Viewport width.
        width: u32,
        /// Viewport height.
        height: u32,
        /// Device scale factor (0 keeps the host value).
        #[serde(rename = "deviceScaleFactor")]
        device_scale_factor: f64,
        /// Emulate a mobile device.
        mobile: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================
