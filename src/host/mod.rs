//! Host process collaborators.
//!
//! The host is the GUI application that owns native windows and can expose
//! a remote-debugging endpoint. This crate never creates or destroys host
//! objects; it only reads and writes launch switches before readiness and
//! runs transient scripts inside windows.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`HostProcess`] | Readiness, version, launch switches |
//! | [`HostWindow`] | Script execution and navigation inside one window |
//! | [`CommandLine`] | Read/write access to launch switches |
//! | [`Switches`] | Thread-safe [`CommandLine`] store for embedders |

// ============================================================================
// Submodules
// ============================================================================

/// Launch switch storage and well-known switch names.
pub mod switches;

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

// ============================================================================
// Re-exports
// ============================================================================

pub use switches::{CommandLine, Switches};

// ============================================================================
// HostProcess
// ============================================================================

/// The long-lived host application.
///
/// Readiness is monotonic: once [`is_ready`](Self::is_ready) returns `true`
/// it never returns `false` again.
#[async_trait]
pub trait HostProcess: Send + Sync {
    /// Returns `true` once the host has finished starting up.
    fn is_ready(&self) -> bool;

    /// Resolves once the host is ready. Returns immediately if it already is.
    async fn when_ready(&self);

    /// Host version string, e.g. `"7.1.2"`.
    fn version(&self) -> String;

    /// Launch-time switches of this process.
    fn command_line(&self) -> &dyn CommandLine;
}

// ============================================================================
// HostWindow
// ============================================================================

/// A native window owned by the host process.
#[async_trait]
pub trait HostWindow: Send + Sync {
    /// Current location of the window content. Empty when nothing is loaded.
    fn url(&self) -> String;

    /// Navigates the window and resolves once the content has loaded.
    async fn load_url(&self, url: &str) -> Result<()>;

    /// Executes script in the window content and returns its result.
    async fn execute_script(&self, script: &str) -> Result<Value>;

    /// Returns `true` if the window has loaded content.
    #[inline]
    fn has_content(&self) -> bool {
        !self.url().is_empty()
    }
}
