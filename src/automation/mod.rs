//! Automation controller collaborators.
//!
//! The bridge needs three capabilities from whatever drives the DevTools
//! session: open a connection from a websocket endpoint, list the pages of
//! that connection, and evaluate an expression in one page. Anything that
//! provides them can be plugged in; [`crate::cdp`] ships a websocket-backed
//! implementation.
//!
//! | Trait | Capability |
//! |-------|------------|
//! | [`Automation`] | `connect` |
//! | [`RemoteConnection`] | `pages` |
//! | [`RemotePage`] | `evaluate`, `url` |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::Result;

// ============================================================================
// Viewport
// ============================================================================

/// Emulated viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

// ============================================================================
// ConnectOptions
// ============================================================================

/// Arguments passed to [`Automation::connect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Browser-level websocket endpoint from `/json/version`.
    pub websocket_endpoint: Url,

    /// Viewport override. `None` leaves sizing to the host window.
    pub default_viewport: Option<Viewport>,
}

impl ConnectOptions {
    /// Creates options with no viewport override.
    #[inline]
    #[must_use]
    pub fn new(websocket_endpoint: Url) -> Self {
        Self {
            websocket_endpoint,
            default_viewport: None,
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Entry point of an automation controller.
#[async_trait]
pub trait Automation: Send + Sync {
    /// Opens a connection to the given endpoint.
    async fn connect(&self, options: ConnectOptions) -> Result<Arc<dyn RemoteConnection>>;
}

/// A live automation session.
#[async_trait]
pub trait RemoteConnection: Send + Sync {
    /// Lists the pages currently known to the session.
    async fn pages(&self) -> Result<Vec<Arc<dyn RemotePage>>>;
}

/// One remote-controllable content context.
#[async_trait]
pub trait RemotePage: Send + Sync + fmt::Debug {
    /// Current location of the page.
    fn url(&self) -> String;

    /// Evaluates `expression` in the page's main world.
    ///
    /// Fails if the page's script context is gone.
    async fn evaluate(&self, expression: &str) -> Result<Value>;
}
