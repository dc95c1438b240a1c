//! DevTools bridge - connect an automation controller to a GUI host process.
//!
//! This library configures a host process to expose a remote-debugging
//! endpoint, connects an automation controller to that endpoint, and finds
//! the remote page that backs any given host window.
//!
//! # Architecture
//!
//! The bridge runs in three phases:
//!
//! - **Initialize**: before the host is ready, write the debugging port and
//!   loopback address switches (picking a free port when asked)
//! - **Connect**: wait for readiness, probe `GET /json/version` with bounded
//!   retry, hand the websocket endpoint to the automation controller
//! - **Correlate**: plant a per-call marker global in a window, ask every
//!   remote page for it concurrently, remove it, return the single match
//!
//! Key design principles:
//!
//! - Host and automation are narrow traits ([`HostProcess`], [`HostWindow`],
//!   [`Automation`]); [`CdpAutomation`] is the built-in websocket controller
//! - Every wait carries a deadline from [`BridgeOptions`]
//! - The marker name is unique per call, so concurrent lookups never collide
//!
//! # Quick Start
//!
//! ```no_run
//! use devtools_bridge::{Bridge, CdpAutomation, HostProcess, HostWindow, Result};
//!
//! async fn attach(host: &dyn HostProcess, window: &dyn HostWindow) -> Result<()> {
//!     let bridge = Bridge::builder().automation(CdpAutomation::new()).build()?;
//!
//!     // Before the host is ready.
//!     bridge.initialize(host, 0).await?;
//!
//!     // Any time after.
//!     let connection = bridge.connect(host).await?;
//!     let page = bridge.get_page(&connection, window).await?;
//!
//!     let title = page.evaluate("document.title").await?;
//!     println!("{} - {}", page.url(), title);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`automation`] | Automation controller traits |
//! | [`bootstrap`] | Port allocation, switch configuration, connect with retry |
//! | [`bridge`] | [`Bridge`] facade, builder and options |
//! | [`cdp`] | DevTools websocket implementation of [`automation`] |
//! | [`correlate`] | Window to page correlation |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`host`] | Host process and window traits |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | DevTools message types (internal) |
//! | [`transport`] | WebSocket transport layer (internal) |

// ============================================================================
// Modules
// ============================================================================

/// Automation controller traits.
///
/// Implement [`Automation`] to plug in another controller.
pub mod automation;

/// Connection bootstrap.
///
/// - [`Configurator`] - switch configuration before readiness
/// - [`Connector`] - readiness wait, metadata probe, automation connect
/// - [`PortAllocator`] - free loopback port lookup
pub mod bootstrap;

/// Bridge facade.
///
/// Use [`Bridge::builder()`] to create a configured bridge.
pub mod bridge;

/// DevTools websocket automation controller.
pub mod cdp;

/// Window to page correlation.
pub mod correlate;

/// Error types and result alias.
pub mod error;

/// Host process and window traits.
pub mod host;

/// Type-safe identifier wrappers.
pub mod identifiers;

/// DevTools protocol message types.
///
/// Internal module for websocket communication.
pub mod protocol;

/// WebSocket transport layer.
///
/// Internal module for the client websocket connection.
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Automation types
pub use automation::{Automation, ConnectOptions, RemoteConnection, RemotePage, Viewport};

// Bootstrap types
pub use bootstrap::{
    BridgeConnection, ConnectionConfig, Configurator, Connector, PortAllocator, RetryPolicy,
    VersionInfo,
};

// Bridge types
pub use bridge::{Bridge, BridgeBuilder, BridgeOptions};

// DevTools controller
pub use cdp::{CdpAutomation, CdpBrowser, CdpPage};

// Correlation
pub use correlate::Correlator;

// Error types
pub use error::{Error, Result};

// Host types
pub use host::{CommandLine, HostProcess, HostWindow, Switches};

// Identifier types
pub use identifiers::{CdpSessionId, CorrelationToken, RequestId, TargetId};
