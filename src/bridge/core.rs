//! Bridge coordinator.
//!
//! The [`Bridge`] owns one automation controller and runs the three steps of
//! a host session against it:
//!
//! 1. [`Bridge::initialize`] before the host is ready
//! 2. [`Bridge::connect`] once per desired connection
//! 3. [`Bridge::get_page`] per window, any number of times
//!
//! # Example
//!
//! ```no_run
//! use devtools_bridge::{Bridge, CdpAutomation, HostProcess, HostWindow};
//!
//! # async fn example(host: &dyn HostProcess, window: &dyn HostWindow) -> devtools_bridge::Result<()> {
//! let bridge = Bridge::builder().automation(CdpAutomation::new()).build()?;
//!
//! bridge.initialize(host, 0).await?;
//! // ... host finishes starting up ...
//! let connection = bridge.connect(host).await?;
//!
//! let page = bridge.get_page(&connection, window).await?;
//! println!("window shows {}", page.url());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::automation::{Automation, RemotePage};
use crate::bootstrap::{BridgeConnection, ConnectionConfig, Configurator, Connector};
use crate::correlate::Correlator;
use crate::error::Result;
use crate::host::{HostProcess, HostWindow};

use super::builder::BridgeBuilder;
use super::options::BridgeOptions;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the bridge.
pub(crate) struct BridgeInner {
    /// Automation controller handed the websocket endpoint.
    pub automation: Arc<dyn Automation>,

    /// Readiness wait, metadata probe and port pinning.
    pub connector: Connector,

    /// Window to page lookup.
    pub correlator: Correlator,

    /// Options the bridge was built with.
    pub options: BridgeOptions,
}

// ============================================================================
// Bridge
// ============================================================================

/// DevTools bridge for host processes.
///
/// Cloning is cheap; clones share the automation controller and the pinned
/// debugging ports.
#[derive(Clone)]
pub struct Bridge {
    /// Shared inner state.
    pub(crate) inner: Arc<BridgeInner>,
}

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("connector", &self.inner.connector)
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Bridge - Public API
// ============================================================================

impl Bridge {
    /// Creates a configuration builder for the bridge.
    #[inline]
    #[must_use]
    pub fn builder() -> BridgeBuilder {
        BridgeBuilder::new()
    }

    /// Returns the options the bridge was built with.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &BridgeOptions {
        &self.inner.options
    }

    /// Returns the port pinned by the first connect to `process`.
    #[inline]
    #[must_use]
    pub fn pinned_port(&self, process: &dyn HostProcess) -> Option<u16> {
        self.inner.connector.pinned_port(process)
    }

    /// Configures remote debugging on a host that is not ready yet.
    ///
    /// Port `0` picks a free loopback port.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyReady`](crate::Error::AlreadyReady) if the host is already ready
    /// - [`Error::InvalidPort`](crate::Error::InvalidPort) if `port > 65535`
    /// - [`Error::AlreadyInitialized`](crate::Error::AlreadyInitialized) on a second call
    ///   or if a debugging switch is already present
    pub async fn initialize(&self, process: &dyn HostProcess, port: u32) -> Result<ConnectionConfig> {
        Configurator::initialize(process, port).await
    }

    /// Connects the automation controller to the host.
    ///
    /// Each call returns a fresh connection over the same port.
    ///
    /// # Errors
    ///
    /// See [`Connector::connect`].
    pub async fn connect(&self, process: &dyn HostProcess) -> Result<BridgeConnection> {
        self.inner
            .connector
            .connect(process, self.inner.automation.as_ref())
            .await
    }

    /// Returns the remote page shown by `window`.
    ///
    /// Empty windows are navigated to the blank page when the options allow it.
    ///
    /// # Errors
    ///
    /// See [`Correlator::get_page`].
    pub async fn get_page(
        &self,
        connection: &BridgeConnection,
        window: &dyn HostWindow,
    ) -> Result<Arc<dyn RemotePage>> {
        self.get_page_with(connection, window, self.inner.options.allow_blank_navigate)
            .await
    }

    /// Returns the remote page shown by `window`, choosing blank navigation explicitly.
    ///
    /// # Errors
    ///
    /// See [`Correlator::get_page`].
    pub async fn get_page_with(
        &self,
        connection: &BridgeConnection,
        window: &dyn HostWindow,
        allow_blank_navigate: bool,
    ) -> Result<Arc<dyn RemotePage>> {
        debug!(port = connection.port(), allow_blank_navigate, "Looking up window page");
        self.inner
            .correlator
            .get_page(connection.connection().as_ref(), window, allow_blank_navigate)
            .await
    }
}

// ============================================================================
// Bridge - Internal
// ============================================================================

impl Bridge {
    /// Creates a bridge from validated parts.
    pub(crate) fn new(automation: Arc<dyn Automation>, options: BridgeOptions) -> Result<Self> {
        let connector = Connector::new(options.clone())?;
        let correlator = Correlator::new(options.clone());

        Ok(Self {
            inner: Arc::new(BridgeInner {
                automation,
                connector,
                correlator,
                options,
            }),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
