//! Connection establishment against the host debugging endpoint.
//!
//! # Connection Flow
//!
//! 1. Read the port written by [`Configurator::initialize`](super::Configurator::initialize)
//! 2. Wait for the host to become ready (with deadline)
//! 3. Probe `GET /json/version` until it answers (bounded retry, capped backoff)
//! 4. Hand the websocket endpoint to the automation controller

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use reqwest::Client;
use rustc_hash::FxHashMap;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::automation::{Automation, ConnectOptions, RemoteConnection};
use crate::bridge::BridgeOptions;
use crate::error::{Error, Result};
use crate::host::HostProcess;

use super::config::ConnectionConfig;
use super::version::VersionInfo;

// ============================================================================
// BridgeConnection
// ============================================================================

/// A live automation connection to the host, plus how it was reached.
#[derive(Clone)]
pub struct BridgeConnection {
    /// Remote session handle.
    connection: Arc<dyn RemoteConnection>,
    /// Metadata returned by `/json/version`.
    version: VersionInfo,
    /// Debugging port used.
    port: u16,
}

impl BridgeConnection {
    /// Returns the remote session handle.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &Arc<dyn RemoteConnection> {
        &self.connection
    }

    /// Returns the debugging metadata.
    #[inline]
    #[must_use]
    pub fn version(&self) -> &VersionInfo {
        &self.version
    }

    /// Returns the debugging port.
    #[inline]
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Debug for BridgeConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConnection")
            .field("port", &self.port)
            .field("browser", &self.version.browser)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Connector
// ============================================================================

/// Waits for the host, probes its metadata and opens automation connections.
///
/// The port of each process's first connect is pinned; a later connect to the
/// same process that finds a different port fails. Processes are told apart
/// by address, so one connector can serve several hosts.
pub struct Connector {
    /// Deadlines and retry schedule.
    options: BridgeOptions,
    /// HTTP client for the metadata probe.
    client: Client,
    /// Port of the first configuration read, per process.
    pinned_ports: Mutex<FxHashMap<ProcessKey, u16>>,
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("pinned_ports", &self.pinned_ports.lock().len())
            .finish_non_exhaustive()
    }
}

impl Connector {
    /// Creates a connector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(options: BridgeOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.request_timeout())
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()?;

        Ok(Self {
            options,
            client,
            pinned_ports: Mutex::new(FxHashMap::default()),
        })
    }

    /// Returns the port pinned by the first connect to `process`, if any.
    #[inline]
    #[must_use]
    pub fn pinned_port(&self, process: &dyn HostProcess) -> Option<u16> {
        self.pinned_ports
            .lock()
            .get(&ProcessKey::of(process))
            .copied()
    }

    /// Connects the automation controller to the host debugging endpoint.
    ///
    /// # Errors
    ///
    /// - [`Error::NotInitialized`] if the host carries no port switch
    /// - [`Error::PortMismatch`] if the port changed since the previous connect
    /// - [`Error::ConnectionTimeout`] if the host does not become ready in time
    /// - [`Error::EndpointUnreachable`] if the retry budget runs out
    /// - any error returned by the automation controller
    pub async fn connect(
        &self,
        process: &dyn HostProcess,
        automation: &dyn Automation,
    ) -> Result<BridgeConnection> {
        let config =
            ConnectionConfig::read(process.command_line())?.ok_or(Error::NotInitialized)?;
        self.pin_port(process, config.port())?;

        self.wait_ready(process).await?;

        let version = self.fetch_version(&config).await?;
        let endpoint = version.websocket_endpoint()?;
        debug!(endpoint = %endpoint, "Connecting automation controller");

        let connection = automation.connect(ConnectOptions::new(endpoint)).await?;

        info!(port = config.port(), browser = %version.browser, "Automation connected");

        Ok(BridgeConnection {
            connection,
            version,
            port: config.port(),
        })
    }

    /// Probes the metadata resource until it answers or the budget runs out.
    ///
    /// Only transient failures are retried; a malformed answer fails at once.
    ///
    /// # Errors
    ///
    /// - [`Error::EndpointUnreachable`] after the last failed attempt
    /// - [`Error::Protocol`] or [`Error::Http`] for non-transient failures
    pub async fn fetch_version(&self, config: &ConnectionConfig) -> Result<VersionInfo> {
        let url = config.metadata_url();
        let policy = self.options.retry;
        let attempts = policy.attempts();
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.fetch_once(&url).await {
                Ok(info) => {
                    debug!(attempt, %url, "Debugging metadata received");
                    return Ok(info);
                }

                Err(e) if e.is_recoverable() => {
                    last_error = e.to_string();

                    if attempt < attempts {
                        let delay = policy.delay_after(attempt);
                        debug!(
                            attempt,
                            attempts,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Debugging endpoint not reachable yet"
                        );
                        sleep(delay).await;
                    }
                }

                Err(e) => return Err(e),
            }
        }

        warn!(%url, attempts, "Debugging endpoint unreachable");
        Err(Error::endpoint_unreachable(url, attempts, last_error))
    }

    /// Issues a single metadata request.
    async fn fetch_once(&self, url: &str) -> Result<VersionInfo> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::protocol(format!(
                "Debugging metadata returned {status}"
            )));
        }

        Ok(response.json::<VersionInfo>().await?)
    }

    /// Waits for host readiness with the configured deadline.
    async fn wait_ready(&self, process: &dyn HostProcess) -> Result<()> {
        if process.is_ready() {
            return Ok(());
        }

        let deadline = self.options.ready_timeout();
        debug!(timeout_ms = deadline.as_millis() as u64, "Waiting for host readiness");

        timeout(deadline, process.when_ready())
            .await
            .map_err(|_| Error::connection_timeout(deadline.as_millis() as u64))
    }

    /// Records the port on first use and rejects a different one afterwards.
    fn pin_port(&self, process: &dyn HostProcess, port: u16) -> Result<()> {
        let mut pinned = self.pinned_ports.lock();
        match pinned.get(&ProcessKey::of(process)) {
            Some(&expected) if expected != port => Err(Error::PortMismatch {
                expected,
                actual: port,
            }),
            Some(_) => Ok(()),
            None => {
                pinned.insert(ProcessKey::of(process), port);
                Ok(())
            }
        }
    }
}

// ============================================================================
// ProcessKey
// ============================================================================

/// Identity of a host process: the address of the borrowed object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ProcessKey(usize);

impl ProcessKey {
    #[inline]
    fn of(process: &dyn HostProcess) -> Self {
        Self(std::ptr::from_ref(process).cast::<()>() as usize)
    }
}

// ============================================================================
// Tests
// ============================================================================
