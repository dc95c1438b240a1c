//! Remote-debugging bootstrap of the host process.
//!
//! Must run before the host is ready: switches written afterwards are
//! silently ignored by the host, so late calls fail instead.

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::host::switches::ENABLE_FEATURES;
use crate::host::{CommandLine, HostProcess};

use super::config::{ConnectionConfig, LOOPBACK};
use super::port::PortAllocator;

// ============================================================================
// Constants
// ============================================================================

/// First host major version that needs the network service enabled.
pub const NETWORK_SERVICE_MIN_MAJOR: u32 = 7;

/// Feature enabling the out-of-process network service.
pub const NETWORK_SERVICE_FEATURE: &str = "NetworkService";

// ============================================================================
// Configurator
// ============================================================================

/// Applies remote-debugging configuration to a host process.
#[derive(Debug, Clone, Copy, Default)]
pub struct Configurator;

impl Configurator {
    /// Configures `process` for remote debugging on `port`.
    ///
    /// Port 0 picks a free loopback port.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyReady`] if the host already finished starting
    /// - [`Error::InvalidPort`] if `port` exceeds 65535
    /// - [`Error::AlreadyInitialized`] if the host already carries a port or
    ///   address switch
    /// - [`Error::Io`] if no free port could be allocated
    pub async fn initialize(process: &dyn HostProcess, port: u32) -> Result<ConnectionConfig> {
        if process.is_ready() {
            return Err(Error::AlreadyReady);
        }

        let requested = u16::try_from(port).map_err(|_| Error::InvalidPort { port })?;

        let command_line = process.command_line();
        ConnectionConfig::ensure_unconfigured(command_line)?;

        let port = match requested {
            0 => PortAllocator::allocate(LOOPBACK).await?,
            port => port,
        };

        let config = ConnectionConfig::new(port);
        config.apply(command_line)?;

        let version = process.version();
        if needs_network_service(&version) {
            enable_feature(command_line, NETWORK_SERVICE_FEATURE);
            debug!(%version, "Enabled network service feature");
        }

        info!(port, address = %config.address(), "Remote debugging configured");

        Ok(config)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Returns `true` if the host version requires the network service flag.
///
/// Unparseable versions are left alone.
pub(crate) fn needs_network_service(version: &str) -> bool {
    match major_version(version) {
        Some(major) => major >= NETWORK_SERVICE_MIN_MAJOR,
        None => {
            warn!(%version, "Could not parse host major version");
            false
        }
    }
}

/// Extracts the major component of a dotted version string.
pub(crate) fn major_version(version: &str) -> Option<u32> {
    version
        .trim()
        .trim_start_matches('v')
        .split('.')
        .next()
        .and_then(|major| major.parse().ok())
}

/// Adds `feature` to the comma-separated `enable-features` switch.
fn enable_feature(command_line: &dyn CommandLine, feature: &str) {
    let merged = match command_line.switch_value(ENABLE_FEATURES) {
        Some(existing) if existing.split(',').any(|f| f.trim() == feature) => return,
        Some(existing) if !existing.trim().is_empty() => format!("{existing},{feature}"),
        _ => feature.to_string(),
    };
    command_line.append_switch(ENABLE_FEATURES, Some(&merged));
}

// ============================================================================
// Tests
// ============================================================================
